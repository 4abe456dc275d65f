//! Draft identification and the handful of places keyword behavior forks by
//! draft (identifier keyword names, `items`/`additionalItems` vs
//! `prefixItems`/`items`, the `dependencies` split, boolean-exclusive-bound
//! spelling).

use serde_json::Value;

/// A JSON Schema draft/dialect this engine understands.
///
/// Variants are ordered oldest-first so `Draft07 < Draft201909 < Draft202012`
/// reads naturally if ever compared, though no code currently relies on that
/// ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
pub enum Draft {
    #[strum(serialize = "draft-07")]
    Draft07,
    #[strum(serialize = "2019-09")]
    Draft201909,
    #[strum(serialize = "2020-12")]
    Draft202012,
}

impl Draft {
    /// The canonical `$schema` URI used to recognize this draft.
    #[must_use]
    pub fn meta_schema_uri(self) -> &'static str {
        match self {
            Draft::Draft07 => "http://json-schema.org/draft-07/schema#",
            Draft::Draft201909 => "https://json-schema.org/draft/2019-09/schema",
            Draft::Draft202012 => "https://json-schema.org/draft/2020-12/schema",
        }
    }

    /// `true` for drafts where `$recursiveRef`/`$recursiveAnchor` are the
    /// dynamic-scoping mechanism (superseded by `$dynamicRef`/`$dynamicAnchor`
    /// in 2020-12).
    #[must_use]
    pub fn uses_recursive_ref(self) -> bool {
        matches!(self, Draft::Draft201909)
    }

    /// `true` for drafts where `$dynamicRef`/`$dynamicAnchor` exist.
    #[must_use]
    pub fn uses_dynamic_ref(self) -> bool {
        matches!(self, Draft::Draft202012)
    }

    /// `true` for 2019-09 and later, where `items` only ever takes a single
    /// schema and tuple validation moved to `prefixItems`.
    #[must_use]
    pub fn has_prefix_items(self) -> bool {
        matches!(self, Draft::Draft202012)
    }

    /// `true` for draft-07 and earlier, where `dependencies` covers both
    /// `dependentRequired` and `dependentSchemas`.
    #[must_use]
    pub fn has_legacy_dependencies(self) -> bool {
        matches!(self, Draft::Draft07)
    }

    /// `true` when `unevaluatedProperties`/`unevaluatedItems` exist (2019-09+).
    #[must_use]
    pub fn has_unevaluated(self) -> bool {
        !matches!(self, Draft::Draft07)
    }
}

/// Inspects a schema document's `$schema` keyword (falling back to
/// [`crate::Options::default_draft`] when absent or unrecognized) to decide
/// which draft's keyword set and identifier names apply.
#[must_use]
pub fn detect_draft(document: &Value, options: &crate::Options) -> Draft {
    if let Some(forced) = options.evaluate_as() {
        return forced;
    }
    let declared = document
        .as_object()
        .and_then(|map| map.get("$schema"))
        .and_then(Value::as_str);
    match declared {
        Some(uri) if uri.contains("draft-07") => Draft::Draft07,
        Some(uri) if uri.contains("2019-09") => Draft::Draft201909,
        Some(uri) if uri.contains("2020-12") => Draft::Draft202012,
        _ => options.default_draft(),
    }
}
