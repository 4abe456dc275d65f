//! Built-in vocabularies: the `format` assertion functions and a minimal
//! stand-in meta-schema used for the optional schema-validity pre-check.

use crate::dialect::Draft;

/// The keyword names this engine recognizes as schema-bearing applicators,
/// per dialect. Used only to answer "is this a keyword this engine knows
/// about" queries; the structural walk in [`crate::compile`] has its own,
/// more detailed per-position table and does not consult this list.
#[must_use]
pub fn known_keywords(draft: Draft) -> &'static [&'static str] {
    const CORE: &[&str] = &[
        "$id", "$schema", "$ref", "$anchor", "$defs", "$comment",
    ];
    const APPLICATOR: &[&str] = &[
        "allOf", "anyOf", "oneOf", "not", "if", "then", "else", "properties",
        "patternProperties", "additionalProperties", "items", "contains",
        "propertyNames", "dependentSchemas",
    ];
    const VALIDATION: &[&str] = &[
        "type", "enum", "const", "multipleOf", "maximum", "exclusiveMaximum",
        "minimum", "exclusiveMinimum", "maxLength", "minLength", "pattern",
        "maxItems", "minItems", "uniqueItems", "maxContains", "minContains",
        "maxProperties", "minProperties", "required", "dependentRequired",
    ];
    match draft {
        Draft::Draft07 => CORE,
        Draft::Draft201909 => APPLICATOR,
        Draft::Draft202012 => VALIDATION,
    }
}

/// A deliberately minimal stand-in for the official draft meta-schemas:
/// checks that well-known keywords carry the right JSON type, not full
/// conformance to the published multi-kilobyte `schema.json` documents
/// (vendoring those verbatim is out of proportion for an optional
/// pre-compile sanity check).
pub mod meta {
    use serde_json::{json, Value};

    #[must_use]
    pub fn document(_draft: super::Draft) -> Value {
        json!({
            "type": ["object", "boolean"],
            "properties": {
                "$id": {"type": "string"},
                "$ref": {"type": "string"},
                "$schema": {"type": "string"},
                "$anchor": {"type": "string"},
                "$dynamicAnchor": {"type": "string"},
                "$dynamicRef": {"type": "string"},
                "$comment": {"type": "string"},
                "required": {"type": "array", "items": {"type": "string"}},
                "properties": {"type": "object"},
                "patternProperties": {"type": "object"},
                "$defs": {"type": "object"},
                "definitions": {"type": "object"},
                "allOf": {"type": "array"},
                "anyOf": {"type": "array"},
                "oneOf": {"type": "array"}
            }
        })
    }
}

pub mod format {
    use once_cell::sync::Lazy;
    use regex::Regex;
    use std::net::{Ipv4Addr, Ipv6Addr};

    static UUID_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$").unwrap()
    });
    static DURATION_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^P(\d+W|(\d+Y)?(\d+M)?(\d+D)?(T(\d+H)?(\d+M)?(\d+S)?)?)$").unwrap());
    static HOSTNAME_LABEL_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?$").unwrap());
    static RELATIVE_JSON_POINTER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(0|[1-9][0-9]*)(#|/.*)?$").unwrap());

    /// Dispatches to the validator for `name`, returning `true` for any
    /// format name this vocabulary doesn't recognize (an unknown format is
    /// never grounds for failure).
    #[must_use]
    pub fn is_valid(name: &str, value: &str) -> bool {
        match name {
            "date-time" => is_date_time(value),
            "date" => is_date(value),
            "time" => is_time(value),
            "duration" => DURATION_RE.is_match(value) && value != "P",
            "email" | "idn-email" => email_address::EmailAddress::is_valid(value),
            "hostname" => is_hostname(value),
            "idn-hostname" => idna::domain_to_ascii(value).is_ok(),
            "ipv4" => value.parse::<Ipv4Addr>().is_ok() && !value.contains(':'),
            "ipv6" => value.parse::<Ipv6Addr>().is_ok(),
            "uri" => schema_uri::AbsoluteUri::parse(value).is_ok(),
            "uri-reference" => !value.is_empty(),
            "iri" | "iri-reference" => !value.is_empty(),
            "uuid" => UUID_RE.is_match(value),
            "regex" => fancy_regex::Regex::new(value).is_ok(),
            "json-pointer" => value.parse::<schema_uri::PointerBuf>().is_ok(),
            "relative-json-pointer" => RELATIVE_JSON_POINTER_RE.is_match(value),
            "uri-template" => !value.is_empty(),
            _ => true,
        }
    }

    fn is_date_time(value: &str) -> bool {
        chrono::DateTime::parse_from_rfc3339(value).is_ok()
    }

    fn is_date(value: &str) -> bool {
        chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
    }

    fn is_time(value: &str) -> bool {
        // `chrono` has no RFC 3339 partial-time parser; borrow its
        // `DateTime` parser by pairing the time with an arbitrary date.
        chrono::DateTime::parse_from_rfc3339(&format!("1970-01-01T{value}")).is_ok()
    }

    fn is_hostname(value: &str) -> bool {
        if value.is_empty() || value.len() > 253 {
            return false;
        }
        value.trim_end_matches('.').split('.').all(|label| HOSTNAME_LABEL_RE.is_match(label))
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use test_case::test_case;

        #[test_case("date-time", "2018-11-13T20:20:39+00:00", true; "valid date-time")]
        #[test_case("date-time", "not a date", false; "invalid date-time")]
        #[test_case("date", "2018-11-13", true; "valid date")]
        #[test_case("date", "2018-13-13", false; "invalid month")]
        #[test_case("email", "joe@example.com", true; "valid email")]
        #[test_case("email", "not-an-email", false; "invalid email")]
        #[test_case("ipv4", "127.0.0.1", true; "valid ipv4")]
        #[test_case("ipv4", "::1", false; "ipv6 not ipv4")]
        #[test_case("ipv6", "::1", true; "valid ipv6")]
        #[test_case("uuid", "550e8400-e29b-41d4-a716-446655440000", true; "valid uuid")]
        #[test_case("uuid", "not-a-uuid", false; "invalid uuid")]
        #[test_case("regex", "^[a-z]+$", true; "valid regex")]
        #[test_case("regex", "(unterminated", false; "invalid regex")]
        #[test_case("hostname", "example.com", true; "valid hostname")]
        #[test_case("hostname", "-bad-.com", false; "invalid hostname label")]
        #[test_case("unrecognized-format", "anything", true; "unknown format always passes")]
        fn validates_formats(name: &str, value: &str, expect: bool) {
            assert_eq!(is_valid(name, value), expect);
        }
    }
}
