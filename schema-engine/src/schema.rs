//! The compiled form of a single schema node.

use crate::dialect::Draft;
use crate::keyword::Keyword;
use schema_uri::AbsoluteUri;
use serde_json::Value;

slotmap::new_key_type! {
    /// A handle to one compiled schema node inside a [`crate::Registry`].
    ///
    /// Keys are stable for the lifetime of the registry that produced them
    /// and are cheap to copy; the registry is the only place a
    /// [`SchemaKey`] can be dereferenced into a [`CompiledSchema`].
    pub struct SchemaKey;
}

/// One node of a compiled schema graph: either a boolean schema (`true`/
/// `false`) or an object schema with its keywords already parsed and, for
/// every applicator keyword, already linked to the [`SchemaKey`]s of its
/// subschemas.
#[derive(Debug, Clone)]
pub struct CompiledSchema {
    pub(crate) key: SchemaKey,
    /// This node's canonical location: the nearest enclosing `$id` (or the
    /// registry's default base URI for a root with none) plus the JSON
    /// Pointer from that base down to this node.
    pub(crate) uri: AbsoluteUri,
    /// The base URI nested `$ref`s and `$id`s inside this node resolve
    /// against: equal to `uri` (fragment stripped) if this node itself
    /// declares `$id`, otherwise inherited unchanged from its parent.
    pub(crate) base_uri: AbsoluteUri,
    /// The raw schema value (`Value::Bool` or `Value::Object`).
    pub(crate) value: Value,
    pub(crate) draft: Draft,
    pub(crate) keywords: Vec<Keyword>,
    /// The name this node was registered under via `$dynamicAnchor`, if any.
    pub(crate) dynamic_anchor: Option<String>,
}

impl CompiledSchema {
    #[must_use]
    pub fn key(&self) -> SchemaKey {
        self.key
    }

    #[must_use]
    pub fn uri(&self) -> &AbsoluteUri {
        &self.uri
    }

    #[must_use]
    pub fn base_uri(&self) -> &AbsoluteUri {
        &self.base_uri
    }

    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    #[must_use]
    pub fn draft(&self) -> Draft {
        self.draft
    }

    #[must_use]
    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    #[must_use]
    pub fn dynamic_anchor(&self) -> Option<&str> {
        self.dynamic_anchor.as_deref()
    }

    /// A boolean schema short-circuits evaluation: `true` always passes,
    /// `false` always fails, neither ever produces annotations.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        self.value.as_bool()
    }
}
