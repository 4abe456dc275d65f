//! The append-only store of compiled schemas.
//!
//! A [`Registry`] is built up by one or more calls to [`crate::compile`] and
//! is safe to share (`&Registry`) across concurrently running validations
//! once compilation has finished: nothing under `validate` mutates it.

use crate::dialect::Draft;
use crate::error::{CompileError, ReferenceUnresolvedSnafu, RegistryConflictSnafu, ResolveSnafu};
use crate::options::Options;
use crate::resolve::Resolve;
use crate::schema::{CompiledSchema, SchemaKey};
use schema_uri::{AbsoluteUri, Pointer};
use serde_json::Value;
use slotmap::SlotMap;
use snafu::ResultExt;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// The compiled-schema graph.
#[derive(Debug, Default)]
pub struct Registry {
    pub(crate) schemas: SlotMap<SchemaKey, CompiledSchema>,
    pub(crate) by_uri: HashMap<AbsoluteUri, SchemaKey>,
    pub(crate) anchors: HashMap<(AbsoluteUri, String), SchemaKey>,
    pub(crate) dynamic_anchors: HashMap<(AbsoluteUri, String), SchemaKey>,
    pub(crate) sources: HashMap<AbsoluteUri, Arc<Value>>,
    pub(crate) compiled_documents: HashSet<AbsoluteUri>,
    /// `(parent, keyword-relative segment like "allOf/0") -> child`, built by
    /// the structural walk so keyword compilation never has to re-derive a
    /// child's URI (which `$id` boundaries make ambiguous to reconstruct).
    pub(crate) children: HashMap<(SchemaKey, String), SchemaKey>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-registers a document under `uri` so that a later `$ref` into it
    /// does not need to go through [`crate::Resolve`].
    ///
    /// # Errors
    /// Returns [`CompileError::RegistryConflict`] if `uri` is already
    /// registered with different contents. Re-registering the identical
    /// document is a no-op.
    pub fn register(&mut self, uri: AbsoluteUri, document: Value) -> Result<(), CompileError> {
        let uri = uri.without_fragment();
        if let Some(existing) = self.sources.get(&uri) {
            if existing.as_ref() == &document {
                return Ok(());
            }
            return RegistryConflictSnafu { uri }.fail();
        }
        self.sources.insert(uri, Arc::new(document));
        Ok(())
    }

    #[must_use]
    pub fn get(&self, key: SchemaKey) -> Option<&CompiledSchema> {
        self.schemas.get(key)
    }

    #[must_use]
    pub fn get_by_uri(&self, uri: &AbsoluteUri) -> Option<SchemaKey> {
        self.by_uri.get(uri).copied()
    }

    #[must_use]
    pub fn source(&self, uri: &AbsoluteUri) -> Option<&Arc<Value>> {
        self.sources.get(uri)
    }

    /// Looks up the schema declaring `$dynamicAnchor = name` whose base URI
    /// is `base_uri`, without consulting the dynamic scope. Used by
    /// [`crate::scope::DynamicScope`] scans.
    #[must_use]
    pub fn dynamic_anchor(&self, base_uri: &AbsoluteUri, name: &str) -> Option<SchemaKey> {
        self.dynamic_anchors
            .get(&(base_uri.clone(), name.to_string()))
            .copied()
    }

    /// Reserves a placeholder node (empty keyword list) and links its URI,
    /// returning the existing key if `uri` is already present. Compile-time
    /// only; callers fill in `keywords` afterward via
    /// [`Registry::set_keywords`].
    pub(crate) fn reserve(
        &mut self,
        uri: AbsoluteUri,
        base_uri: AbsoluteUri,
        value: Value,
        draft: Draft,
    ) -> SchemaKey {
        if let Some(&key) = self.by_uri.get(&uri) {
            return key;
        }
        let key = self.schemas.insert_with_key(|key| CompiledSchema {
            key,
            uri: uri.clone(),
            base_uri,
            value,
            draft,
            keywords: Vec::new(),
            dynamic_anchor: None,
        });
        self.by_uri.insert(uri, key);
        key
    }

    pub(crate) fn link_anchor(&mut self, base_uri: AbsoluteUri, name: String, key: SchemaKey) {
        self.anchors.insert((base_uri, name), key);
    }

    pub(crate) fn link_dynamic_anchor(&mut self, base_uri: AbsoluteUri, name: String, key: SchemaKey) {
        self.anchors.insert((base_uri.clone(), name.clone()), key);
        self.dynamic_anchors.insert((base_uri, name.clone()), key);
        if let Some(schema) = self.schemas.get_mut(key) {
            schema.dynamic_anchor = Some(name);
        }
    }

    pub(crate) fn set_keywords(&mut self, key: SchemaKey, keywords: Vec<crate::keyword::Keyword>) {
        if let Some(schema) = self.schemas.get_mut(key) {
            schema.keywords = keywords;
        }
    }

    pub(crate) fn mark_document_compiled(&mut self, uri: AbsoluteUri) {
        self.compiled_documents.insert(uri);
    }

    pub(crate) fn document_compiled(&self, uri: &AbsoluteUri) -> bool {
        self.compiled_documents.contains(uri)
    }

    pub(crate) fn pointer_in(&self, document: &Value, pointer: &Pointer) -> Option<Value> {
        if pointer.to_string().is_empty() {
            return Some(document.clone());
        }
        document.pointer(&pointer.to_string()).cloned()
    }

    pub(crate) fn link_child(&mut self, parent: SchemaKey, segment: String, child: SchemaKey) {
        self.children.insert((parent, segment), child);
    }

    #[must_use]
    pub(crate) fn child(&self, parent: SchemaKey, segment: &str) -> Option<SchemaKey> {
        self.children.get(&(parent, segment.to_string())).copied()
    }

    /// Fetches the document at `uri` (no fragment), consulting
    /// pre-registered sources first and falling back to `resolver`, caching
    /// whatever it returns.
    pub(crate) fn fetch_source(
        &mut self,
        uri: &AbsoluteUri,
        resolver: &dyn Resolve,
    ) -> Result<Arc<Value>, CompileError> {
        if let Some(doc) = self.sources.get(uri) {
            return Ok(Arc::clone(doc));
        }
        let doc = resolver.resolve(uri).context(ResolveSnafu { uri: uri.clone() })?;
        self.sources.insert(uri.clone(), Arc::clone(&doc));
        Ok(doc)
    }

    /// Resolves `target` to a [`SchemaKey`], compiling its owning document
    /// on demand (via `resolver`) if this is the first time it's been
    /// referenced.
    ///
    /// # Errors
    /// Returns [`CompileError::ReferenceUnresolved`] if, once the owning
    /// document is compiled, `target` still names no known schema node.
    pub(crate) fn resolve_target(
        &mut self,
        target: &AbsoluteUri,
        resolver: &dyn Resolve,
        options: &Options,
    ) -> Result<SchemaKey, CompileError> {
        if let Some(&key) = self.by_uri.get(target) {
            return Ok(key);
        }
        let doc_uri = target.without_fragment();
        if !self.compiled_documents.contains(&doc_uri) {
            crate::compile::compile_document(self, &doc_uri, resolver, options)?;
        }
        if let Some(&key) = self.by_uri.get(target) {
            return Ok(key);
        }
        if let Some(frag) = target.fragment() {
            if !(frag.is_empty() || frag.starts_with('/')) {
                if let Some(&key) = self.anchors.get(&(doc_uri, frag.to_string())) {
                    return Ok(key);
                }
            }
        }
        ReferenceUnresolvedSnafu { uri: target.clone() }.fail()
    }
}
