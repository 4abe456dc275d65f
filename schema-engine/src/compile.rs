//! Turning a raw document into linked, keyword-indexed [`CompiledSchema`]
//! nodes inside a [`Registry`].
//!
//! Compilation runs in two structural passes over a document the first time
//! it's seen:
//!
//! 1. [`walk_structure`] descends every keyword position a dialect defines
//!    as schema-bearing (`properties`, `allOf`, `$defs`, `items`, ...),
//!    assigning each node its canonical URI (honoring nested `$id`
//!    boundaries) and recording `$anchor`/`$dynamicAnchor` declarations.
//!    This produces every node's identity before any keyword is compiled,
//!    so forward references within the same document resolve without a
//!    second fixpoint pass.
//! 2. [`compile_keywords`] then builds each node's [`crate::keyword::Keyword`]
//!    list, looking up already-known sibling/child keys by URI or by the
//!    `(parent, segment)` links [`walk_structure`] recorded.
//!
//! A `$ref` whose target lives in a document not yet compiled triggers
//! [`compile_document`] for that document (via [`Registry::resolve_target`]),
//! recursively but re-entrant-safe: `compiled_documents` guards against
//! revisiting the same document twice.

use crate::dialect::{self, Draft};
use crate::error::{CompileError, SchemaInvalidSnafu, UriSnafu};
use crate::keyword;
use crate::options::Options;
use crate::registry::Registry;
use crate::resolve::{NoResolve, Resolve};
use crate::schema::SchemaKey;
use schema_uri::{pointer, AbsoluteUri, PointerBuf, Uri};
use serde_json::{Map, Value};
use snafu::ResultExt;
use tracing::debug;

/// The pseudo-anchor-name [`Registry::dynamic_anchor`] is keyed on for
/// draft 2019-09's `$recursiveAnchor: true`, so `$recursiveRef` can reuse the
/// same dynamic-scope scanning machinery as `$dynamicRef` instead of needing
/// a parallel lookup table.
pub(crate) const RECURSIVE_ANCHOR: &str = "$recursive";

fn root_pointer() -> PointerBuf {
    "".parse().expect("empty string is the root JSON Pointer")
}

/// Compiles `document` into `registry`, returning the [`SchemaKey`] of its
/// root schema node.
///
/// The root's base URI is its own `$id` if it declares one (resolved
/// against `options.default_base_uri()`), otherwise
/// `options.default_base_uri()` directly. Any `$ref` reaching outside this
/// document is resolved through `resolver`, which is also used for any
/// document *that* document references, and so on transitively.
///
/// # Errors
/// Returns [`CompileError`] if the document conflicts with an
/// already-registered document at the same URI, if a `$ref` cannot be
/// resolved, or if a keyword is malformed for its draft.
pub fn compile(
    registry: &mut Registry,
    document: Value,
    resolver: &dyn Resolve,
    options: &Options,
) -> Result<SchemaKey, CompileError> {
    let draft = dialect::detect_draft(&document, options);
    let declared_id = document
        .as_object()
        .and_then(|map| map.get("$id"))
        .and_then(Value::as_str);
    let root_base = match declared_id {
        Some(id) => Uri::parse(id)
            .resolve(options.default_base_uri())
            .context(UriSnafu)?
            .without_fragment(),
        None => options.default_base_uri().clone(),
    };
    if options.validate_schema() {
        check_schema_valid(&document, draft, &root_base)?;
    }
    let _span = tracing::info_span!("compile", uri = %root_base, %draft).entered();
    registry.register(root_base.clone(), document.clone())?;
    let mut keys = Vec::new();
    let root_key = walk_structure(registry, document, root_pointer(), root_base.clone(), draft, &mut keys)?;
    debug!(node_count = keys.len(), "structural walk complete");
    for key in keys {
        compile_keywords(registry, key, options, resolver)?;
    }
    registry.mark_document_compiled(root_base);
    Ok(root_key)
}

/// Fetches, structurally walks, and keyword-compiles the document at
/// `doc_uri`, used when a `$ref` crosses into a document not yet known to
/// `registry`.
pub(crate) fn compile_document(
    registry: &mut Registry,
    doc_uri: &AbsoluteUri,
    resolver: &dyn Resolve,
    options: &Options,
) -> Result<(), CompileError> {
    let _span = tracing::debug_span!("compile_document", uri = %doc_uri).entered();
    let document = registry.fetch_source(doc_uri, resolver)?;
    let draft = dialect::detect_draft(&document, options);
    let mut keys = Vec::new();
    walk_structure(
        registry,
        document.as_ref().clone(),
        root_pointer(),
        doc_uri.clone(),
        draft,
        &mut keys,
    )?;
    for key in keys {
        compile_keywords(registry, key, options, resolver)?;
    }
    registry.mark_document_compiled(doc_uri.clone());
    Ok(())
}

/// Validates `document` against `draft`'s minimal stand-in meta-schema (see
/// [`crate::vocabulary::meta`]), run in a scratch [`Registry`] so it never
/// touches the caller's.
fn check_schema_valid(document: &Value, draft: Draft, uri: &AbsoluteUri) -> Result<(), CompileError> {
    let mut meta_registry = Registry::new();
    let meta_options = Options::new().with_default_draft(draft);
    let meta_key = compile(
        &mut meta_registry,
        crate::vocabulary::meta::document(draft),
        &NoResolve,
        &meta_options,
    )?;
    let results = crate::evaluate::validate(&meta_registry, meta_key, document, &meta_options)
        .expect("the bundled meta-schema stand-in never fails to evaluate");
    if !results.is_valid() {
        debug!(%uri, "schema failed meta-schema validation");
        return SchemaInvalidSnafu { uri: uri.clone() }.fail();
    }
    Ok(())
}

/// Computes `(this node's uri, base URI for children, resource-relative
/// pointer for children)`. `$id` resets the resource-relative pointer to
/// the root, since JSON Pointer fragments are always evaluated against the
/// nearest enclosing schema resource, not the physical document root.
fn resolve_identity(
    value: &Value,
    own_resource_ptr: &PointerBuf,
    inherited_base: &AbsoluteUri,
) -> Result<(AbsoluteUri, AbsoluteUri, PointerBuf), CompileError> {
    if let Some(id) = value.as_object().and_then(|m| m.get("$id")).and_then(Value::as_str) {
        let new_base = Uri::parse(id).resolve(inherited_base).context(UriSnafu)?.without_fragment();
        return Ok((new_base.clone(), new_base, root_pointer()));
    }
    let uri = inherited_base.with_pointer(own_resource_ptr);
    Ok((uri, inherited_base.clone(), own_resource_ptr.clone()))
}

fn walk_structure(
    registry: &mut Registry,
    value: Value,
    own_resource_ptr: PointerBuf,
    inherited_base: AbsoluteUri,
    draft: Draft,
    out_keys: &mut Vec<SchemaKey>,
) -> Result<SchemaKey, CompileError> {
    let (node_uri, base_for_children, resource_ptr_for_children) =
        resolve_identity(&value, &own_resource_ptr, &inherited_base)?;
    if let Some(existing) = registry.get_by_uri(&node_uri) {
        return Ok(existing);
    }
    let key = registry.reserve(node_uri, base_for_children.clone(), value.clone(), draft);
    out_keys.push(key);
    if let Value::Object(map) = &value {
        if let Some(name) = map.get("$anchor").and_then(Value::as_str) {
            registry.link_anchor(base_for_children.clone(), name.to_string(), key);
        }
        if let Some(name) = map.get("$dynamicAnchor").and_then(Value::as_str) {
            registry.link_dynamic_anchor(base_for_children.clone(), name.to_string(), key);
        }
        if draft.uses_recursive_ref() && map.get("$recursiveAnchor").and_then(Value::as_bool) == Some(true) {
            registry.link_dynamic_anchor(base_for_children.clone(), RECURSIVE_ANCHOR.to_string(), key);
        }
        for (segment, child_value) in structural_children(map, draft) {
            let child_resource_ptr = pointer::append(&resource_ptr_for_children, &segment);
            let child_key = walk_structure(
                registry,
                child_value,
                child_resource_ptr,
                base_for_children.clone(),
                draft,
                out_keys,
            )?;
            registry.link_child(key, segment, child_key);
        }
    }
    Ok(key)
}

/// Every position a dialect treats as holding a nested schema (or array/map
/// of them), as `(segment, value)` pairs where `segment` is the
/// slash-joined path from this node used both to build the child's JSON
/// Pointer and as the `(parent, segment)` key recorded by
/// [`Registry::link_child`].
fn structural_children(map: &Map<String, Value>, draft: Draft) -> Vec<(String, Value)> {
    let mut children = Vec::new();

    for keyword in ["allOf", "anyOf", "oneOf"] {
        if let Some(Value::Array(items)) = map.get(keyword) {
            for (i, item) in items.iter().enumerate() {
                children.push((format!("{keyword}/{i}"), item.clone()));
            }
        }
    }

    for keyword in [
        "not",
        "if",
        "then",
        "else",
        "propertyNames",
        "contains",
        "additionalProperties",
        "additionalItems",
        "unevaluatedProperties",
        "unevaluatedItems",
    ] {
        if let Some(v) = map.get(keyword) {
            if v.is_object() || v.is_boolean() {
                children.push((keyword.to_string(), v.clone()));
            }
        }
    }

    for keyword in ["properties", "patternProperties", "$defs", "definitions", "dependentSchemas"] {
        if let Some(Value::Object(sub)) = map.get(keyword) {
            for (name, schema) in sub {
                children.push((format!("{keyword}/{name}"), schema.clone()));
            }
        }
    }

    // draft-07's `dependencies` overloads each entry as either an array
    // (dependentRequired-shaped) or a schema (dependentSchemas-shaped); only
    // the latter is a structural child.
    if draft.has_legacy_dependencies() {
        if let Some(Value::Object(sub)) = map.get("dependencies") {
            for (name, entry) in sub {
                if entry.is_object() || entry.is_boolean() {
                    children.push((format!("dependencies/{name}"), entry.clone()));
                }
            }
        }
    }

    if draft.has_prefix_items() {
        if let Some(Value::Array(items)) = map.get("prefixItems") {
            for (i, item) in items.iter().enumerate() {
                children.push((format!("prefixItems/{i}"), item.clone()));
            }
        }
        if let Some(v) = map.get("items") {
            if v.is_object() || v.is_boolean() {
                children.push(("items".to_string(), v.clone()));
            }
        }
    } else {
        match map.get("items") {
            Some(Value::Array(items)) => {
                for (i, item) in items.iter().enumerate() {
                    children.push((format!("items/{i}"), item.clone()));
                }
            }
            Some(v) if v.is_object() || v.is_boolean() => {
                children.push(("items".to_string(), v.clone()));
            }
            _ => {}
        }
    }

    children
}

fn compile_keywords(
    registry: &mut Registry,
    key: SchemaKey,
    options: &Options,
    resolver: &dyn Resolve,
) -> Result<(), CompileError> {
    let schema = registry.get(key).expect("key was just reserved");
    if schema.as_bool().is_some() {
        return Ok(());
    }
    let value = schema.value().clone();
    let node_uri = schema.uri().clone();
    let base_uri = schema.base_uri().clone();
    let draft = schema.draft();
    let mut ctx = keyword::CompileCtx {
        registry,
        resolver,
        options,
        node_key: key,
        node_uri,
        base_uri,
        draft,
    };
    let keywords = keyword::compile_all(&mut ctx, &value)?;
    registry.set_keywords(key, keywords);
    Ok(())
}
