//! `$ref` and its dynamically-scoped cousins, `$dynamicRef` (2020-12) and
//! `$recursiveRef` (2019-09).

use super::{CompileCtx, EvalContext};
use crate::compile::RECURSIVE_ANCHOR;
use crate::error::{CompileError, EvaluateError};
use crate::evaluate::KeywordOutcome;
use crate::schema::SchemaKey;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct Ref {
    pub key: SchemaKey,
}

pub(crate) fn compile_ref(ctx: &mut CompileCtx<'_>, value: &Value) -> Result<Option<Ref>, CompileError> {
    let Some(raw) = value.as_object().and_then(|m| m.get("$ref")).and_then(Value::as_str) else {
        return Ok(None);
    };
    Ok(Some(Ref { key: ctx.resolve_ref(raw)? }))
}

impl Ref {
    pub(crate) fn evaluate(&self, ctx: &mut EvalContext<'_>, instance: &Value) -> Result<KeywordOutcome, EvaluateError> {
        let outcome = ctx.evaluate_child(self.key, instance, "$ref", None)?;
        Ok(KeywordOutcome {
            result: ctx.wrap(outcome.results.valid, vec![outcome.results]),
            evaluated_properties: outcome.evaluated_properties,
            evaluated_items: outcome.evaluated_items,
        })
    }
}

/// Either a `$dynamicRef` (bearing a plain fragment, e.g. `#item`) or a
/// `$recursiveRef` (always `#`, gated by `$recursiveAnchor: true` on the
/// resolved target). Both resolve statically first, then rescan the dynamic
/// scope outermost-in for an earlier schema resource declaring a matching
/// anchor, using that one instead if the statically-resolved target itself
/// opted in (declared the matching anchor).
#[derive(Debug, Clone)]
pub struct DynamicRef {
    pub static_key: SchemaKey,
    pub anchor_name: Option<String>,
}

pub(crate) fn compile_dynamic_ref(ctx: &mut CompileCtx<'_>, value: &Value) -> Result<Option<DynamicRef>, CompileError> {
    let map = value.as_object();

    if ctx.draft.uses_dynamic_ref() {
        if let Some(raw) = map.and_then(|m| m.get("$dynamicRef")).and_then(Value::as_str) {
            let static_key = ctx.resolve_ref(raw)?;
            let anchor_name = raw.split('#').nth(1).filter(|frag| !frag.is_empty()).map(str::to_string);
            return Ok(Some(DynamicRef { static_key, anchor_name }));
        }
    }

    if ctx.draft.uses_recursive_ref() {
        if let Some(raw) = map.and_then(|m| m.get("$recursiveRef")).and_then(Value::as_str) {
            let static_key = ctx.resolve_ref(raw)?;
            let target = ctx.registry.get(static_key).expect("just resolved");
            let anchor_name = (target.dynamic_anchor().map(String::as_str) == Some(RECURSIVE_ANCHOR))
                .then(|| RECURSIVE_ANCHOR.to_string());
            return Ok(Some(DynamicRef { static_key, anchor_name }));
        }
    }

    Ok(None)
}

impl DynamicRef {
    fn resolve_dynamic(&self, ctx: &EvalContext<'_>) -> SchemaKey {
        let Some(name) = &self.anchor_name else { return self.static_key };
        for frame in ctx.scope.frames() {
            if let Some(key) = ctx.registry.dynamic_anchor(frame, name) {
                return key;
            }
        }
        self.static_key
    }

    pub(crate) fn evaluate(&self, ctx: &mut EvalContext<'_>, instance: &Value) -> Result<KeywordOutcome, EvaluateError> {
        let key = self.resolve_dynamic(ctx);
        let outcome = ctx.evaluate_child(key, instance, "$dynamicRef", None)?;
        Ok(KeywordOutcome {
            result: ctx.wrap(outcome.results.valid, vec![outcome.results]),
            evaluated_properties: outcome.evaluated_properties,
            evaluated_items: outcome.evaluated_items,
        })
    }
}
