//! `unevaluatedItems`/`unevaluatedProperties`: applied last against whatever
//! instance surface the rest of the node's keywords (and, transitively,
//! their nested applicators/`$ref`s) didn't already account for.

use super::{CompileCtx, EvalContext};
use crate::error::{CompileError, EvaluateError};
use crate::evaluate::KeywordOutcome;
use crate::schema::SchemaKey;
use serde_json::Value;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct UnevaluatedItems {
    pub key: SchemaKey,
}

pub(crate) fn compile_unevaluated_items(ctx: &mut CompileCtx<'_>, value: &Value) -> Result<Option<UnevaluatedItems>, CompileError> {
    if !ctx.draft.has_unevaluated() {
        return Ok(None);
    }
    if value.as_object().and_then(|m| m.get("unevaluatedItems")).is_none() {
        return Ok(None);
    }
    Ok(Some(UnevaluatedItems { key: ctx.child("unevaluatedItems") }))
}

impl UnevaluatedItems {
    pub(crate) fn evaluate(&self, ctx: &mut EvalContext<'_>, instance: &Value) -> Result<KeywordOutcome, EvaluateError> {
        let Some(items) = instance.as_array() else { return Ok(ctx.pass("unevaluatedItems")) };
        let mut nested = Vec::new();
        let mut newly_evaluated = HashSet::new();
        let mut valid = true;
        for (i, item) in items.iter().enumerate() {
            if ctx.evaluated_items.contains(&i) {
                continue;
            }
            let outcome = ctx.evaluate_child(self.key, item, "unevaluatedItems", Some(&i.to_string()))?;
            valid &= outcome.results.valid;
            newly_evaluated.insert(i);
            nested.push(outcome.results);
        }
        Ok(KeywordOutcome {
            result: ctx.wrap(valid, nested),
            evaluated_properties: HashSet::new(),
            evaluated_items: newly_evaluated,
        })
    }
}

#[derive(Debug, Clone)]
pub struct UnevaluatedProperties {
    pub key: SchemaKey,
}

pub(crate) fn compile_unevaluated_properties(
    ctx: &mut CompileCtx<'_>,
    value: &Value,
) -> Result<Option<UnevaluatedProperties>, CompileError> {
    if !ctx.draft.has_unevaluated() {
        return Ok(None);
    }
    if value.as_object().and_then(|m| m.get("unevaluatedProperties")).is_none() {
        return Ok(None);
    }
    Ok(Some(UnevaluatedProperties { key: ctx.child("unevaluatedProperties") }))
}

impl UnevaluatedProperties {
    pub(crate) fn evaluate(&self, ctx: &mut EvalContext<'_>, instance: &Value) -> Result<KeywordOutcome, EvaluateError> {
        let Some(obj) = instance.as_object() else { return Ok(ctx.pass("unevaluatedProperties")) };
        let mut nested = Vec::new();
        let mut newly_evaluated = HashSet::new();
        let mut valid = true;
        for (name, item) in obj {
            if ctx.evaluated_properties.contains(name) {
                continue;
            }
            let outcome = ctx.evaluate_child(self.key, item, "unevaluatedProperties", Some(name))?;
            valid &= outcome.results.valid;
            newly_evaluated.insert(name.clone());
            nested.push(outcome.results);
        }
        Ok(KeywordOutcome {
            result: ctx.wrap(valid, nested),
            evaluated_properties: newly_evaluated,
            evaluated_items: HashSet::new(),
        })
    }
}
