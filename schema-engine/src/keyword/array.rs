//! Array-shaped keywords: length bounds, uniqueness, tuple/prefix typing,
//! and membership (`contains`).

use super::{CompileCtx, EvalContext};
use crate::error::{CompileError, EvaluateError};
use crate::evaluate::KeywordOutcome;
use crate::schema::SchemaKey;
use serde_json::Value;
use std::collections::HashSet;

fn as_usize(value: &Value, keyword: &'static str, ctx: &CompileCtx<'_>) -> Result<usize, CompileError> {
    value
        .as_u64()
        .map(|n| n as usize)
        .ok_or_else(|| CompileError::MalformedKeyword {
            keyword,
            location: ctx.node_uri.to_string(),
            reason: "expected a non-negative integer".to_string(),
        })
}

#[derive(Debug, Clone)]
pub struct MaxItems {
    pub limit: usize,
}

pub(crate) fn compile_max_items(ctx: &mut CompileCtx<'_>, value: &Value) -> Result<Option<MaxItems>, CompileError> {
    let Some(raw) = value.as_object().and_then(|m| m.get("maxItems")) else {
        return Ok(None);
    };
    Ok(Some(MaxItems { limit: as_usize(raw, "maxItems", ctx)? }))
}

impl MaxItems {
    pub(crate) fn evaluate(&self, ctx: &EvalContext<'_>, instance: &Value) -> KeywordOutcome {
        let Some(items) = instance.as_array() else { return ctx.pass("maxItems") };
        if items.len() <= self.limit {
            ctx.pass("maxItems")
        } else {
            ctx.fail("maxItems", format!("{} items exceeds {}", items.len(), self.limit))
        }
    }
}

#[derive(Debug, Clone)]
pub struct MinItems {
    pub limit: usize,
}

pub(crate) fn compile_min_items(ctx: &mut CompileCtx<'_>, value: &Value) -> Result<Option<MinItems>, CompileError> {
    let Some(raw) = value.as_object().and_then(|m| m.get("minItems")) else {
        return Ok(None);
    };
    Ok(Some(MinItems { limit: as_usize(raw, "minItems", ctx)? }))
}

impl MinItems {
    pub(crate) fn evaluate(&self, ctx: &EvalContext<'_>, instance: &Value) -> KeywordOutcome {
        let Some(items) = instance.as_array() else { return ctx.pass("minItems") };
        if items.len() >= self.limit {
            ctx.pass("minItems")
        } else {
            ctx.fail("minItems", format!("{} items is below {}", items.len(), self.limit))
        }
    }
}

#[derive(Debug, Clone)]
pub struct UniqueItems;

pub(crate) fn compile_unique_items(value: &Value) -> Option<UniqueItems> {
    if value.as_object()?.get("uniqueItems")?.as_bool()? {
        Some(UniqueItems)
    } else {
        None
    }
}

impl UniqueItems {
    pub(crate) fn evaluate(&self, ctx: &EvalContext<'_>, instance: &Value) -> KeywordOutcome {
        let Some(items) = instance.as_array() else { return ctx.pass("uniqueItems") };
        for (i, a) in items.iter().enumerate() {
            for b in &items[..i] {
                if a == b {
                    return ctx.fail("uniqueItems", "array contains duplicate elements");
                }
            }
        }
        ctx.pass("uniqueItems")
    }
}

/*
── prefixItems / items ─────────────────────────────────────────────────────
*/

#[derive(Debug, Clone)]
pub struct PrefixItems {
    pub keys: Vec<SchemaKey>,
}

pub(crate) fn compile_prefix_items(ctx: &mut CompileCtx<'_>, value: &Value) -> Result<Option<PrefixItems>, CompileError> {
    let Some(Value::Array(items)) = value.as_object().and_then(|m| m.get("prefixItems")) else {
        return Ok(None);
    };
    let keys = (0..items.len()).map(|i| ctx.child(&format!("prefixItems/{i}"))).collect();
    Ok(Some(PrefixItems { keys }))
}

impl PrefixItems {
    pub(crate) fn evaluate(&self, ctx: &mut EvalContext<'_>, instance: &Value) -> Result<KeywordOutcome, EvaluateError> {
        let Some(items) = instance.as_array() else { return Ok(ctx.pass("prefixItems")) };
        let mut nested = Vec::new();
        let mut evaluated_items = HashSet::new();
        let mut valid = true;
        for (i, key) in self.keys.iter().enumerate() {
            let Some(item) = items.get(i) else { break };
            let outcome = ctx.evaluate_child(*key, item, &format!("prefixItems/{i}"), Some(&i.to_string()))?;
            valid &= outcome.results.valid;
            evaluated_items.insert(i);
            nested.push(outcome.results);
        }
        Ok(KeywordOutcome {
            result: ctx.wrap(valid, nested),
            evaluated_properties: HashSet::new(),
            evaluated_items,
        })
    }
}

#[derive(Debug, Clone)]
pub enum Items {
    /// 2020-12 single-schema form (also pre-2020-12 when `items` is not an
    /// array): applies to every index `>= start_index`.
    Single { key: SchemaKey, start_index: usize },
    /// Pre-2020-12 tuple form: `items` is itself an array of per-position
    /// schemas, with `additionalItems` (if present) covering the rest.
    Tuple {
        keys: Vec<SchemaKey>,
        additional: Option<SchemaKey>,
    },
}

pub(crate) fn compile_items(ctx: &mut CompileCtx<'_>, value: &Value) -> Result<Option<Items>, CompileError> {
    let Some(raw) = value.as_object().and_then(|m| m.get("items")) else {
        return Ok(None);
    };
    if ctx.draft.has_prefix_items() {
        if !(raw.is_object() || raw.is_boolean()) {
            return Ok(None);
        }
        let start = value
            .as_object()
            .and_then(|m| m.get("prefixItems"))
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        return Ok(Some(Items::Single { key: ctx.child("items"), start_index: start }));
    }
    match raw {
        Value::Array(items) => {
            let keys = (0..items.len()).map(|i| ctx.child(&format!("items/{i}"))).collect();
            let additional = value
                .as_object()
                .and_then(|m| m.get("additionalItems"))
                .filter(|v| v.is_object() || v.is_boolean())
                .map(|_| ctx.child("additionalItems"));
            Ok(Some(Items::Tuple { keys, additional }))
        }
        Value::Object(_) | Value::Bool(_) => Ok(Some(Items::Single { key: ctx.child("items"), start_index: 0 })),
        _ => Ok(None),
    }
}

impl Items {
    pub(crate) fn evaluate(&self, ctx: &mut EvalContext<'_>, instance: &Value) -> Result<KeywordOutcome, EvaluateError> {
        let Some(items) = instance.as_array() else { return Ok(ctx.pass("items")) };
        let mut nested = Vec::new();
        let mut evaluated_items = HashSet::new();
        let mut valid = true;
        match self {
            Items::Single { key, start_index } => {
                for (i, item) in items.iter().enumerate().skip(*start_index) {
                    let outcome = ctx.evaluate_child(*key, item, "items", Some(&i.to_string()))?;
                    valid &= outcome.results.valid;
                    evaluated_items.insert(i);
                    nested.push(outcome.results);
                }
            }
            Items::Tuple { keys, additional } => {
                for (i, key) in keys.iter().enumerate() {
                    let Some(item) = items.get(i) else { break };
                    let outcome = ctx.evaluate_child(*key, item, &format!("items/{i}"), Some(&i.to_string()))?;
                    valid &= outcome.results.valid;
                    evaluated_items.insert(i);
                    nested.push(outcome.results);
                }
                if let Some(additional_key) = additional {
                    for (i, item) in items.iter().enumerate().skip(keys.len()) {
                        let outcome = ctx.evaluate_child(*additional_key, item, "additionalItems", Some(&i.to_string()))?;
                        valid &= outcome.results.valid;
                        evaluated_items.insert(i);
                        nested.push(outcome.results);
                    }
                }
            }
        }
        Ok(KeywordOutcome {
            result: ctx.wrap(valid, nested),
            evaluated_properties: HashSet::new(),
            evaluated_items,
        })
    }
}

/*
── contains / minContains / maxContains ────────────────────────────────────
*/

#[derive(Debug, Clone)]
pub struct Contains {
    pub key: SchemaKey,
    pub min: usize,
    pub max: Option<usize>,
}

pub(crate) fn compile_contains(ctx: &mut CompileCtx<'_>, value: &Value) -> Result<Option<Contains>, CompileError> {
    let map = value.as_object();
    if map.and_then(|m| m.get("contains")).is_none() {
        return Ok(None);
    }
    let min = match map.and_then(|m| m.get("minContains")) {
        Some(raw) => as_usize(raw, "minContains", ctx)?,
        None => 1,
    };
    let max = match map.and_then(|m| m.get("maxContains")) {
        Some(raw) => Some(as_usize(raw, "maxContains", ctx)?),
        None => None,
    };
    Ok(Some(Contains { key: ctx.child("contains"), min, max }))
}

impl Contains {
    pub(crate) fn evaluate(&self, ctx: &mut EvalContext<'_>, instance: &Value) -> Result<KeywordOutcome, EvaluateError> {
        let Some(items) = instance.as_array() else { return Ok(ctx.pass("contains")) };
        let mut matched_indices = HashSet::new();
        let mut nested = Vec::new();
        for (i, item) in items.iter().enumerate() {
            let outcome = ctx.evaluate_child(self.key, item, "contains", Some(&i.to_string()))?;
            if outcome.results.valid {
                matched_indices.insert(i);
            }
            nested.push(outcome.results);
        }
        let count = matched_indices.len();
        let valid = count >= self.min && self.max.map_or(true, |max| count <= max);
        let mut result = ctx.wrap(valid, nested);
        if !valid {
            result.errors.push(crate::output::ErrorDetail {
                keyword: "contains",
                message: format!("{count} matching items, expected between {} and {:?}", self.min, self.max),
            });
        }
        Ok(KeywordOutcome {
            result,
            evaluated_properties: HashSet::new(),
            evaluated_items: matched_indices,
        })
    }
}
