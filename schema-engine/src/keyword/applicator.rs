//! The boolean-logic applicators: `allOf`, `anyOf`, `oneOf`, `not`, and
//! `if`/`then`/`else`.
//!
//! Each bubbles up the `evaluated_properties`/`evaluated_items` of whichever
//! branches actually contributed to the final verdict, per the rule that
//! annotations only propagate out of subschemas that were found valid (for
//! `anyOf`/`oneOf`) or whose evaluation was not itself discarded (`not`
//! contributes nothing, since its subschema failing is what makes `not`
//! pass). `if` is the exception to "only valid subschemas annotate": a
//! passing `if` contributes its own annotations regardless of which branch
//! (`then`/`else`) is then selected.

use super::{CompileCtx, EvalContext};
use crate::error::{CompileError, EvaluateError};
use crate::evaluate::KeywordOutcome;
use crate::schema::SchemaKey;
use serde_json::Value;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct AllOf {
    pub keys: Vec<SchemaKey>,
}

pub(crate) fn compile_all_of(ctx: &mut CompileCtx<'_>, value: &Value) -> Result<Option<AllOf>, CompileError> {
    let Some(Value::Array(items)) = value.as_object().and_then(|m| m.get("allOf")) else {
        return Ok(None);
    };
    let keys = (0..items.len()).map(|i| ctx.child(&format!("allOf/{i}"))).collect();
    Ok(Some(AllOf { keys }))
}

impl AllOf {
    pub(crate) fn evaluate(&self, ctx: &mut EvalContext<'_>, instance: &Value) -> Result<KeywordOutcome, EvaluateError> {
        let mut nested = Vec::new();
        let mut evaluated_properties = HashSet::new();
        let mut evaluated_items = HashSet::new();
        let mut valid = true;
        for (i, key) in self.keys.iter().enumerate() {
            let outcome = ctx.evaluate_child(*key, instance, &format!("allOf/{i}"), None)?;
            valid &= outcome.results.valid;
            evaluated_properties.extend(outcome.evaluated_properties);
            evaluated_items.extend(outcome.evaluated_items);
            nested.push(outcome.results);
        }
        Ok(KeywordOutcome { result: ctx.wrap(valid, nested), evaluated_properties, evaluated_items })
    }
}

#[derive(Debug, Clone)]
pub struct AnyOf {
    pub keys: Vec<SchemaKey>,
}

pub(crate) fn compile_any_of(ctx: &mut CompileCtx<'_>, value: &Value) -> Result<Option<AnyOf>, CompileError> {
    let Some(Value::Array(items)) = value.as_object().and_then(|m| m.get("anyOf")) else {
        return Ok(None);
    };
    let keys = (0..items.len()).map(|i| ctx.child(&format!("anyOf/{i}"))).collect();
    Ok(Some(AnyOf { keys }))
}

impl AnyOf {
    pub(crate) fn evaluate(&self, ctx: &mut EvalContext<'_>, instance: &Value) -> Result<KeywordOutcome, EvaluateError> {
        let mut nested = Vec::new();
        let mut evaluated_properties = HashSet::new();
        let mut evaluated_items = HashSet::new();
        let mut any_valid = false;
        for (i, key) in self.keys.iter().enumerate() {
            let outcome = ctx.evaluate_child(*key, instance, &format!("anyOf/{i}"), None)?;
            if outcome.results.valid {
                any_valid = true;
                evaluated_properties.extend(outcome.evaluated_properties);
                evaluated_items.extend(outcome.evaluated_items);
            }
            nested.push(outcome.results);
        }
        Ok(KeywordOutcome { result: ctx.wrap(any_valid, nested), evaluated_properties, evaluated_items })
    }
}

#[derive(Debug, Clone)]
pub struct OneOf {
    pub keys: Vec<SchemaKey>,
}

pub(crate) fn compile_one_of(ctx: &mut CompileCtx<'_>, value: &Value) -> Result<Option<OneOf>, CompileError> {
    let Some(Value::Array(items)) = value.as_object().and_then(|m| m.get("oneOf")) else {
        return Ok(None);
    };
    let keys = (0..items.len()).map(|i| ctx.child(&format!("oneOf/{i}"))).collect();
    Ok(Some(OneOf { keys }))
}

impl OneOf {
    pub(crate) fn evaluate(&self, ctx: &mut EvalContext<'_>, instance: &Value) -> Result<KeywordOutcome, EvaluateError> {
        let mut nested = Vec::new();
        let mut passing = Vec::new();
        for (i, key) in self.keys.iter().enumerate() {
            let outcome = ctx.evaluate_child(*key, instance, &format!("oneOf/{i}"), None)?;
            if outcome.results.valid {
                passing.push((outcome.evaluated_properties, outcome.evaluated_items));
            }
            nested.push(outcome.results);
        }
        let valid = passing.len() == 1;
        let (evaluated_properties, evaluated_items) = if valid {
            passing.into_iter().next().unwrap()
        } else {
            (HashSet::new(), HashSet::new())
        };
        let mut result = ctx.wrap(valid, nested);
        if !valid {
            result.errors.push(crate::output::ErrorDetail {
                keyword: "oneOf",
                message: format!("expected exactly one matching subschema, found {}", result.nested.iter().filter(|r| r.valid).count()),
            });
        }
        Ok(KeywordOutcome { result, evaluated_properties, evaluated_items })
    }
}

#[derive(Debug, Clone)]
pub struct Not {
    pub key: SchemaKey,
}

pub(crate) fn compile_not(ctx: &mut CompileCtx<'_>, value: &Value) -> Result<Option<Not>, CompileError> {
    let raw = value.as_object().and_then(|m| m.get("not"));
    if !raw.is_some_and(|v| v.is_object() || v.is_boolean()) {
        return Ok(None);
    }
    Ok(Some(Not { key: ctx.child("not") }))
}

impl Not {
    pub(crate) fn evaluate(&self, ctx: &mut EvalContext<'_>, instance: &Value) -> Result<KeywordOutcome, EvaluateError> {
        let outcome = ctx.evaluate_child(self.key, instance, "not", None)?;
        let valid = !outcome.results.valid;
        let mut result = ctx.wrap(valid, vec![outcome.results]);
        if !valid {
            result.errors.push(crate::output::ErrorDetail {
                keyword: "not",
                message: "instance matched a schema it must not match".to_string(),
            });
        }
        Ok(KeywordOutcome { result, evaluated_properties: HashSet::new(), evaluated_items: HashSet::new() })
    }
}

#[derive(Debug, Clone)]
pub struct IfThenElse {
    pub if_key: SchemaKey,
    pub then_key: Option<SchemaKey>,
    pub else_key: Option<SchemaKey>,
}

pub(crate) fn compile_if_then_else(ctx: &mut CompileCtx<'_>, value: &Value) -> Result<Option<IfThenElse>, CompileError> {
    let map = value.as_object();
    let has_if = map.and_then(|m| m.get("if")).is_some_and(|v| v.is_object() || v.is_boolean());
    if !has_if {
        return Ok(None);
    }
    let then_key = map
        .and_then(|m| m.get("then"))
        .filter(|v| v.is_object() || v.is_boolean())
        .map(|_| ctx.child("then"));
    let else_key = map
        .and_then(|m| m.get("else"))
        .filter(|v| v.is_object() || v.is_boolean())
        .map(|_| ctx.child("else"));
    Ok(Some(IfThenElse { if_key: ctx.child("if"), then_key, else_key }))
}

impl IfThenElse {
    pub(crate) fn evaluate(&self, ctx: &mut EvalContext<'_>, instance: &Value) -> Result<KeywordOutcome, EvaluateError> {
        let if_outcome = ctx.evaluate_child(self.if_key, instance, "if", None)?;
        let if_valid = if_outcome.results.valid;
        let branch_key = if if_valid { self.then_key } else { self.else_key };
        let branch_segment = if if_valid { "then" } else { "else" };

        let mut evaluated_properties = if if_valid { if_outcome.evaluated_properties } else { HashSet::new() };
        let mut evaluated_items = if if_valid { if_outcome.evaluated_items } else { HashSet::new() };

        let mut nested = vec![if_outcome.results];
        let valid = match branch_key {
            Some(key) => {
                let outcome = ctx.evaluate_child(key, instance, branch_segment, None)?;
                let valid = outcome.results.valid;
                evaluated_properties.extend(outcome.evaluated_properties);
                evaluated_items.extend(outcome.evaluated_items);
                nested.push(outcome.results);
                valid
            }
            None => true,
        };

        Ok(KeywordOutcome { result: ctx.wrap(valid, nested), evaluated_properties, evaluated_items })
    }
}
