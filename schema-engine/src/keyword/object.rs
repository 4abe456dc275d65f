//! Object-shaped keywords: size bounds, `required`, and the
//! `properties`/`patternProperties`/`additionalProperties` trio (compiled
//! and evaluated together since each needs to know what the others already
//! matched).

use super::{CompileCtx, EvalContext};
use crate::error::{CompileError, InvalidPatternSnafu};
use crate::evaluate::KeywordOutcome;
use crate::schema::SchemaKey;
use fancy_regex::Regex;
use serde_json::Value;
use snafu::ResultExt;
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
pub struct MaxProperties {
    pub limit: usize,
}

pub(crate) fn compile_max_properties(ctx: &mut CompileCtx<'_>, value: &Value) -> Result<Option<MaxProperties>, CompileError> {
    let Some(raw) = value.as_object().and_then(|m| m.get("maxProperties")) else {
        return Ok(None);
    };
    Ok(Some(MaxProperties { limit: as_usize(raw, "maxProperties", ctx)? }))
}

impl MaxProperties {
    pub(crate) fn evaluate(&self, ctx: &EvalContext<'_>, instance: &Value) -> KeywordOutcome {
        let Some(obj) = instance.as_object() else { return ctx.pass("maxProperties") };
        if obj.len() <= self.limit {
            ctx.pass("maxProperties")
        } else {
            ctx.fail("maxProperties", format!("{} properties exceeds {}", obj.len(), self.limit))
        }
    }
}

#[derive(Debug, Clone)]
pub struct MinProperties {
    pub limit: usize,
}

pub(crate) fn compile_min_properties(ctx: &mut CompileCtx<'_>, value: &Value) -> Result<Option<MinProperties>, CompileError> {
    let Some(raw) = value.as_object().and_then(|m| m.get("minProperties")) else {
        return Ok(None);
    };
    Ok(Some(MinProperties { limit: as_usize(raw, "minProperties", ctx)? }))
}

impl MinProperties {
    pub(crate) fn evaluate(&self, ctx: &EvalContext<'_>, instance: &Value) -> KeywordOutcome {
        let Some(obj) = instance.as_object() else { return ctx.pass("minProperties") };
        if obj.len() >= self.limit {
            ctx.pass("minProperties")
        } else {
            ctx.fail("minProperties", format!("{} properties is below {}", obj.len(), self.limit))
        }
    }
}

#[derive(Debug, Clone)]
pub struct Required {
    pub names: Vec<String>,
}

pub(crate) fn compile_required(value: &Value) -> Option<Required> {
    let Value::Array(names) = value.as_object()?.get("required")? else {
        return None;
    };
    Some(Required { names: names.iter().filter_map(Value::as_str).map(str::to_string).collect() })
}

impl Required {
    pub(crate) fn evaluate(&self, ctx: &EvalContext<'_>, instance: &Value) -> KeywordOutcome {
        let Some(obj) = instance.as_object() else { return ctx.pass("required") };
        let missing: Vec<_> = self.names.iter().filter(|name| !obj.contains_key(*name)).collect();
        if missing.is_empty() {
            ctx.pass("required")
        } else {
            ctx.fail("required", format!("missing required properties: {missing:?}"))
        }
    }
}

/*
── properties / patternProperties / additionalProperties ──────────────────
*/

#[derive(Debug, Clone)]
pub struct Properties {
    pub properties: Vec<(String, SchemaKey)>,
    pub pattern_properties: Vec<(Regex, SchemaKey)>,
    pub additional_properties: Option<SchemaKey>,
}

pub(crate) fn compile_properties(ctx: &mut CompileCtx<'_>, value: &Value) -> Result<Option<Properties>, CompileError> {
    let map = value.as_object();
    let has_properties = map.and_then(|m| m.get("properties")).is_some();
    let has_pattern_properties = map.and_then(|m| m.get("patternProperties")).is_some();
    let has_additional = map
        .and_then(|m| m.get("additionalProperties"))
        .is_some_and(|v| v.is_object() || v.is_boolean());
    if !has_properties && !has_pattern_properties && !has_additional {
        return Ok(None);
    }

    let mut properties = Vec::new();
    if let Some(Value::Object(props)) = map.and_then(|m| m.get("properties")) {
        for name in props.keys() {
            properties.push((name.clone(), ctx.child(&format!("properties/{name}"))));
        }
    }

    let mut pattern_properties = Vec::new();
    if let Some(Value::Object(patterns)) = map.and_then(|m| m.get("patternProperties")) {
        for name in patterns.keys() {
            let regex = Regex::new(name).context(InvalidPatternSnafu { location: ctx.node_uri.to_string() })?;
            pattern_properties.push((regex, ctx.child(&format!("patternProperties/{name}"))));
        }
    }

    let additional_properties = has_additional.then(|| ctx.child("additionalProperties"));

    Ok(Some(Properties { properties, pattern_properties, additional_properties }))
}

impl Properties {
    pub(crate) fn evaluate(&self, ctx: &mut EvalContext<'_>, instance: &Value) -> Result<KeywordOutcome, crate::error::EvaluateError> {
        let Some(obj) = instance.as_object() else { return Ok(ctx.pass("properties")) };
        let mut nested = Vec::new();
        let mut evaluated = HashSet::new();
        let mut valid = true;

        for (name, key) in &self.properties {
            if let Some(item) = obj.get(name) {
                let outcome = ctx.evaluate_child(*key, item, &format!("properties/{name}"), Some(name))?;
                valid &= outcome.results.valid;
                evaluated.insert(name.clone());
                nested.push(outcome.results);
            }
        }

        for (name, item) in obj {
            for (pattern, key) in &self.pattern_properties {
                if pattern.is_match(name).unwrap_or(false) {
                    let outcome = ctx.evaluate_child(*key, item, &format!("patternProperties/{pattern}"), Some(name))?;
                    valid &= outcome.results.valid;
                    evaluated.insert(name.clone());
                    nested.push(outcome.results);
                }
            }
        }

        if let Some(additional_key) = self.additional_properties {
            for (name, item) in obj {
                if evaluated.contains(name) {
                    continue;
                }
                let outcome = ctx.evaluate_child(additional_key, item, "additionalProperties", Some(name))?;
                valid &= outcome.results.valid;
                evaluated.insert(name.clone());
                nested.push(outcome.results);
            }
        }

        Ok(KeywordOutcome {
            result: ctx.wrap(valid, nested),
            evaluated_properties: evaluated,
            evaluated_items: HashSet::new(),
        })
    }
}

/*
── propertyNames ───────────────────────────────────────────────────────────
*/

#[derive(Debug, Clone)]
pub struct PropertyNames {
    pub key: SchemaKey,
}

pub(crate) fn compile_property_names(ctx: &mut CompileCtx<'_>, value: &Value) -> Result<Option<PropertyNames>, CompileError> {
    if value.as_object().and_then(|m| m.get("propertyNames")).is_none() {
        return Ok(None);
    }
    Ok(Some(PropertyNames { key: ctx.child("propertyNames") }))
}

impl PropertyNames {
    pub(crate) fn evaluate(&self, ctx: &mut EvalContext<'_>, instance: &Value) -> Result<KeywordOutcome, crate::error::EvaluateError> {
        let Some(obj) = instance.as_object() else { return Ok(ctx.pass("propertyNames")) };
        let mut nested = Vec::new();
        let mut valid = true;
        for name in obj.keys() {
            let outcome = ctx.evaluate_child(self.key, &Value::String(name.clone()), "propertyNames", None)?;
            valid &= outcome.results.valid;
            nested.push(outcome.results);
        }
        Ok(KeywordOutcome {
            result: ctx.wrap(valid, nested),
            evaluated_properties: HashSet::new(),
            evaluated_items: HashSet::new(),
        })
    }
}

/*
── dependentRequired / dependentSchemas ─────────────────────────────────────
*/

#[derive(Debug, Clone)]
pub struct DependentRequired {
    pub dependencies: Vec<(String, Vec<String>)>,
}

pub(crate) fn compile_dependent_required(ctx: &mut CompileCtx<'_>, value: &Value) -> Result<Option<DependentRequired>, CompileError> {
    let key = if ctx.draft.has_legacy_dependencies() { "dependencies" } else { "dependentRequired" };
    let Some(Value::Object(map)) = value.as_object().and_then(|m| m.get(key)) else {
        return Ok(None);
    };
    let mut dependencies = Vec::new();
    for (name, raw) in map {
        if let Value::Array(names) = raw {
            dependencies.push((name.clone(), names.iter().filter_map(Value::as_str).map(str::to_string).collect()));
        }
    }
    if dependencies.is_empty() {
        return Ok(None);
    }
    Ok(Some(DependentRequired { dependencies }))
}

impl DependentRequired {
    pub(crate) fn evaluate(&self, ctx: &EvalContext<'_>, instance: &Value) -> KeywordOutcome {
        let Some(obj) = instance.as_object() else { return ctx.pass("dependentRequired") };
        for (trigger, required) in &self.dependencies {
            if !obj.contains_key(trigger) {
                continue;
            }
            let missing: Vec<_> = required.iter().filter(|name| !obj.contains_key(*name)).collect();
            if !missing.is_empty() {
                return ctx.fail(
                    "dependentRequired",
                    format!("\"{trigger}\" requires missing properties: {missing:?}"),
                );
            }
        }
        ctx.pass("dependentRequired")
    }
}

#[derive(Debug, Clone)]
pub struct DependentSchemas {
    pub dependencies: Vec<(String, SchemaKey)>,
}

pub(crate) fn compile_dependent_schemas(ctx: &mut CompileCtx<'_>, value: &Value) -> Result<Option<DependentSchemas>, CompileError> {
    let key_name = if ctx.draft.has_legacy_dependencies() { "dependencies" } else { "dependentSchemas" };
    let Some(Value::Object(map)) = value.as_object().and_then(|m| m.get(key_name)) else {
        return Ok(None);
    };
    let mut dependencies = Vec::new();
    for (name, raw) in map {
        if raw.is_object() || raw.is_boolean() {
            dependencies.push((name.clone(), ctx.child(&format!("{key_name}/{name}"))));
        }
    }
    if dependencies.is_empty() {
        return Ok(None);
    }
    Ok(Some(DependentSchemas { dependencies }))
}

impl DependentSchemas {
    pub(crate) fn evaluate(&self, ctx: &mut EvalContext<'_>, instance: &Value) -> Result<KeywordOutcome, crate::error::EvaluateError> {
        let Some(obj) = instance.as_object() else { return Ok(ctx.pass("dependentSchemas")) };
        let mut nested = Vec::new();
        let mut valid = true;
        let mut evaluated_properties = HashSet::new();
        let mut evaluated_items = HashSet::new();
        for (trigger, key) in &self.dependencies {
            if !obj.contains_key(trigger) {
                continue;
            }
            let outcome = ctx.evaluate_child(*key, instance, &format!("dependentSchemas/{trigger}"), None)?;
            valid &= outcome.results.valid;
            evaluated_properties.extend(outcome.evaluated_properties);
            evaluated_items.extend(outcome.evaluated_items);
            nested.push(outcome.results);
        }
        Ok(KeywordOutcome {
            result: ctx.wrap(valid, nested),
            evaluated_properties,
            evaluated_items,
        })
    }
}
