//! Keywords that assert something about a single scalar facet of an
//! instance: its type, its identity against an enum/const, a numeric bound,
//! a string length/pattern/format.

use super::{CompileCtx, EvalContext};
use crate::error::{CompileError, InvalidPatternSnafu};
use crate::evaluate::KeywordOutcome;
use fancy_regex::Regex;
use serde_json::Value;
use snafu::ResultExt;
use std::sync::Arc;

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() || n.fract_is_zero() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// `serde_json::Number` has no `fract_is_zero`; this shim treats any
/// finite floating value with a zero fractional part as also satisfying
/// `"integer"`, matching the JSON Schema type model where `1.0` is an
/// integer.
trait FractIsZero {
    fn fract_is_zero(&self) -> bool;
}
impl FractIsZero for serde_json::Number {
    fn fract_is_zero(&self) -> bool {
        self.as_f64().is_some_and(|f| f.fract() == 0.0)
    }
}

/*
── type ──────────────────────────────────────────────────────────────────
*/

#[derive(Debug, Clone)]
pub struct Type {
    pub allowed: Vec<String>,
}

pub(crate) fn compile_type(_ctx: &mut CompileCtx<'_>, value: &Value) -> Result<Option<Type>, CompileError> {
    let Some(raw) = value.as_object().and_then(|m| m.get("type")) else {
        return Ok(None);
    };
    let allowed = match raw {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items.iter().filter_map(Value::as_str).map(str::to_string).collect(),
        _ => return Ok(None),
    };
    Ok(Some(Type { allowed }))
}

impl Type {
    pub(crate) fn evaluate(&self, ctx: &EvalContext<'_>, instance: &Value) -> KeywordOutcome {
        let actual = json_type_name(instance);
        let matches = self.allowed.iter().any(|t| t == actual || (t == "number" && actual == "integer"));
        if matches {
            ctx.pass("type")
        } else {
            ctx.fail("type", format!("expected {:?}, found \"{actual}\"", self.allowed))
        }
    }
}

/*
── enum / const ────────────────────────────────────────────────────────────
*/

#[derive(Debug, Clone)]
pub struct Enum {
    pub values: Vec<Value>,
}

pub(crate) fn compile_enum(value: &Value) -> Option<Enum> {
    let Value::Array(values) = value.as_object()?.get("enum")? else {
        return None;
    };
    Some(Enum { values: values.clone() })
}

impl Enum {
    pub(crate) fn evaluate(&self, ctx: &EvalContext<'_>, instance: &Value) -> KeywordOutcome {
        if self.values.iter().any(|v| v == instance) {
            ctx.pass("enum")
        } else {
            ctx.fail("enum", "instance does not match any value in enum")
        }
    }
}

#[derive(Debug, Clone)]
pub struct Const {
    pub value: Value,
}

pub(crate) fn compile_const(value: &Value) -> Option<Const> {
    let v = value.as_object()?.get("const")?;
    Some(Const { value: v.clone() })
}

impl Const {
    pub(crate) fn evaluate(&self, ctx: &EvalContext<'_>, instance: &Value) -> KeywordOutcome {
        if &self.value == instance {
            ctx.pass("const")
        } else {
            ctx.fail("const", "instance does not equal const value")
        }
    }
}

/*
── numeric bounds ──────────────────────────────────────────────────────────
*/

fn as_f64(value: &Value, keyword: &'static str, ctx: &CompileCtx<'_>) -> Result<f64, CompileError> {
    value.as_f64().ok_or_else(|| CompileError::MalformedKeyword {
        keyword,
        location: ctx.node_uri.to_string(),
        reason: "expected a JSON number".to_string(),
    })
}

#[derive(Debug, Clone)]
pub struct MultipleOf {
    pub factor: f64,
}

pub(crate) fn compile_multiple_of(ctx: &mut CompileCtx<'_>, value: &Value) -> Result<Option<MultipleOf>, CompileError> {
    let Some(raw) = value.as_object().and_then(|m| m.get("multipleOf")) else {
        return Ok(None);
    };
    Ok(Some(MultipleOf { factor: as_f64(raw, "multipleOf", ctx)? }))
}

impl MultipleOf {
    pub(crate) fn evaluate(&self, ctx: &EvalContext<'_>, instance: &Value) -> KeywordOutcome {
        let Some(n) = instance.as_f64() else {
            return ctx.pass("multipleOf");
        };
        let quotient = n / self.factor;
        if (quotient - quotient.round()).abs() < f64::EPSILON.sqrt() {
            ctx.pass("multipleOf")
        } else {
            ctx.fail("multipleOf", format!("{n} is not a multiple of {}", self.factor))
        }
    }
}

/// `maximum`, folded together with draft-07's boolean sibling
/// `exclusiveMaximum` (which just flips this bound's inclusivity rather than
/// asserting independently, the way it does from 2019-09 onward).
#[derive(Debug, Clone)]
pub struct Maximum {
    pub limit: f64,
    pub exclusive: bool,
}

pub(crate) fn compile_maximum(ctx: &mut CompileCtx<'_>, value: &Value) -> Result<Option<Maximum>, CompileError> {
    let Some(raw) = value.as_object().and_then(|m| m.get("maximum")) else {
        return Ok(None);
    };
    let exclusive = ctx.draft == crate::dialect::Draft::Draft07
        && value
            .as_object()
            .and_then(|m| m.get("exclusiveMaximum"))
            .and_then(Value::as_bool)
            .unwrap_or(false);
    Ok(Some(Maximum { limit: as_f64(raw, "maximum", ctx)?, exclusive }))
}

impl Maximum {
    pub(crate) fn evaluate(&self, ctx: &EvalContext<'_>, instance: &Value) -> KeywordOutcome {
        let Some(n) = instance.as_f64() else { return ctx.pass("maximum") };
        let ok = if self.exclusive { n < self.limit } else { n <= self.limit };
        if ok {
            ctx.pass("maximum")
        } else {
            let op = if self.exclusive { "less than" } else { "less than or equal to" };
            ctx.fail("maximum", format!("{n} is not {op} {}", self.limit))
        }
    }
}

/// `minimum`, folded together with draft-07's boolean sibling
/// `exclusiveMinimum` (see [`Maximum`]).
#[derive(Debug, Clone)]
pub struct Minimum {
    pub limit: f64,
    pub exclusive: bool,
}

pub(crate) fn compile_minimum(ctx: &mut CompileCtx<'_>, value: &Value) -> Result<Option<Minimum>, CompileError> {
    let Some(raw) = value.as_object().and_then(|m| m.get("minimum")) else {
        return Ok(None);
    };
    let exclusive = ctx.draft == crate::dialect::Draft::Draft07
        && value
            .as_object()
            .and_then(|m| m.get("exclusiveMinimum"))
            .and_then(Value::as_bool)
            .unwrap_or(false);
    Ok(Some(Minimum { limit: as_f64(raw, "minimum", ctx)?, exclusive }))
}

impl Minimum {
    pub(crate) fn evaluate(&self, ctx: &EvalContext<'_>, instance: &Value) -> KeywordOutcome {
        let Some(n) = instance.as_f64() else { return ctx.pass("minimum") };
        let ok = if self.exclusive { n > self.limit } else { n >= self.limit };
        if ok {
            ctx.pass("minimum")
        } else {
            let op = if self.exclusive { "greater than" } else { "greater than or equal to" };
            ctx.fail("minimum", format!("{n} is not {op} {}", self.limit))
        }
    }
}

macro_rules! bound_keyword {
    ($name:ident, $field:literal, $compile_fn:ident, $op:tt, $op_name:literal) => {
        #[derive(Debug, Clone)]
        pub struct $name {
            pub limit: f64,
        }

        fn $compile_fn(ctx: &mut CompileCtx<'_>, value: &Value) -> Result<Option<$name>, CompileError> {
            let Some(raw) = value.as_object().and_then(|m| m.get($field)) else {
                return Ok(None);
            };
            Ok(Some($name { limit: as_f64(raw, $field, ctx)? }))
        }

        impl $name {
            pub(crate) fn evaluate(&self, ctx: &EvalContext<'_>, instance: &Value) -> KeywordOutcome {
                let Some(n) = instance.as_f64() else {
                    return ctx.pass($field);
                };
                if n $op self.limit {
                    ctx.pass($field)
                } else {
                    ctx.fail($field, format!("{n} is not {} {}", $op_name, self.limit))
                }
            }
        }
    };
}

bound_keyword!(ExclusiveMaximum, "exclusiveMaximum", compile_exclusive_maximum_numeric, <, "less than");
bound_keyword!(ExclusiveMinimum, "exclusiveMinimum", compile_exclusive_minimum_numeric, >, "greater than");

/// `exclusiveMaximum`/`exclusiveMinimum` are numeric, independent keywords
/// from 2019-09 onward; in draft-07 they're booleans folded into
/// [`Maximum`]/[`Minimum`] instead, so no independent keyword is produced.
pub(crate) fn compile_exclusive_maximum(
    ctx: &mut CompileCtx<'_>,
    value: &Value,
) -> Result<Option<ExclusiveMaximum>, CompileError> {
    if ctx.draft == crate::dialect::Draft::Draft07 {
        return Ok(None);
    }
    compile_exclusive_maximum_numeric(ctx, value)
}

pub(crate) fn compile_exclusive_minimum(
    ctx: &mut CompileCtx<'_>,
    value: &Value,
) -> Result<Option<ExclusiveMinimum>, CompileError> {
    if ctx.draft == crate::dialect::Draft::Draft07 {
        return Ok(None);
    }
    compile_exclusive_minimum_numeric(ctx, value)
}

/*
── string length / pattern / format ────────────────────────────────────────
*/

fn str_len(s: &str) -> usize {
    s.chars().count()
}

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
pub struct MaxLength {
    pub limit: usize,
}

pub(crate) fn compile_max_length(ctx: &mut CompileCtx<'_>, value: &Value) -> Result<Option<MaxLength>, CompileError> {
    let Some(raw) = value.as_object().and_then(|m| m.get("maxLength")) else {
        return Ok(None);
    };
    Ok(Some(MaxLength { limit: as_usize(raw, "maxLength", ctx)? }))
}

impl MaxLength {
    pub(crate) fn evaluate(&self, ctx: &EvalContext<'_>, instance: &Value) -> KeywordOutcome {
        let Some(s) = instance.as_str() else { return ctx.pass("maxLength") };
        if str_len(s) <= self.limit {
            ctx.pass("maxLength")
        } else {
            ctx.fail("maxLength", format!("length {} exceeds {}", str_len(s), self.limit))
        }
    }
}

#[derive(Debug, Clone)]
pub struct MinLength {
    pub limit: usize,
}

pub(crate) fn compile_min_length(ctx: &mut CompileCtx<'_>, value: &Value) -> Result<Option<MinLength>, CompileError> {
    let Some(raw) = value.as_object().and_then(|m| m.get("minLength")) else {
        return Ok(None);
    };
    Ok(Some(MinLength { limit: as_usize(raw, "minLength", ctx)? }))
}

impl MinLength {
    pub(crate) fn evaluate(&self, ctx: &EvalContext<'_>, instance: &Value) -> KeywordOutcome {
        let Some(s) = instance.as_str() else { return ctx.pass("minLength") };
        if str_len(s) >= self.limit {
            ctx.pass("minLength")
        } else {
            ctx.fail("minLength", format!("length {} is below {}", str_len(s), self.limit))
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pattern {
    pub regex: Arc<Regex>,
    pub source: String,
}

pub(crate) fn compile_pattern(ctx: &mut CompileCtx<'_>, value: &Value) -> Result<Option<Pattern>, CompileError> {
    let Some(raw) = value.as_object().and_then(|m| m.get("pattern")).and_then(Value::as_str) else {
        return Ok(None);
    };
    let regex = Regex::new(raw).context(InvalidPatternSnafu { location: ctx.node_uri.to_string() })?;
    Ok(Some(Pattern { regex: Arc::new(regex), source: raw.to_string() }))
}

impl Pattern {
    pub(crate) fn evaluate(&self, ctx: &EvalContext<'_>, instance: &Value) -> KeywordOutcome {
        let Some(s) = instance.as_str() else { return ctx.pass("pattern") };
        match self.regex.is_match(s) {
            Ok(true) => ctx.pass("pattern"),
            Ok(false) => ctx.fail("pattern", format!("\"{s}\" does not match /{}/", self.source)),
            Err(_) => ctx.fail("pattern", "pattern evaluation failed"),
        }
    }
}

/*
── format ──────────────────────────────────────────────────────────────────
*/

#[derive(Debug, Clone)]
pub struct Format {
    pub name: String,
    pub assert: bool,
}

pub(crate) fn compile_format(ctx: &mut CompileCtx<'_>, value: &Value) -> Option<Format> {
    let name = value.as_object()?.get("format")?.as_str()?.to_string();
    Some(Format { name, assert: ctx.options.validate_formats() })
}

impl Format {
    pub(crate) fn evaluate(&self, ctx: &EvalContext<'_>, instance: &Value) -> KeywordOutcome {
        let Some(s) = instance.as_str() else {
            return ctx.annotate("format", Value::String(self.name.clone()));
        };
        if !self.assert {
            return ctx.annotate("format", Value::String(self.name.clone()));
        }
        if crate::vocabulary::format::is_valid(&self.name, s) {
            ctx.annotate("format", Value::String(self.name.clone()))
        } else {
            ctx.fail("format", format!("\"{s}\" is not a valid \"{}\"", self.name))
        }
    }
}

/*
── contentEncoding ──────────────────────────────────────────────────────────
*/

/// Asserts `contentEncoding: "base64"` only — every other declared encoding
/// (`quoted-printable`, `base64url`, ...) stays annotation-only, matching how
/// loosely the keyword is specified outside that one well-known case.
#[derive(Debug, Clone)]
pub struct ContentEncoding {
    pub assert: bool,
}

pub(crate) fn compile_content_encoding(ctx: &mut CompileCtx<'_>, value: &Value) -> Option<ContentEncoding> {
    let name = value.as_object()?.get("contentEncoding")?.as_str()?;
    if name != "base64" {
        return None;
    }
    Some(ContentEncoding { assert: ctx.options.validate_formats() })
}

impl ContentEncoding {
    pub(crate) fn evaluate(&self, ctx: &EvalContext<'_>, instance: &Value) -> KeywordOutcome {
        let Some(s) = instance.as_str() else { return ctx.pass("contentEncoding") };
        if !self.assert {
            return ctx.pass("contentEncoding");
        }
        use base64::Engine;
        match base64::engine::general_purpose::STANDARD.decode(s) {
            Ok(_) => ctx.pass("contentEncoding"),
            Err(_) => ctx.fail("contentEncoding", format!("\"{s}\" is not valid base64")),
        }
    }
}
