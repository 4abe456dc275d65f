//! Walking a compiled schema against an instance.

use crate::error::{EvaluateError, UnknownSchemaKeySnafu};
use crate::keyword::EvalContext;
use crate::options::Options;
use crate::output::Results;
use crate::registry::Registry;
use crate::schema::SchemaKey;
use crate::scope::DynamicScope;
use schema_uri::PointerBuf;
use serde_json::Value;
use snafu::OptionExt;
use std::collections::HashSet;

/// A hook polled between sibling keyword evaluations so a caller can bound
/// how long a single `validate` call may run.
pub trait Cancel: Send + Sync {
    fn is_cancelled(&self) -> bool;
}

/// The outcome of evaluating every keyword on one compiled schema node
/// against one instance location, plus the instance surface it covers (fed
/// to `unevaluatedProperties`/`unevaluatedItems` at the enclosing node).
pub(crate) struct NodeOutcome {
    pub results: Results,
    pub evaluated_properties: HashSet<String>,
    pub evaluated_items: HashSet<usize>,
}

/// The outcome of a single keyword's evaluation.
pub(crate) struct KeywordOutcome {
    pub result: Results,
    pub evaluated_properties: HashSet<String>,
    pub evaluated_items: HashSet<usize>,
}

fn root_pointer() -> PointerBuf {
    "".parse().expect("empty string is the root JSON Pointer")
}

/// Evaluates `instance` against the schema compiled at `schema` within
/// `registry`, using `options` to select draft-sensitive behavior and the
/// output shape callers will ultimately ask for via `Results::to_*`.
///
/// # Errors
/// Returns [`EvaluateError::UnknownSchemaKey`] if `schema` does not belong to
/// `registry`, or [`EvaluateError::Cancelled`] if `options`'s cancellation
/// hook reports cancellation mid-walk.
pub fn validate(
    registry: &Registry,
    schema: SchemaKey,
    instance: &Value,
    options: &Options,
) -> Result<Results, EvaluateError> {
    let root = registry.get(schema).context(UnknownSchemaKeySnafu)?;
    let _span = tracing::info_span!("evaluate", schema_location = %root.uri()).entered();
    let mut scope = DynamicScope::new();
    let _guard = scope.enter(root.base_uri().clone());
    let outcome = evaluate_node(
        registry,
        schema,
        instance,
        &mut scope,
        options,
        root_pointer(),
        root_pointer(),
    )?;
    Ok(outcome.results)
}

/// Recursively evaluates the schema at `key` against `instance`, extending
/// `eval_path`/`instance_path` for nested keyword reporting.
pub(crate) fn evaluate_node(
    registry: &Registry,
    key: SchemaKey,
    instance: &Value,
    scope: &mut DynamicScope,
    options: &Options,
    eval_path: PointerBuf,
    instance_path: PointerBuf,
) -> Result<NodeOutcome, EvaluateError> {
    if let Some(cancel) = options.cancel() {
        if cancel.is_cancelled() {
            return Err(EvaluateError::Cancelled);
        }
    }
    let schema = registry.get(key).context(UnknownSchemaKeySnafu)?;

    if let Some(valid) = schema.as_bool() {
        return Ok(NodeOutcome {
            results: Results {
                valid,
                evaluation_path: eval_path,
                schema_location: schema.uri().clone(),
                instance_location: instance_path,
                annotations: Vec::new(),
                errors: Vec::new(),
                nested: Vec::new(),
            },
            evaluated_properties: HashSet::new(),
            evaluated_items: HashSet::new(),
        });
    }

    let mut valid = true;
    let mut nested = Vec::new();
    let mut evaluated_properties = HashSet::new();
    let mut evaluated_items = HashSet::new();

    for kw in schema.keywords() {
        if let Some(cancel) = options.cancel() {
            if cancel.is_cancelled() {
                return Err(EvaluateError::Cancelled);
            }
        }
        let mut ctx = EvalContext {
            registry,
            scope,
            options,
            eval_path: &eval_path,
            instance_path: &instance_path,
            schema_uri: schema.uri(),
            base_uri: schema.base_uri(),
            draft: schema.draft(),
            evaluated_properties: &evaluated_properties,
            evaluated_items: &evaluated_items,
        };
        let outcome = kw.evaluate(&mut ctx, instance)?;
        tracing::trace!(%eval_path, valid = outcome.result.valid, "keyword dispatched");
        valid &= outcome.result.valid;
        evaluated_properties.extend(outcome.evaluated_properties);
        evaluated_items.extend(outcome.evaluated_items);
        nested.push(outcome.result);

        if !valid && options.short_circuit() && matches!(options.output_format(), crate::options::OutputFormat::Flag)
        {
            break;
        }
    }

    Ok(NodeOutcome {
        results: Results {
            valid,
            evaluation_path: eval_path,
            schema_location: schema.uri().clone(),
            instance_location: instance_path,
            annotations: Vec::new(),
            errors: Vec::new(),
            nested,
        },
        evaluated_properties,
        evaluated_items,
    })
}
