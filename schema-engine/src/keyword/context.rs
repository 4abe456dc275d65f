//! The per-keyword evaluation context: everything a [`super::Keyword`] needs
//! to inspect sibling annotations, recurse into a subschema, and build its
//! own [`crate::output::Results`] node.

use crate::dialect::Draft;
use crate::error::EvaluateError;
use crate::evaluate::{evaluate_node, KeywordOutcome, NodeOutcome};
use crate::options::Options;
use crate::output::{Annotation, ErrorDetail, Results};
use crate::registry::Registry;
use crate::schema::SchemaKey;
use crate::scope::DynamicScope;
use schema_uri::{pointer, AbsoluteUri, PointerBuf};
use serde_json::Value;
use std::collections::HashSet;

pub struct EvalContext<'a> {
    pub registry: &'a Registry,
    pub scope: &'a mut DynamicScope,
    pub options: &'a Options,
    pub eval_path: &'a PointerBuf,
    pub instance_path: &'a PointerBuf,
    pub schema_uri: &'a AbsoluteUri,
    pub base_uri: &'a AbsoluteUri,
    pub draft: Draft,
    pub evaluated_properties: &'a HashSet<String>,
    pub evaluated_items: &'a HashSet<usize>,
}

impl<'a> EvalContext<'a> {
    #[must_use]
    pub fn child_eval_path(&self, segment: &str) -> PointerBuf {
        pointer::append(self.eval_path, segment)
    }

    #[must_use]
    pub fn child_instance_path(&self, segment: &str) -> PointerBuf {
        pointer::append(self.instance_path, segment)
    }

    /// Builds a passing, annotation-free leaf result for `keyword`.
    #[must_use]
    pub fn pass(&self, _keyword: &'static str) -> KeywordOutcome {
        KeywordOutcome {
            result: self.leaf(true, Vec::new(), Vec::new()),
            evaluated_properties: HashSet::new(),
            evaluated_items: HashSet::new(),
        }
    }

    /// Builds a failing leaf result carrying one error message.
    #[must_use]
    pub fn fail(&self, keyword: &'static str, message: impl Into<String>) -> KeywordOutcome {
        KeywordOutcome {
            result: self.leaf(
                false,
                Vec::new(),
                vec![ErrorDetail {
                    keyword,
                    message: message.into(),
                }],
            ),
            evaluated_properties: HashSet::new(),
            evaluated_items: HashSet::new(),
        }
    }

    /// Builds a passing leaf result carrying one annotation value.
    #[must_use]
    pub fn annotate(&self, keyword: &'static str, value: Value) -> KeywordOutcome {
        KeywordOutcome {
            result: self.leaf(true, vec![Annotation { keyword, value }], Vec::new()),
            evaluated_properties: HashSet::new(),
            evaluated_items: HashSet::new(),
        }
    }

    /// Builds a passing leaf result carrying several annotation values at
    /// once (`title`/`description`/`default`/... are compiled as one
    /// combined keyword, so they share a single result node).
    #[must_use]
    pub fn wrap_annotations(&self, annotations: Vec<Annotation>) -> Results {
        self.leaf(true, annotations, Vec::new())
    }

    fn leaf(&self, valid: bool, annotations: Vec<Annotation>, errors: Vec<ErrorDetail>) -> Results {
        Results {
            valid,
            evaluation_path: self.eval_path.clone(),
            schema_location: self.schema_uri.clone(),
            instance_location: self.instance_path.clone(),
            annotations,
            errors,
            nested: Vec::new(),
        }
    }

    /// Wraps a set of applicator-branch [`Results`] as this keyword's own
    /// node, `valid` being the applicator's aggregate verdict (e.g. "all of
    /// these must be valid" for `allOf`, "at least one" for `anyOf`).
    #[must_use]
    pub fn wrap(&self, valid: bool, nested: Vec<Results>) -> Results {
        Results {
            valid,
            evaluation_path: self.eval_path.clone(),
            schema_location: self.schema_uri.clone(),
            instance_location: self.instance_path.clone(),
            annotations: Vec::new(),
            errors: Vec::new(),
            nested,
        }
    }

    /// Recurses into the schema at `key`, descending the evaluation path by
    /// `eval_segment` and, when `instance_segment` is given, the instance
    /// path too (applicators like `allOf` keep the same instance location;
    /// `properties`/`items` descend into a member/index).
    ///
    /// # Errors
    /// Propagates [`EvaluateError`] from the recursive walk.
    pub fn evaluate_child(
        &mut self,
        key: SchemaKey,
        instance: &Value,
        eval_segment: &str,
        instance_segment: Option<&str>,
    ) -> Result<NodeOutcome, EvaluateError> {
        let child = self
            .registry
            .get(key)
            .expect("keyword compile only stores keys present in this registry");
        let eval_path = self.child_eval_path(eval_segment);
        let instance_path = match instance_segment {
            Some(segment) => self.child_instance_path(segment),
            None => self.instance_path.clone(),
        };
        let _guard = self.scope.enter(child.base_uri().clone());
        evaluate_node(
            self.registry,
            key,
            instance,
            self.scope,
            self.options,
            eval_path,
            instance_path,
        )
    }
}
