//! The evaluation result tree and its `flag`/`basic`/`hierarchical`/
//! pre-2020-12 flattenings.

use schema_uri::{AbsoluteUri, PointerBuf};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// One schema node's contribution to evaluation: its own pass/fail verdict,
/// where it sits in both the instance and the schema, and the (possibly
/// empty) subtree of applicator children it produced.
#[derive(Debug, Clone)]
pub struct Results {
    pub valid: bool,
    /// The path of keyword names taken to reach this node, reset to the
    /// empty pointer each time a `$ref`/`$dynamicRef`/`$recursiveRef` is
    /// followed (see `to_basic`'s root-copy handling of the boundary).
    pub evaluation_path: PointerBuf,
    /// This node's own canonical schema location (the compiled schema's
    /// `uri`), not the keyword-relative path.
    pub schema_location: AbsoluteUri,
    pub instance_location: PointerBuf,
    pub annotations: Vec<Annotation>,
    pub errors: Vec<ErrorDetail>,
    pub nested: Vec<Results>,
}

/// A single keyword's annotation value (e.g. `properties`'s list of matched
/// property names, or `title`'s literal string).
#[derive(Debug, Clone, Serialize)]
pub struct Annotation {
    pub keyword: &'static str,
    pub value: Value,
}

/// A single keyword's assertion failure.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    pub keyword: &'static str,
    pub message: String,
}

impl Results {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Flattens to a single boolean, discarding every annotation and error.
    #[must_use]
    pub fn to_flag(&self) -> FlagOutput {
        FlagOutput { valid: self.valid }
    }

    /// Flattens the tree into one list per outcome, each entry carrying its
    /// own `instanceLocation`/`keywordLocation` rather than nesting.
    ///
    /// The root node always contributes exactly one flattened entry (never
    /// duplicated as both the list's implicit wrapper and a list member):
    /// this function walks the whole tree (root included) emitting one
    /// `OutcomeUnit` per node that carries an annotation or error of its
    /// own, so a passing node with no direct annotations contributes
    /// nothing beyond letting its children flow through.
    #[must_use]
    pub fn to_basic(&self) -> BasicOutput {
        let mut units = Vec::new();
        self.collect_basic(self.valid, &mut units);
        BasicOutput {
            valid: self.valid,
            units,
        }
    }

    /// Only a descendant whose own validity matches the root's contributes
    /// units: an invalid root lifts failing nodes' errors, a valid root
    /// lifts passing nodes' annotations. A node that disagrees with the
    /// root (e.g. a passing `if` branch under an otherwise-invalid root) is
    /// skipped, though its own children are still walked.
    fn collect_basic(&self, root_valid: bool, out: &mut Vec<OutcomeUnit>) {
        if self.valid == root_valid {
            for error in &self.errors {
                out.push(OutcomeUnit {
                    valid: false,
                    keyword: Some(error.keyword),
                    instance_location: self.instance_location.to_string(),
                    evaluation_path: self.evaluation_path.to_string(),
                    schema_location: self.schema_location.to_string(),
                    message: Some(error.message.clone()),
                    annotation: None,
                });
            }
            for annotation in &self.annotations {
                out.push(OutcomeUnit {
                    valid: true,
                    keyword: Some(annotation.keyword),
                    instance_location: self.instance_location.to_string(),
                    evaluation_path: self.evaluation_path.to_string(),
                    schema_location: self.schema_location.to_string(),
                    message: None,
                    annotation: Some(annotation.value.clone()),
                });
            }
        }
        for child in &self.nested {
            child.collect_basic(root_valid, out);
        }
    }

    /// Flattens to the nested shape: every node keeps its own children,
    /// with its own errors/annotations as keyword-keyed maps.
    #[must_use]
    pub fn to_hierarchical(&self) -> HierarchicalOutput {
        HierarchicalOutput {
            valid: self.valid,
            evaluation_path: self.evaluation_path.to_string(),
            schema_location: self.schema_location.to_string(),
            instance_location: self.instance_location.to_string(),
            errors: self.errors.iter().map(|e| (e.keyword, e.message.clone())).collect(),
            annotations: self.annotations.iter().map(|a| (a.keyword, a.value.clone())).collect(),
            nested: self.nested.iter().map(Results::to_hierarchical).collect(),
        }
    }

    /// Flattens to the pre-2020-12 ("verbose") shape: `keywordLocation`/
    /// `absoluteKeywordLocation` in place of `evaluationPath`/
    /// `schemaLocation`, a single overall `error` message plus an `errors`
    /// array for an invalid node, or an `annotations` array for a valid
    /// one. Both arrays interleave nested child nodes (in traversal order)
    /// ahead of this node's own loose keyword entries (in declaration
    /// order).
    #[must_use]
    pub fn to_pre_2020_12(&self) -> Pre202012Output {
        let keyword_location = self.evaluation_path.to_string();
        let absolute_keyword_location = self.schema_location.to_string();
        let instance_location = self.instance_location.to_string();

        if self.valid {
            let mut annotations = Vec::new();
            for child in self.nested.iter().filter(|c| c.valid) {
                annotations.push(Pre202012Entry::Node(child.to_pre_2020_12()));
            }
            for annotation in &self.annotations {
                annotations.push(Pre202012Entry::Annotation {
                    keyword_location: format!("{keyword_location}/{}", annotation.keyword),
                    absolute_keyword_location: format!("{absolute_keyword_location}/{}", annotation.keyword),
                    instance_location: instance_location.clone(),
                    annotation: annotation.value.clone(),
                });
            }
            Pre202012Output {
                valid: true,
                keyword_location,
                absolute_keyword_location: Some(absolute_keyword_location),
                instance_location,
                error: None,
                errors: Vec::new(),
                annotations,
            }
        } else {
            let mut errors = Vec::new();
            for child in self.nested.iter().filter(|c| !c.valid) {
                errors.push(Pre202012Entry::Node(child.to_pre_2020_12()));
            }
            for error in &self.errors {
                errors.push(Pre202012Entry::Error {
                    keyword_location: format!("{keyword_location}/{}", error.keyword),
                    absolute_keyword_location: format!("{absolute_keyword_location}/{}", error.keyword),
                    instance_location: instance_location.clone(),
                    error: error.message.clone(),
                });
            }
            let error = self.errors.first().map_or_else(
                || format!("instance at \"{instance_location}\" failed validation against \"{absolute_keyword_location}\""),
                |e| e.message.clone(),
            );
            Pre202012Output {
                valid: false,
                keyword_location,
                absolute_keyword_location: Some(absolute_keyword_location),
                instance_location,
                error: Some(error),
                errors,
                annotations: Vec::new(),
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FlagOutput {
    pub valid: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BasicOutput {
    pub valid: bool,
    #[serde(rename = "units")]
    pub units: Vec<OutcomeUnit>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutcomeUnit {
    pub valid: bool,
    pub keyword: Option<&'static str>,
    #[serde(rename = "instanceLocation")]
    pub instance_location: String,
    #[serde(rename = "evaluationPath")]
    pub evaluation_path: String,
    #[serde(rename = "schemaLocation")]
    pub schema_location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HierarchicalOutput {
    pub valid: bool,
    #[serde(rename = "evaluationPath")]
    pub evaluation_path: String,
    #[serde(rename = "schemaLocation")]
    pub schema_location: String,
    #[serde(rename = "instanceLocation")]
    pub instance_location: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<&'static str, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<&'static str, Value>,
    #[serde(rename = "nested", skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<HierarchicalOutput>,
}

/// The pre-2020-12 ("verbose") legacy output shape. Unlike
/// [`HierarchicalOutput`]'s flat `errors`/`annotations` maps, nested child
/// nodes and this node's own keyword entries share one array, in the order
/// they were produced.
#[derive(Debug, Clone, Serialize)]
pub struct Pre202012Output {
    pub valid: bool,
    #[serde(rename = "keywordLocation")]
    pub keyword_location: String,
    #[serde(rename = "absoluteKeywordLocation", skip_serializing_if = "Option::is_none")]
    pub absolute_keyword_location: Option<String>,
    #[serde(rename = "instanceLocation")]
    pub instance_location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<Pre202012Entry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Pre202012Entry>,
}

/// One element of a [`Pre202012Output`]'s `errors`/`annotations` array:
/// either a nested child node (itself a full [`Pre202012Output`]) or a
/// leaf entry for a single keyword this node owns directly.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Pre202012Entry {
    Node(Pre202012Output),
    Error {
        #[serde(rename = "keywordLocation")]
        keyword_location: String,
        #[serde(rename = "absoluteKeywordLocation")]
        absolute_keyword_location: String,
        #[serde(rename = "instanceLocation")]
        instance_location: String,
        error: String,
    },
    Annotation {
        #[serde(rename = "keywordLocation")]
        keyword_location: String,
        #[serde(rename = "absoluteKeywordLocation")]
        absolute_keyword_location: String,
        #[serde(rename = "instanceLocation")]
        instance_location: String,
        annotation: Value,
    },
}
