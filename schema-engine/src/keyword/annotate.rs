//! Keywords that never constrain an instance, only annotate it: `title`,
//! `description`, `default`, `examples`, `deprecated`, `readOnly`,
//! `writeOnly`, and the `content*` trio. Compiled together into one
//! [`Keyword::Annotate`](super::Keyword::Annotate) since none of them need a
//! nested schema or affect `unevaluated*` bookkeeping.

use super::{CompileCtx, EvalContext};
use crate::error::CompileError;
use crate::evaluate::KeywordOutcome;
use crate::output::Annotation;
use serde_json::Value;

const ANNOTATION_KEYWORDS: &[&str] = &[
    "title",
    "description",
    "default",
    "examples",
    "deprecated",
    "readOnly",
    "writeOnly",
    "contentEncoding",
    "contentMediaType",
];

#[derive(Debug, Clone)]
pub struct Annotate {
    pub entries: Vec<(&'static str, Value)>,
}

pub(crate) fn compile(_ctx: &mut CompileCtx<'_>, value: &Value) -> Result<Option<super::Keyword>, CompileError> {
    let Some(map) = value.as_object() else { return Ok(None) };
    let mut entries = Vec::new();
    for keyword in ANNOTATION_KEYWORDS {
        if let Some(v) = map.get(*keyword) {
            entries.push((*keyword, v.clone()));
        }
    }
    if entries.is_empty() {
        return Ok(None);
    }
    Ok(Some(super::Keyword::Annotate(Annotate { entries })))
}

impl Annotate {
    pub(crate) fn evaluate(&self, ctx: &EvalContext<'_>, _instance: &Value) -> KeywordOutcome {
        let annotations = self
            .entries
            .iter()
            .map(|(keyword, value)| Annotation {
                keyword,
                value: value.clone(),
            })
            .collect();
        KeywordOutcome {
            result: ctx.wrap_annotations(annotations),
            evaluated_properties: Default::default(),
            evaluated_items: Default::default(),
        }
    }
}
