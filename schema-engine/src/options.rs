//! Knobs that control compilation and evaluation.

use crate::dialect::Draft;
use schema_uri::AbsoluteUri;
use std::sync::Arc;

/// The shape of a [`crate::output::Results`] tree once flattened for
/// consumption outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum OutputFormat {
    /// A single boolean: did the instance validate.
    Flag,
    /// One flat list of errors/annotations, all relative to the root.
    Basic,
    /// The full evaluation tree, nested by applicator.
    Hierarchical,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Hierarchical
    }
}

/// Compilation and evaluation options, shared read-only across concurrent
/// validations once a [`crate::Registry`] has been compiled.
///
/// Construct with [`Options::new`] and adjust with the `with_*` builders,
/// mirroring the fluent-options convention this engine's keyword types also
/// follow.
#[derive(Clone)]
pub struct Options {
    pub(crate) default_draft: Draft,
    pub(crate) evaluate_as: Option<Draft>,
    pub(crate) default_base_uri: AbsoluteUri,
    pub(crate) output_format: OutputFormat,
    pub(crate) validate_formats: bool,
    pub(crate) validate_schema: bool,
    pub(crate) short_circuit: bool,
    pub(crate) cancel: Option<Arc<dyn crate::evaluate::Cancel>>,
}

impl Options {
    /// Creates an options set with every field at its specification default:
    /// draft 2020-12, `hierarchical` output, format left as annotation-only,
    /// no short-circuiting, no cancellation hook.
    #[must_use]
    pub fn new() -> Self {
        Self {
            default_draft: Draft::Draft202012,
            evaluate_as: None,
            default_base_uri: AbsoluteUri::parse("https://json-everything.net/base")
                .expect("fixed literal is a valid URI"),
            output_format: OutputFormat::Hierarchical,
            validate_formats: false,
            validate_schema: false,
            short_circuit: false,
            cancel: None,
        }
    }

    /// Sets the draft assumed for a document that declares no `$schema`.
    #[must_use]
    pub fn with_default_draft(mut self, draft: Draft) -> Self {
        self.default_draft = draft;
        self
    }

    /// Forces every document to be evaluated as `draft`, ignoring its own
    /// `$schema` declaration entirely.
    #[must_use]
    pub fn with_evaluate_as(mut self, draft: Draft) -> Self {
        self.evaluate_as = Some(draft);
        self
    }

    /// Sets the base URI assigned to a root document that declares no `$id`.
    #[must_use]
    pub fn with_default_base_uri(mut self, uri: AbsoluteUri) -> Self {
        self.default_base_uri = uri;
        self
    }

    /// Selects the shape `validate` flattens its result tree into.
    #[must_use]
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Enables the `format` keyword as an assertion rather than a bare
    /// annotation. Off by default, per the `format-assertion` vocabulary
    /// being opt-in for 2019-09 and later drafts.
    #[must_use]
    pub fn with_validate_formats(mut self, validate: bool) -> Self {
        self.validate_formats = validate;
        self
    }

    /// Validates each document against its dialect's meta-schema before
    /// compiling it, failing with [`crate::CompileError::SchemaInvalid`] if
    /// it doesn't conform.
    #[must_use]
    pub fn with_validate_schema(mut self, validate: bool) -> Self {
        self.validate_schema = validate;
        self
    }

    /// Allows evaluation to stop as soon as the overall result is known,
    /// skipping remaining sibling branches. Only safe (and only honored)
    /// when the output format is [`OutputFormat::Flag`] and no enclosing
    /// `unevaluatedProperties`/`unevaluatedItems` needs full annotation
    /// coverage; see [`crate::evaluate`] for exactly when this applies.
    #[must_use]
    pub fn with_short_circuit(mut self, short_circuit: bool) -> Self {
        self.short_circuit = short_circuit;
        self
    }

    /// Installs a cancellation hook, polled between sibling keyword
    /// evaluations so a caller can bound evaluation time.
    #[must_use]
    pub fn with_cancel(mut self, cancel: Arc<dyn crate::evaluate::Cancel>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    #[must_use]
    pub fn default_draft(&self) -> Draft {
        self.default_draft
    }

    #[must_use]
    pub fn evaluate_as(&self) -> Option<Draft> {
        self.evaluate_as
    }

    #[must_use]
    pub fn default_base_uri(&self) -> &AbsoluteUri {
        &self.default_base_uri
    }

    #[must_use]
    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    #[must_use]
    pub fn validate_formats(&self) -> bool {
        self.validate_formats
    }

    #[must_use]
    pub fn validate_schema(&self) -> bool {
        self.validate_schema
    }

    #[must_use]
    pub fn short_circuit(&self) -> bool {
        self.short_circuit
    }

    pub(crate) fn cancel(&self) -> Option<&Arc<dyn crate::evaluate::Cancel>> {
        self.cancel.as_ref()
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}
