//! The error enums raised while compiling or evaluating a schema.

use schema_uri::{AbsoluteUri, UriError};
use snafu::Snafu;

/// Failure to turn a raw document into registered, keyword-indexed schema
/// nodes.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CompileError {
    /// A `$ref`/`$dynamicRef`/`$recursiveRef` target could not be located
    /// after its owning document was fetched and compiled.
    #[snafu(display("could not resolve reference to \"{uri}\""))]
    ReferenceUnresolved { uri: AbsoluteUri },

    /// Two documents were registered under the same URI with different
    /// contents.
    #[snafu(display("\"{uri}\" is already registered with different contents"))]
    RegistryConflict { uri: AbsoluteUri },

    /// A `$ref`/`$id`/`$schema` string was not a parseable or resolvable URI.
    #[snafu(display("invalid schema URI: {source}"))]
    Uri { source: UriError },

    /// Resolving an external document failed.
    #[snafu(display("failed to resolve \"{uri}\": {source}"))]
    Resolve {
        uri: AbsoluteUri,
        source: crate::resolve::ResolveError,
    },

    /// A JSON Pointer embedded in a `$ref`/`$id` fragment did not address any
    /// value in the target document.
    #[snafu(display("pointer \"{pointer}\" does not resolve within \"{uri}\""))]
    PointerNotFound {
        uri: AbsoluteUri,
        pointer: String,
    },

    /// A keyword's value had the wrong JSON type or shape for its draft.
    #[snafu(display("\"{keyword}\" at \"{location}\" is malformed: {reason}"))]
    MalformedKeyword {
        keyword: &'static str,
        location: String,
        reason: String,
    },

    /// [`crate::Options::with_validate_schema`] is enabled and `uri` failed
    /// meta-schema validation.
    #[snafu(display("schema \"{uri}\" does not conform to its dialect's meta-schema"))]
    SchemaInvalid { uri: AbsoluteUri },

    /// A `format` or `pattern` string was not a syntactically valid regular
    /// expression / format name at compile time (only surfaces when the
    /// engine eagerly validates regex syntax rather than deferring to
    /// evaluation time).
    #[snafu(display("invalid pattern at \"{location}\": {source}"))]
    InvalidPattern {
        location: String,
        source: fancy_regex::Error,
    },
}

/// Failure to carry out evaluation to completion. Individual keyword
/// assertion failures are *not* errors: they are recorded as failed nodes in
/// [`crate::output::Results`]. This enum covers only conditions that prevent
/// evaluation from finishing at all.
#[derive(Debug, Snafu)]
pub enum EvaluateError {
    /// [`crate::options::Options::with_cancel`]'s hook reported cancellation.
    #[snafu(display("evaluation was cancelled"))]
    Cancelled,

    /// A `$dynamicRef`/`$recursiveRef`/`$ref` pointed at a [`crate::SchemaKey`]
    /// that is not present in the registry being evaluated against (always a
    /// caller bug: evaluating a schema against a different registry than the
    /// one it was compiled into).
    #[snafu(display("schema key does not belong to this registry"))]
    UnknownSchemaKey,
}
