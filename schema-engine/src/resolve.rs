//! Fetching schema documents that were not registered up front.
//!
//! Resolution is synchronous and blocking by design: keyword evaluation
//! never performs I/O, and compilation only calls through [`Resolve`] the
//! first time a `$ref` crosses into a document the caller hasn't already
//! handed to [`crate::Registry`] via a pre-registered source.

use schema_uri::AbsoluteUri;
use serde_json::Value;
use snafu::Snafu;
use std::collections::HashMap;
use std::sync::Arc;

/// Fetches the document addressed by an [`AbsoluteUri`] (its fragment, if
/// any, already stripped).
///
/// Implement this for whatever backs your schema documents: an in-memory
/// map, a filesystem directory keyed by URI, a blocking HTTP client. There
/// is no async variant; engines that need non-blocking fetches should
/// resolve every external document ahead of time and register it directly.
pub trait Resolve: Send + Sync {
    /// Returns the document registered at `uri`, or a [`ResolveError`] if
    /// none exists / it could not be fetched.
    ///
    /// # Errors
    /// Returns [`ResolveError::NotFound`] if this resolver has no document
    /// for `uri`, or another variant if fetching failed.
    fn resolve(&self, uri: &AbsoluteUri) -> Result<Arc<Value>, ResolveError>;
}

/// A [`Resolve`] that never has anything, for callers who pre-register every
/// document a schema will ever reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResolve;

impl Resolve for NoResolve {
    fn resolve(&self, uri: &AbsoluteUri) -> Result<Arc<Value>, ResolveError> {
        Err(ResolveError::NotFound { uri: uri.clone() })
    }
}

/// A [`Resolve`] backed by a fixed in-memory table, keyed by the document's
/// own (fragment-less) URI.
#[derive(Debug, Clone, Default)]
pub struct StaticResolve(HashMap<AbsoluteUri, Arc<Value>>);

impl StaticResolve {
    #[must_use]
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    #[must_use]
    pub fn with(mut self, uri: AbsoluteUri, document: Value) -> Self {
        self.0.insert(uri, Arc::new(document));
        self
    }
}

impl Resolve for StaticResolve {
    fn resolve(&self, uri: &AbsoluteUri) -> Result<Arc<Value>, ResolveError> {
        self.0
            .get(uri)
            .cloned()
            .ok_or_else(|| ResolveError::NotFound { uri: uri.clone() })
    }
}

/// A failure to fetch a referenced document.
#[derive(Debug, Snafu)]
pub enum ResolveError {
    /// No document is known at this URI.
    #[snafu(display("no schema document registered for \"{uri}\""))]
    NotFound { uri: AbsoluteUri },

    /// The resolver found the URI but fetching or parsing it failed.
    #[snafu(display("failed to fetch \"{uri}\": {reason}"))]
    Fetch { uri: AbsoluteUri, reason: String },
}
