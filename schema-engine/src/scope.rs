//! The dynamic scope: the stack of schema base URIs evaluation has descended
//! through, used to resolve `$dynamicRef`/`$recursiveRef`.
//!
//! Unlike the *lexical* nesting of a schema document, the dynamic scope
//! follows the actual evaluation path, including every `$ref` followed
//! along the way. A `$dynamicRef` resolves by scanning this stack from the
//! outermost frame inward and picking the first schema whose base URI
//! declares a matching `$dynamicAnchor`; only if none match does it fall
//! back to the statically resolved target computed at compile time.

use schema_uri::AbsoluteUri;

/// A stack of schema base URIs, innermost (most recently entered) last.
#[derive(Debug, Clone, Default)]
pub struct DynamicScope {
    frames: Vec<AbsoluteUri>,
}

impl DynamicScope {
    #[must_use]
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Enters a new frame for `base_uri`, returning a guard that pops it on
    /// drop so evaluation code can use ordinary scoped blocks / `?` without
    /// leaking stale frames on an early return.
    pub fn enter(&mut self, base_uri: AbsoluteUri) -> ScopeGuard<'_> {
        self.frames.push(base_uri);
        ScopeGuard { scope: self }
    }

    /// Iterates frames outermost-first.
    pub fn frames(&self) -> impl Iterator<Item = &AbsoluteUri> {
        self.frames.iter()
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

/// Pops the frame it was created from when dropped.
pub struct ScopeGuard<'a> {
    scope: &'a mut DynamicScope,
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.scope.frames.pop();
    }
}
