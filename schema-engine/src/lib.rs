//! A synchronous JSON Schema compilation and evaluation core.
//!
//! This crate implements the keyword-dispatch engine shared by every draft
//! from `draft-07` through `2020-12`: a [`Registry`] holds compiled schemas
//! keyed by [`schema::SchemaKey`], [`compile::compile`] turns a raw
//! [`serde_json::Value`] document into entries in that registry, and
//! [`evaluate::validate`] walks a compiled schema against an instance,
//! producing an [`output::Results`] tree that can be flattened to the
//! `flag`, `basic`, or `hierarchical` output shapes defined by the 2019-09
//! output specification.
//!
//! Nothing in this crate performs I/O on its own. Resolving a `$ref` that
//! points outside an already-registered document goes through the
//! synchronous [`resolve::Resolve`] trait, which callers implement however
//! fits their environment (filesystem, embedded bundle, blocking HTTP
//! client, ...).

#![deny(clippy::all)]
#![allow(
    clippy::module_name_repetitions,
    clippy::result_large_err,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::wildcard_imports
)]

pub mod compile;
pub mod dialect;
pub mod error;
pub mod evaluate;
pub mod keyword;
pub mod options;
pub mod output;
pub mod registry;
pub mod resolve;
pub mod schema;
pub mod scope;
pub mod vocabulary;

pub use compile::compile;
pub use dialect::Draft;
pub use error::{CompileError, EvaluateError};
pub use evaluate::validate;
pub use options::{OutputFormat, Options};
pub use registry::Registry;
pub use resolve::{NoResolve, Resolve, ResolveError};
pub use schema::SchemaKey;
pub use schema_uri::{AbsoluteUri, Pointer, PointerBuf, Uri};

pub use output::Results;
