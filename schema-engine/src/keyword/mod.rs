//! The compiled keyword set: one variant per JSON Schema keyword (or small
//! family of closely related keywords) this engine understands, each
//! carrying whatever it needed precomputed at compile time (a parsed
//! regex, a resolved [`crate::SchemaKey`], a numeric bound) so evaluation
//! never re-parses the schema document.

pub mod annotate;
pub mod applicator;
pub mod array;
pub mod context;
pub mod object;
pub mod reference;
pub mod scalar;
pub mod unevaluated;

pub use context::EvalContext;

use crate::dialect::Draft;
use crate::error::CompileError;
use crate::evaluate::KeywordOutcome;
use crate::options::Options;
use crate::registry::Registry;
use crate::resolve::Resolve;
use crate::schema::SchemaKey;
use schema_uri::AbsoluteUri;
use serde_json::Value;

/// Everything a keyword's `compile` function needs: read access to sibling
/// schema values already linked by the structural walk, and the means to
/// resolve a `$ref`/`$dynamicRef` target, possibly fetching and compiling a
/// document that hasn't been seen yet.
pub struct CompileCtx<'a> {
    pub registry: &'a mut Registry,
    pub resolver: &'a dyn Resolve,
    pub options: &'a Options,
    pub node_key: SchemaKey,
    pub node_uri: AbsoluteUri,
    pub base_uri: AbsoluteUri,
    pub draft: Draft,
}

impl<'a> CompileCtx<'a> {
    /// The already-compiled child at `segment` (e.g. `"allOf/0"`,
    /// `"properties/name"`), recorded by the structural walk that ran
    /// before any keyword was compiled.
    #[must_use]
    pub fn child(&self, segment: &str) -> SchemaKey {
        self.registry.child(self.node_key, segment).unwrap_or_else(|| {
            panic!("structural walk did not record a child at \"{segment}\" for this node")
        })
    }

    /// Resolves `raw` (a `$ref`/`$dynamicRef`/`$recursiveRef` string) against
    /// this node's base URI, compiling the owning document first if needed.
    ///
    /// # Errors
    /// Returns [`CompileError`] if `raw` is not a valid URI reference or if
    /// no schema is ultimately found at the resolved target.
    pub fn resolve_ref(&mut self, raw: &str) -> Result<SchemaKey, CompileError> {
        use snafu::ResultExt;
        let target = schema_uri::Uri::parse(raw)
            .resolve(&self.base_uri)
            .context(crate::error::UriSnafu)?;
        self.registry.resolve_target(&target, self.resolver, self.options)
    }
}

/// One compiled keyword.
#[derive(Debug, Clone)]
pub enum Keyword {
    Annotate(annotate::Annotate),
    Ref(reference::Ref),
    DynamicRef(reference::DynamicRef),
    Type(scalar::Type),
    Enum(scalar::Enum),
    Const(scalar::Const),
    MultipleOf(scalar::MultipleOf),
    Maximum(scalar::Maximum),
    Minimum(scalar::Minimum),
    ExclusiveMaximum(scalar::ExclusiveMaximum),
    ExclusiveMinimum(scalar::ExclusiveMinimum),
    MaxLength(scalar::MaxLength),
    MinLength(scalar::MinLength),
    Pattern(scalar::Pattern),
    Format(scalar::Format),
    ContentEncoding(scalar::ContentEncoding),
    MaxItems(array::MaxItems),
    MinItems(array::MinItems),
    UniqueItems(array::UniqueItems),
    PrefixItems(array::PrefixItems),
    Items(array::Items),
    Contains(array::Contains),
    MaxProperties(object::MaxProperties),
    MinProperties(object::MinProperties),
    Required(object::Required),
    Properties(object::Properties),
    PropertyNames(object::PropertyNames),
    DependentRequired(object::DependentRequired),
    DependentSchemas(object::DependentSchemas),
    AllOf(applicator::AllOf),
    AnyOf(applicator::AnyOf),
    OneOf(applicator::OneOf),
    Not(applicator::Not),
    IfThenElse(applicator::IfThenElse),
    UnevaluatedItems(unevaluated::UnevaluatedItems),
    UnevaluatedProperties(unevaluated::UnevaluatedProperties),
}

impl Keyword {
    /// Evaluates this keyword against `instance`, producing its own result
    /// node plus whatever instance surface it covers for
    /// `unevaluatedProperties`/`unevaluatedItems` bookkeeping.
    pub fn evaluate(
        &self,
        ctx: &mut EvalContext<'_>,
        instance: &Value,
    ) -> Result<KeywordOutcome, crate::error::EvaluateError> {
        match self {
            Keyword::Annotate(k) => Ok(k.evaluate(ctx, instance)),
            Keyword::Ref(k) => k.evaluate(ctx, instance),
            Keyword::DynamicRef(k) => k.evaluate(ctx, instance),
            Keyword::Type(k) => Ok(k.evaluate(ctx, instance)),
            Keyword::Enum(k) => Ok(k.evaluate(ctx, instance)),
            Keyword::Const(k) => Ok(k.evaluate(ctx, instance)),
            Keyword::MultipleOf(k) => Ok(k.evaluate(ctx, instance)),
            Keyword::Maximum(k) => Ok(k.evaluate(ctx, instance)),
            Keyword::Minimum(k) => Ok(k.evaluate(ctx, instance)),
            Keyword::ExclusiveMaximum(k) => Ok(k.evaluate(ctx, instance)),
            Keyword::ExclusiveMinimum(k) => Ok(k.evaluate(ctx, instance)),
            Keyword::MaxLength(k) => Ok(k.evaluate(ctx, instance)),
            Keyword::MinLength(k) => Ok(k.evaluate(ctx, instance)),
            Keyword::Pattern(k) => Ok(k.evaluate(ctx, instance)),
            Keyword::Format(k) => Ok(k.evaluate(ctx, instance)),
            Keyword::ContentEncoding(k) => Ok(k.evaluate(ctx, instance)),
            Keyword::MaxItems(k) => Ok(k.evaluate(ctx, instance)),
            Keyword::MinItems(k) => Ok(k.evaluate(ctx, instance)),
            Keyword::UniqueItems(k) => Ok(k.evaluate(ctx, instance)),
            Keyword::PrefixItems(k) => k.evaluate(ctx, instance),
            Keyword::Items(k) => k.evaluate(ctx, instance),
            Keyword::Contains(k) => k.evaluate(ctx, instance),
            Keyword::MaxProperties(k) => Ok(k.evaluate(ctx, instance)),
            Keyword::MinProperties(k) => Ok(k.evaluate(ctx, instance)),
            Keyword::Required(k) => Ok(k.evaluate(ctx, instance)),
            Keyword::Properties(k) => k.evaluate(ctx, instance),
            Keyword::PropertyNames(k) => k.evaluate(ctx, instance),
            Keyword::DependentRequired(k) => Ok(k.evaluate(ctx, instance)),
            Keyword::DependentSchemas(k) => k.evaluate(ctx, instance),
            Keyword::AllOf(k) => k.evaluate(ctx, instance),
            Keyword::AnyOf(k) => k.evaluate(ctx, instance),
            Keyword::OneOf(k) => k.evaluate(ctx, instance),
            Keyword::Not(k) => k.evaluate(ctx, instance),
            Keyword::IfThenElse(k) => k.evaluate(ctx, instance),
            Keyword::UnevaluatedItems(k) => k.evaluate(ctx, instance),
            Keyword::UnevaluatedProperties(k) => k.evaluate(ctx, instance),
        }
    }
}

/// Builds the full keyword list for one schema object, in a fixed
/// compile-order (annotations and `$ref`-family first, `unevaluated*`
/// last) that also becomes this node's pre-2020-12 annotation ordering,
/// since annotations not produced by a nested applicator are reported in
/// keyword-declaration order.
pub(crate) fn compile_all(ctx: &mut CompileCtx<'_>, value: &Value) -> Result<Vec<Keyword>, CompileError> {
    let mut keywords = Vec::new();
    macro_rules! push {
        ($compiled:expr) => {
            if let Some(k) = $compiled {
                keywords.push(k);
            }
        };
    }

    push!(annotate::compile(ctx, value)?);
    push!(reference::compile_ref(ctx, value)?.map(Keyword::Ref));
    push!(reference::compile_dynamic_ref(ctx, value)?.map(Keyword::DynamicRef));
    push!(scalar::compile_type(ctx, value)?.map(Keyword::Type));
    push!(scalar::compile_enum(value).map(Keyword::Enum));
    push!(scalar::compile_const(value).map(Keyword::Const));
    push!(scalar::compile_multiple_of(ctx, value)?.map(Keyword::MultipleOf));
    push!(scalar::compile_maximum(ctx, value)?.map(Keyword::Maximum));
    push!(scalar::compile_minimum(ctx, value)?.map(Keyword::Minimum));
    push!(scalar::compile_exclusive_maximum(ctx, value)?.map(Keyword::ExclusiveMaximum));
    push!(scalar::compile_exclusive_minimum(ctx, value)?.map(Keyword::ExclusiveMinimum));
    push!(scalar::compile_max_length(ctx, value)?.map(Keyword::MaxLength));
    push!(scalar::compile_min_length(ctx, value)?.map(Keyword::MinLength));
    push!(scalar::compile_pattern(ctx, value)?.map(Keyword::Pattern));
    push!(scalar::compile_format(ctx, value).map(Keyword::Format));
    push!(scalar::compile_content_encoding(ctx, value).map(Keyword::ContentEncoding));
    push!(array::compile_max_items(ctx, value)?.map(Keyword::MaxItems));
    push!(array::compile_min_items(ctx, value)?.map(Keyword::MinItems));
    push!(array::compile_unique_items(value).map(Keyword::UniqueItems));
    push!(array::compile_prefix_items(ctx, value)?.map(Keyword::PrefixItems));
    push!(array::compile_items(ctx, value)?.map(Keyword::Items));
    push!(array::compile_contains(ctx, value)?.map(Keyword::Contains));
    push!(object::compile_max_properties(ctx, value)?.map(Keyword::MaxProperties));
    push!(object::compile_min_properties(ctx, value)?.map(Keyword::MinProperties));
    push!(object::compile_required(value).map(Keyword::Required));
    push!(object::compile_properties(ctx, value)?.map(Keyword::Properties));
    push!(object::compile_property_names(ctx, value)?.map(Keyword::PropertyNames));
    push!(object::compile_dependent_required(ctx, value)?.map(Keyword::DependentRequired));
    push!(object::compile_dependent_schemas(ctx, value)?.map(Keyword::DependentSchemas));
    push!(applicator::compile_all_of(ctx, value)?.map(Keyword::AllOf));
    push!(applicator::compile_any_of(ctx, value)?.map(Keyword::AnyOf));
    push!(applicator::compile_one_of(ctx, value)?.map(Keyword::OneOf));
    push!(applicator::compile_not(ctx, value)?.map(Keyword::Not));
    push!(applicator::compile_if_then_else(ctx, value)?.map(Keyword::IfThenElse));
    push!(unevaluated::compile_unevaluated_items(ctx, value)?.map(Keyword::UnevaluatedItems));
    push!(unevaluated::compile_unevaluated_properties(ctx, value)?.map(Keyword::UnevaluatedProperties));

    Ok(keywords)
}
