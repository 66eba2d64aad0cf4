#![deny(missing_docs)]

//! # Parameter Resolution
//!
//! Hook run after reference resolution. Applies parameter-level overrides
//! (`{ key, value }` entries of the options) to the context.

use crate::error::AppResult;
use crate::options::ResolverOptions;
use crate::refs::{variable_uri, Reference, SchemaValue};
use crate::resolver::context::Context;
use serde_json::Value as JsonValue;
use tracing::debug;

/// Second-stage resolver working on a fully loaded context.
pub trait ParameterResolver: Send + Sync {
    /// Returns the context with parameter overrides applied.
    fn resolve_all(&self, context: Context, options: &ResolverOptions) -> AppResult<Context>;
}

/// Writes parameter overrides into the matching `#/x-variables/<key>` references.
///
/// Only domains that already know the variable are touched. A `null` value
/// clears the variable.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariableResolver;

impl ParameterResolver for VariableResolver {
    fn resolve_all(&self, mut context: Context, options: &ResolverOptions) -> AppResult<Context> {
        for parameter in options.resolve.parameters() {
            let uri = variable_uri(&parameter.key);
            let value = parameter.value.as_ref().and_then(literal);

            for (domain, container) in context.references.iter_mut() {
                let Some(existing) = container.get(&uri).map(|cache| cache.cached().clone()) else {
                    continue;
                };
                debug!(%domain, key = %parameter.key, "applying parameter override");
                let updated = Reference {
                    value: value.clone(),
                    resolved: true,
                    ..existing
                };
                *container = std::mem::take(container).update(updated);
            }
        }
        Ok(context)
    }
}

/// Converts a literal override into a variable value.
pub(crate) fn literal(value: &JsonValue) -> Option<SchemaValue> {
    (!value.is_null()).then(|| SchemaValue::from(value.clone()))
}
