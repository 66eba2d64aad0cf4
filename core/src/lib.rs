#![deny(missing_docs)]

//! # apiref Core
//!
//! Reference resolution engine for API description documents.
//!
//! Discovers `$ref` pointers, loads the documents they point into, and
//! expands (possibly circular) references to a caller-chosen depth.

/// Shared error types.
pub mod error;

/// Reference values, caches and containers.
pub mod refs;

/// Resolution options.
pub mod options;

/// Context orchestration and fetching.
pub mod resolver;

/// Reference discovery inside a document.
pub mod discovery;

/// Rendering of expanded containers.
pub mod serialize;

pub use discovery::{discover_references, VARIABLES_DOMAIN};
pub use error::{AppError, AppResult};
pub use options::{
    BaseMode, CustomResolution, ParameterItem, ResolutionItem, ResolutionOptions, ResolverOptions,
};
pub use refs::{
    variable_uri, Reference, ReferenceCache, ReferenceContainer, ReferenceKind, SchemaValue,
};
pub use resolver::{
    Context, ContextResolver, DefaultFetcher, Fetcher, Item, ParameterResolver, VariableResolver,
    SCHEMAS_DOMAIN,
};
pub use serialize::{expand_context, expand_definitions};
