#![deny(missing_docs)]

//! # Reference Engine
//!
//! - **value**: the schema tree with reference placeholders.
//! - **pointer**: JSON Pointer and URI composition helpers.
//! - **reference**: the reference value and its variants.
//! - **cache**: per-depth memoization of one reference.
//! - **container**: the keyed set of caches for one domain.

pub mod cache;
pub mod container;
pub mod pointer;
pub mod reference;
pub mod value;

pub use cache::{ReferenceCache, BASE_DEPTH};
pub use container::ReferenceContainer;
pub use reference::{variable_uri, Reference, ReferenceKind, VARIABLES_NAMESPACE};
pub use value::{SchemaValue, REF_KEY};
