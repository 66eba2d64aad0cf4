#![deny(missing_docs)]

//! # Context
//!
//! Reference containers of one document, grouped by domain.

use crate::refs::container::ReferenceContainer;
use indexmap::IndexMap;

/// Domain holding schema references.
pub const SCHEMAS_DOMAIN: &str = "schemas";

/// Per-document set of reference containers, keyed by domain name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Context {
    /// Containers in insertion order.
    pub references: IndexMap<String, ReferenceContainer>,
}

impl Context {
    /// Creates a context holding an empty `"schemas"` container.
    pub fn new() -> Self {
        Self::default().insert(SCHEMAS_DOMAIN, ReferenceContainer::named(SCHEMAS_DOMAIN))
    }

    /// Replaces (or adds) the container for `domain`.
    pub fn insert(mut self, domain: impl Into<String>, container: ReferenceContainer) -> Self {
        self.references.insert(domain.into(), container);
        self
    }

    /// Container of `domain`.
    pub fn container(&self, domain: &str) -> Option<&ReferenceContainer> {
        self.references.get(domain)
    }

    /// Mutable container of `domain`.
    pub fn container_mut(&mut self, domain: &str) -> Option<&mut ReferenceContainer> {
        self.references.get_mut(domain)
    }

    /// The `"schemas"` container.
    pub fn schemas(&self) -> Option<&ReferenceContainer> {
        self.container(SCHEMAS_DOMAIN)
    }

    /// Domain names in insertion order.
    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.references.keys().map(String::as_str)
    }
}
