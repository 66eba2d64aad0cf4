#![deny(missing_docs)]

//! # Reference Container
//!
//! Owns every [`ReferenceCache`] of one reference domain (e.g. `"schemas"`),
//! keyed by URI in insertion order. Dependencies between references are URI
//! lookups into this map, never direct links, so circular schemas never turn
//! into circular ownership.

use crate::refs::cache::ReferenceCache;
use crate::refs::reference::Reference;
use indexmap::IndexMap;
use uuid::Uuid;

/// Keyed collection of reference caches.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReferenceContainer {
    id: Option<String>,
    name: Option<String>,
    cache: IndexMap<String, ReferenceCache>,
}

impl ReferenceContainer {
    /// Creates an empty, anonymous container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty container for the named domain, with a fresh UUIDv4 id.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: Some(Uuid::new_v4().to_string()),
            name: Some(name.into()),
            cache: IndexMap::new(),
        }
    }

    /// Unique identifier, if one was assigned.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Domain name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Adds a cache for every reference whose URI is not already present.
    ///
    /// Existing entries are never overwritten, so a loaded definition is not
    /// clobbered by a bare placeholder discovered later.
    pub fn create<I>(mut self, references: I) -> Self
    where
        I: IntoIterator<Item = Reference>,
    {
        for reference in references {
            if !self.cache.contains_key(&reference.uri) {
                self.cache
                    .insert(reference.uri.clone(), ReferenceCache::new(reference));
            }
        }
        self
    }

    /// Replaces (or inserts) the cache at `reference.uri` with a fresh one.
    pub fn update(mut self, reference: Reference) -> Self {
        self.cache
            .insert(reference.uri.clone(), ReferenceCache::new(reference));
        self
    }

    /// Replaces (or inserts) the cache stored at `uri`.
    ///
    /// Used to install caches carrying a precomputed final depth.
    pub fn with_cache(mut self, uri: impl Into<String>, cache: ReferenceCache) -> Self {
        self.cache.insert(uri.into(), cache);
        self
    }

    /// Resolves `uri` to `depth`.
    ///
    /// Returns `None` for unknown URIs; the caller decides whether that
    /// matters. The container itself is left untouched.
    pub fn resolve(&self, uri: &str, depth: usize) -> Option<Reference> {
        let cache = self.cache.get(uri)?;
        fill_saturating(cache, self, depth).get_reference(depth).cloned()
    }

    /// Resolves `uri` to `depth` and keeps the computed expansion memoized.
    ///
    /// Only the entry for `uri` is updated.
    pub fn expand(&mut self, uri: &str, depth: usize) -> Option<Reference> {
        let cache = self.cache.get(uri)?;
        let updated = fill_saturating(cache, self, depth);
        let reference = updated.get_reference(depth).cloned();
        self.cache.insert(uri.to_string(), updated);
        reference
    }

    /// URIs whose base reference has not been loaded yet, in insertion order.
    pub fn unresolved_references(&self) -> Vec<String> {
        self.cache
            .iter()
            .filter(|(_, cache)| !cache.is_base_resolved())
            .map(|(uri, _)| uri.clone())
            .collect()
    }

    /// Returns the cache stored at `uri`.
    pub fn get(&self, uri: &str) -> Option<&ReferenceCache> {
        self.cache.get(uri)
    }

    /// True if a cache exists for `uri`.
    pub fn contains(&self, uri: &str) -> bool {
        self.cache.contains_key(uri)
    }

    /// Iterates over `(uri, cache)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ReferenceCache)> {
        self.cache.iter()
    }

    /// URIs in insertion order.
    pub fn uris(&self) -> Vec<String> {
        self.cache.keys().cloned().collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// True if the container holds no entries.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

/// Fills `depth`, or the final depth a saturated lookup for `depth` reads.
fn fill_saturating(cache: &ReferenceCache, container: &ReferenceContainer, depth: usize) -> ReferenceCache {
    let filled = cache.resolve(container, depth);
    match filled.saturation(depth) {
        Some(limit) => filled.resolve(container, limit),
        None => filled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn loaded(uri: &str, value: serde_json::Value) -> Reference {
        Reference::json_schema(uri).resolve_value(value)
    }

    #[test]
    fn test_create_first_write_wins() {
        let first = loaded("#/A", json!({ "v": 1 }));
        let duplicate = loaded("#/A", json!({ "v": 2 }));
        let later = loaded("#/A", json!({ "v": 3 }));

        let container = ReferenceContainer::new()
            .create(vec![first.clone(), duplicate])
            .create(vec![later.clone()]);
        assert_eq!(container.len(), 1);
        assert_eq!(container.get("#/A").map(|c| c.cached()), Some(&first));

        let container = container.update(later.clone());
        assert_eq!(container.get("#/A").map(|c| c.cached()), Some(&later));
    }

    #[test]
    fn test_update_resets_memoized_entries() {
        let mut container = ReferenceContainer::new().update(loaded("#/A", json!({ "v": 1 })));
        container.expand("#/A", 1);
        assert_eq!(container.get("#/A").map(|c| c.depths()), Some(vec![-1, 1]));

        let container = container.update(loaded("#/A", json!({ "v": 2 })));
        assert_eq!(container.get("#/A").map(|c| c.depths()), Some(vec![]));
    }

    #[test]
    fn test_resolve_unknown_reference() {
        let container = ReferenceContainer::new();
        assert_eq!(container.resolve("#/definitions/Missing", 0), None);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let container = ReferenceContainer::new()
            .update(loaded("#/A", json!({ "$ref": "#/B" })))
            .update(loaded("#/B", json!({ "leaf": true })));

        let first = container.resolve("#/A", 3);
        let second = container.resolve("#/A", 3);
        assert_eq!(first, second);
        assert_eq!(
            first.and_then(|r| r.to_json_schema(3)),
            Some(json!({ "$ref": { "leaf": true } }))
        );
        assert!(container.get("#/A").map(|c| c.depths().is_empty()).unwrap_or(false));
    }

    #[test]
    fn test_expand_memoizes_only_target_entry() {
        let mut container = ReferenceContainer::new()
            .update(loaded("#/A", json!({ "x": 1 })))
            .update(loaded("#/B", json!({ "y": 2 })));

        let reference = container.expand("#/A", 2);
        assert!(reference.is_some());
        assert_eq!(container.get("#/A").map(|c| c.depths()), Some(vec![-1, 2]));
        assert_eq!(container.get("#/B").map(|c| c.depths()), Some(vec![]));
    }

    #[test]
    fn test_resolve_saturates_at_final_depth() {
        let reference = loaded("#/A", json!({ "x": 1 }));
        let container = ReferenceContainer::new()
            .with_cache("#/A", ReferenceCache::new(reference.clone()).with_final(1));

        assert_eq!(container.resolve("#/A", 9), Some(reference));
    }

    #[test]
    fn test_zero_final_is_not_a_saturation_cap() {
        let reference = loaded("#/A", json!({ "x": 1 }));
        let container = ReferenceContainer::new()
            .with_cache("#/A", ReferenceCache::new(reference.clone()).with_final(0));

        assert_eq!(container.resolve("#/A", 0), Some(reference));
        assert_eq!(container.resolve("#/A", 3), None);
    }

    #[test]
    fn test_expand_after_memoized_depth_keeps_full_nesting() {
        let mut container = ReferenceContainer::new()
            .update(loaded("#/A", json!({ "$ref": "#/B" })))
            .update(loaded("#/B", json!({ "$ref": "#/A" })));
        let fresh = container.resolve("#/A", 3);

        container.expand("#/A", 2);
        let stepped = container.expand("#/A", 3);
        assert_eq!(stepped, fresh);
        assert_eq!(container.resolve("#/A", 3), fresh);
        assert_eq!(
            stepped.and_then(|r| r.to_json_schema(3)),
            Some(json!({ "$ref": { "$ref": { "$ref": { "$ref": "#/A" } } } }))
        );
    }

    #[test]
    fn test_unresolved_references_in_insertion_order() {
        let container = ReferenceContainer::new().create(vec![
            Reference::json_schema("#/C"),
            loaded("#/B", json!({})),
            Reference::json_schema("#/A"),
        ]);
        assert_eq!(container.unresolved_references(), vec!["#/C", "#/A"]);
    }

    #[test]
    fn test_named_container_has_uuid() {
        let container = ReferenceContainer::named("schemas");
        assert_eq!(container.name(), Some("schemas"));
        let id = container.id().unwrap_or_default();
        assert_eq!(id.len(), 36);
        assert_eq!(id.chars().nth(14), Some('4'));
    }
}
