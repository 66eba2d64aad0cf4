#![deny(missing_docs)]

//! # Reference Cache
//!
//! Memoizes the expansions of one [`Reference`] per depth.
//!
//! Depth `-1` is the synthetic pre-expansion entry and always equals the
//! cached base reference. Any other depth `d` is derived from the closest
//! populated depth below it, by evaluating only the missing levels: an entry
//! at depth `k >= 0` already holds `k` expanded levels, so reaching `d` takes
//! `d - k` more, while the base entry needs all `d`. Because
//! expansion at depth `d` only asks its dependencies for depth `d - 1`,
//! recursion through circular references is bounded by the requested depth.

use crate::refs::container::ReferenceContainer;
use crate::refs::reference::Reference;
use std::collections::BTreeMap;

/// Key of the synthetic pre-expansion entry.
pub const BASE_DEPTH: isize = -1;

/// A reference plus its memoized expansions.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceCache {
    cached: Reference,
    resolved: BTreeMap<isize, Reference>,
    final_depth: Option<usize>,
}

impl ReferenceCache {
    /// Wraps `reference` with an empty memoization table.
    pub fn new(reference: Reference) -> Self {
        Self {
            cached: reference,
            resolved: BTreeMap::new(),
            final_depth: None,
        }
    }

    /// Caps the meaningful expansion depth. Deeper requests saturate at `depth`.
    pub fn with_final(mut self, depth: usize) -> Self {
        self.final_depth = Some(depth);
        self
    }

    /// Seeds the memoization table with a precomputed entry.
    pub fn with_entry(mut self, depth: isize, reference: Reference) -> Self {
        self.resolved.insert(depth, reference);
        self
    }

    /// The base (un-expanded) reference.
    pub fn cached(&self) -> &Reference {
        &self.cached
    }

    /// The saturation depth, if any.
    pub fn final_depth(&self) -> Option<usize> {
        self.final_depth
    }

    /// Returns the memoized entry stored for `depth`, without computing it.
    pub fn entry(&self, depth: isize) -> Option<&Reference> {
        self.resolved.get(&depth)
    }

    /// Depths currently memoized, ascending.
    pub fn depths(&self) -> Vec<isize> {
        self.resolved.keys().copied().collect()
    }

    /// True if the base reference's own content has been loaded.
    pub fn is_base_resolved(&self) -> bool {
        self.cached.resolved
    }

    /// Returns a cache whose table holds an entry for `depth`.
    ///
    /// The cache is returned unchanged if the base is not loaded, if `depth`
    /// lies beyond the final depth, or if the entry already exists.
    pub fn resolve(&self, container: &ReferenceContainer, depth: usize) -> ReferenceCache {
        let mut next = self.clone();
        next.fill(container, depth);
        next
    }

    pub(crate) fn fill(&mut self, container: &ReferenceContainer, depth: usize) {
        if !self.is_base_resolved() {
            return;
        }
        if matches!(self.final_depth, Some(limit) if depth > limit) {
            return;
        }
        let key = depth_key(depth);
        if self.resolved.contains_key(&key) {
            return;
        }

        self.resolved
            .entry(BASE_DEPTH)
            .or_insert_with(|| self.cached.clone());

        let (closest, base) = match self.resolved.range(..key).next_back() {
            Some((closest, base)) => (*closest, base),
            None => (BASE_DEPTH, &self.cached),
        };
        let levels = usize::try_from(key - closest.max(0)).unwrap_or_default();
        let expanded = base.evaluate(container, levels);

        self.resolved.insert(key, expanded);
    }

    /// Reads the expansion for `depth`.
    ///
    /// An unloaded base is returned as-is. Depths beyond a nonzero final depth
    /// read the final entry. Depths never computed read as `None`.
    pub fn get_reference(&self, depth: usize) -> Option<&Reference> {
        if !self.is_base_resolved() {
            return Some(&self.cached);
        }
        match self.saturation(depth) {
            Some(limit) => self.resolved.get(&depth_key(limit)),
            None => self.resolved.get(&depth_key(depth)),
        }
    }

    /// The depth a lookup for `depth` is redirected to, if `final` is set,
    /// nonzero and below `depth`.
    pub fn saturation(&self, depth: usize) -> Option<usize> {
        self.final_depth.filter(|limit| *limit != 0 && depth > *limit)
    }
}

fn depth_key(depth: usize) -> isize {
    isize::try_from(depth).unwrap_or(isize::MAX)
}
