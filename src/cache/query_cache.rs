//! Shared map of live queries keyed by canonical string
//!
//! Two subscribers asking the same logical question must end up on the
//! same entry, so creation happens under the write lock and runs the
//! factory at most once per insertion.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::cached_query::CachedQuery;
use super::subscribers::SubscriberCountProvider;

/// Cache of live queries, one entry per distinct canonical string
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: RwLock<HashMap<String, Arc<CachedQuery>>>,
}

impl QueryCache {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached queries
    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The entry for a canonical string, if cached
    pub fn get(&self, canonical: &str) -> Option<Arc<CachedQuery>> {
        self.entries
            .read()
            .ok()
            .and_then(|entries| entries.get(canonical).cloned())
    }

    /// Returns the entry for the canonical string, creating it with the
    /// factory when absent. Racing callers get the same entry.
    pub fn get_or_create(
        &self,
        canonical: &str,
        factory: impl FnOnce() -> Arc<CachedQuery>,
    ) -> Arc<CachedQuery> {
        if let Some(hit) = self.get(canonical) {
            return hit;
        }
        match self.entries.write() {
            Ok(mut entries) => entries
                .entry(canonical.to_string())
                .or_insert_with(factory)
                .clone(),
            // On a poisoned lock the caller gets a private entry.
            Err(_) => factory(),
        }
    }

    /// Removes an entry unconditionally, regardless of subscribers.
    /// Callers are responsible for only evicting when safe.
    pub fn evict(&self, query: &CachedQuery) -> bool {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(query.canonical()).is_some()
        } else {
            false
        }
    }

    /// Removes an entry only when it is still the cached one and the
    /// provider reports no subscribers at the time the write lock is
    /// held. The same provider must be used for selection and removal,
    /// or the two can disagree.
    pub fn evict_if_unreferenced(
        &self,
        query: &CachedQuery,
        subscribers: &dyn SubscriberCountProvider,
    ) -> bool {
        if let Ok(mut entries) = self.entries.write() {
            let is_current = entries
                .get(query.canonical())
                .map(|stored| stored.id() == query.id())
                .unwrap_or(false);
            if is_current && subscribers.subscriber_count(query) == 0 {
                return entries.remove(query.canonical()).is_some();
            }
        }
        false
    }

    /// Snapshot of all entries, unordered
    pub fn snapshot(&self) -> Vec<Arc<CachedQuery>> {
        self.entries
            .read()
            .map(|entries| entries.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Drops every entry
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }
}
