//! One live query shared by all of its subscribers per QUERY-CACHE.md
//!
//! A cached query owns the materialized result window, the usage
//! counters the replacement policy reads, and the derived event reduce
//! parameters. Identity is the canonical query string.

use std::sync::atomic::{AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::query::NormalizedQuery;
use crate::reduce::{QueryParams, ResultSet};

/// A cached live query with its materialized results
pub struct CachedQuery {
    /// Unique handle for log correlation
    id: Uuid,
    /// Canonical query string, the cache key
    canonical: String,
    /// The normalized query itself
    query: NormalizedQuery,
    /// Creation time, read by the replacement policy
    created_at: DateTime<Utc>,
    /// Last use in epoch milliseconds
    last_used_at: AtomicI64,
    /// Number of executions against storage
    exec_count: AtomicU64,
    /// Number of active subscribers
    subscriber_count: AtomicUsize,
    /// Derived event reduce parameters, absent when the selector holds
    /// an operator the matcher cannot express
    params: Option<Arc<QueryParams>>,
    /// Materialized results, absent until the first execution
    results: Mutex<Option<ResultSet>>,
}

impl CachedQuery {
    /// Creates an unexecuted cached query.
    pub fn new(
        query: NormalizedQuery,
        canonical: impl Into<String>,
        params: Option<Arc<QueryParams>>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            canonical: canonical.into(),
            query,
            created_at: now,
            last_used_at: AtomicI64::new(now.timestamp_millis()),
            exec_count: AtomicU64::new(0),
            subscriber_count: AtomicUsize::new(0),
            params,
            results: Mutex::new(None),
        }
    }

    /// Unique id of this cache entry
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The canonical string this entry is keyed by
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// The normalized query
    pub fn query(&self) -> &NormalizedQuery {
        &self.query
    }

    /// When this entry was created
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Derived event reduce parameters, if the query supports them
    pub fn params(&self) -> Option<Arc<QueryParams>> {
        self.params.clone()
    }

    /// Last use in epoch milliseconds
    pub fn last_used_at(&self) -> i64 {
        self.last_used_at.load(Ordering::Relaxed)
    }

    /// Marks the entry as used now
    pub fn touch(&self) {
        self.last_used_at
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    #[cfg(test)]
    pub(crate) fn set_last_used_at(&self, millis: i64) {
        self.last_used_at.store(millis, Ordering::Relaxed);
    }

    /// Number of executions against storage
    pub fn exec_count(&self) -> u64 {
        self.exec_count.load(Ordering::Relaxed)
    }

    /// Records one execution against storage
    pub fn mark_executed(&self) {
        self.exec_count.fetch_add(1, Ordering::Relaxed);
        self.touch();
    }

    /// Number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscriber_count.load(Ordering::Relaxed)
    }

    /// Registers a subscriber. The count drops when the guard does.
    pub fn subscribe(self: &Arc<Self>) -> SubscriptionGuard {
        self.subscriber_count.fetch_add(1, Ordering::Relaxed);
        SubscriptionGuard {
            query: self.clone(),
        }
    }

    /// Replaces the materialized results with a fresh window
    pub fn set_results(&self, results: ResultSet) {
        if let Ok(mut guard) = self.results.lock() {
            *guard = Some(results);
        }
    }

    /// Locks the materialized results for in-place mutation.
    /// Returns `None` when the lock is poisoned.
    pub fn lock_results(&self) -> Option<MutexGuard<'_, Option<ResultSet>>> {
        self.results.lock().ok()
    }

    /// Snapshot of the current result window, if one exists
    pub fn results_snapshot(&self) -> Option<Vec<Arc<Value>>> {
        self.results
            .lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(ResultSet::to_vec))
    }
}

impl std::fmt::Debug for CachedQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedQuery")
            .field("id", &self.id)
            .field("canonical", &self.canonical)
            .field("exec_count", &self.exec_count())
            .field("subscriber_count", &self.subscriber_count())
            .finish_non_exhaustive()
    }
}

/// Keeps a subscription registered while alive
pub struct SubscriptionGuard {
    query: Arc<CachedQuery>,
}

impl SubscriptionGuard {
    /// The subscribed query
    pub fn query(&self) -> &Arc<CachedQuery> {
        &self.query
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.query.subscriber_count.fetch_sub(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cached(canonical: &str) -> CachedQuery {
        CachedQuery::new(NormalizedQuery::default(), canonical, None)
    }

    #[test]
    fn test_new_entry_is_unexecuted() {
        let query = cached("q1");
        assert_eq!(query.canonical(), "q1");
        assert_eq!(query.exec_count(), 0);
        assert_eq!(query.subscriber_count(), 0);
        assert!(query.results_snapshot().is_none());
        assert!(query.params().is_none());
    }

    #[test]
    fn test_subscription_guard_counts_up_and_down() {
        let query = Arc::new(cached("q1"));
        let first = query.subscribe();
        let second = query.subscribe();
        assert_eq!(query.subscriber_count(), 2);
        drop(first);
        assert_eq!(query.subscriber_count(), 1);
        drop(second);
        assert_eq!(query.subscriber_count(), 0);
    }

    #[test]
    fn test_mark_executed_advances_usage() {
        let query = cached("q1");
        query.mark_executed();
        query.mark_executed();
        assert_eq!(query.exec_count(), 2);
        assert!(query.last_used_at() >= query.created_at().timestamp_millis());
    }

    #[test]
    fn test_set_results_and_snapshot() {
        let query = cached("q1");
        let docs = vec![json!({"id": "a"}), json!({"id": "b"})];
        query.set_results(ResultSet::from_documents("id", docs));

        let snapshot = query.results_snapshot().unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].as_ref(), &json!({"id": "a"}));
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(cached("a").id(), cached("a").id());
    }
}
