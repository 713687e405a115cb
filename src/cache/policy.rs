//! Cache replacement policy
//!
//! The policy only selects victims; the trigger applies them. That
//! keeps the policy a pure function of the cache state, swappable and
//! unit-testable on its own.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use super::cached_query::CachedQuery;
use super::query_cache::QueryCache;
use super::subscribers::SubscriberCountProvider;

/// Unsubscribed entries the default policy retains at most
pub const DEFAULT_TRY_TO_KEEP_MAX: usize = 100;

/// Age in milliseconds after which a never-executed entry is evicted
pub const DEFAULT_UNEXECUTED_LIFETIME_MS: u64 = 30_000;

/// Cache state handed to the policy
pub struct EvictionContext<'a> {
    /// The cache under pressure
    pub cache: &'a QueryCache,
    /// Where subscriber counts come from
    pub subscribers: &'a dyn SubscriberCountProvider,
    /// The moment the policy runs
    pub now: DateTime<Utc>,
}

/// Picks cache entries to evict. Must not mutate the cache itself.
pub trait CacheReplacementPolicy: Send + Sync {
    fn select_evictions(&self, ctx: &EvictionContext<'_>) -> Vec<Arc<CachedQuery>>;
}

/// Default replacement policy.
///
/// Nothing is selected while the cache holds fewer than
/// `try_to_keep_max` entries. Above that, entries that never executed
/// and outlived `unexecuted_lifetime` go first, then the least recently
/// used entries until `try_to_keep_max` remain. Subscribed entries are
/// never selected.
#[derive(Debug, Clone)]
pub struct DefaultCacheReplacementPolicy {
    /// Unsubscribed entries to retain at most
    pub try_to_keep_max: usize,
    /// Age after which a never-executed entry is wasted
    pub unexecuted_lifetime: Duration,
}

impl DefaultCacheReplacementPolicy {
    /// Creates a policy with explicit bounds
    pub fn new(try_to_keep_max: usize, unexecuted_lifetime: Duration) -> Self {
        Self {
            try_to_keep_max,
            unexecuted_lifetime,
        }
    }
}

impl Default for DefaultCacheReplacementPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_TRY_TO_KEEP_MAX,
            Duration::milliseconds(DEFAULT_UNEXECUTED_LIFETIME_MS as i64),
        )
    }
}

impl CacheReplacementPolicy for DefaultCacheReplacementPolicy {
    fn select_evictions(&self, ctx: &EvictionContext<'_>) -> Vec<Arc<CachedQuery>> {
        let mut evictions = Vec::new();
        if ctx.cache.len() < self.try_to_keep_max {
            return evictions;
        }

        let unexecuted_deadline = ctx.now - self.unexecuted_lifetime;
        let mut candidates = Vec::new();
        for query in ctx.cache.snapshot() {
            if ctx.subscribers.subscriber_count(&query) > 0 {
                continue;
            }
            if query.exec_count() == 0 && query.created_at() < unexecuted_deadline {
                evictions.push(query);
                continue;
            }
            candidates.push(query);
        }

        let excess = candidates.len().saturating_sub(self.try_to_keep_max);
        if excess == 0 {
            return evictions;
        }
        candidates.sort_by_key(|query| query.last_used_at());
        evictions.extend(candidates.into_iter().take(excess));
        evictions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::subscribers::AtomicSubscriberCount;
    use crate::query::NormalizedQuery;

    fn filled_cache(canonicals: &[&str]) -> QueryCache {
        let cache = QueryCache::new();
        for canonical in canonicals {
            cache.get_or_create(canonical, || {
                Arc::new(CachedQuery::new(NormalizedQuery::default(), *canonical, None))
            });
        }
        cache
    }

    fn ctx<'a>(cache: &'a QueryCache, now: DateTime<Utc>) -> EvictionContext<'a> {
        EvictionContext {
            cache,
            subscribers: &AtomicSubscriberCount,
            now,
        }
    }

    #[test]
    fn test_below_capacity_selects_nothing() {
        let cache = filled_cache(&["q1", "q2"]);
        let policy = DefaultCacheReplacementPolicy::new(3, Duration::milliseconds(0));

        // Even with now far in the future, a small cache stays intact.
        let future = Utc::now() + Duration::days(1);
        assert!(policy.select_evictions(&ctx(&cache, future)).is_empty());
    }

    #[test]
    fn test_subscribed_entries_are_never_selected() {
        let cache = filled_cache(&["q1", "q2", "q3"]);
        let guards: Vec<_> = cache
            .snapshot()
            .into_iter()
            .map(|cached| cached.subscribe())
            .collect();

        let policy = DefaultCacheReplacementPolicy::new(1, Duration::milliseconds(0));
        let future = Utc::now() + Duration::days(1);
        assert!(policy.select_evictions(&ctx(&cache, future)).is_empty());
        drop(guards);
    }

    #[test]
    fn test_stale_unexecuted_entries_go_first() {
        let cache = filled_cache(&["q1", "q2", "q3"]);
        for cached in cache.snapshot() {
            if cached.canonical() != "q1" {
                cached.mark_executed();
            }
        }

        // All three fit, but q1 never executed and its lifetime is up.
        let policy = DefaultCacheReplacementPolicy::new(3, Duration::milliseconds(30_000));
        let now = Utc::now() + Duration::milliseconds(31_000);
        let victims = policy.select_evictions(&ctx(&cache, now));

        assert_eq!(victims.len(), 1);
        assert_eq!(victims[0].canonical(), "q1");
    }

    #[test]
    fn test_least_recently_used_evicted_down_to_capacity() {
        let cache = filled_cache(&["q1", "q2", "q3", "q4"]);
        for (position, canonical) in ["q3", "q1", "q4", "q2"].iter().enumerate() {
            let cached = cache.get(canonical).unwrap();
            cached.mark_executed();
            cached.set_last_used_at(position as i64 + 1);
        }

        let policy = DefaultCacheReplacementPolicy::new(2, Duration::milliseconds(30_000));
        let victims = policy.select_evictions(&ctx(&cache, Utc::now()));

        let mut names: Vec<_> = victims.iter().map(|victim| victim.canonical()).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["q1", "q3"]);
    }

    #[test]
    fn test_selection_does_not_mutate_the_cache() {
        let cache = filled_cache(&["q1", "q2", "q3"]);
        let policy = DefaultCacheReplacementPolicy::new(1, Duration::milliseconds(0));
        let future = Utc::now() + Duration::days(1);

        let victims = policy.select_evictions(&ctx(&cache, future));
        assert!(!victims.is_empty());
        assert_eq!(cache.len(), 3);
    }
}
