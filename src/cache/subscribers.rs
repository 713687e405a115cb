//! Subscriber counting seam for the replacement policy
//!
//! The policy must never evict a query someone still observes. How
//! subscriptions are tracked is a host concern, so the count is read
//! through a trait instead of a hard-wired field.

use super::cached_query::CachedQuery;

/// Source of subscriber counts for cached queries
pub trait SubscriberCountProvider: Send + Sync {
    /// Number of active subscribers of the given query
    fn subscriber_count(&self, query: &CachedQuery) -> usize;
}

/// Default provider reading the query's own subscription counter
#[derive(Debug, Clone, Copy, Default)]
pub struct AtomicSubscriberCount;

impl SubscriberCountProvider for AtomicSubscriberCount {
    fn subscriber_count(&self, query: &CachedQuery) -> usize {
        query.subscriber_count()
    }
}
