//! Query result cache for LumaDB
//!
//! Per QUERY-CACHE.md, one live entry exists per distinct canonical
//! query string. Entries carry the materialized results every
//! subscriber shares, so the same logical question is planned,
//! executed and maintained once.
//!
//! # Design Principles
//!
//! 1. Identity by canonical string, never by object
//! 2. Subscribed entries are never evicted
//! 3. Replacement is debounced and coalesced, not per-insert
//! 4. The policy selects, the trigger applies
//!
//! The replacement policy is swappable through
//! [`CacheReplacementPolicy`]; [`DefaultCacheReplacementPolicy`] keeps
//! a bounded number of unsubscribed entries and drops never-executed
//! ones once their lifetime is up.

mod cached_query;
mod config;
mod policy;
mod query_cache;
mod subscribers;
mod trigger;

pub use cached_query::{CachedQuery, SubscriptionGuard};
pub use config::{QueryCacheConfig, DEFAULT_REPLACEMENT_DEBOUNCE_MS};
pub use policy::{
    CacheReplacementPolicy, DefaultCacheReplacementPolicy, EvictionContext,
    DEFAULT_TRY_TO_KEEP_MAX, DEFAULT_UNEXECUTED_LIFETIME_MS,
};
pub use query_cache::QueryCache;
pub use subscribers::{AtomicSubscriberCount, SubscriberCountProvider};
pub use trigger::ReplacementTrigger;
