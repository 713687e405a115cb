//! Query Cache Replacement Tests
//!
//! Cache lifecycle through the collection handle:
//! - Equivalent queries share one cached entry
//! - Replacement runs are debounced and evict down to the keep budget
//! - Subscribed entries survive every replacement run
//! - Never-executed entries age out once the cache is at capacity
//! - Custom policies plug in; the trigger re-checks subscribers at
//!   apply time

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use lumadb::cache::{CacheReplacementPolicy, CachedQuery, EvictionContext, QueryCacheConfig};
use lumadb::collection::{Collection, CollectionOptions};
use lumadb::query::{Query, OP_EQ, OP_GTE};
use lumadb::schema::{CollectionSchema, FieldType, IndexDef};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn schema() -> CollectionSchema {
    let mut fields = HashMap::new();
    fields.insert("id".to_string(), FieldType::string(8));
    fields.insert("age".to_string(), FieldType::integer(0, 120));
    CollectionSchema::new("id", fields, vec![IndexDef::single("age")]).unwrap()
}

fn tuned(try_to_keep_max: usize, unexecuted_lifetime_ms: u64, debounce_ms: u64) -> Collection {
    let cache = QueryCacheConfig {
        try_to_keep_max,
        unexecuted_lifetime_ms,
        replacement_debounce_ms: debounce_ms,
    };
    Collection::create(CollectionOptions::new("tuned", schema()).with_cache_config(cache))
        .unwrap()
}

fn age_query(age: i64) -> Query {
    Query::new().filter_op("age", OP_GTE, json!(age))
}

/// Policy that offers every entry, subscribed or not.
struct EvictEverything;

impl CacheReplacementPolicy for EvictEverything {
    fn select_evictions(&self, ctx: &EvictionContext<'_>) -> Vec<Arc<CachedQuery>> {
        ctx.cache.snapshot()
    }
}

// =============================================================================
// Entry Sharing Tests
// =============================================================================

/// A literal and its spelled-out operator form hit the same entry.
#[test]
fn test_equivalent_builder_forms_share_one_entry() {
    let collection = Collection::create(CollectionOptions::new("people", schema())).unwrap();

    let literal = collection
        .query(&Query::new().filter_eq("age", json!(30)))
        .unwrap();
    let spelled = collection
        .query(&Query::new().filter_op("age", OP_EQ, json!(30)))
        .unwrap();

    assert!(Arc::ptr_eq(&literal, &spelled));
    assert_eq!(collection.cache().len(), 1);
}

// =============================================================================
// Replacement Run Tests
// =============================================================================

/// Above the keep budget the debounced run drops the least recently
/// used entries.
#[tokio::test]
async fn test_replacement_evicts_least_recently_used() {
    let collection = tuned(2, 60_000, 30);

    for age in [10, 20, 30] {
        collection.query(&age_query(age)).unwrap();
    }
    tokio::time::sleep(Duration::from_millis(10)).await;
    let kept_a = collection.query(&age_query(40)).unwrap();
    let kept_b = collection.query(&age_query(50)).unwrap();

    tokio::time::sleep(Duration::from_millis(120)).await;

    assert_eq!(collection.cache().len(), 2);
    assert!(collection.cache().get(kept_a.canonical()).is_some());
    assert!(collection.cache().get(kept_b.canonical()).is_some());
}

/// A cache hit refreshes recency, so an old entry can outlive newer
/// but idle ones.
#[tokio::test]
async fn test_cache_hits_refresh_recency() {
    let collection = tuned(2, 60_000, 30);

    let early = collection.query(&age_query(10)).unwrap();
    collection.query(&age_query(20)).unwrap();
    collection.query(&age_query(30)).unwrap();

    tokio::time::sleep(Duration::from_millis(10)).await;
    collection.query(&age_query(10)).unwrap();
    let late = collection.query(&age_query(40)).unwrap();

    tokio::time::sleep(Duration::from_millis(120)).await;

    assert_eq!(collection.cache().len(), 2);
    assert!(collection.cache().get(early.canonical()).is_some());
    assert!(collection.cache().get(late.canonical()).is_some());
}

/// Entries that never got results age out once the cache is at
/// capacity, regardless of the keep budget.
#[tokio::test]
async fn test_stale_unexecuted_entries_age_out() {
    let collection = tuned(2, 40, 60);

    let executed = collection.query(&age_query(10)).unwrap();
    collection
        .set_query_results(&executed, vec![json!({"id": "a", "age": 12})])
        .unwrap();
    let stale = collection.query(&age_query(20)).unwrap();

    tokio::time::sleep(Duration::from_millis(140)).await;

    assert_eq!(collection.cache().len(), 1);
    assert!(collection.cache().get(executed.canonical()).is_some());
    assert!(collection.cache().get(stale.canonical()).is_none());
}

// =============================================================================
// Subscription Tests
// =============================================================================

/// Subscribed entries survive even a zero keep budget.
#[tokio::test]
async fn test_subscribed_entries_survive_replacement() {
    let collection = tuned(0, 60_000, 30);

    let watched = collection.query(&age_query(10)).unwrap();
    let _guard = watched.subscribe();
    collection.query(&age_query(20)).unwrap();
    collection.query(&age_query(30)).unwrap();

    tokio::time::sleep(Duration::from_millis(120)).await;

    assert_eq!(collection.cache().len(), 1);
    assert!(collection.cache().get(watched.canonical()).is_some());
    assert_eq!(watched.subscriber_count(), 1);
}

/// Dropping the last guard makes the entry evictable on the next run.
#[tokio::test]
async fn test_unsubscribed_entries_become_evictable() {
    let collection = tuned(0, 60_000, 30);

    let watched = collection.query(&age_query(10)).unwrap();
    let guard = watched.subscribe();
    drop(guard);

    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(collection.cache().len(), 0);
}

/// Unsubscribing alone evicts nothing; only a replacement run does.
#[test]
fn test_unsubscribing_defers_to_the_next_run() {
    let collection = tuned(100, 60_000, 10);

    let watched = collection.query(&age_query(10)).unwrap();
    let guard = watched.subscribe();
    assert_eq!(watched.subscriber_count(), 1);
    drop(guard);

    assert_eq!(watched.subscriber_count(), 0);
    assert!(collection.cache().get(watched.canonical()).is_some());
}

// =============================================================================
// Custom Policy Tests
// =============================================================================

/// Victims that gained a subscriber are refused at apply time, no
/// matter what the policy selected.
#[tokio::test]
async fn test_trigger_rechecks_subscribers_at_apply_time() {
    let cache = QueryCacheConfig {
        try_to_keep_max: 100,
        unexecuted_lifetime_ms: 60_000,
        replacement_debounce_ms: 30,
    };
    let collection = Collection::create(
        CollectionOptions::new("strict", schema())
            .with_cache_config(cache)
            .with_replacement_policy(Arc::new(EvictEverything)),
    )
    .unwrap();

    let watched = collection.query(&age_query(10)).unwrap();
    let _guard = watched.subscribe();
    collection.query(&age_query(20)).unwrap();
    collection.query(&age_query(30)).unwrap();

    tokio::time::sleep(Duration::from_millis(120)).await;

    assert_eq!(collection.cache().len(), 1);
    assert!(collection.cache().get(watched.canonical()).is_some());
}

// =============================================================================
// Teardown Tests
// =============================================================================

/// Destroy clears the cache, cancels the pending run and blocks use.
#[tokio::test]
async fn test_destroy_clears_cache_and_cancels_pending_run() {
    let collection = tuned(0, 60_000, 5_000);

    collection.query(&age_query(10)).unwrap();
    collection.query(&age_query(20)).unwrap();
    assert_eq!(collection.cache().len(), 2);

    collection.destroy();
    assert!(collection.is_destroyed());
    assert_eq!(collection.cache().len(), 0);

    let err = collection.query(&age_query(30)).unwrap_err();
    assert_eq!(err.code(), "LUMA_COLLECTION_DESTROYED");
}
