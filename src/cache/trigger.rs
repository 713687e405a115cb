//! Debounced replacement runs
//!
//! Cache insertions only schedule work. One pending run absorbs any
//! number of schedule calls, then applies the policy after the debounce
//! interval. Without an async runtime the run happens inline instead,
//! so embedded synchronous hosts stay bounded too.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::observability::{Event, Logger};

use super::policy::{CacheReplacementPolicy, EvictionContext};
use super::query_cache::QueryCache;
use super::subscribers::SubscriberCountProvider;

/// Debounced, coalesced driver of the replacement policy
pub struct ReplacementTrigger {
    cache: Arc<QueryCache>,
    policy: Arc<dyn CacheReplacementPolicy>,
    subscribers: Arc<dyn SubscriberCountProvider>,
    logger: Logger,
    debounce: Duration,
    pending: Arc<AtomicBool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ReplacementTrigger {
    /// Creates a trigger over the given cache
    pub fn new(
        cache: Arc<QueryCache>,
        policy: Arc<dyn CacheReplacementPolicy>,
        subscribers: Arc<dyn SubscriberCountProvider>,
        logger: Logger,
        debounce: Duration,
    ) -> Self {
        Self {
            cache,
            policy,
            subscribers,
            logger,
            debounce,
            pending: Arc::new(AtomicBool::new(false)),
            task: Mutex::new(None),
        }
    }

    /// Schedules a replacement run after the debounce interval.
    /// Calls made while one is pending are absorbed into it.
    pub fn schedule(&self) {
        if self.pending.swap(true, Ordering::SeqCst) {
            return;
        }
        match Handle::try_current() {
            Ok(handle) => {
                self.logger.event(Event::CacheReplacementScheduled, &[]);
                let cache = self.cache.clone();
                let policy = self.policy.clone();
                let subscribers = self.subscribers.clone();
                let logger = self.logger.clone();
                let pending = self.pending.clone();
                let debounce = self.debounce;
                let task = handle.spawn(async move {
                    tokio::time::sleep(debounce).await;
                    pending.store(false, Ordering::SeqCst);
                    run_replacement(&cache, policy.as_ref(), subscribers.as_ref(), &logger);
                });
                if let Ok(mut slot) = self.task.lock() {
                    *slot = Some(task);
                }
            }
            Err(_) => {
                self.pending.store(false, Ordering::SeqCst);
                run_replacement(
                    &self.cache,
                    self.policy.as_ref(),
                    self.subscribers.as_ref(),
                    &self.logger,
                );
            }
        }
    }

    /// Cancels any pending run
    pub fn abort(&self) {
        if let Ok(mut slot) = self.task.lock() {
            if let Some(task) = slot.take() {
                task.abort();
            }
        }
        self.pending.store(false, Ordering::SeqCst);
    }
}

impl Drop for ReplacementTrigger {
    fn drop(&mut self) {
        self.abort();
    }
}

impl std::fmt::Debug for ReplacementTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplacementTrigger")
            .field("debounce", &self.debounce)
            .field("pending", &self.pending.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// One policy application over the cache
fn run_replacement(
    cache: &QueryCache,
    policy: &dyn CacheReplacementPolicy,
    subscribers: &dyn SubscriberCountProvider,
    logger: &Logger,
) {
    let ctx = EvictionContext {
        cache,
        subscribers,
        now: Utc::now(),
    };
    let victims = policy.select_evictions(&ctx);
    let mut evicted = 0usize;
    for victim in &victims {
        // Re-checked under the cache lock; a subscriber may have
        // arrived between selection and application.
        if cache.evict_if_unreferenced(victim, subscribers) {
            evicted += 1;
            logger.event(Event::QueryEvicted, &[("query", victim.canonical())]);
        }
    }
    let evicted_count = evicted.to_string();
    let cache_size = cache.len().to_string();
    logger.event(
        Event::CacheReplacementRun,
        &[("evicted", &evicted_count), ("size", &cache_size)],
    );
}
