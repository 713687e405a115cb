//! Query cache configuration

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::policy::{
    DefaultCacheReplacementPolicy, DEFAULT_TRY_TO_KEEP_MAX, DEFAULT_UNEXECUTED_LIFETIME_MS,
};

/// Delay between a cache insertion and the replacement run it schedules
pub const DEFAULT_REPLACEMENT_DEBOUNCE_MS: u64 = 20_000;

/// Tunables of the query cache and its replacement runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryCacheConfig {
    /// Unsubscribed entries to retain at most (default: 100)
    #[serde(default = "default_try_to_keep_max")]
    pub try_to_keep_max: usize,

    /// Milliseconds after which a never-executed entry is evicted
    /// (default: 30000)
    #[serde(default = "default_unexecuted_lifetime_ms")]
    pub unexecuted_lifetime_ms: u64,

    /// Milliseconds between an insertion and the replacement run it
    /// schedules (default: 20000)
    #[serde(default = "default_replacement_debounce_ms")]
    pub replacement_debounce_ms: u64,
}

fn default_try_to_keep_max() -> usize {
    DEFAULT_TRY_TO_KEEP_MAX
}

fn default_unexecuted_lifetime_ms() -> u64 {
    DEFAULT_UNEXECUTED_LIFETIME_MS
}

fn default_replacement_debounce_ms() -> u64 {
    DEFAULT_REPLACEMENT_DEBOUNCE_MS
}

impl Default for QueryCacheConfig {
    fn default() -> Self {
        Self {
            try_to_keep_max: default_try_to_keep_max(),
            unexecuted_lifetime_ms: default_unexecuted_lifetime_ms(),
            replacement_debounce_ms: default_replacement_debounce_ms(),
        }
    }
}

impl QueryCacheConfig {
    /// Default replacement policy parameterized by these settings
    pub fn default_policy(&self) -> DefaultCacheReplacementPolicy {
        DefaultCacheReplacementPolicy::new(
            self.try_to_keep_max,
            Duration::milliseconds(self.unexecuted_lifetime_ms as i64),
        )
    }
}
