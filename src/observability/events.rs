//! Observability events for LumaDB
//!
//! Per OBSERVABILITY.md, this module defines all observable events
//! that can occur while the query core runs.
//!
//! Events are explicit and typed.

use std::fmt;

use super::Severity;

/// Observable events in LumaDB
///
/// Per OBSERVABILITY.md §2, these events cover:
/// - Collection lifecycle
/// - Query cache activity
/// - Cache replacement
/// - Incremental result maintenance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Collection lifecycle
    /// Collection handle created
    CollectionCreate,
    /// Collection handle destroyed
    CollectionDestroy,

    // Query cache
    /// A new query object was created and cached
    QueryNew,
    /// An equivalent query was already cached and got reused
    QueryCacheHit,
    /// A cached query was removed from the cache
    QueryEvicted,

    // Cache replacement
    /// A replacement run was scheduled (debounced)
    CacheReplacementScheduled,
    /// The replacement policy ran
    CacheReplacementRun,

    // Incremental result maintenance
    /// Change events were applied to a cached result set in place
    EventReduceApplied,
    /// Incremental maintenance gave up; caller must re-run the query
    EventReduceFallback,
    /// No classifier or action runner is wired; degraded to full re-query
    ClassifierUnavailable,
    /// A query uses an operator the built-in matcher cannot evaluate
    MatcherUnsupported,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            // Collection lifecycle
            Event::CollectionCreate => "COLLECTION_CREATE",
            Event::CollectionDestroy => "COLLECTION_DESTROY",

            // Query cache
            Event::QueryNew => "QUERY_NEW",
            Event::QueryCacheHit => "QUERY_CACHE_HIT",
            Event::QueryEvicted => "QUERY_EVICTED",

            // Cache replacement
            Event::CacheReplacementScheduled => "CACHE_REPLACEMENT_SCHEDULED",
            Event::CacheReplacementRun => "CACHE_REPLACEMENT_RUN",

            // Incremental result maintenance
            Event::EventReduceApplied => "EVENT_REDUCE_APPLIED",
            Event::EventReduceFallback => "EVENT_REDUCE_FALLBACK",
            Event::ClassifierUnavailable => "CLASSIFIER_UNAVAILABLE",
            Event::MatcherUnsupported => "MATCHER_UNSUPPORTED",
        }
    }

    /// Default severity an event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::ClassifierUnavailable | Event::MatcherUnsupported => Severity::Warn,
            Event::QueryCacheHit | Event::CacheReplacementScheduled => Severity::Trace,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::CollectionCreate,
            Event::CollectionDestroy,
            Event::QueryNew,
            Event::QueryCacheHit,
            Event::QueryEvicted,
            Event::CacheReplacementScheduled,
            Event::CacheReplacementRun,
            Event::EventReduceApplied,
            Event::EventReduceFallback,
            Event::ClassifierUnavailable,
            Event::MatcherUnsupported,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            // Verify all uppercase format
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_degraded_events_warn() {
        assert_eq!(Event::ClassifierUnavailable.severity(), Severity::Warn);
        assert_eq!(Event::MatcherUnsupported.severity(), Severity::Warn);
        assert_eq!(Event::CollectionCreate.severity(), Severity::Info);
        assert_eq!(Event::QueryCacheHit.severity(), Severity::Trace);
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::CollectionCreate), "COLLECTION_CREATE");
        assert_eq!(
            format!("{}", Event::CacheReplacementRun),
            "CACHE_REPLACEMENT_RUN"
        );
    }
}
