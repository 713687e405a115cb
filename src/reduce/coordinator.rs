//! Incremental maintenance of cached result windows
//!
//! A write commits, change events arrive, and every cached query must
//! answer: can the window absorb this batch in place, or does the query
//! have to run against storage again? The coordinator asks the
//! classifier per event and hands verdicts to the action runner. Any
//! uncertainty degrades to a full re-query, never to a wrong window.

use std::sync::Arc;

use serde_json::Value;

use crate::cache::CachedQuery;
use crate::events::ChangeEvent;
use crate::observability::{Event, Logger};

use super::traits::{Action, ActionRunner, ChangeClassifier};

/// Outcome of feeding one change event batch through the coordinator
#[derive(Debug, Clone)]
pub enum EventReduceOutcome {
    /// The batch could not be applied incrementally; the caller must
    /// re-execute the query against storage
    RunFullQueryAgain,
    /// The batch was applied to the cached window in place
    Applied {
        /// Whether any event mutated the window
        changed: bool,
        /// The window after application
        new_results: Vec<Arc<Value>>,
    },
}

impl EventReduceOutcome {
    /// Whether the caller has to re-execute against storage
    pub fn needs_requery(&self) -> bool {
        matches!(self, EventReduceOutcome::RunFullQueryAgain)
    }
}

/// Drives change events into cached result windows
pub struct EventReduceCoordinator {
    enabled: bool,
    classifier: Option<Arc<dyn ChangeClassifier>>,
    action_runner: Option<Arc<dyn ActionRunner>>,
    logger: Logger,
}

impl EventReduceCoordinator {
    /// Creates a coordinator. With `enabled` false, or with either
    /// collaborator absent, every batch degrades to a full re-query.
    pub fn new(
        enabled: bool,
        classifier: Option<Arc<dyn ChangeClassifier>>,
        action_runner: Option<Arc<dyn ActionRunner>>,
        logger: Logger,
    ) -> Self {
        Self {
            enabled,
            classifier,
            action_runner,
            logger,
        }
    }

    /// Whether incremental maintenance is switched on
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Applies a batch of change events to the cached window.
    ///
    /// Events are classified in order. The first `RunFullQueryAgain`
    /// verdict aborts the batch; mutations applied before it stay in
    /// the window and are superseded by the re-query the caller runs.
    pub fn update(&self, cached: &CachedQuery, events: &[ChangeEvent]) -> EventReduceOutcome {
        if !self.enabled {
            return EventReduceOutcome::RunFullQueryAgain;
        }
        let (Some(classifier), Some(runner)) =
            (self.classifier.as_ref(), self.action_runner.as_ref())
        else {
            self.logger.event(Event::ClassifierUnavailable, &[]);
            return EventReduceOutcome::RunFullQueryAgain;
        };
        let Some(params) = cached.params() else {
            // The selector holds an operator the matcher cannot
            // express, so verdicts would be guesses.
            self.logger
                .event(Event::EventReduceFallback, &[("reason", "unsupported-matcher")]);
            return EventReduceOutcome::RunFullQueryAgain;
        };
        let Some(mut guard) = cached.lock_results() else {
            return EventReduceOutcome::RunFullQueryAgain;
        };
        let Some(results) = guard.as_mut() else {
            // Nothing materialized yet; the first window must come
            // from storage.
            return EventReduceOutcome::RunFullQueryAgain;
        };

        let mut changed = false;
        for event in events {
            match classifier.classify(&params, event, results) {
                Action::RunFullQueryAgain => {
                    self.logger.event(
                        Event::EventReduceFallback,
                        &[("document", &event.document_id)],
                    );
                    return EventReduceOutcome::RunFullQueryAgain;
                }
                Action::DoNothing => {}
                Action::Apply(action) => {
                    runner.apply(&action, &params, event, results);
                    changed = true;
                }
            }
        }

        if changed {
            let applied = events.len().to_string();
            self.logger
                .event(Event::EventReduceApplied, &[("events", &applied)]);
        }
        EventReduceOutcome::Applied {
            changed,
            new_results: results.to_vec(),
        }
    }
}

impl std::fmt::Debug for EventReduceCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventReduceCoordinator")
            .field("enabled", &self.enabled)
            .field("has_classifier", &self.classifier.is_some())
            .field("has_action_runner", &self.action_runner.is_some())
            .finish_non_exhaustive()
    }
}
