//! Collaborator seams of the event reduce path
//!
//! The decision table that maps one change event onto one result window
//! is deliberately replaceable and lives outside this crate. The
//! coordinator depends only on these contracts, injected per collection.

use crate::events::ChangeEvent;

use super::params::QueryParams;
use super::result_set::ResultSet;

/// Verdict of the classifier for one event against one query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Correctness cannot be proven cheaply, re-run the full query
    RunFullQueryAgain,
    /// The event cannot affect the result window
    DoNothing,
    /// A named in-place mutation for the action runner
    Apply(String),
}

/// Decides how a single change event affects a single result window.
///
/// Implementations must be deterministic and side effect free. The
/// coordinator may call them many times per batch, and the same inputs
/// must always yield the same verdict.
pub trait ChangeClassifier: Send + Sync {
    fn classify(&self, params: &QueryParams, event: &ChangeEvent, results: &ResultSet) -> Action;
}

/// Applies a named in-place mutation to a result window.
///
/// An unknown action name must leave the window untouched; the
/// classifier and runner are expected to agree on the name set.
pub trait ActionRunner: Send + Sync {
    fn apply(&self, action: &str, params: &QueryParams, event: &ChangeEvent, results: &mut ResultSet);
}
