//! Event reduce subsystem for LumaDB
//!
//! Per QUERY-CACHE.md §4, cached result windows are maintained
//! incrementally: change events from committed writes are classified
//! per query and applied in place, and only ambiguous cases pay for a
//! re-execution against storage.
//!
//! # Design Principles
//!
//! 1. Correctness over cleverness: any doubt means full re-query
//! 2. Classification is pure and deterministic
//! 3. Window mutations happen under the entry's result lock
//! 4. Classifier and action runner are pluggable
//!
//! The classification table itself ([`ChangeClassifier`]) and the
//! action vocabulary ([`ActionRunner`]) are injected, so hosts can
//! swap in a generated state-table implementation without touching the
//! coordinator.

mod coordinator;
mod params;
mod result_set;
mod traits;

pub use coordinator::{EventReduceCoordinator, EventReduceOutcome};
pub use params::{DefaultQueryRuntime, QueryParams, QueryRuntime};
pub use result_set::ResultSet;
pub use traits::{Action, ActionRunner, ChangeClassifier};
