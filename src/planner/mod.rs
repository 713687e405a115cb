//! Query Planner subsystem for LumaDB
//!
//! Per QUERY.md, the planner turns a normalized query into a
//! deterministic scan plan.
//!
//! # Design Principles
//!
//! - Deterministic: Same schema and query always give the same plan
//! - Rated: Every candidate index gets a quality score, best one wins
//! - Total: The primary index is the fallback, planning never comes up
//!   empty for a well-formed query
//! - Checked: A returned plan is guaranteed encodable by the index codec
//!
//! The executor walks the chosen index between the encoded start and end
//! keys. When `selector_satisfied_by_index` is false the documents must
//! still pass the query matcher, and when
//! `sort_fields_same_as_index_fields` is false the results must be
//! re-sorted.

mod errors;
mod plan;
mod planner;

pub use errors::{PlannerError, PlannerErrorCode, PlannerResult, Severity};
pub use plan::{QueryPlan, ScanBound};
pub use planner::plan;
