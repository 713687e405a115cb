//! Query subsystem for LumaDB
//!
//! Per QUERY.md, queries are declarative Mango-style documents:
//! a selector over field paths, sort, skip, limit and an optional
//! index override. This module owns the raw AST, normalization,
//! canonical strings and the built-in matcher; the planner turns
//! normalized queries into index scans.

mod ast;
mod canonical;
mod errors;
mod matching;
mod normalize;

pub use ast::{
    is_operator_map, Query, SortDirection, SortField, LOGICAL_OPERATORS,
    LOWER_BOUND_LOGICAL_OPERATORS, OP_EQ, OP_GT, OP_GTE, OP_LT, OP_LTE,
    UPPER_BOUND_LOGICAL_OPERATORS,
};
pub use canonical::canonical_string;
pub use errors::{QueryError, QueryErrorCode, QueryResult};
pub use matching::{build_matcher, build_sort_comparator, compare_values, QueryMatcher, SortComparator};
pub use normalize::{normalize, NormalizedQuery};
