//! Per-query parameters for the event reduce path per QUERY-CACHE.md
//!
//! Comparator and matcher construction walk the whole normalized query,
//! so the parameters are derived once per distinct query and then reused
//! for every change event batch.

use std::fmt;

use crate::query::{
    build_matcher, build_sort_comparator, NormalizedQuery, QueryMatcher, QueryResult,
    SortComparator, SortField,
};
use crate::schema::CollectionSchema;

/// Supplies the pure comparator and matcher for one query
///
/// Hosts with their own value semantics implement this; the crate
/// ships [`DefaultQueryRuntime`] backed by its own comparator and
/// matcher builders. Both returned functions must be side-effect-free,
/// since the event reduce path invokes them many times per batch.
pub trait QueryRuntime: Send + Sync {
    /// Comparator ordering two documents like the query sort
    fn sort_comparator(
        &self,
        schema: &CollectionSchema,
        query: &NormalizedQuery,
    ) -> SortComparator;

    /// Predicate deciding whether a document matches the selector.
    /// Fails for operators the runtime cannot evaluate.
    fn query_matcher(
        &self,
        schema: &CollectionSchema,
        query: &NormalizedQuery,
    ) -> QueryResult<QueryMatcher>;
}

/// Default runtime using the crate's own comparator and matcher
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultQueryRuntime;

impl QueryRuntime for DefaultQueryRuntime {
    fn sort_comparator(
        &self,
        _schema: &CollectionSchema,
        query: &NormalizedQuery,
    ) -> SortComparator {
        build_sort_comparator(&query.sort)
    }

    fn query_matcher(
        &self,
        _schema: &CollectionSchema,
        query: &NormalizedQuery,
    ) -> QueryResult<QueryMatcher> {
        build_matcher(query)
    }
}

/// Everything the event reduce path needs to know about one query
#[derive(Clone)]
pub struct QueryParams {
    /// Primary key field of the collection
    pub primary_key: String,
    /// Number of leading matches the query drops
    pub skip: u64,
    /// Result window size, unlimited when absent
    pub limit: Option<u64>,
    /// Sort specification, always ending with the primary key
    pub sort_fields: Vec<SortField>,
    /// Pure comparator ordering two documents like the query sort
    pub sort_comparator: SortComparator,
    /// Pure predicate deciding whether a document matches the selector
    pub query_matcher: QueryMatcher,
}

impl QueryParams {
    /// Builds the parameters for one normalized query.
    ///
    /// Fails when the selector holds an operator the matcher cannot
    /// express. Callers are expected to skip the incremental path for
    /// such queries instead of failing them.
    pub fn derive(schema: &CollectionSchema, query: &NormalizedQuery) -> QueryResult<Self> {
        Self::derive_with(&DefaultQueryRuntime, schema, query)
    }

    /// Builds the parameters with a host-supplied runtime
    pub fn derive_with(
        runtime: &dyn QueryRuntime,
        schema: &CollectionSchema,
        query: &NormalizedQuery,
    ) -> QueryResult<Self> {
        Ok(Self {
            primary_key: schema.primary_key.clone(),
            skip: query.skip,
            limit: query.limit,
            sort_fields: query.sort.clone(),
            sort_comparator: runtime.sort_comparator(schema, query),
            query_matcher: runtime.query_matcher(schema, query)?,
        })
    }
}

impl fmt::Debug for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryParams")
            .field("primary_key", &self.primary_key)
            .field("skip", &self.skip)
            .field("limit", &self.limit)
            .field("sort_fields", &self.sort_fields)
            .finish_non_exhaustive()
    }
}
