//! Query normalization per QUERY.md §2
//!
//! Normalization turns a raw [`Query`] into the single canonical shape
//! the planner, the cache and the matcher operate on:
//!
//! - literal selector values become `{"$eq": value}` operator maps
//! - an absent sort becomes `[primary asc]`; the primary key is
//!   appended as final tie-breaker when the sort lacks it
//! - an explicit index gets the primary key appended when absent,
//!   mirroring schema index normalization
//! - `limit: 0` is rejected, absent means unlimited
//!
//! Two raw queries with the same meaning normalize to the same value,
//! which is what makes canonical-string deduplication work.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::CollectionSchema;

use super::ast::{is_operator_map, Query, SortDirection, SortField, OP_EQ};
use super::errors::{QueryError, QueryResult};

/// A normalized query
///
/// Selector conditions are always operator maps here. `BTreeMap` keeps
/// fields and operators sorted, so serialization is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedQuery {
    /// Field path to operator map
    pub selector: BTreeMap<String, BTreeMap<String, Value>>,
    /// Number of leading results to drop
    pub skip: u64,
    /// Maximum number of results, unlimited when absent
    pub limit: Option<u64>,
    /// Sort specification, always ends with the primary key
    pub sort: Vec<SortField>,
    /// Explicit index override, always ends with the primary key
    pub index: Option<Vec<String>>,
}

impl NormalizedQuery {
    /// The operator map constraining a field, if any
    pub fn condition(&self, field: &str) -> Option<&BTreeMap<String, Value>> {
        self.selector.get(field)
    }

    /// Sort field paths in order
    pub fn sort_field_names(&self) -> Vec<&str> {
        self.sort.iter().map(|s| s.field.as_str()).collect()
    }

    /// Whether any sort field is descending
    pub fn has_desc_sort(&self) -> bool {
        self.sort
            .iter()
            .any(|s| s.direction == SortDirection::Desc)
    }
}

/// Normalize a raw query against a schema
pub fn normalize(query: &Query, schema: &CollectionSchema) -> QueryResult<NormalizedQuery> {
    if query.limit == Some(0) {
        return Err(QueryError::query_invalid("limit must be positive"));
    }

    let mut selector: BTreeMap<String, BTreeMap<String, Value>> = BTreeMap::new();
    for (field, condition) in &query.selector {
        let ops = if is_operator_map(condition) {
            condition
                .as_object()
                .map(|map| {
                    map.iter()
                        .map(|(op, value)| (op.clone(), value.clone()))
                        .collect()
                })
                .unwrap_or_default()
        } else {
            let mut map = BTreeMap::new();
            map.insert(OP_EQ.to_string(), condition.clone());
            map
        };
        selector.insert(field.clone(), ops);
    }

    let primary = schema.primary_key.as_str();
    let mut sort = query.sort.clone();
    if sort.is_empty() {
        sort.push(SortField::asc(primary));
    } else if !sort.iter().any(|s| s.field == primary) {
        sort.push(SortField::asc(primary));
    }

    let index = query.index.as_ref().map(|fields| {
        let mut fields = fields.clone();
        if !fields.iter().any(|f| f == primary) {
            fields.push(primary.to_string());
        }
        fields
    });

    Ok(NormalizedQuery {
        selector,
        skip: query.skip,
        limit: query.limit,
        sort,
        index,
    })
}
