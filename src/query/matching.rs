//! Value ordering and the built-in matcher per QUERY.md §4
//!
//! The comparator and the matcher built here are what the incremental
//! result coordinator uses to keep cached result sets ordered and
//! filtered without re-running the query. Hosts that execute queries
//! themselves should filter and sort with these same functions, so
//! incremental maintenance and full execution agree.

use std::cmp::Ordering;
use std::sync::Arc;

use serde_json::Value;

use crate::schema::FieldPath;

use super::ast::{SortDirection, SortField};
use super::errors::{QueryError, QueryResult};
use super::normalize::NormalizedQuery;

/// Comparator over full documents, derived from a sort specification
pub type SortComparator = Arc<dyn Fn(&Value, &Value) -> Ordering + Send + Sync>;

/// Predicate over full documents, derived from a selector
pub type QueryMatcher = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Compares two JSON values for sorting.
///
/// Ordering rules:
/// - missing < null < bool < number < string
/// - For same types, natural ordering
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a_val), Some(b_val)) => {
            // Compare by type first
            let type_order = |v: &Value| -> u8 {
                match v {
                    Value::Null => 0,
                    Value::Bool(_) => 1,
                    Value::Number(_) => 2,
                    Value::String(_) => 3,
                    Value::Array(_) => 4,
                    Value::Object(_) => 5,
                }
            };

            let a_type = type_order(a_val);
            let b_type = type_order(b_val);

            if a_type != b_type {
                return a_type.cmp(&b_type);
            }

            // Same type, compare values
            match (a_val, b_val) {
                (Value::Null, Value::Null) => Ordering::Equal,
                (Value::Bool(a_b), Value::Bool(b_b)) => a_b.cmp(b_b),
                (Value::Number(a_n), Value::Number(b_n)) => {
                    let a_f = a_n.as_f64().unwrap_or(0.0);
                    let b_f = b_n.as_f64().unwrap_or(0.0);
                    a_f.partial_cmp(&b_f).unwrap_or(Ordering::Equal)
                }
                (Value::String(a_s), Value::String(b_s)) => a_s.cmp(b_s),
                _ => Ordering::Equal, // Arrays and objects not compared
            }
        }
    }
}

/// Build a document comparator for a sort specification.
///
/// The comparison walks the sort fields in order and returns on the
/// first difference. Field paths are compiled once.
pub fn build_sort_comparator(sort: &[SortField]) -> SortComparator {
    let compiled: Vec<(FieldPath, SortDirection)> = sort
        .iter()
        .map(|s| (FieldPath::parse(s.field.clone()), s.direction))
        .collect();

    Arc::new(move |a: &Value, b: &Value| {
        for (path, direction) in &compiled {
            let ordering = compare_values(path.get(a), path.get(b));
            let ordering = match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    })
}

/// Operators the built-in matcher evaluates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Nin,
}

impl MatchOp {
    fn parse(op: &str) -> QueryResult<Self> {
        match op {
            "$eq" => Ok(MatchOp::Eq),
            "$ne" => Ok(MatchOp::Ne),
            "$gt" => Ok(MatchOp::Gt),
            "$gte" => Ok(MatchOp::Gte),
            "$lt" => Ok(MatchOp::Lt),
            "$lte" => Ok(MatchOp::Lte),
            "$in" => Ok(MatchOp::In),
            "$nin" => Ok(MatchOp::Nin),
            other => Err(QueryError::unsupported_operator(other)),
        }
    }

    /// Evaluate the operator against a resolved field value.
    ///
    /// Range operators require the field to be present. `$ne` and
    /// `$nin` match documents where the field is absent.
    fn eval(&self, field: Option<&Value>, expected: &Value) -> bool {
        match self {
            MatchOp::Eq => field == Some(expected),
            MatchOp::Ne => field != Some(expected),
            MatchOp::Gt => field
                .map_or(false, |v| compare_values(Some(v), Some(expected)) == Ordering::Greater),
            MatchOp::Gte => field.map_or(false, |v| {
                compare_values(Some(v), Some(expected)) != Ordering::Less
            }),
            MatchOp::Lt => field
                .map_or(false, |v| compare_values(Some(v), Some(expected)) == Ordering::Less),
            MatchOp::Lte => field.map_or(false, |v| {
                compare_values(Some(v), Some(expected)) != Ordering::Greater
            }),
            MatchOp::In => field.map_or(false, |v| {
                expected.as_array().map_or(false, |arr| arr.contains(v))
            }),
            MatchOp::Nin => expected
                .as_array()
                .map_or(false, |arr| field.map_or(true, |v| !arr.contains(v))),
        }
    }
}

/// Build the built-in matcher for a normalized selector.
///
/// Supported operators: `$eq`, `$ne`, `$gt`, `$gte`, `$lt`, `$lte`,
/// `$in`, `$nin`. Construction fails on anything else, and the caller
/// degrades that query to full re-execution.
pub fn build_matcher(query: &NormalizedQuery) -> QueryResult<QueryMatcher> {
    let mut compiled: Vec<(FieldPath, Vec<(MatchOp, Value)>)> = Vec::new();
    for (field, ops) in &query.selector {
        let mut checks = Vec::new();
        for (op, value) in ops {
            checks.push((MatchOp::parse(op)?, value.clone()));
        }
        compiled.push((FieldPath::parse(field.clone()), checks));
    }

    Ok(Arc::new(move |doc: &Value| {
        compiled.iter().all(|(path, checks)| {
            let field_value = path.get(doc);
            checks
                .iter()
                .all(|(op, expected)| op.eval(field_value, expected))
        })
    }))
}
