//! Query AST structures per QUERY.md
//!
//! A [`Query`] is the raw, builder-assembled form: selector entries may
//! be literals or operator maps, sort and index are optional. The
//! planner and the cache only ever see the normalized form.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Equality operator
pub const OP_EQ: &str = "$eq";
/// Strictly-greater operator
pub const OP_GT: &str = "$gt";
/// Greater-or-equal operator
pub const OP_GTE: &str = "$gte";
/// Strictly-less operator
pub const OP_LT: &str = "$lt";
/// Less-or-equal operator
pub const OP_LTE: &str = "$lte";

/// Operators the planner can turn into scan bounds
pub const LOGICAL_OPERATORS: [&str; 5] = [OP_EQ, OP_GT, OP_GTE, OP_LT, OP_LTE];

/// Operators that constrain the lower end of a scan
pub const LOWER_BOUND_LOGICAL_OPERATORS: [&str; 3] = [OP_EQ, OP_GT, OP_GTE];

/// Operators that constrain the upper end of a scan
pub const UPPER_BOUND_LOGICAL_OPERATORS: [&str; 3] = [OP_EQ, OP_LT, OP_LTE];

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Sort specification for a single field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
    /// Field path to sort by
    pub field: String,
    /// Sort direction
    pub direction: SortDirection,
}

impl SortField {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Raw query as assembled by the caller
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Selector: field path to literal value or operator map
    pub selector: BTreeMap<String, Value>,
    /// Number of leading results to drop
    pub skip: u64,
    /// Maximum number of results, unlimited when absent
    pub limit: Option<u64>,
    /// Sort specification, defaults to primary key ascending
    pub sort: Vec<SortField>,
    /// Explicit index override
    pub index: Option<Vec<String>>,
}

impl Query {
    /// Creates a new query builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a raw selector condition (literal or operator map)
    pub fn filter(mut self, field: impl Into<String>, condition: Value) -> Self {
        self.selector.insert(field.into(), condition);
        self
    }

    /// Adds an equality condition
    pub fn filter_eq(self, field: impl Into<String>, value: Value) -> Self {
        self.filter(field, value)
    }

    /// Adds a single-operator condition, merging with any operator map
    /// already present on the field
    pub fn filter_op(mut self, field: impl Into<String>, op: &str, value: Value) -> Self {
        let field = field.into();
        let entry = self
            .selector
            .entry(field)
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
        if !entry.is_object() {
            let literal = entry.take();
            let mut map = serde_json::Map::new();
            map.insert(OP_EQ.to_string(), literal);
            *entry = Value::Object(map);
        }
        if let Some(map) = entry.as_object_mut() {
            map.insert(op.to_string(), value);
        }
        self
    }

    /// Sets the number of leading results to drop
    pub fn with_skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    /// Sets the result limit
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Adds a sort field
    pub fn with_sort(mut self, sort: SortField) -> Self {
        self.sort.push(sort);
        self
    }

    /// Forces the planner to use the given index
    pub fn with_index(mut self, fields: Vec<&str>) -> Self {
        self.index = Some(fields.into_iter().map(str::to_string).collect());
        self
    }
}

/// Whether a selector condition is an operator map
///
/// An object whose keys all start with `$` is an operator map; any
/// other value is a literal and means equality.
pub fn is_operator_map(condition: &Value) -> bool {
    match condition.as_object() {
        Some(map) => !map.is_empty() && map.keys().all(|k| k.starts_with('$')),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_builder() {
        let query = Query::new()
            .filter_eq("name", json!("alice"))
            .filter_op("age", OP_GTE, json!(18))
            .with_sort(SortField::asc("age"))
            .with_skip(5)
            .with_limit(10);

        assert_eq!(query.selector["name"], json!("alice"));
        assert_eq!(query.selector["age"], json!({"$gte": 18}));
        assert_eq!(query.skip, 5);
        assert_eq!(query.limit, Some(10));
        assert_eq!(query.sort.len(), 1);
    }

    #[test]
    fn test_filter_op_merges() {
        let query = Query::new()
            .filter_op("age", OP_GTE, json!(18))
            .filter_op("age", OP_LT, json!(65));

        assert_eq!(query.selector["age"], json!({"$gte": 18, "$lt": 65}));
    }

    #[test]
    fn test_filter_op_lifts_literal_to_eq() {
        let query = Query::new()
            .filter_eq("age", json!(30))
            .filter_op("age", OP_LTE, json!(40));

        assert_eq!(query.selector["age"], json!({"$eq": 30, "$lte": 40}));
    }

    #[test]
    fn test_operator_map_detection() {
        assert!(is_operator_map(&json!({"$gte": 18})));
        assert!(is_operator_map(&json!({"$gte": 18, "$lt": 65})));
        assert!(!is_operator_map(&json!(42)));
        assert!(!is_operator_map(&json!("alice")));
        assert!(!is_operator_map(&json!({"city": "Berlin"})));
        assert!(!is_operator_map(&json!({})));
    }

    #[test]
    fn test_sort_direction() {
        assert_eq!(SortField::asc("age").direction, SortDirection::Asc);
        assert_eq!(SortField::desc("age").direction.as_str(), "desc");
    }

    #[test]
    fn test_bound_operator_sets() {
        assert!(LOWER_BOUND_LOGICAL_OPERATORS.contains(&OP_GTE));
        assert!(!LOWER_BOUND_LOGICAL_OPERATORS.contains(&OP_LT));
        assert!(UPPER_BOUND_LOGICAL_OPERATORS.contains(&OP_LTE));
        assert!(!UPPER_BOUND_LOGICAL_OPERATORS.contains(&OP_GT));
        assert!(LOGICAL_OPERATORS.contains(&OP_EQ));
    }
}
