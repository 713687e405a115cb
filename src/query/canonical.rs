//! Canonical query strings per QUERY.md §3
//!
//! Two queries with the same meaning must produce byte-identical
//! canonical strings, because the query cache deduplicates on them.
//! The string is the JSON of the normalized query with every object
//! sorted by key, including objects nested inside selector values.

use serde_json::{Map, Value};

use super::ast::SortField;
use super::normalize::NormalizedQuery;

/// Deterministic string form of a normalized query
pub fn canonical_string(query: &NormalizedQuery) -> String {
    let mut root = Map::new();

    if let Some(ref index) = query.index {
        root.insert(
            "index".to_string(),
            Value::Array(index.iter().map(|f| Value::String(f.clone())).collect()),
        );
    }
    if let Some(limit) = query.limit {
        root.insert("limit".to_string(), Value::from(limit));
    }

    let mut selector = Map::new();
    for (field, ops) in &query.selector {
        let mut op_map = Map::new();
        for (op, value) in ops {
            op_map.insert(op.clone(), sorted_value(value));
        }
        selector.insert(field.clone(), Value::Object(op_map));
    }
    root.insert("selector".to_string(), Value::Object(selector));

    root.insert("skip".to_string(), Value::from(query.skip));
    root.insert(
        "sort".to_string(),
        Value::Array(query.sort.iter().map(sort_entry).collect()),
    );

    Value::Object(root).to_string()
}

/// A sort field as a single-key object, `{"age": "asc"}`
fn sort_entry(sort: &SortField) -> Value {
    let mut map = Map::new();
    map.insert(
        sort.field.clone(),
        Value::String(sort.direction.as_str().to_string()),
    );
    Value::Object(map)
}

/// Recursively sort object keys inside a value
fn sorted_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = Map::new();
            for key in keys {
                out.insert(key.clone(), sorted_value(&map[key]));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted_value).collect()),
        other => other.clone(),
    }
}
