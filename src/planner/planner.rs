//! Index selection per QUERY.md §2
//!
//! For every candidate index the planner derives the key range the
//! selector pins on it, rates the candidates and keeps the best one.
//! The primary key index is always the last candidate, so a query that
//! no declared index helps degrades to a full primary scan instead of
//! failing.

use std::collections::{BTreeMap, HashSet};

use serde_json::Value;

use crate::index::IndexCodec;
use crate::query::{
    NormalizedQuery, LOGICAL_OPERATORS, LOWER_BOUND_LOGICAL_OPERATORS, OP_EQ, OP_GT, OP_GTE,
    OP_LT, OP_LTE, UPPER_BOUND_LOGICAL_OPERATORS,
};
use crate::schema::{CollectionSchema, FieldType, IndexDef};

use super::errors::{PlannerError, PlannerResult};
use super::plan::{QueryPlan, ScanBound};

/// Rating points per leading field anchored at a concrete start or end value
const POINTS_PER_ANCHORED_KEY: i64 = 10;
/// Rating points per leading field whose start and end bound are equal
const POINTS_PER_EXACT_KEY: i64 = 15;
/// Rating points when the index walk already yields the sort order
const POINTS_SORT_SATISFIED: i64 = 5;

/// Picks the best index for a normalized query and derives the key range
/// the executor must scan on it.
///
/// Planning is deterministic: the same schema and query always produce
/// the same plan. The winning index is checked against the codec, so a
/// plan that is handed out is guaranteed encodable.
pub fn plan(schema: &CollectionSchema, query: &NormalizedQuery) -> PlannerResult<QueryPlan> {
    let candidates = candidate_indexes(schema, query)?;

    // Boolean fields pinned by $eq cannot change the relative order of
    // matching documents, so they are ignored when comparing sort order
    // against index order.
    let sort_irrelevant = sort_irrelevant_fields(schema, query);
    let has_desc_sort = query.has_desc_sort();
    let optimal_sort: Vec<&str> = query
        .sort_field_names()
        .into_iter()
        .filter(|field| !sort_irrelevant.contains(field))
        .collect();

    let mut best: Option<(i64, QueryPlan)> = None;
    for index in candidates {
        let candidate =
            build_candidate_plan(query, index, &sort_irrelevant, has_desc_sort, &optimal_sort);
        let quality = rate_plan(&candidate);
        // Ties go to the later candidate, which makes the trailing
        // primary index the fallback when nothing scores.
        let replace = match &best {
            None => true,
            Some((best_quality, _)) => quality >= *best_quality,
        };
        if replace {
            best = Some((quality, candidate));
        }
    }

    let (_, chosen) =
        best.ok_or_else(|| PlannerError::invalid_index("schema declares no usable index"))?;

    // The executor will encode these bounds. Fail now if the winning
    // index covers a field the codec cannot handle.
    IndexCodec::new(schema, &chosen.index)?;

    Ok(chosen)
}

/// Candidate set: the declared indexes with the primary index appended
/// last, or only the requested index when the query names one.
fn candidate_indexes(
    schema: &CollectionSchema,
    query: &NormalizedQuery,
) -> PlannerResult<Vec<IndexDef>> {
    if let Some(fields) = &query.index {
        let requested = IndexDef::new(fields.clone());
        let known = requested == schema.primary_index()
            || schema.indexes.iter().any(|declared| *declared == requested);
        if !known {
            return Err(PlannerError::invalid_index(requested.to_string()));
        }
        return Ok(vec![requested]);
    }

    let mut candidates = schema.indexes.clone();
    candidates.push(schema.primary_index());
    Ok(candidates)
}

/// Selector fields that cannot influence sort order: boolean fields
/// pinned to a single value by `$eq`.
fn sort_irrelevant_fields<'a>(
    schema: &CollectionSchema,
    query: &'a NormalizedQuery,
) -> HashSet<&'a str> {
    query
        .selector
        .iter()
        .filter(|(field, operators)| {
            operators.contains_key(OP_EQ)
                && matches!(schema.field_at(field), Some(FieldType::Boolean))
        })
        .map(|(field, _)| field.as_str())
        .collect()
}

/// Resolved bound pair for one index field
struct FieldRange {
    start_key: ScanBound,
    end_key: ScanBound,
    inclusive_start: bool,
    inclusive_end: bool,
}

/// Derives the key range one candidate index supports for the query.
fn build_candidate_plan(
    query: &NormalizedQuery,
    index: IndexDef,
    sort_irrelevant: &HashSet<&str>,
    has_desc_sort: bool,
    optimal_sort: &[&str],
) -> QueryPlan {
    let mut inclusive_start = true;
    let mut inclusive_end = true;
    let mut start_keys = Vec::with_capacity(index.len());
    let mut end_keys = Vec::with_capacity(index.len());

    for field in &index.fields {
        let operators = query.condition(field).filter(|ops| !ops.is_empty());
        let range = match operators {
            // An exclusive bound on an earlier field must clear the whole
            // prefix, so unconstrained fields pin to the far extreme.
            None => FieldRange {
                start_key: if inclusive_start {
                    ScanBound::Min
                } else {
                    ScanBound::Max
                },
                end_key: if inclusive_end {
                    ScanBound::Max
                } else {
                    ScanBound::Min
                },
                inclusive_start: true,
                inclusive_end: true,
            },
            Some(ops) => merged_range(ops),
        };
        if inclusive_start && !range.inclusive_start {
            inclusive_start = false;
        }
        if inclusive_end && !range.inclusive_end {
            inclusive_end = false;
        }
        start_keys.push(range.start_key);
        end_keys.push(range.end_key);
    }

    let index_sort: Vec<&str> = index
        .fields
        .iter()
        .map(String::as_str)
        .filter(|field| !sort_irrelevant.contains(field))
        .collect();
    let sort_fields_same_as_index_fields = !has_desc_sort && optimal_sort == index_sort.as_slice();
    let selector_satisfied_by_index = selector_satisfied(&index, query, &start_keys, &end_keys);

    QueryPlan {
        index,
        start_keys,
        end_keys,
        inclusive_start,
        inclusive_end,
        sort_fields_same_as_index_fields,
        selector_satisfied_by_index,
    }
}

/// Merges every range operator on one field into a single bound pair.
/// Later operators overwrite the attributes set by earlier ones.
fn merged_range(operators: &BTreeMap<String, Value>) -> FieldRange {
    let mut start_key = None;
    let mut end_key = None;
    let mut inclusive_start = None;
    let mut inclusive_end = None;

    for (operator, value) in operators {
        let bound = ScanBound::Value(value.clone());
        match operator.as_str() {
            OP_EQ => {
                start_key = Some(bound.clone());
                end_key = Some(bound);
                inclusive_start = Some(true);
                inclusive_end = Some(true);
            }
            OP_GT => {
                start_key = Some(bound);
                inclusive_start = Some(false);
            }
            OP_GTE => {
                start_key = Some(bound);
                inclusive_start = Some(true);
            }
            OP_LT => {
                end_key = Some(bound);
                inclusive_end = Some(false);
            }
            OP_LTE => {
                end_key = Some(bound);
                inclusive_end = Some(true);
            }
            _ => {}
        }
    }

    FieldRange {
        start_key: start_key.unwrap_or(ScanBound::Min),
        end_key: end_key.unwrap_or(ScanBound::Max),
        inclusive_start: inclusive_start.unwrap_or(true),
        inclusive_end: inclusive_end.unwrap_or(true),
    }
}

/// True when the key range alone enforces every selector condition, so
/// the executor can skip per-document matching.
fn selector_satisfied(
    index: &IndexDef,
    query: &NormalizedQuery,
    start_keys: &[ScanBound],
    end_keys: &[ScanBound],
) -> bool {
    // Any field outside the index, and any operator a key range cannot
    // express, forces residual filtering.
    for (field, operators) in &query.selector {
        if !index.contains(field) {
            return false;
        }
        if operators
            .keys()
            .any(|op| !LOGICAL_OPERATORS.contains(&op.as_str()))
        {
            return false;
        }
    }

    // At most one field may leave its lower bound open, and one its
    // upper bound. A second open bound cannot map onto one contiguous
    // key range. A field without a lower (or upper) operator counts as
    // open on that side.
    let mut lower_fields: HashSet<&str> = HashSet::new();
    let mut open_lower_seen = false;
    for (field, operators) in &query.selector {
        let mut lower_ops = operators
            .keys()
            .map(String::as_str)
            .filter(|op| LOWER_BOUND_LOGICAL_OPERATORS.contains(op));
        let first = lower_ops.next();
        if lower_ops.next().is_some() {
            return false;
        }
        if first.is_some() {
            lower_fields.insert(field.as_str());
        }
        if first != Some(OP_EQ) {
            if open_lower_seen {
                return false;
            }
            open_lower_seen = true;
        }
    }

    let mut upper_fields: HashSet<&str> = HashSet::new();
    let mut open_upper_seen = false;
    for (field, operators) in &query.selector {
        let mut upper_ops = operators
            .keys()
            .map(String::as_str)
            .filter(|op| UPPER_BOUND_LOGICAL_OPERATORS.contains(op));
        let first = upper_ops.next();
        if upper_ops.next().is_some() {
            return false;
        }
        if first.is_some() {
            upper_fields.insert(field.as_str());
        }
        if first != Some(OP_EQ) {
            if open_upper_seen {
                return false;
            }
            open_upper_seen = true;
        }
    }

    // Bound fields must cover a prefix of the index, and once a field
    // scans a real range nothing behind it may still be bound.
    for (position, field) in index.fields.iter().enumerate() {
        for bound_fields in [&mut lower_fields, &mut upper_fields] {
            if !bound_fields.contains(field.as_str()) && !bound_fields.is_empty() {
                return false;
            }
            bound_fields.remove(field.as_str());
        }
        if start_keys.get(position) != end_keys.get(position)
            && !lower_fields.is_empty()
            && !upper_fields.is_empty()
        {
            return false;
        }
    }

    true
}

/// Additive quality score for a candidate plan. Only leading fields
/// count: a range on one field makes the anchoring of every later field
/// unreliable.
fn rate_plan(plan: &QueryPlan) -> i64 {
    let mut quality: i64 = 0;

    let anchored_starts = plan
        .start_keys
        .iter()
        .take_while(|key| !key.is_sentinel())
        .count();
    quality += anchored_starts as i64 * POINTS_PER_ANCHORED_KEY;

    let anchored_ends = plan
        .end_keys
        .iter()
        .take_while(|key| !key.is_sentinel())
        .count();
    quality += anchored_ends as i64 * POINTS_PER_ANCHORED_KEY;

    let exact_fields = plan
        .start_keys
        .iter()
        .zip(plan.end_keys.iter())
        .take_while(|(start, end)| start == end)
        .count();
    quality += exact_fields as i64 * POINTS_PER_EXACT_KEY;

    if plan.sort_fields_same_as_index_fields {
        quality += POINTS_SORT_SATISFIED;
    }

    quality
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{normalize, Query, SortField};
    use serde_json::json;
    use std::collections::HashMap;

    fn person_schema(indexes: Vec<IndexDef>) -> CollectionSchema {
        let mut fields = HashMap::new();
        fields.insert("id".to_string(), FieldType::string(10));
        fields.insert("age".to_string(), FieldType::integer(0, 120));
        fields.insert("score".to_string(), FieldType::integer(0, 100));
        fields.insert("name".to_string(), FieldType::string(12));
        fields.insert("email".to_string(), FieldType::string(20));
        fields.insert("active".to_string(), FieldType::boolean());
        CollectionSchema::new("id", fields, indexes).unwrap()
    }

    fn plan_for(schema: &CollectionSchema, query: Query) -> QueryPlan {
        let normalized = normalize(&query, schema).unwrap();
        plan(schema, &normalized).unwrap()
    }

    #[test]
    fn test_range_query_picks_matching_index() {
        let schema = person_schema(vec![IndexDef::single("age")]);
        let query = Query::new()
            .filter_op("age", OP_GTE, json!(18))
            .with_sort(SortField::asc("age"));

        let plan = plan_for(&schema, query);
        assert_eq!(plan.index.fields, vec!["age", "id"]);
        assert_eq!(
            plan.start_keys,
            vec![ScanBound::Value(json!(18)), ScanBound::Min]
        );
        assert_eq!(plan.end_keys, vec![ScanBound::Max, ScanBound::Max]);
        assert!(plan.inclusive_start);
        assert!(plan.inclusive_end);
        assert!(plan.sort_fields_same_as_index_fields);
        assert!(plan.selector_satisfied_by_index);
    }

    #[test]
    fn test_point_lookup_beats_primary_fallback() {
        let schema = person_schema(vec![IndexDef::single("age")]);
        let query = Query::new().filter_eq("age", json!(30));

        let plan = plan_for(&schema, query);
        assert_eq!(plan.index.fields, vec!["age", "id"]);
        assert_eq!(plan.start_keys[0], plan.end_keys[0]);
        assert_eq!(plan.start_keys[0], ScanBound::Value(json!(30)));
        assert!(plan.selector_satisfied_by_index);
        // Default sort is by primary key, which this index does not give.
        assert!(!plan.sort_fields_same_as_index_fields);
    }

    #[test]
    fn test_exact_match_outscores_plain_anchor() {
        let schema = person_schema(vec![IndexDef::single("age")]);
        let exact = plan_for(&schema, Query::new().filter_eq("age", json!(30)));
        let ranged = plan_for(&schema, Query::new().filter_op("age", OP_GTE, json!(30)));
        assert!(rate_plan(&exact) > rate_plan(&ranged));
    }

    #[test]
    fn test_unconstrained_query_falls_back_to_primary() {
        let schema = person_schema(vec![IndexDef::single("age")]);
        let plan = plan_for(&schema, Query::new());

        assert_eq!(plan.index.fields, vec!["id"]);
        assert_eq!(plan.start_keys, vec![ScanBound::Min]);
        assert_eq!(plan.end_keys, vec![ScanBound::Max]);
        assert!(plan.inclusive_start);
        assert!(plan.inclusive_end);
        assert!(plan.sort_fields_same_as_index_fields);
        assert!(plan.selector_satisfied_by_index);
    }

    #[test]
    fn test_later_candidate_wins_ties() {
        let schema = person_schema(vec![IndexDef::single("name"), IndexDef::single("email")]);
        let query = Query::new()
            .filter_eq("name", json!("carol"))
            .filter_eq("email", json!("carol@example.com"));

        let plan = plan_for(&schema, query);
        assert_eq!(plan.index.fields, vec!["email", "id"]);
    }

    #[test]
    fn test_explicit_index_always_wins() {
        let schema = person_schema(vec![IndexDef::single("age"), IndexDef::single("name")]);
        let query = Query::new()
            .filter_eq("name", json!("carol"))
            .with_index(vec!["age"]);

        let plan = plan_for(&schema, query);
        assert_eq!(plan.index.fields, vec!["age", "id"]);
    }

    #[test]
    fn test_unknown_explicit_index_rejected() {
        let schema = person_schema(vec![IndexDef::single("age")]);
        let query = Query::new().with_index(vec!["salary"]);
        let normalized = normalize(&query, &schema).unwrap();

        let err = plan(&schema, &normalized).unwrap_err();
        assert_eq!(err.code().code(), "LUMA_QUERY_INVALID_INDEX");
        assert!(err.message().contains("salary"));
    }

    #[test]
    fn test_primary_key_as_explicit_index_accepted() {
        let schema = person_schema(vec![IndexDef::single("age")]);
        let query = Query::new()
            .filter_eq("id", json!("doc1"))
            .with_index(vec!["id"]);

        let plan = plan_for(&schema, query);
        assert_eq!(plan.index.fields, vec!["id"]);
        assert_eq!(plan.start_keys, vec![ScanBound::Value(json!("doc1"))]);
    }

    #[test]
    fn test_exclusive_start_propagates_to_unconstrained_fields() {
        let schema = person_schema(vec![IndexDef::single("age")]);
        let query = Query::new().filter_op("age", OP_GT, json!(30));

        let plan = plan_for(&schema, query);
        assert!(!plan.inclusive_start);
        assert!(plan.inclusive_end);
        // The primary field has no condition. With an exclusive start it
        // must skip every document that ties on age 30.
        assert_eq!(
            plan.start_keys,
            vec![ScanBound::Value(json!(30)), ScanBound::Max]
        );
        assert_eq!(plan.end_keys, vec![ScanBound::Max, ScanBound::Max]);
    }

    #[test]
    fn test_exclusive_end_propagates_to_unconstrained_fields() {
        let schema = person_schema(vec![IndexDef::single("age")]);
        let query = Query::new().filter_op("age", OP_LT, json!(65));

        let plan = plan_for(&schema, query);
        assert!(plan.inclusive_start);
        assert!(!plan.inclusive_end);
        assert_eq!(plan.start_keys, vec![ScanBound::Min, ScanBound::Min]);
        assert_eq!(
            plan.end_keys,
            vec![ScanBound::Value(json!(65)), ScanBound::Min]
        );
    }

    #[test]
    fn test_desc_sort_is_never_satisfied_by_index() {
        let schema = person_schema(vec![IndexDef::single("age")]);
        let query = Query::new()
            .filter_op("age", OP_GTE, json!(18))
            .with_sort(SortField::desc("age"));

        let plan = plan_for(&schema, query);
        assert_eq!(plan.index.fields, vec!["age", "id"]);
        assert!(!plan.sort_fields_same_as_index_fields);
    }

    #[test]
    fn test_boolean_eq_fields_ignored_for_sort_match() {
        let schema = person_schema(vec![IndexDef::new(vec![
            "active".to_string(),
            "age".to_string(),
        ])]);
        let query = Query::new()
            .filter_eq("active", json!(true))
            .with_sort(SortField::asc("age"));

        let plan = plan_for(&schema, query);
        assert_eq!(plan.index.fields, vec!["active", "age", "id"]);
        // The index leads with `active`, but every match shares the same
        // value there, so the walk is still in sort order.
        assert!(plan.sort_fields_same_as_index_fields);
    }

    #[test]
    fn test_selector_on_unindexed_field_not_satisfied() {
        let schema = person_schema(vec![IndexDef::single("age")]);
        let query = Query::new()
            .filter_op("age", OP_GTE, json!(18))
            .filter_eq("name", json!("carol"));

        let normalized = normalize(&query, &schema).unwrap();
        let plan = plan(&schema, &normalized).unwrap();
        assert!(!plan.selector_satisfied_by_index);
    }

    #[test]
    fn test_two_open_lower_bounds_not_satisfied() {
        let schema = person_schema(vec![IndexDef::new(vec![
            "age".to_string(),
            "score".to_string(),
        ])]);
        let query = Query::new()
            .filter_op("age", OP_GT, json!(10))
            .filter_op("score", OP_GT, json!(20));

        let plan = plan_for(&schema, query);
        assert_eq!(plan.index.fields, vec!["age", "score", "id"]);
        assert!(!plan.selector_satisfied_by_index);
    }

    #[test]
    fn test_planning_is_deterministic() {
        let schema = person_schema(vec![IndexDef::single("age"), IndexDef::single("name")]);
        let query = Query::new()
            .filter_op("age", OP_GTE, json!(18))
            .filter_eq("name", json!("carol"));
        let normalized = normalize(&query, &schema).unwrap();

        let first = plan(&schema, &normalized).unwrap();
        let second = plan(&schema, &normalized).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unencodable_winner_rejected() {
        // Built without `new` to skip schema validation, like a schema
        // deserialized straight from config.
        let mut fields = HashMap::new();
        fields.insert("id".to_string(), FieldType::string(10));
        fields.insert("note".to_string(), FieldType::unbounded_string());
        let schema = CollectionSchema {
            primary_key: "id".to_string(),
            version: 0,
            fields,
            indexes: vec![IndexDef::new(vec!["note".to_string(), "id".to_string()])],
        };

        let query = Query::new().filter_eq("note", json!("x"));
        let normalized = normalize(&query, &schema).unwrap();

        let err = plan(&schema, &normalized).unwrap_err();
        assert_eq!(err.code().code(), "LUMA_INDEX_SCHEMA_TYPE");
        assert_eq!(err.field(), Some("note"));
    }
}
