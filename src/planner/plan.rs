//! Query plan types per QUERY.md §3
//!
//! A plan fixes the index the executor walks and the key range on it.
//! Bounds are kept per index field as `ScanBound` values so plans stay
//! serializable and storage-agnostic until the codec turns them into
//! key strings.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::IndexDef;

/// One end of the scan range for a single index field.
///
/// `Min` and `Max` are opaque markers for "below every value" and "above
/// every value" of a field. They are not data values; only the index codec
/// knows how to materialize them into key characters. The tagged
/// serialization keeps them distinguishable from selector values that
/// happen to be strings like `"min"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ScanBound {
    /// Sorts below every representable value of the field
    Min,
    /// Sorts above every representable value of the field
    Max,
    /// A concrete value taken from the selector
    Value(Value),
}

impl ScanBound {
    /// True for the `Min`/`Max` range markers.
    pub fn is_sentinel(&self) -> bool {
        matches!(self, ScanBound::Min | ScanBound::Max)
    }

    /// The concrete value if this bound carries one.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            ScanBound::Value(value) => Some(value),
            _ => None,
        }
    }
}

/// Immutable query plan (no runtime state)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPlan {
    /// Chosen index, always ending with the primary key
    pub index: IndexDef,
    /// Start bound for each index field, in index order
    pub start_keys: Vec<ScanBound>,
    /// End bound for each index field, in index order
    pub end_keys: Vec<ScanBound>,
    /// Whether documents equal to the start keys are part of the scan
    pub inclusive_start: bool,
    /// Whether documents equal to the end keys are part of the scan
    pub inclusive_end: bool,
    /// True when walking the index in order already yields the query's
    /// sort order, so no re-sort of the results is needed
    pub sort_fields_same_as_index_fields: bool,
    /// True when the key range alone enforces every selector condition,
    /// so no residual per-document filtering is needed
    pub selector_satisfied_by_index: bool,
}
