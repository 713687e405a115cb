//! Order-preserving index strings per INDEX.md
//!
//! An index codec maps a document to a fixed-layout string so that
//! lexicographic order of the strings equals the index order of the
//! documents. Storages can then keep documents sorted, seek by plain
//! string comparison and slice scan ranges out of the planner's
//! bounds without understanding field types.
//!
//! Layout per field, concatenated in index order:
//! - string: the value right-padded with spaces to maxLength
//! - boolean: '1' or '0'
//! - number/integer: the whole part offset by the schema minimum and
//!   zero-padded, then the fraction digits at multipleOf precision
//!
//! Field metadata is resolved once at construction; encoding itself is
//! a hot path and does no schema lookups.

use std::fmt::Write;

use serde_json::Value;

use crate::planner::ScanBound;
use crate::schema::{CollectionSchema, FieldPath, FieldType, IndexDef};

use super::errors::{IndexError, IndexResult};

/// Character that sorts above every other in an index string
pub const INDEX_MAX_CHAR: char = '\u{ffff}';

/// Parsed width information for a numeric index field
#[derive(Debug, Clone, PartialEq)]
struct NumberLengths {
    /// Floor of the declared minimum
    minimum: f64,
    /// Ceiling of the declared maximum
    maximum: f64,
    /// Digits of the whole part
    non_decimals: usize,
    /// Digits of the fraction part, from multipleOf
    decimals: usize,
}

impl NumberLengths {
    fn parse(field: &str, minimum: f64, maximum: f64, multiple_of: f64) -> IndexResult<Self> {
        let minimum = minimum.floor();
        let maximum = maximum.ceil();
        if !(minimum <= maximum) {
            return Err(IndexError::schema_type(field, "minimum exceeds maximum"));
        }
        if !(multiple_of.is_finite() && multiple_of > 0.0) {
            return Err(IndexError::schema_type(field, "multipleOf must be positive"));
        }

        let span = (maximum - minimum) as u64;
        let non_decimals = span.to_string().len();
        let decimals = multiple_of
            .to_string()
            .split('.')
            .nth(1)
            .map_or(0, str::len);

        Ok(Self {
            minimum,
            maximum,
            non_decimals,
            decimals,
        })
    }

    fn width(&self) -> usize {
        self.non_decimals + self.decimals
    }
}

/// Encodable field kinds
#[derive(Debug, Clone)]
enum FieldKind {
    String { max_length: usize },
    Boolean,
    Number(NumberLengths),
}

#[derive(Debug, Clone)]
struct FieldMeta {
    path: FieldPath,
    kind: FieldKind,
}

/// Codec for one index of one schema
#[derive(Debug, Clone)]
pub struct IndexCodec {
    fields: Vec<FieldMeta>,
}

impl IndexCodec {
    /// Resolve per-field metadata for an index
    ///
    /// Fails when an index field is not declared in the schema or its
    /// type lacks what the fixed layout needs.
    pub fn new(schema: &CollectionSchema, index: &IndexDef) -> IndexResult<Self> {
        let mut fields = Vec::with_capacity(index.len());
        for field in &index.fields {
            let field_type = schema
                .field_at(field)
                .ok_or_else(|| IndexError::schema_type(field, "not declared in schema"))?;
            let kind = match field_type {
                FieldType::String {
                    max_length: Some(max_length),
                } => FieldKind::String {
                    max_length: *max_length as usize,
                },
                FieldType::String { max_length: None } => {
                    return Err(IndexError::schema_type(field, "string fields need maxLength"))
                }
                FieldType::Boolean => FieldKind::Boolean,
                FieldType::Number {
                    minimum,
                    maximum,
                    multiple_of,
                }
                | FieldType::Integer {
                    minimum,
                    maximum,
                    multiple_of,
                } => {
                    let minimum = minimum
                        .ok_or_else(|| IndexError::schema_type(field, "missing minimum"))?;
                    let maximum = maximum
                        .ok_or_else(|| IndexError::schema_type(field, "missing maximum"))?;
                    let multiple_of = multiple_of
                        .ok_or_else(|| IndexError::schema_type(field, "missing multipleOf"))?;
                    FieldKind::Number(NumberLengths::parse(field, minimum, maximum, multiple_of)?)
                }
                FieldType::Object { .. } => {
                    return Err(IndexError::schema_type(
                        field,
                        "object fields cannot be encoded",
                    ))
                }
            };
            fields.push(FieldMeta {
                path: FieldPath::parse(field.clone()),
                kind,
            });
        }
        Ok(Self { fields })
    }

    /// Fixed-layout index string for a document
    ///
    /// Missing values encode as the type's low end: empty string, `false`,
    /// or zero clamped into the schema bounds. Out-of-range numbers clamp,
    /// oversized strings truncate, so the layout stays fixed.
    pub fn encode(&self, doc: &Value) -> String {
        let mut out = String::with_capacity(self.string_length());
        for field in &self.fields {
            let value = field.path.get(doc);
            match &field.kind {
                FieldKind::String { max_length } => {
                    let text = value.and_then(Value::as_str).unwrap_or("");
                    push_padded(&mut out, text, *max_length, ' ');
                }
                FieldKind::Boolean => {
                    let flag = value.and_then(Value::as_bool).unwrap_or(false);
                    out.push(if flag { '1' } else { '0' });
                }
                FieldKind::Number(lengths) => {
                    let number = value.and_then(Value::as_f64).unwrap_or(0.0);
                    push_number(&mut out, lengths, number);
                }
            }
        }
        out
    }

    /// Start key for a scan from per-field lower bounds
    ///
    /// Bounds missing from the slice behave like [`ScanBound::Min`].
    /// A non-numeric bound value on a number field widens the scan to
    /// the low extreme.
    pub fn encode_lower_bound(&self, bounds: &[ScanBound]) -> String {
        let mut out = String::with_capacity(self.string_length());
        for (i, field) in self.fields.iter().enumerate() {
            let bound = bounds.get(i).unwrap_or(&ScanBound::Min);
            match &field.kind {
                FieldKind::String { max_length } => match bound {
                    ScanBound::Value(value) => {
                        let text = value.as_str().unwrap_or("");
                        push_padded(&mut out, text, *max_length, ' ');
                    }
                    ScanBound::Min => push_padded(&mut out, "", *max_length, ' '),
                    ScanBound::Max => push_padded(&mut out, "", *max_length, INDEX_MAX_CHAR),
                },
                FieldKind::Boolean => match bound {
                    ScanBound::Value(value) => {
                        let flag = value.as_bool().unwrap_or(false);
                        out.push(if flag { '1' } else { '0' });
                    }
                    ScanBound::Min => out.push('0'),
                    ScanBound::Max => out.push('1'),
                },
                FieldKind::Number(lengths) => match bound {
                    ScanBound::Value(value) => match value.as_f64() {
                        Some(number) => push_number(&mut out, lengths, number),
                        None => push_fill(&mut out, '0', lengths.width()),
                    },
                    ScanBound::Min => push_fill(&mut out, '0', lengths.width()),
                    ScanBound::Max => push_number(&mut out, lengths, lengths.maximum),
                },
            }
        }
        out
    }

    /// End key for a scan from per-field upper bounds
    ///
    /// Bounds missing from the slice behave like [`ScanBound::Max`].
    /// A non-numeric bound value on a number field widens the scan to
    /// the high extreme.
    pub fn encode_upper_bound(&self, bounds: &[ScanBound]) -> String {
        let mut out = String::with_capacity(self.string_length());
        for (i, field) in self.fields.iter().enumerate() {
            let bound = bounds.get(i).unwrap_or(&ScanBound::Max);
            match &field.kind {
                FieldKind::String { max_length } => match bound {
                    ScanBound::Value(value) => {
                        let text = value.as_str().unwrap_or("");
                        push_padded(&mut out, text, *max_length, ' ');
                    }
                    ScanBound::Min => push_padded(&mut out, "", *max_length, ' '),
                    ScanBound::Max => push_padded(&mut out, "", *max_length, INDEX_MAX_CHAR),
                },
                FieldKind::Boolean => match bound {
                    ScanBound::Value(value) => {
                        let flag = value.as_bool().unwrap_or(false);
                        out.push(if flag { '1' } else { '0' });
                    }
                    ScanBound::Min => out.push('0'),
                    ScanBound::Max => out.push('1'),
                },
                FieldKind::Number(lengths) => match bound {
                    ScanBound::Value(value) => match value.as_f64() {
                        Some(number) => push_number(&mut out, lengths, number),
                        None => push_fill(&mut out, '9', lengths.width()),
                    },
                    ScanBound::Min => push_fill(&mut out, '0', lengths.width()),
                    ScanBound::Max => push_fill(&mut out, '9', lengths.width()),
                },
            }
        }
        out
    }

    /// Total character length of every string this codec produces
    pub fn string_length(&self) -> usize {
        self.fields
            .iter()
            .map(|field| match &field.kind {
                FieldKind::String { max_length } => *max_length,
                FieldKind::Boolean => 1,
                FieldKind::Number(lengths) => lengths.width(),
            })
            .sum()
    }

    /// Read the primary key back out of an index string
    ///
    /// Works because normalized indexes end on the primary key and
    /// primary values may not start or end with a space. Returns
    /// `None` when the last index field is not a string.
    pub fn recover_primary_key(&self, index_string: &str) -> Option<String> {
        let max_length = match &self.fields.last()?.kind {
            FieldKind::String { max_length } => *max_length,
            _ => return None,
        };
        let chars: Vec<char> = index_string.chars().collect();
        let start = chars.len().saturating_sub(max_length);
        let tail: String = chars[start..].iter().collect();
        Some(tail.trim().to_string())
    }
}

/// Shift an index string by one quantum of its last character
///
/// For storages that cannot express inclusive and exclusive bounds:
/// shifting an encoded bound by `+1` or `-1` turns one into the other.
pub fn shift_by_one_quantum(index_string: &str, direction: i32) -> String {
    let mut chars: Vec<char> = index_string.chars().collect();
    if let Some(last) = chars.pop() {
        let code = last as u32;
        let target = if direction >= 0 {
            (code + 1).min(char::MAX as u32)
        } else {
            code.saturating_sub(1)
        };
        // Stepping into the surrogate gap lands on its far edge
        let next = char::from_u32(target).unwrap_or(if direction >= 0 {
            '\u{e000}'
        } else {
            '\u{d7ff}'
        });
        chars.push(next);
    }
    chars.into_iter().collect()
}

/// Append `text` truncated and padded to exactly `width` characters
fn push_padded(out: &mut String, text: &str, width: usize, fill: char) {
    let mut count = 0;
    for c in text.chars().take(width) {
        out.push(c);
        count += 1;
    }
    for _ in count..width {
        out.push(fill);
    }
}

fn push_fill(out: &mut String, fill: char, width: usize) {
    for _ in 0..width {
        out.push(fill);
    }
}

/// Numeric encode per INDEX.md §3
///
/// The whole part is offset by the schema minimum and zero-padded. The
/// fraction digits come from the floor residual at multipleOf
/// precision, which keeps negative values in order.
fn push_number(out: &mut String, lengths: &NumberLengths, value: f64) {
    let clamped = value.clamp(lengths.minimum, lengths.maximum);
    let whole = (clamped.floor() - lengths.minimum) as u64;
    let _ = write!(out, "{:0>width$}", whole, width = lengths.non_decimals);

    if lengths.decimals > 0 {
        let scale = 10f64.powi(lengths.decimals as i32);
        let mut fraction = ((clamped - clamped.floor()) * scale).round() as u64;
        let top = scale as u64 - 1;
        if fraction > top {
            fraction = top;
        }
        let _ = write!(out, "{:0>width$}", fraction, width = lengths.decimals);
    }
}
