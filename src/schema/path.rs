//! Dotted field paths per SCHEMA.md
//!
//! Index fields and selector fields address document values by dotted
//! path ("address.city"). Paths are parsed once and reused, since the
//! codec and the planner resolve the same paths on every document.

use std::fmt;

use serde_json::Value;

/// A parsed dotted field path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    raw: String,
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a dotted path into its segments
    pub fn parse(path: impl Into<String>) -> Self {
        let raw = path.into();
        let segments = raw.split('.').map(str::to_string).collect();
        Self { raw, segments }
    }

    /// The original dotted form
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The path segments in order
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Resolve the path against a document
    ///
    /// Returns `None` when any segment is missing or a non-object value
    /// is traversed before the last segment.
    pub fn get<'a>(&self, doc: &'a Value) -> Option<&'a Value> {
        let mut current = doc;
        for segment in &self.segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
