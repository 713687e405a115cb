//! Schema type definitions per SCHEMA.md
//!
//! Supported types:
//! - string: UTF-8 string, indexable when a maxLength is declared
//! - number: 64-bit floating point with declared bounds and precision
//! - integer: number constrained to whole values
//! - boolean: Boolean
//! - object: Nested object with field schema
//!
//! Schemas are declared in JSON. A schema built through
//! [`CollectionSchema::new`] is validated and normalized; a schema
//! deserialized directly is neither, which is why the index codec and
//! the planner re-check what they depend on.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

use super::errors::{SchemaError, SchemaResult};

/// Supported field types as defined in SCHEMA.md §2
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldType {
    /// UTF-8 string
    String {
        /// Maximum length in characters, required for indexed fields
        #[serde(rename = "maxLength", default, skip_serializing_if = "Option::is_none")]
        max_length: Option<u32>,
    },
    /// 64-bit floating point
    Number {
        /// Smallest allowed value, required for indexed fields
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum: Option<f64>,
        /// Largest allowed value, required for indexed fields
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maximum: Option<f64>,
        /// Value granularity, determines the encoded decimal precision
        #[serde(rename = "multipleOf", default, skip_serializing_if = "Option::is_none")]
        multiple_of: Option<f64>,
    },
    /// Number constrained to whole values
    Integer {
        /// Smallest allowed value, required for indexed fields
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum: Option<f64>,
        /// Largest allowed value, required for indexed fields
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maximum: Option<f64>,
        /// Value granularity, defaults to 1 for integers
        #[serde(rename = "multipleOf", default, skip_serializing_if = "Option::is_none")]
        multiple_of: Option<f64>,
    },
    /// Boolean
    Boolean,
    /// Nested object with its own field schema
    Object {
        /// Nested field definitions
        #[serde(default)]
        fields: HashMap<String, FieldType>,
    },
}

impl FieldType {
    /// Create a string field with a maximum length
    pub fn string(max_length: u32) -> Self {
        FieldType::String {
            max_length: Some(max_length),
        }
    }

    /// Create a string field without a maximum length (not indexable)
    pub fn unbounded_string() -> Self {
        FieldType::String { max_length: None }
    }

    /// Create a number field with full index bounds
    pub fn number(minimum: f64, maximum: f64, multiple_of: f64) -> Self {
        FieldType::Number {
            minimum: Some(minimum),
            maximum: Some(maximum),
            multiple_of: Some(multiple_of),
        }
    }

    /// Create an integer field with full index bounds
    pub fn integer(minimum: i64, maximum: i64) -> Self {
        FieldType::Integer {
            minimum: Some(minimum as f64),
            maximum: Some(maximum as f64),
            multiple_of: Some(1.0),
        }
    }

    /// Create a boolean field
    pub fn boolean() -> Self {
        FieldType::Boolean
    }

    /// Create a nested object field
    pub fn object(fields: HashMap<String, FieldType>) -> Self {
        FieldType::Object { fields }
    }

    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String { .. } => "string",
            FieldType::Number { .. } => "number",
            FieldType::Integer { .. } => "integer",
            FieldType::Boolean => "boolean",
            FieldType::Object { .. } => "object",
        }
    }
}

/// An index over an ordered list of field paths
///
/// Serialized as a plain array of paths, the way schemas declare it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexDef {
    /// Field paths in index order
    pub fields: Vec<String>,
}

impl IndexDef {
    /// Create an index over the given field paths
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// Create a single-field index
    pub fn single(field: impl Into<String>) -> Self {
        Self {
            fields: vec![field.into()],
        }
    }

    /// Whether the index covers the given field path
    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    /// Number of fields in the index
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the index has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Vec<&str>> for IndexDef {
    fn from(fields: Vec<&str>) -> Self {
        Self::new(fields.into_iter().map(str::to_string).collect())
    }
}

impl fmt::Display for IndexDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.fields.join(","))
    }
}

/// Complete collection schema as per SCHEMA.md §1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSchema {
    /// Name of the field holding the document identity
    pub primary_key: String,
    /// Schema version (monotonic)
    #[serde(default)]
    pub version: u32,
    /// Field definitions
    pub fields: HashMap<String, FieldType>,
    /// Declared indexes
    #[serde(default)]
    pub indexes: Vec<IndexDef>,
}

impl CollectionSchema {
    /// Create a validated, normalized schema
    ///
    /// Validation rejects a primary key that is missing, non-string or
    /// without a maxLength, and any index field that is undeclared or
    /// not encodable. Normalization appends the primary key to every
    /// index that lacks it, so every index scan ends on a unique field.
    pub fn new(
        primary_key: impl Into<String>,
        fields: HashMap<String, FieldType>,
        indexes: Vec<IndexDef>,
    ) -> SchemaResult<Self> {
        let mut schema = Self {
            primary_key: primary_key.into(),
            version: 0,
            fields,
            indexes,
        };
        schema.validate()?;
        schema.normalize_indexes();
        Ok(schema)
    }

    /// Validates the schema structure itself (not a document)
    pub fn validate(&self) -> SchemaResult<()> {
        match self.fields.get(&self.primary_key) {
            None => {
                return Err(SchemaError::primary_key_invalid(format!(
                    "primary key field '{}' is not declared",
                    self.primary_key
                )))
            }
            Some(FieldType::String {
                max_length: Some(_),
            }) => {}
            Some(FieldType::String { max_length: None }) => {
                return Err(SchemaError::primary_key_invalid(format!(
                    "primary key field '{}' has no maxLength",
                    self.primary_key
                )))
            }
            Some(other) => {
                return Err(SchemaError::primary_key_invalid(format!(
                    "primary key field '{}' must be a string, got {}",
                    self.primary_key,
                    other.type_name()
                )))
            }
        }

        for index in &self.indexes {
            for field in &index.fields {
                let field_type = self
                    .field_at(field)
                    .ok_or_else(|| SchemaError::unknown_field(field))?;
                Self::check_indexable(field, field_type)?;
            }
        }

        Ok(())
    }

    /// Whether a field type carries everything the index codec needs
    fn check_indexable(field: &str, field_type: &FieldType) -> SchemaResult<()> {
        match field_type {
            FieldType::String {
                max_length: Some(_),
            } => Ok(()),
            FieldType::String { max_length: None } => Err(SchemaError::field_not_indexable(
                field,
                "string fields need maxLength",
            )),
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
                if minimum.is_none() {
                    Err(SchemaError::field_not_indexable(field, "missing minimum"))
                } else if maximum.is_none() {
                    Err(SchemaError::field_not_indexable(field, "missing maximum"))
                } else if multiple_of.is_none() {
                    Err(SchemaError::field_not_indexable(field, "missing multipleOf"))
                } else {
                    Ok(())
                }
            }
            FieldType::Boolean => Ok(()),
            FieldType::Object { .. } => Err(SchemaError::field_not_indexable(
                field,
                "object fields cannot be indexed directly",
            )),
        }
    }

    /// Append the primary key to every index that lacks it
    fn normalize_indexes(&mut self) {
        for index in &mut self.indexes {
            if !index.contains(&self.primary_key) {
                index.fields.push(self.primary_key.clone());
            }
        }
    }

    /// Resolve a dotted field path to its declared type
    pub fn field_at(&self, path: &str) -> Option<&FieldType> {
        let mut segments = path.split('.');
        let mut current = self.fields.get(segments.next()?)?;
        for segment in segments {
            match current {
                FieldType::Object { fields } => current = fields.get(segment)?,
                _ => return None,
            }
        }
        Some(current)
    }

    /// Maximum length of the primary key field
    pub fn primary_key_max_length(&self) -> Option<u32> {
        match self.fields.get(&self.primary_key) {
            Some(FieldType::String { max_length }) => *max_length,
            _ => None,
        }
    }

    /// The implicit single-field index over the primary key
    pub fn primary_index(&self) -> IndexDef {
        IndexDef::single(self.primary_key.clone())
    }

    /// Extract the primary key value of a document
    pub fn primary_key_of<'a>(&self, doc: &'a Value) -> Option<&'a str> {
        doc.get(&self.primary_key)?.as_str()
    }
}
