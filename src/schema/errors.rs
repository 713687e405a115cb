//! Schema error types following ERRORS.md specification
//!
//! Error codes:
//! - LUMA_SCHEMA_PRIMARY_KEY_INVALID (REJECT)
//! - LUMA_SCHEMA_UNKNOWN_FIELD (REJECT)
//! - LUMA_SCHEMA_FIELD_NOT_INDEXABLE (REJECT)

use std::fmt;

/// Severity levels for schema errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Schema rejected at construction
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Schema-specific error codes as defined in ERRORS.md
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Primary key missing, not a string, or without a maximum length
    LumaSchemaPrimaryKeyInvalid,
    /// An index references a field the schema does not declare
    LumaSchemaUnknownField,
    /// An indexed field has a type or bounds the index codec cannot encode
    LumaSchemaFieldNotIndexable,
}

impl SchemaErrorCode {
    /// Returns the string code as defined in ERRORS.md
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::LumaSchemaPrimaryKeyInvalid => "LUMA_SCHEMA_PRIMARY_KEY_INVALID",
            SchemaErrorCode::LumaSchemaUnknownField => "LUMA_SCHEMA_UNKNOWN_FIELD",
            SchemaErrorCode::LumaSchemaFieldNotIndexable => "LUMA_SCHEMA_FIELD_NOT_INDEXABLE",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error type with full context
#[derive(Debug, Clone)]
pub struct SchemaError {
    /// Error code
    code: SchemaErrorCode,
    /// Human-readable message
    message: String,
    /// Field path if applicable
    field: Option<String>,
}

impl SchemaError {
    /// Create a primary key invalid error
    pub fn primary_key_invalid(reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::LumaSchemaPrimaryKeyInvalid,
            message: reason.into(),
            field: None,
        }
    }

    /// Create an unknown field error
    pub fn unknown_field(field: impl Into<String>) -> Self {
        let f = field.into();
        Self {
            code: SchemaErrorCode::LumaSchemaUnknownField,
            message: format!("Index references undeclared field '{}'", f),
            field: Some(f),
        }
    }

    /// Create a field not indexable error
    pub fn field_not_indexable(field: impl Into<String>, reason: impl Into<String>) -> Self {
        let f = field.into();
        Self {
            code: SchemaErrorCode::LumaSchemaFieldNotIndexable,
            message: format!("Field '{}' cannot be indexed: {}", f, reason.into()),
            field: Some(f),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the field path if applicable
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
