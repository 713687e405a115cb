//! Planner error types following ERRORS.md
//!
//! Error codes:
//! - LUMA_QUERY_INVALID_INDEX (REJECT)
//! - LUMA_INDEX_SCHEMA_TYPE (REJECT)

use std::fmt;

use crate::index::IndexError;

/// Severity levels for planner errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client request rejected
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Planner-specific error codes as defined in ERRORS.md
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerErrorCode {
    /// Explicitly requested index is not declared in the schema
    LumaQueryInvalidIndex,
    /// Winning index covers a field the codec cannot encode
    LumaIndexSchemaType,
}

impl PlannerErrorCode {
    /// Returns the string code as defined in ERRORS.md
    pub fn code(&self) -> &'static str {
        match self {
            PlannerErrorCode::LumaQueryInvalidIndex => "LUMA_QUERY_INVALID_INDEX",
            PlannerErrorCode::LumaIndexSchemaType => "LUMA_INDEX_SCHEMA_TYPE",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for PlannerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Planner error type with full context
#[derive(Debug, Clone)]
pub struct PlannerError {
    /// Error code
    code: PlannerErrorCode,
    /// Human-readable message
    message: String,
    /// Field name if applicable
    field: Option<String>,
}

impl PlannerError {
    /// Create an invalid index error
    pub fn invalid_index(index: impl Into<String>) -> Self {
        Self {
            code: PlannerErrorCode::LumaQueryInvalidIndex,
            message: format!(
                "Index {} is neither declared in the schema nor the primary index",
                index.into()
            ),
            field: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> PlannerErrorCode {
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

    /// Returns the field name if applicable
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }
}

impl From<IndexError> for PlannerError {
    fn from(err: IndexError) -> Self {
        Self {
            code: PlannerErrorCode::LumaIndexSchemaType,
            message: err.message().to_string(),
            field: err.field().map(str::to_string),
        }
    }
}

impl fmt::Display for PlannerError {
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

impl std::error::Error for PlannerError {}

/// Result type for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;
