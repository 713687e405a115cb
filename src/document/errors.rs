//! Document error types following ERRORS.md specification
//!
//! Error codes:
//! - LUMA_DOCUMENT_RESERVED_NAME (REJECT)
//! - LUMA_DOCUMENT_FIELD_COLLISION (REJECT)

use std::fmt;

/// Severity levels for document errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Vtable composition rejected
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Document-specific error codes as defined in ERRORS.md
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentErrorCode {
    /// A user method name is reserved for base document operations
    LumaDocumentReservedName,
    /// A user method name shadows a schema-declared field accessor
    LumaDocumentFieldCollision,
}

impl DocumentErrorCode {
    /// Returns the string code as defined in ERRORS.md
    pub fn code(&self) -> &'static str {
        match self {
            DocumentErrorCode::LumaDocumentReservedName => "LUMA_DOCUMENT_RESERVED_NAME",
            DocumentErrorCode::LumaDocumentFieldCollision => "LUMA_DOCUMENT_FIELD_COLLISION",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for DocumentErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Document error type with full context
#[derive(Debug, Clone)]
pub struct DocumentError {
    /// Error code
    code: DocumentErrorCode,
    /// Human-readable message
    message: String,
    /// Offending method name
    name: Option<String>,
}

impl DocumentError {
    /// Create a reserved name error
    pub fn reserved_name(name: impl Into<String>) -> Self {
        let n = name.into();
        Self {
            code: DocumentErrorCode::LumaDocumentReservedName,
            message: format!("Method name '{}' is reserved for document operations", n),
            name: Some(n),
        }
    }

    /// Create a field collision error
    pub fn field_collision(name: impl Into<String>) -> Self {
        let n = name.into();
        Self {
            code: DocumentErrorCode::LumaDocumentFieldCollision,
            message: format!("Method name '{}' shadows a schema field accessor", n),
            name: Some(n),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> DocumentErrorCode {
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

    /// Returns the offending method name if applicable
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl fmt::Display for DocumentError {
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

impl std::error::Error for DocumentError {}

/// Result type for document operations
pub type DocumentResult<T> = Result<T, DocumentError>;
