//! # Collection Errors
//!
//! Umbrella error type for the collection surface. The subsystem
//! errors keep their own codes; this type only routes them upward.

use thiserror::Error;

use crate::document::DocumentError;
use crate::planner::PlannerError;
use crate::query::QueryError;
use crate::schema::SchemaError;

/// Result type for collection operations
pub type CollectionResult<T> = Result<T, CollectionError>;

/// Errors surfaced by a collection handle
#[derive(Debug, Clone, Error)]
pub enum CollectionError {
    /// Schema rejected at construction
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Query rejected during normalization
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Planning failed
    #[error(transparent)]
    Planner(#[from] PlannerError),

    /// Document vtable composition failed
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Operation on a destroyed collection handle
    #[error("Collection '{0}' is destroyed")]
    Destroyed(String),
}

impl CollectionError {
    /// Returns the stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            CollectionError::Schema(err) => err.code().code(),
            CollectionError::Query(err) => err.code().code(),
            CollectionError::Planner(err) => err.code().code(),
            CollectionError::Document(err) => err.code().code(),
            CollectionError::Destroyed(_) => "LUMA_COLLECTION_DESTROYED",
        }
    }
}
