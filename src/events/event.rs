//! # Change Events
//!
//! Event types for document changes.
//!
//! Writes produce one event per affected document. Cached queries
//! consume these to keep their materialized results current without
//! re-running against storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Type of document change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
    /// New document inserted
    Insert,
    /// Existing document updated
    Update,
    /// Document deleted
    Delete,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventType::Insert => write!(f, "INSERT"),
            EventType::Update => write!(f, "UPDATE"),
            EventType::Delete => write!(f, "DELETE"),
        }
    }
}

/// Change event emitted after a write commits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Event type
    pub event_type: EventType,

    /// Primary key of the affected document
    pub document_id: String,

    /// Document state after the change (INSERT/UPDATE)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_data: Option<Value>,

    /// Document state before the change (UPDATE/DELETE)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_data: Option<Value>,

    /// Timestamp of the event
    pub timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    /// Create an INSERT event
    pub fn insert(document_id: impl Into<String>, data: Value) -> Self {
        Self {
            event_type: EventType::Insert,
            document_id: document_id.into(),
            new_data: Some(data),
            old_data: None,
            timestamp: Utc::now(),
        }
    }

    /// Create an UPDATE event
    pub fn update(document_id: impl Into<String>, old_data: Value, new_data: Value) -> Self {
        Self {
            event_type: EventType::Update,
            document_id: document_id.into(),
            new_data: Some(new_data),
            old_data: Some(old_data),
            timestamp: Utc::now(),
        }
    }

    /// Create a DELETE event
    pub fn delete(document_id: impl Into<String>, data: Value) -> Self {
        Self {
            event_type: EventType::Delete,
            document_id: document_id.into(),
            new_data: None,
            old_data: Some(data),
            timestamp: Utc::now(),
        }
    }

    /// Document state after this event, absent for deletes
    pub fn current(&self) -> Option<&Value> {
        self.new_data.as_ref()
    }

    /// Document state before this event, absent for inserts
    pub fn previous(&self) -> Option<&Value> {
        self.old_data.as_ref()
    }
}
