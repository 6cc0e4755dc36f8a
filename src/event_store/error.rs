//! Event Store Errors
//!
//! Error types for event store operations.

use crate::domain::{DecodeError, Resource, ResourceVersion};

/// Errors that can occur in the event store
#[derive(Debug, thiserror::Error)]
pub enum EventStoreError {
    /// Another writer already took the version slot this commit aimed for
    #[error("Concurrency conflict for {resource}: expected version {expected}, but it has moved on")]
    ConcurrencyConflict {
        resource: Resource,
        expected: ResourceVersion,
    },

    /// A stored row no longer matches any known event shape
    #[error("Undecodable event {event_id}: {source}")]
    Decode {
        event_id: String,
        #[source]
        source: DecodeError,
    },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Non-database backend failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// The conditional insert touched more than one row
    #[error("Conditional insert affected {0} rows")]
    UnexpectedRowCount(u64),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EventStoreError {
    /// Check if this error is a concurrency conflict
    pub fn is_concurrency_conflict(&self) -> bool {
        matches!(self, EventStoreError::ConcurrencyConflict { .. })
    }

    /// Check if the stored log is corrupt
    pub fn is_decode_error(&self) -> bool {
        matches!(self, EventStoreError::Decode { .. })
    }

    /// Check if a caller could reasonably retry
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EventStoreError::ConcurrencyConflict { .. }
                | EventStoreError::Database(_)
                | EventStoreError::Storage(_)
        )
    }
}
