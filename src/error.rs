//! Error handling module
//!
//! Centralized error type for command handling, with a stable machine-readable
//! code per variant for collaborators that render errors.

use crate::config::ConfigError;
use crate::domain::{DomainError, Resource};
use crate::event_store::EventStoreError;
use crate::projection::ProjectionError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error("Unauthorized: no actor supplied")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("{resource} has changed since it was loaded")]
    ConcurrencyConflict { resource: Resource },

    // Server errors
    #[error("Event log is corrupt: {0}")]
    CorruptLog(EventStoreError),

    #[error("Storage error: {0}")]
    Storage(EventStoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<EventStoreError> for AppError {
    fn from(err: EventStoreError) -> Self {
        match err {
            EventStoreError::ConcurrencyConflict { resource, .. } => {
                AppError::ConcurrencyConflict { resource }
            }
            err @ EventStoreError::Decode { .. } => AppError::CorruptLog(err),
            err => AppError::Storage(err),
        }
    }
}

impl From<ProjectionError> for AppError {
    fn from(err: ProjectionError) -> Self {
        match err {
            ProjectionError::EventStore(err) => err.into(),
        }
    }
}

impl AppError {
    /// Stable code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "bad_request",
            AppError::Validation(_) => "validation_failed",
            AppError::Unauthorized => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::ConcurrencyConflict { .. } => "concurrency_conflict",
            AppError::CorruptLog(_) => "corrupt_event_log",
            AppError::Storage(_) => "storage_error",
            AppError::Config(_) => "config_error",
        }
    }

    /// Check if this is a client error (caller's fault)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::BadRequest(_)
                | AppError::Validation(_)
                | AppError::Unauthorized
                | AppError::Forbidden(_)
                | AppError::ConcurrencyConflict { .. }
        )
    }

    /// Check if reloading and retrying could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::ConcurrencyConflict { .. } => true,
            AppError::Storage(err) => err.is_retryable(),
            _ => false,
        }
    }
}
