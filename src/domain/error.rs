//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

/// Rejections of command input.
///
/// These are local to one request and never touch shared state.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// A required text field was empty or whitespace
    #[error("{field} must not be blank")]
    Blank { field: &'static str },

    /// Email address failed the shape check
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    /// Business rule violation
    #[error("Business rule violation: {0}")]
    BusinessRuleViolation(String),
}

impl DomainError {
    /// Create a blank field error
    pub fn blank(field: &'static str) -> Self {
        Self::Blank { field }
    }

    /// Reject blank text, returning the trimmed value otherwise
    pub fn require_text(field: &'static str, value: &str) -> Result<String, Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(Self::blank(field));
        }
        Ok(trimmed.to_string())
    }
}
