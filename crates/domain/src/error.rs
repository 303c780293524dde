//! Unified error types for the domain layer
//!
//! Value objects built from author-supplied configuration (kwargs, content
//! files, token claims) report failures through `DomainError` so the engine
//! can log them uniformly and route the player to `FSM_ERROR`.

use thiserror::Error;

use crate::expr::ExprError;
use crate::otp::OtpError;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),

    /// A required configuration key is absent
    #[error("Missing configuration key: {0}")]
    MissingKey(&'static str),
}

impl DomainError {
    /// Creates a validation error for rejected configuration values.
    ///
    /// # Example
    /// ```ignore
    /// if delay_ms < 0.0 {
    ///     return Err(DomainError::validation("delay must not be negative"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a missing key error
    pub fn missing_key(key: &'static str) -> Self {
        Self::MissingKey(key)
    }
}

impl From<OtpError> for DomainError {
    fn from(err: OtpError) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<ExprError> for DomainError {
    fn from(err: ExprError) -> Self {
        Self::Parse(err.to_string())
    }
}
