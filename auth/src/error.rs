//! Error types for account and session operations.

use thiserror::Error;
use ticketing_core::TicketingError;

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Failure modes of registration, login and session handling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    // ═══════════════════════════════════════════════════════════
    // Authentication Errors
    // ═══════════════════════════════════════════════════════════

    /// Unknown email or wrong password. Both produce the same message.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Registration input rejected.
    #[error("{0}")]
    Validation(String),

    // ═══════════════════════════════════════════════════════════
    // Session Errors
    // ═══════════════════════════════════════════════════════════

    /// Session not found.
    #[error("Session not found")]
    SessionNotFound,

    /// Session has expired.
    #[error("Session has expired")]
    SessionExpired,

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// Session (de)serialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Password hashing failed.
    #[error("Password hashing error: {0}")]
    HashingError(String),

    /// Backing store failed.
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    /// Check if this error was caused by user input.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials
                | Self::Validation(_)
                | Self::SessionNotFound
                | Self::SessionExpired
        )
    }
}

impl From<TicketingError> for AuthError {
    fn from(err: TicketingError) -> Self {
        match err {
            TicketingError::Validation(message) => Self::Validation(message),
            other => Self::InternalError(other.to_string()),
        }
    }
}
