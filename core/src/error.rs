//! Error types shared by every ticketing operation.

use crate::types::{EventId, TransactionStatus};
use thiserror::Error;

/// Result type for ticketing operations
pub type Result<T> = std::result::Result<T, TicketingError>;

/// Errors surfaced by the reservation, payment, catalog and identity layers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TicketingError {
    /// Referenced event, transaction or user does not exist
    #[error("{resource} not found: {id}")]
    NotFound {
        /// Kind of resource ("Event", "Transaction", "User")
        resource: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// Operation requires an authenticated caller
    #[error("Authentication required")]
    Unauthorized,

    /// Caller is authenticated but not allowed to perform the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Event has no ticket left
    #[error("Event {event_id} is sold out")]
    OutOfStock {
        /// Event that ran out
        event_id: EventId,
    },

    /// Input rejected by a validation rule
    #[error("{0}")]
    Validation(String),

    /// Transition attempted from a terminal status
    #[error("Cannot move transaction from {from} to {to}")]
    InvalidStateTransition {
        /// Status the transaction is in
        from: TransactionStatus,
        /// Status the transition would have produced
        to: TransactionStatus,
    },

    /// Backing store failed
    #[error("Storage error: {0}")]
    Storage(String),
}

impl TicketingError {
    /// Create a not-found error
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Whether the error was caused by the caller rather than the system.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}
