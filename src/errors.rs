//! Unified error types for the records engine.
//!
//! Every failure in the engine is local to the operation that raised it. Collaborator
//! failures are retryable by the user; validation failures never leave the process.

use thiserror::Error;

/// Errors raised by the aggregation, capture, approval and export layers.
#[derive(Debug, Error)]
pub enum Error {
    /// The remote API could not serve the request (network, outage, rejected call).
    #[error("{operation} failed: {message}")]
    CollaboratorUnavailable {
        /// Which collaborator call failed
        operation: &'static str,
        /// Message reported by the transport
        message: String,
    },

    /// A record is missing required fields and was left out of aggregation.
    #[error("Malformed record {id}: {reason}")]
    MalformedRecord {
        /// Record identifier, or its position in the feed when the id is missing
        id: String,
        /// What was wrong with it
        reason: String,
    },

    /// Input rejected locally before reaching the collaborator.
    #[error("Validation failed: {message}")]
    Validation {
        /// Description of the rejected input
        message: String,
    },

    /// The capture workflow was asked for a transition its current state forbids.
    #[error("Cannot {action} while in {state}")]
    InvalidTransition {
        /// Name of the state the workflow is in
        state: &'static str,
        /// The rejected action
        action: &'static str,
    },

    /// A collaborator call is already in flight for this workflow.
    #[error("{operation} is already in progress")]
    Busy {
        /// The outstanding call
        operation: &'static str,
    },

    /// Configuration file or environment could not be used.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// I/O error while reading feeds or writing reports.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON feed could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::CollaboratorUnavailable`].
    pub fn unavailable(operation: &'static str, message: impl Into<String>) -> Self {
        Self::CollaboratorUnavailable {
            operation,
            message: message.into(),
        }
    }

    /// Whether the user can simply retry the failed operation.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::CollaboratorUnavailable { .. })
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
