//! Shared error types for the application

use crate::core::EscalationStatus;
use thiserror::Error;
use uuid::Uuid;

/// Main error type for careguard operations
#[derive(Debug, Error)]
pub enum Error {
    /// A required input field was absent or malformed
    #[error("Missing required input: {field}")]
    MissingInput { field: String },

    /// A component input source failed or was unavailable.
    ///
    /// Scoring recovers from this locally with documented defaults; the
    /// variant exists for input adapters that want to surface the failure
    /// to their own callers.
    #[error("Collaborator unavailable for {component}: {reason}")]
    CollaboratorUnavailable { component: String, reason: String },

    /// An operation referenced an unknown escalation id
    #[error("Escalation {escalation_id} not found")]
    NotFound { escalation_id: Uuid },

    /// An operation attempted an illegal state change
    #[error("Cannot {operation} escalation {escalation_id} in status {status:?}")]
    InvalidTransition {
        escalation_id: Uuid,
        status: EscalationStatus,
        operation: &'static str,
    },

    /// Trend or rate computations requested with too few data points
    #[error("Insufficient history: {required} data points required, {actual} available")]
    InsufficientHistory { required: usize, actual: usize },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a missing-input error for a named field
    pub fn missing_input(field: impl Into<String>) -> Self {
        Self::MissingInput {
            field: field.into(),
        }
    }

    /// Create a collaborator-unavailable error for a named component
    pub fn collaborator_unavailable(
        component: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::CollaboratorUnavailable {
            component: component.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;
