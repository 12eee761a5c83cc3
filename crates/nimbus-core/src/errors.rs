//! Unified error system for Nimbus core
//!
//! A single error enum covers every failure class the reconciliation engine
//! can observe, so callers branch on variants instead of string matching.

use serde::{Deserialize, Serialize};

/// Unified error type for all Nimbus operations
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum NimbusError {
    /// Invalid input or configuration
    #[error("Invalid: {message}")]
    Invalid {
        /// Error message describing the invalid input
        message: String,
    },

    /// Resource not found
    #[error("Not found: {message}")]
    NotFound {
        /// Error message describing what was not found
        message: String,
    },

    /// The remote reported a concurrent mutation of the same resource.
    /// Retryable: re-reading current state and recomputing the delta
    /// recovers from this class of failure.
    #[error("Conflicting operation: {message}")]
    Conflict {
        /// Error message describing the conflicting write
        message: String,
    },

    /// Remote API call failed
    #[error("API error: {message}")]
    Api {
        /// Error message describing the remote failure
        message: String,
    },

    /// A batched update failed after earlier batches committed. The
    /// committed work is not rolled back; re-running reconciliation
    /// recomputes the delta from actual remote state.
    #[error(
        "Partial apply: {committed_deltas} deltas in {committed_batches} batches committed, then: {message}"
    )]
    PartialApply {
        /// Number of batches fully committed before the failure
        committed_batches: usize,
        /// Number of deltas contained in the committed batches
        committed_deltas: usize,
        /// The failure that stopped the remaining batches
        message: String,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Error message describing the internal error
        message: String,
    },
}

impl NimbusError {
    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a conflicting-operation error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create a remote API error
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a partial-apply error recording committed work
    pub fn partial_apply(
        committed_batches: usize,
        committed_deltas: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::PartialApply {
            committed_batches,
            committed_deltas,
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// True for the transient conflict class that the orchestrator retries
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// True when the target resource no longer exists
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Standard Result type for Nimbus operations
pub type Result<T> = std::result::Result<T, NimbusError>;

impl From<std::io::Error> for NimbusError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::not_found(err.to_string()),
            _ => Self::internal(err.to_string()),
        }
    }
}
