//! Scan error types
//!
//! Failures raised by collaborators and by the orchestration around them.

use keycycle_lifecycle::LifecycleError;
use thiserror::Error;

/// Errors that can occur while scanning an account
#[derive(Debug, Error)]
pub enum ScanError {
    /// A credential-store call failed
    #[error("Credential store {operation} failed for {target}: {reason}")]
    Store {
        operation: &'static str,
        target: String,
        reason: String,
    },

    /// Publishing an issued secret failed
    #[error("Secret publication failed for {target}: {reason}")]
    Secret { target: String, reason: String },

    /// Exemption lookup failed
    #[error("Exemption lookup failed for account {account}: {reason}")]
    Exemption { account: String, reason: String },

    /// Notification delivery failed
    #[error("Notification to {recipient} failed: {reason}")]
    Notification { recipient: String, reason: String },

    /// Retries exhausted
    #[error("Max retries ({max_attempts}) exceeded for {operation}")]
    MaxRetriesExceeded {
        operation: String,
        max_attempts: u32,
    },

    /// Credential set or policy rejected by the engine
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

impl ScanError {
    /// Create a credential-store error
    pub fn store(
        operation: &'static str,
        target: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Store {
            operation,
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// Check if retrying the same call may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Notification { .. } | Self::Store { .. })
    }
}

/// Result type for scan operations
pub type ScanResult<T> = Result<T, ScanError>;
