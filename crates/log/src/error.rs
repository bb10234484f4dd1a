//! Logging setup errors

use thiserror::Error;

/// Errors raised while building or installing a logger
#[derive(Debug, Error)]
pub enum LogError {
    /// The level filter could not be parsed
    #[error("Invalid filter '{filter}': {reason}")]
    Filter { filter: String, reason: String },

    /// Unknown output format name
    #[error("Unknown log format '{0}', expected one of: pretty, compact, json")]
    Format(String),

    /// A global subscriber is already installed
    #[error("Logger initialization failed: {0}")]
    Init(String),
}

/// Result type for logging setup
pub type LogResult<T> = Result<T, LogError>;
