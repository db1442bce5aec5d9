//! Error types for jsonkv
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using JsonKvError
pub type Result<T> = std::result::Result<T, JsonKvError>;

/// Unified error type for jsonkv operations
#[derive(Debug, Error)]
pub enum JsonKvError {
    // -------------------------------------------------------------------------
    // Caller Errors (raised before any network I/O)
    // -------------------------------------------------------------------------
    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("Command error: {0}")]
    Command(String),

    #[error("Batch aborted at command {index}: {message}")]
    Batch { index: usize, message: String },

    // -------------------------------------------------------------------------
    // Local Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl JsonKvError {
    /// True for connection-level failures the caller may want to retry
    pub fn is_transport(&self) -> bool {
        matches!(self, JsonKvError::Transport(_) | JsonKvError::Protocol(_))
    }

    /// Index of the offending command for batch failures
    pub fn batch_index(&self) -> Option<usize> {
        match self {
            JsonKvError::Batch { index, .. } => Some(*index),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for JsonKvError {
    fn from(err: serde_json::Error) -> Self {
        JsonKvError::Encoding(err.to_string())
    }
}
