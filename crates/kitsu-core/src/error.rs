//! Error types for the history synchronization layer
//!
//! Two levels: `ValidationError` for input rejection that happens entirely
//! locally (before any network call), and `Error` for everything a sync
//! operation can surface.

use thiserror::Error;

/// Result type alias for sync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Rejection reasons produced by the URL validator
///
/// These never reach the network: they are resolved by the manager before a
/// request is constructed. Each variant's display string is the user-facing
/// message shown by the presentation layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Input was empty after trimming
    #[error("Please enter a URL")]
    Empty,

    /// Input contained whitespace or failed to parse as an absolute URL
    #[error("Please enter a valid URL")]
    Malformed,

    /// Input parsed, but its scheme is not http or https
    #[error("Please enter a valid URL (must start with http:// or https://)")]
    UnsupportedScheme(String),
}

/// Core error type for the sync layer
#[derive(Error, Debug)]
pub enum Error {
    /// Input rejected by the validator (local, pre-network)
    #[error("Invalid URL: {0}")]
    Validation(#[from] ValidationError),

    /// Remote call did not return the expected success status
    #[error("Network error: {0}")]
    Network(String),

    /// Local persistence read/write failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Whether this error was resolved locally, without a network attempt
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
