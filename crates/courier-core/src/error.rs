//! Error types shared by the Courier crates.
//!
//! Dispatch-level errors (the ones accumulated on an execution context) live
//! in `courier-router`; this module only covers what the leaf types can fail with.

use thiserror::Error;

// =============================================================================
// Pattern Errors
// =============================================================================

/// Errors produced when compiling a command pattern.
///
/// Patterns are compiled while the router is being configured, so these are
/// configuration errors: they surface at registration time, never at match time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// The pattern contains more than one end anchor.
    #[error("invalid pattern: more than one $ in pattern: {0}")]
    MultipleAnchors(String),

    /// The pattern text is empty.
    #[error("invalid pattern: empty pattern")]
    Empty,
}

// =============================================================================
// API Errors
// =============================================================================

/// Error type for calls made against the bot platform API.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The client does not implement the requested method.
    #[error("API method '{0}' is not supported by this client")]
    NotSupported(String),

    /// The platform rejected the call.
    #[error("API error ({code}): {description}")]
    Api { code: i64, description: String },

    /// Failed to serialize parameters or deserialize the result.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The underlying transport failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for API calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type for pattern compilation.
pub type PatternResult<T> = Result<T, PatternError>;
