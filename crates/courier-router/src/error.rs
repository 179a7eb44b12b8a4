//! Errors accumulated on an execution context during dispatch.

use std::any::Any;

use courier_core::ApiError;
use thiserror::Error;

/// Boxed error raised by handler business logic.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An error recorded while running a handler chain.
///
/// Dispatch errors never stop the chain by themselves; they are appended to
/// the context and handed back in the dispatch outcome.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A platform call was made on a router configured without a client.
    #[error("client is not set, configure the router with Router::with_client")]
    ClientNotSet,

    /// A platform call failed.
    #[error("{method} failed: {source}")]
    Api {
        method: &'static str,
        #[source]
        source: ApiError,
    },

    /// The helper does not apply to this kind of update.
    #[error("unsupported update: {0}")]
    Unsupported(&'static str),

    /// The update lacks a field the helper needs.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// A handler panicked.
    #[error("handler panicked: {0}")]
    Panic(String),

    /// An error raised by handler logic.
    #[error(transparent)]
    Handler(BoxError),

    #[error("{0}")]
    Custom(String),
}

impl DispatchError {
    /// Wraps an arbitrary handler error.
    pub fn handler(err: impl Into<BoxError>) -> Self {
        Self::Handler(err.into())
    }

    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }

    /// Returns `true` for a caught panic.
    pub fn is_panic(&self) -> bool {
        matches!(self, Self::Panic(_))
    }

    /// Converts a panic payload into an error.
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());
        Self::Panic(message)
    }
}

/// Result type for context operations.
pub type DispatchResult<T> = Result<T, DispatchError>;
