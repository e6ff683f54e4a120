use thiserror::Error;

use spotify_native::NativeError;

/// Errors surfaced synchronously by the session layer.
///
/// Asynchronous outcomes (login failure, connection loss, search failure)
/// never appear here; they arrive through the event listeners.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The native library rejected a call outright
    #[error("native library error: {0}")]
    Native(#[from] NativeError),

    /// A login attempt is already in flight
    #[error("a login attempt is already in progress")]
    LoginInProgress,

    /// Search construction got more positional arguments than
    /// query + offset + limit
    #[error("search accepts a query plus at most offset and limit, got {given} numeric arguments")]
    InvalidSearchArguments { given: usize },

    /// The search was already issued; a request object executes once
    #[error("search has already been executed")]
    SearchAlreadyExecuted,

    /// Configuration failed validation
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

/// Result type for session-layer operations
pub type Result<T> = std::result::Result<T, SessionError>;
