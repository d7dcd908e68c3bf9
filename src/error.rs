//! Error types for dbx-bridge.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for dbx-bridge operations.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Network-level failures (host unreachable, timeouts, TLS, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// The workspace rejected the token (401/403).
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Any other non-success response from the workspace API.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// A SQL statement finished in a state other than SUCCEEDED.
    #[error("{message}")]
    Statement {
        state: String,
        message: String,
        statement_id: Option<String>,
    },

    /// Row data in a statement result could not be read.
    #[error("Normalization error: {0}")]
    Normalization(String),

    /// Configuration errors (invalid config file, missing host or token, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local file system errors.
    #[error("I/O error: {0}")]
    Io(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates an authentication error with the given message.
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Creates an API error for the given HTTP status.
    pub fn api(status: u16, msg: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: msg.into(),
        }
    }

    /// Creates a normalization error with the given message.
    pub fn normalization(msg: impl Into<String>) -> Self {
        Self::Normalization(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an I/O error with the given message.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the statement id attached to this error, if any.
    pub fn statement_id(&self) -> Option<&str> {
        match self {
            Self::Statement { statement_id, .. } => statement_id.as_deref(),
            _ => None,
        }
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Error",
            Self::Auth(_) => "Authentication Error",
            Self::Api { .. } => "API Error",
            Self::Statement { .. } => "Statement Error",
            Self::Normalization(_) => "Normalization Error",
            Self::Config(_) => "Configuration Error",
            Self::Io(_) => "I/O Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

impl From<std::io::Error> for BridgeError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

/// Result type alias using BridgeError.
pub type Result<T> = std::result::Result<T, BridgeError>;
