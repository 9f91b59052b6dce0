//! Error types for the catalog service
//!
//! Every fallible operation in the crate returns `Result<T, Error>`. Request
//! handlers collapse an `Error` into exactly one HTTP status and one message
//! through [`Error::status_code`] and [`Error::client_message`].

use thiserror::Error;

/// Message sent to clients in place of any storage-class failure
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Error";

/// The main error type for the catalog service
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Validation Errors (400)
    // ============================================================================
    #[error("{message}")]
    Validation { field: String, message: String },

    #[error("Invalid request body")]
    InvalidRequestBody(#[source] serde_json::Error),

    // ============================================================================
    // Storage Errors (500)
    // ============================================================================
    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Database error: {0}")]
    Database(#[from] duckdb::Error),

    #[error("Query timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Connection pool error: {message}")]
    Pool { message: String },

    // ============================================================================
    // Startup / CLI Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a validation error for a request field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a pool error
    pub fn pool(message: impl Into<String>) -> Self {
        Self::Pool {
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether the error was caused by the client's request
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::InvalidRequestBody(_))
    }

    /// HTTP status code this error maps to
    pub fn status_code(&self) -> u16 {
        if self.is_client_error() {
            400
        } else {
            500
        }
    }

    /// Message safe to return to a client.
    ///
    /// Storage-class failures never leak their cause; callers log the
    /// `Display` form separately.
    pub fn client_message(&self) -> String {
        if self.is_client_error() {
            self.to_string()
        } else {
            INTERNAL_ERROR_MESSAGE.to_string()
        }
    }
}

/// Result type alias for the catalog service
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
