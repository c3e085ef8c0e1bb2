//! Error types for signboard-core.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for signboard-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Backend gateway errors
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Errors from talking to the signboard backend.
///
/// Callers treat any gateway failure as "no state change occurred" and
/// recover on the next scheduled poll cycle.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Transport-level failure (connection, timeout, body decode)
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success HTTP status
    #[error("Backend returned HTTP {status} for {operation}")]
    Status {
        operation: &'static str,
        status: u16,
    },

    /// Backend answered 2xx but reported failure in the body
    #[error("Backend rejected {operation}")]
    Rejected { operation: &'static str },

    /// The configured base URL (or a joined path) is not a valid URL
    #[error("Invalid backend URL: {0}")]
    BadUrl(#[from] url::ParseError),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// No config directory could be determined for this platform
    #[error("No configuration directory available")]
    NoConfigDir,
}

/// Submission validation errors, caught before anything is sent.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// A required field is empty
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
