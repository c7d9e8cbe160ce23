//! Error types for the banter CLI.
//!
//! This module defines a unified error enum covering every failure category
//! in the application: model lookup, credential resolution, the HTTP
//! exchange, response decoding, configuration, and I/O.

use thiserror::Error;

/// Unified error type for the banter CLI.
///
/// All functions in the application return `Result<T, AppError>`.
/// We never panic — errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Unknown model short name or out-of-range index
    #[error("Unknown model: {0}")]
    ModelNotFound(String),

    /// Credential missing from both the environment and the fallback file
    #[error("Credential {0} not found in environment variable or file")]
    CredentialNotFound(String),

    /// Transport-level failure (DNS, connect, TLS, body read)
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx HTTP status from the backend
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Response body did not have the expected JSON shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedResponse(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
