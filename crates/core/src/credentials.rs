//! Credential resolution for backend API keys.
//!
//! A model configuration names its credential by an identifier such as
//! `HUGGINGFACE_API_KEY`. Resolution checks the process environment first
//! and falls back to reading the identifier as a filesystem path, so a user
//! can keep the key in a file instead of exporting it.
//!
//! The secret value itself is never logged.

use crate::error::{AppError, AppResult};

/// Resolve a credential identifier to its secret value.
///
/// Resolution order:
/// 1. An environment variable named exactly `credential_id`, if set and
///    non-empty.
/// 2. The contents of the file at path `credential_id`, trimmed of
///    surrounding whitespace, if non-empty.
///
/// Fails with [`AppError::CredentialNotFound`] when neither source yields a
/// value.
pub fn resolve(credential_id: &str) -> AppResult<String> {
    if let Ok(value) = std::env::var(credential_id) {
        if !value.is_empty() {
            tracing::debug!("Resolved credential {} from environment", credential_id);
            return Ok(value);
        }
    }

    if let Ok(contents) = std::fs::read_to_string(credential_id) {
        let value = contents.trim();
        if !value.is_empty() {
            tracing::debug!("Resolved credential {} from file", credential_id);
            return Ok(value.to_string());
        }
    }

    Err(AppError::CredentialNotFound(credential_id.to_string()))
}
