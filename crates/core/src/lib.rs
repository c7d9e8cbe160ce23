//! Banter Core Library
//!
//! This crate provides the foundational utilities for the banter CLI:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management
//! - Credential resolution for backend API keys

pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};
