//! # CLI Error Types
//!
//! Everything that can stop `bazaar-quote` before it prints a result.
//! Core errors pass through unchanged so their messages reach the user.

use thiserror::Error;

use bazaar_core::{CoreError, ValidationError};

/// Result type alias for CLI operations.
pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Configuration values are out of range or inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The config file could not be parsed.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    // =========================================================================
    // Input / Output Errors
    // =========================================================================
    #[error("I/O error: {0}")]
    Io(String),

    /// The checkout request is not valid JSON of the expected shape.
    #[error("Invalid checkout request: {0}")]
    InvalidRequest(String),

    #[error("Failed to render output: {0}")]
    Output(String),

    // =========================================================================
    // Checkout Errors
    // =========================================================================
    #[error(transparent)]
    Checkout(#[from] CoreError),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Checkout(CoreError::Validation(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidRequest(err.to_string())
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(err: toml::ser::Error) -> Self {
        AppError::Output(err.to_string())
    }
}
