//! Error types for the therapy_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for therapy_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Non-positive or non-finite duration
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    /// Inverted or malformed glucose range
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// Override construction or mutation contract violation
    #[error("Invalid override: {0}")]
    InvalidOverride(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
