//! Error types for the habit_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for habit_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A habit with this id is already registered
    #[error("Habit already exists: {0}")]
    AlreadyExists(String),

    /// No habit or todo is registered under this id
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller supplied an empty id, empty title, or similar bad input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

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

    /// Blob store error
    #[error("Storage error: {0}")]
    Storage(String),
}
