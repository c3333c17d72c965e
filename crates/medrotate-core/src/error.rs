//! Error types for medrotate-core

use thiserror::Error;

/// Result type alias using medrotate-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in medrotate-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// SQLite error from the durable local store
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error for persisted collections
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A note was created without a rotation selected
    #[error("No active rotation selected")]
    NoActiveRotation,

    /// Remote collection API error
    #[error("Remote error: {0}")]
    Remote(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
