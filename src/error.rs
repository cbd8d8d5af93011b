//! Error types for the repository sync engine.

use thiserror::Error;

/// Local storage and layout errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid key material: {0}")]
    InvalidKey(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid file name: {0}")]
    InvalidName(String),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Sync protocol errors
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Malformed local change file: {name}: {source}")]
    MalformedChange {
        name: String,
        source: serde_json::Error,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Server rejected request with status {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Malformed server reply: {0}")]
    MalformedReply(String),

    #[error("No sync server configured")]
    NoServers,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
