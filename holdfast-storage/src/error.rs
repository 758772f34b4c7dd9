//! Error types for the storage layer.

use holdfast_types::EntityKey;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Entity not found.
    #[error("entity not found: {0}")]
    NotFound(EntityKey),

    /// IO error (file system).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The instance id cannot be used as a storage key.
    #[error(transparent)]
    InvalidKey(#[from] holdfast_types::Error),

    /// Invalid data.
    #[error("invalid data: {0}")]
    InvalidData(String),
}
