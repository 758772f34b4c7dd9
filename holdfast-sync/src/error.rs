//! Error types for the sync layer.

use holdfast_storage::StorageError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur in sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Network error.
    #[error("network error: {0}")]
    Network(String),

    /// The remote store cannot be reached at all.
    #[error("remote store is offline")]
    Offline,

    /// Timeout.
    #[error("operation timed out")]
    Timeout,

    /// The remote store rejected the request.
    #[error("remote store rejected request: {0}")]
    Rejected(String),

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Remote storage error (backend I/O).
    #[error("remote storage error: {0}")]
    Remote(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Local storage error.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl SyncError {
    /// Returns true if this error means the network is unreachable.
    pub fn is_connectivity_failure(&self) -> bool {
        matches!(
            self,
            SyncError::Network(_) | SyncError::Offline | SyncError::Timeout
        )
    }
}
