//! Error types for the storage crate.

use thiserror::Error;

/// Result type alias using StorageError.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised by object storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to create storage client: {0}")]
    Client(String),

    #[error("Failed to write {path}: {message}")]
    Write { path: String, message: String },

    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("Failed to delete {path}: {message}")]
    Delete { path: String, message: String },

    #[error("List failed: {0}")]
    List(String),

    #[error("Failed to walk local directory: {0}")]
    Walk(String),

    #[error("Failed to read local file: {0}")]
    LocalIo(#[from] std::io::Error),
}
