//! Error types for the Zarr/STAC writer.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while writing a cube and its catalog documents.
#[derive(Error, Debug)]
pub enum WriterError {
    /// The cube cannot be represented in the target format.
    #[error("invalid cube: {0}")]
    InvalidCube(String),

    /// Zarr format or codec error.
    #[error("Zarr write failed: {0}")]
    Zarr(String),

    /// Writer configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Local filesystem error.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Catalog document serialization error.
    #[error("failed to serialize catalog document: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Object storage upload error.
    #[error("upload failed: {0}")]
    Upload(#[from] storage::StorageError),

    /// The blocking write task panicked or was cancelled.
    #[error("writer task failed: {0}")]
    Task(String),
}

impl WriterError {
    /// Create a Zarr error.
    pub fn zarr(msg: impl std::fmt::Display) -> Self {
        Self::Zarr(msg.to_string())
    }

    /// Map an I/O error to this type, remembering the path involved.
    pub fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for writer operations.
pub type Result<T> = std::result::Result<T, WriterError>;
