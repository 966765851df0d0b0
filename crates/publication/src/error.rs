//! Error types for the publication crate.

use std::path::PathBuf;

use thiserror::Error;
use zarr_stac::WriterError;

/// Errors that can occur while publishing a cube.
#[derive(Error, Debug)]
pub enum PublishError {
    /// Upload requested but the access or secret key is not set.
    #[error("Missing AWS credentials in environment for S3 upload: {missing:?} not set")]
    MissingCredentials { missing: Vec<&'static str> },

    /// Upload requested but the endpoint or bucket is not set.
    #[error("Missing required S3 setting: {0}")]
    MissingS3Setting(&'static str),

    #[error("Invalid identifier {id:?}: {reason}")]
    InvalidIdentifier { id: String, reason: &'static str },

    /// A document the storage writer should have produced does not exist.
    #[error("Expected artifact not found: {}", path.display())]
    MissingArtifact { path: PathBuf },

    /// A document exists but cannot be parsed.
    #[error("Invalid artifact {} (line {line}): {message}", path.display())]
    InvalidArtifact {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// The catalog answered a create request with status >= 400.
    #[error("Catalog rejected POST {url} with status {status}: {body}")]
    RemoteRegistration { url: String, status: u16, body: String },

    /// The request never produced a response.
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failure inside the storage writer, passed through unchanged.
    #[error(transparent)]
    Writer(#[from] WriterError),
}

/// Coarse classification of a [`PublishError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad or missing input, raised before any side effect.
    Configuration,
    /// Expected output of the write step is absent or unreadable.
    MissingArtifact,
    /// The remote catalog refused a registration.
    RemoteRegistration,
    /// Raised by the storage writer.
    StorageWriter,
    /// Network failure talking to the catalog.
    Transport,
}

impl PublishError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCredentials { .. }
            | Self::MissingS3Setting(_)
            | Self::InvalidIdentifier { .. }
            | Self::HttpClient(_) => ErrorKind::Configuration,
            Self::MissingArtifact { .. } | Self::InvalidArtifact { .. } | Self::Io { .. } => {
                ErrorKind::MissingArtifact
            }
            Self::RemoteRegistration { .. } => ErrorKind::RemoteRegistration,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Writer(_) => ErrorKind::StorageWriter,
        }
    }

    pub(crate) fn io(path: &std::path::Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for publication operations.
pub type Result<T> = std::result::Result<T, PublishError>;
