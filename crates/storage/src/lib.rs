//! Storage abstractions for cube-stac.
//!
//! Provides an S3-compatible object storage client used to upload Zarr
//! stores and catalog documents next to them.

pub mod error;
pub mod object_store;
pub mod upload;

pub use self::object_store::{ObjectStorage, ObjectStorageConfig, StoragePath};
pub use error::{StorageError, StorageResult};
pub use upload::upload_directory;
