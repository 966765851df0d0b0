//! Zarr store and STAC document generation for data cubes.
//!
//! This crate is the storage writer behind a publication: it persists a
//! [`DataCube`](cube_common::DataCube) as a Zarr V3 store and describes it
//! with one STAC collection document plus one item document per time step.
//!
//! # Output layout
//!
//! ```text
//! {output_folder}/
//!   ├── {collection_id}.json     collection, pretty-printed JSON
//!   ├── inline_items.csv         items, one compact JSON document per line
//!   └── {collection_id}.zarr/    the cube as a single float32 array
//! ```
//!
//! When [`WriteParameters::s3`] is set, the same three artifacts are uploaded
//! under `{bucket_file_prefix}{collection_id}/` and asset hrefs point at the
//! bucket instead of the local disk.
//!
//! # Example
//!
//! ```ignore
//! use zarr_stac::{StacGenerator, ZarrStacGenerator};
//!
//! let generator = ZarrStacGenerator::from_env();
//! let artifacts = generator.generate(&params, "ndvi-2024").await?;
//! println!("collection at {}", artifacts.collection_document.display());
//! ```

pub mod config;
pub mod error;
pub mod generator;
pub mod params;
pub mod stac;
pub mod writer;

pub use config::{ZarrCompression, ZarrWriterConfig};
pub use error::{Result, WriterError};
pub use generator::{StacArtifacts, StacGenerator, ZarrStacGenerator, ITEMS_FILE_NAME};
pub use params::{S3UploadTarget, WriteParameters};
pub use stac::{join_url, Collection, Item, Link, Provider};
pub use writer::{CubeZarrWriter, ZarrMetadata, ZarrWriteResult};
