//! Zarr writer for converting data cubes to Zarr format.
//!
//! Used by the STAC generator to persist the published cube
//! as a Zarr V3 store next to its catalog documents.

mod zarr_writer;

pub use zarr_writer::{CubeZarrWriter, ZarrMetadata, ZarrWriteResult};
