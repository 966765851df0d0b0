//! Zarr V3 writer for data cubes.
//!
//! A cube becomes a single float32 array with NaN fill. Chunks span
//! `chunk_size` cells along the spatial axes and one cell along every other
//! axis, so each chunk holds one tile of one band at one timestamp.

use std::sync::Arc;

use cube_common::{DataCube, DimensionType};
use serde::{Deserialize, Serialize};
use zarrs::array::codec::bytes_to_bytes::blosc::{
    BloscCodec, BloscCompressionLevel, BloscCompressor, BloscShuffleMode,
};
use zarrs::array::{ArrayBuilder, DataType, FillValue};
use zarrs::array_subset::ArraySubset;
use zarrs::storage::{ReadableStorageTraits, WritableStorageTraits};

use crate::config::{ZarrCompression, ZarrWriterConfig};
use crate::error::{Result, WriterError};

/// Summary of a written Zarr array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZarrMetadata {
    /// Dimension names in array order.
    pub dimensions: Vec<String>,
    /// Array shape.
    pub shape: Vec<u64>,
    /// Chunk shape.
    pub chunk_shape: Vec<u64>,
    /// Data type.
    pub dtype: String,
    /// Compression codec used.
    pub compression: String,
}

/// Result of writing a Zarr array.
#[derive(Debug)]
pub struct ZarrWriteResult {
    pub metadata: ZarrMetadata,
    /// Uncompressed bytes written.
    pub bytes_written: u64,
}

/// Writer for creating Zarr V3 arrays from data cubes.
pub struct CubeZarrWriter {
    config: ZarrWriterConfig,
}

impl CubeZarrWriter {
    /// Create a new CubeZarrWriter with the given configuration.
    pub fn new(config: ZarrWriterConfig) -> Self {
        Self { config }
    }

    /// Chunk shape for a cube: spatial axes tiled, everything else 1.
    pub fn chunk_shape(&self, cube: &DataCube) -> Vec<u64> {
        cube.dimensions()
            .iter()
            .map(|dim| match dim.dim_type {
                DimensionType::SpatialX | DimensionType::SpatialY => {
                    dim.len().min(self.config.chunk_size) as u64
                }
                _ => 1,
            })
            .collect()
    }

    /// Write the cube to a Zarr array at `path` in `storage`.
    pub fn write<S: ReadableStorageTraits + WritableStorageTraits + 'static>(
        &self,
        storage: S,
        path: &str,
        cube: &DataCube,
    ) -> Result<ZarrWriteResult> {
        self.config.validate().map_err(WriterError::Config)?;

        if cube.ndim() == 0 {
            return Err(WriterError::InvalidCube(
                "cube has no dimensions".to_string(),
            ));
        }

        let shape: Vec<u64> = cube.shape().iter().map(|&n| n as u64).collect();
        let chunk_shape = self.chunk_shape(cube);

        let chunk_grid: zarrs::array::ChunkGrid = chunk_shape
            .clone()
            .try_into()
            .map_err(|e| WriterError::Config(format!("{:?}", e)))?;

        let mut binding = ArrayBuilder::new(
            shape.clone(),
            DataType::Float32,
            chunk_grid,
            FillValue::from(f32::NAN),
        );
        let mut builder = binding.attributes(Self::attributes(cube));

        if self.config.compression != ZarrCompression::None {
            let codec = self.create_compression_codec()?;
            builder = builder.bytes_to_bytes_codecs(vec![codec]);
        }

        let array = builder
            .build(Arc::new(storage), path)
            .map_err(WriterError::zarr)?;

        array.store_metadata().map_err(WriterError::zarr)?;

        let subset = ArraySubset::new_with_start_shape(vec![0; shape.len()], shape.clone())
            .map_err(WriterError::zarr)?;

        array
            .store_array_subset_elements(&subset, cube.values())
            .map_err(WriterError::zarr)?;

        let bytes_written = std::mem::size_of_val(cube.values()) as u64;

        Ok(ZarrWriteResult {
            metadata: ZarrMetadata {
                dimensions: cube.dimensions().iter().map(|d| d.name.clone()).collect(),
                shape,
                chunk_shape,
                dtype: "float32".to_string(),
                compression: self.config.compression.as_str().to_string(),
            },
            bytes_written,
        })
    }

    /// Array attributes: xarray-style dimension names, coordinate labels and CRS.
    fn attributes(cube: &DataCube) -> serde_json::Map<String, serde_json::Value> {
        let mut attrs = cube.attributes().clone();

        attrs.insert(
            "_ARRAY_DIMENSIONS".to_string(),
            serde_json::json!(cube
                .dimensions()
                .iter()
                .map(|d| d.name.as_str())
                .collect::<Vec<_>>()),
        );

        let coordinates: serde_json::Map<String, serde_json::Value> = cube
            .dimensions()
            .iter()
            .map(|d| (d.name.clone(), serde_json::Value::Array(d.labels.to_json_values())))
            .collect();
        attrs.insert("coordinates".to_string(), serde_json::Value::Object(coordinates));

        if let Some(epsg) = cube.crs() {
            attrs.insert("crs".to_string(), serde_json::json!(format!("EPSG:{}", epsg)));
        }
        if let Some(name) = cube.name() {
            attrs.insert("name".to_string(), serde_json::json!(name));
        }

        attrs
    }

    /// Create the compression codec based on configuration.
    fn create_compression_codec(
        &self,
    ) -> Result<Arc<dyn zarrs::array::codec::BytesToBytesCodecTraits>> {
        let level = BloscCompressionLevel::try_from(self.config.compression_level)
            .map_err(|_| WriterError::Config("Invalid compression level".to_string()))?;

        let shuffle = if self.config.shuffle {
            BloscShuffleMode::Shuffle
        } else {
            BloscShuffleMode::NoShuffle
        };

        // typesize is required when shuffle is enabled
        let typesize = if self.config.shuffle { Some(4) } else { None };

        let compressor = match self.config.compression {
            ZarrCompression::None => {
                return Err(WriterError::Config("No compression configured".to_string()))
            }
            ZarrCompression::BloscLz4 => BloscCompressor::LZ4,
            ZarrCompression::BloscZstd => BloscCompressor::Zstd,
        };

        let codec = BloscCodec::new(compressor, level, None, shuffle, typesize)
            .map_err(|e| WriterError::Config(e.to_string()))?;

        Ok(Arc::new(codec))
    }
}
