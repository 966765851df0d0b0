//! JSON cube descriptions.
//!
//! A cube file lists the dimensions and either carries the values inline or
//! points at a raw little-endian `f32` file next to it.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use cube_common::{DataCube, Dimension};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CubeFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crs: Option<u32>,
    pub dimensions: Vec<Dimension>,
    /// Row-major values. Exactly one of `values` and `values_file` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<f32>>,
    /// Raw little-endian f32 file, relative to the cube file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl CubeFile {
    pub fn from_cube(cube: &DataCube) -> Self {
        Self {
            name: cube.name().map(str::to_string),
            crs: cube.crs(),
            dimensions: cube.dimensions().to_vec(),
            values: Some(cube.values().to_vec()),
            values_file: None,
            attributes: cube.attributes().clone(),
        }
    }

    /// Build the cube, reading `values_file` relative to `base_dir`.
    pub fn into_cube(self, base_dir: &Path) -> Result<DataCube> {
        let values = match (self.values, &self.values_file) {
            (Some(values), None) => values,
            (None, Some(file)) => read_f32_le(&base_dir.join(file))?,
            (Some(_), Some(_)) => bail!("cube file sets both 'values' and 'values_file'"),
            (None, None) => bail!("cube file sets neither 'values' nor 'values_file'"),
        };

        let mut cube = DataCube::new(self.dimensions, values)
            .map_err(|e| anyhow::anyhow!("invalid cube ({}): {}", e.code(), e))?;
        if let Some(name) = self.name {
            cube = cube.with_name(name);
        }
        if let Some(epsg) = self.crs {
            cube = cube.with_crs(epsg);
        }
        for (key, value) in self.attributes {
            cube = cube.with_attribute(key, value);
        }
        Ok(cube)
    }
}

pub fn load_cube<P: AsRef<Path>>(path: P) -> Result<DataCube> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read cube file from {:?}", path))?;
    let file: CubeFile = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse cube file {:?}", path))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    file.into_cube(base_dir)
}

pub fn save_cube<P: AsRef<Path>>(cube: &DataCube, path: P) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(&CubeFile::from_cube(cube))?;
    fs::write(path, json).with_context(|| format!("Failed to write cube file to {:?}", path))
}

fn read_f32_le(path: &Path) -> Result<Vec<f32>> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read values from {:?}", path))?;
    if bytes.len() % 4 != 0 {
        bail!("{:?} is not a whole number of f32 values ({} bytes)", path, bytes.len());
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}
