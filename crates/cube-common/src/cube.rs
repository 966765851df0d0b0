//! Labeled multi-dimensional arrays.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::bbox::BoundingBox;
use crate::error::{ProcessError, ProcessResult};
use crate::time::TemporalExtent;

/// Semantic role of a cube dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionType {
    SpatialX,
    SpatialY,
    Temporal,
    Bands,
    Other,
}

impl DimensionType {
    /// Guess the role from a conventional dimension name.
    pub fn infer(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "x" | "lon" | "longitude" | "easting" => Self::SpatialX,
            "y" | "lat" | "latitude" | "northing" => Self::SpatialY,
            "t" | "time" => Self::Temporal,
            "bands" | "band" => Self::Bands,
            _ => Self::Other,
        }
    }

    /// The `type` value used by the STAC datacube extension.
    pub fn stac_type(&self) -> &'static str {
        match self {
            Self::SpatialX | Self::SpatialY => "spatial",
            Self::Temporal => "temporal",
            Self::Bands => "bands",
            Self::Other => "other",
        }
    }

    /// The `axis` value for spatial dimensions.
    pub fn axis(&self) -> Option<&'static str> {
        match self {
            Self::SpatialX => Some("x"),
            Self::SpatialY => Some("y"),
            _ => None,
        }
    }
}

/// Coordinate labels along one dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum Labels {
    Numeric(Vec<f64>),
    Temporal(Vec<DateTime<Utc>>),
    Text(Vec<String>),
}

impl Labels {
    pub fn len(&self) -> usize {
        match self {
            Labels::Numeric(v) => v.len(),
            Labels::Temporal(v) => v.len(),
            Labels::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            Labels::Numeric(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_temporal(&self) -> Option<&[DateTime<Utc>]> {
        match self {
            Labels::Temporal(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&[String]> {
        match self {
            Labels::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Labels as JSON values (RFC 3339 strings for timestamps).
    pub fn to_json_values(&self) -> Vec<serde_json::Value> {
        match self {
            Labels::Numeric(v) => v.iter().map(|x| serde_json::json!(x)).collect(),
            Labels::Temporal(v) => v
                .iter()
                .map(|t| serde_json::json!(t.to_rfc3339()))
                .collect(),
            Labels::Text(v) => v.iter().map(|s| serde_json::json!(s)).collect(),
        }
    }
}

/// A named, labeled cube axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
    #[serde(rename = "type")]
    pub dim_type: DimensionType,
    pub labels: Labels,
}

impl Dimension {
    pub fn new(name: impl Into<String>, dim_type: DimensionType, labels: Labels) -> Self {
        Self {
            name: name.into(),
            dim_type,
            labels,
        }
    }

    pub fn spatial_x(name: impl Into<String>, coords: Vec<f64>) -> Self {
        Self::new(name, DimensionType::SpatialX, Labels::Numeric(coords))
    }

    pub fn spatial_y(name: impl Into<String>, coords: Vec<f64>) -> Self {
        Self::new(name, DimensionType::SpatialY, Labels::Numeric(coords))
    }

    pub fn temporal(name: impl Into<String>, times: Vec<DateTime<Utc>>) -> Self {
        Self::new(name, DimensionType::Temporal, Labels::Temporal(times))
    }

    pub fn bands(name: impl Into<String>, bands: Vec<String>) -> Self {
        Self::new(name, DimensionType::Bands, Labels::Text(bands))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// A labeled, multi-dimensional `f32` array stored in row-major order.
///
/// The last dimension varies fastest. Invariants checked on construction:
/// every dimension has at least one label, names are unique, each
/// non-`Other` role appears at most once, and the value count equals the
/// product of the dimension lengths.
#[derive(Debug, Clone, PartialEq)]
pub struct DataCube {
    name: Option<String>,
    dimensions: Vec<Dimension>,
    values: Vec<f32>,
    crs: Option<u32>,
    attributes: serde_json::Map<String, serde_json::Value>,
}

impl DataCube {
    /// Create a cube, validating labels against the value buffer.
    pub fn new(dimensions: Vec<Dimension>, values: Vec<f32>) -> ProcessResult<Self> {
        let mut names = HashSet::new();
        let mut roles = HashSet::new();

        for dim in &dimensions {
            if dim.is_empty() {
                return Err(ProcessError::NoDataAvailable(format!(
                    "dimension '{}' has no labels",
                    dim.name
                )));
            }
            if !names.insert(dim.name.as_str()) {
                return Err(ProcessError::DimensionAmbiguous(dim.name.clone()));
            }
            if dim.dim_type != DimensionType::Other && !roles.insert(dim.dim_type) {
                return Err(ProcessError::DimensionAmbiguous(format!(
                    "{} ({} dimension declared twice)",
                    dim.name,
                    dim.dim_type.stac_type()
                )));
            }
        }

        let expected: usize = dimensions.iter().map(Dimension::len).product();
        if values.len() != expected {
            return Err(ProcessError::ArrayLengthMismatch {
                expected,
                actual: values.len(),
            });
        }

        Ok(Self {
            name: None,
            dimensions,
            values,
            crs: None,
            attributes: serde_json::Map::new(),
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the EPSG code of the spatial coordinates.
    pub fn with_crs(mut self, epsg: u32) -> Self {
        self.crs = Some(epsg);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn crs(&self) -> Option<u32> {
        self.crs
    }

    pub fn attributes(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.attributes
    }

    pub fn shape(&self) -> Vec<usize> {
        self.dimensions.iter().map(Dimension::len).collect()
    }

    pub fn ndim(&self) -> usize {
        self.dimensions.len()
    }

    /// Number of values in the cube.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.name == name)
    }

    pub fn dimension_index(&self, name: &str) -> Option<usize> {
        self.dimensions.iter().position(|d| d.name == name)
    }

    pub fn dimension_of_type(&self, dim_type: DimensionType) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.dim_type == dim_type)
    }

    /// Extent of the spatial coordinates, if the cube has numeric x/y axes.
    pub fn spatial_bbox(&self) -> Option<BoundingBox> {
        let xs = self.dimension_of_type(DimensionType::SpatialX)?.labels.as_numeric()?;
        let ys = self.dimension_of_type(DimensionType::SpatialY)?.labels.as_numeric()?;
        BoundingBox::from_axes(xs, ys)
    }

    /// First and last timestamps of the temporal dimension.
    pub fn temporal_extent(&self) -> Option<TemporalExtent> {
        let times = self
            .dimension_of_type(DimensionType::Temporal)?
            .labels
            .as_temporal()?;
        TemporalExtent::from_times(times)
    }

    pub fn band_names(&self) -> Option<&[String]> {
        self.dimension_of_type(DimensionType::Bands)?.labels.as_text()
    }

    /// Row-major strides for the current shape.
    pub fn strides(&self) -> Vec<usize> {
        let shape = self.shape();
        let mut strides = vec![1usize; shape.len()];
        for i in (0..shape.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * shape[i + 1];
        }
        strides
    }

    /// Value at a multi-dimensional index.
    pub fn value_at(&self, index: &[usize]) -> Option<f32> {
        if index.len() != self.ndim() {
            return None;
        }
        let shape = self.shape();
        if index.iter().zip(&shape).any(|(i, n)| i >= n) {
            return None;
        }
        let offset: usize = index
            .iter()
            .zip(self.strides())
            .map(|(i, s)| i * s)
            .sum();
        self.values.get(offset).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn times(n: u32) -> Vec<DateTime<Utc>> {
        (0..n)
            .map(|d| Utc.with_ymd_and_hms(2024, 1, 1 + d, 0, 0, 0).unwrap())
            .collect()
    }

    fn cube() -> DataCube {
        DataCube::new(
            vec![
                Dimension::temporal("t", times(2)),
                Dimension::spatial_y("y", vec![46.0, 45.0]),
                Dimension::spatial_x("x", vec![11.0, 12.0, 13.0]),
            ],
            (0..12).map(|v| v as f32).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_shape_and_strides() {
        let cube = cube();
        assert_eq!(cube.shape(), vec![2, 2, 3]);
        assert_eq!(cube.strides(), vec![6, 3, 1]);
        assert_eq!(cube.value_at(&[1, 0, 2]), Some(8.0));
        assert_eq!(cube.value_at(&[2, 0, 0]), None);
    }

    #[test]
    fn test_length_mismatch() {
        let err = DataCube::new(vec![Dimension::spatial_x("x", vec![0.0, 1.0])], vec![1.0]).unwrap_err();
        assert_eq!(
            err,
            ProcessError::ArrayLengthMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_duplicate_dimension_rejected() {
        let err = DataCube::new(
            vec![
                Dimension::spatial_x("x", vec![0.0]),
                Dimension::new("x", DimensionType::Other, Labels::Numeric(vec![0.0])),
            ],
            vec![1.0],
        )
        .unwrap_err();
        assert_eq!(err.code(), "DimensionAmbiguous");
    }

    #[test]
    fn test_duplicate_role_rejected() {
        let err = DataCube::new(
            vec![
                Dimension::temporal("t", times(1)),
                Dimension::temporal("time", times(1)),
            ],
            vec![1.0],
        )
        .unwrap_err();
        assert_eq!(err.code(), "DimensionAmbiguous");
    }

    #[test]
    fn test_empty_dimension_rejected() {
        let err = DataCube::new(vec![Dimension::bands("bands", vec![])], vec![]).unwrap_err();
        assert_eq!(err.code(), "NoDataAvailable");
    }

    #[test]
    fn test_extents() {
        let cube = cube();
        assert_eq!(
            cube.spatial_bbox(),
            Some(BoundingBox::new(11.0, 45.0, 13.0, 46.0))
        );
        let extent = cube.temporal_extent().unwrap();
        assert_eq!(extent.start, times(2)[0]);
        assert_eq!(extent.end, times(2)[1]);
        assert!(cube.band_names().is_none());
    }

    #[test]
    fn test_infer_dimension_type() {
        assert_eq!(DimensionType::infer("lat"), DimensionType::SpatialY);
        assert_eq!(DimensionType::infer("X"), DimensionType::SpatialX);
        assert_eq!(DimensionType::infer("time"), DimensionType::Temporal);
        assert_eq!(DimensionType::infer("bands"), DimensionType::Bands);
        assert_eq!(DimensionType::infer("depth"), DimensionType::Other);
    }

    #[test]
    fn test_labels_serde_shape() {
        let json = serde_json::to_value(Labels::Text(vec!["B04".into()])).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "text", "values": ["B04"]}));
    }
}
