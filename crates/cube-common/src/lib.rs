//! Common types shared across the cube-stac crates.
//!
//! A [`DataCube`] is a labeled, multi-dimensional `f32` array (space, time,
//! bands). It is what gets published as a STAC collection by the
//! `publication` crate and written to Zarr by `zarr-stac`.

pub mod bbox;
pub mod cube;
pub mod error;
pub mod time;

pub use bbox::BoundingBox;
pub use cube::{DataCube, Dimension, DimensionType, Labels};
pub use error::{ProcessError, ProcessResult};
pub use time::{day_of_year_angle, sin_cos_doy, TemporalExtent};
