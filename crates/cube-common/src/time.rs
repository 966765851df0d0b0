//! Temporal helpers and the day-of-year feature encoding.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::cube::{DataCube, Dimension, DimensionType, Labels};
use crate::error::{ProcessError, ProcessResult};

/// Closed time interval covered by a cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalExtent {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TemporalExtent {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Earliest and latest of the given timestamps, in any order.
    pub fn from_times(times: &[DateTime<Utc>]) -> Option<Self> {
        let start = times.iter().min()?;
        let end = times.iter().max()?;
        Some(Self::new(*start, *end))
    }
}

fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

/// Position of a timestamp within its year as an angle in radians.
///
/// January 1st maps to 0; the divisor is 366 in leap years and 365 otherwise,
/// so December 31st never wraps around to 2π.
pub fn day_of_year_angle(time: &DateTime<Utc>) -> f64 {
    let doy = time.ordinal() as f64;
    let days = if is_leap_year(time.year()) { 366.0 } else { 365.0 };
    2.0 * PI * (doy - 1.0) / days
}

/// Encode the time axis of a cube as sine/cosine of the day of year.
///
/// The time dimension is looked up by name (`t`, then `time`) and a `bands`
/// dimension must exist. The result has `bands = ["sin_doy", "cos_doy"]` as
/// its first dimension, followed by the input's other dimensions in their
/// original order, with each value depending only on its time label.
pub fn sin_cos_doy(cube: &DataCube) -> ProcessResult<DataCube> {
    let time_dim = cube
        .dimension("t")
        .or_else(|| cube.dimension("time"))
        .ok_or_else(|| ProcessError::DimensionNotAvailable("t".to_string()))?;
    let times = time_dim
        .labels
        .as_temporal()
        .ok_or(ProcessError::ArrayNotLabeled)?;

    if cube.dimension("bands").is_none() {
        return Err(ProcessError::DimensionNotAvailable("bands".to_string()));
    }

    let other_dims: Vec<&Dimension> = cube
        .dimensions()
        .iter()
        .filter(|d| d.name != "bands")
        .collect();

    let time_pos = other_dims
        .iter()
        .position(|d| d.name == time_dim.name)
        .ok_or_else(|| ProcessError::DimensionNotAvailable(time_dim.name.clone()))?;

    // Number of cells that share one time label, laid out after the time axis.
    let inner: usize = other_dims[time_pos + 1..].iter().map(|d| d.len()).product();
    let plane: usize = other_dims.iter().map(|d| d.len()).product();

    let angles: Vec<f64> = times.iter().map(day_of_year_angle).collect();

    let encoders: [fn(f64) -> f64; 2] = [f64::sin, f64::cos];
    let mut values = Vec::with_capacity(plane * 2);
    for encode in encoders {
        values.extend((0..plane).map(|flat| {
            let t = (flat / inner) % times.len();
            encode(angles[t]) as f32
        }));
    }

    let mut dimensions = Vec::with_capacity(other_dims.len() + 1);
    dimensions.push(Dimension::new(
        "bands",
        DimensionType::Bands,
        Labels::Text(vec!["sin_doy".to_string(), "cos_doy".to_string()]),
    ));
    dimensions.extend(other_dims.into_iter().cloned());

    let encoded = DataCube::new(dimensions, values)?;
    Ok(match cube.crs() {
        Some(epsg) => encoded.with_crs(epsg),
        None => encoded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn cube_with(dims: Vec<Dimension>) -> DataCube {
        let n = dims.iter().map(|d| d.len()).product();
        DataCube::new(dims, vec![1.0; n]).unwrap()
    }

    #[test]
    fn test_angle_first_day_is_zero() {
        assert_eq!(day_of_year_angle(&ts(2023, 1, 1)), 0.0);
    }

    #[test]
    fn test_angle_leap_year() {
        // Day 366 of a leap year stays below a full turn.
        let angle = day_of_year_angle(&ts(2024, 12, 31));
        assert!((angle - 2.0 * PI * 365.0 / 366.0).abs() < 1e-12);

        let non_leap = day_of_year_angle(&ts(2023, 12, 31));
        assert!((non_leap - 2.0 * PI * 364.0 / 365.0).abs() < 1e-12);
    }

    #[test]
    fn test_temporal_extent_unordered() {
        let extent = TemporalExtent::from_times(&[ts(2024, 5, 1), ts(2024, 1, 1), ts(2024, 3, 1)]).unwrap();
        assert_eq!(extent.start, ts(2024, 1, 1));
        assert_eq!(extent.end, ts(2024, 5, 1));
        assert!(TemporalExtent::from_times(&[]).is_none());
    }

    #[test]
    fn test_sin_cos_doy_layout() {
        let cube = cube_with(vec![
            Dimension::temporal("t", vec![ts(2023, 1, 1), ts(2023, 7, 2)]),
            Dimension::bands("bands", vec!["B04".into(), "B08".into(), "B11".into()]),
            Dimension::spatial_y("y", vec![0.0, 1.0]),
            Dimension::spatial_x("x", vec![0.0, 1.0, 2.0]),
        ]);

        let encoded = sin_cos_doy(&cube).unwrap();
        let names: Vec<&str> = encoded.dimensions().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["bands", "t", "y", "x"]);
        assert_eq!(encoded.shape(), vec![2, 2, 2, 3]);
        assert_eq!(
            encoded.band_names().unwrap(),
            &["sin_doy".to_string(), "cos_doy".to_string()]
        );

        // Jan 1st: sin 0, cos 1, for every pixel.
        assert_eq!(encoded.value_at(&[0, 0, 1, 2]), Some(0.0));
        assert_eq!(encoded.value_at(&[1, 0, 0, 0]), Some(1.0));

        let expected = day_of_year_angle(&ts(2023, 7, 2));
        let sin = encoded.value_at(&[0, 1, 1, 1]).unwrap();
        let cos = encoded.value_at(&[1, 1, 0, 2]).unwrap();
        assert!((sin as f64 - expected.sin()).abs() < 1e-6);
        assert!((cos as f64 - expected.cos()).abs() < 1e-6);
    }

    #[test]
    fn test_sin_cos_doy_time_not_first() {
        let cube = cube_with(vec![
            Dimension::spatial_x("x", vec![0.0, 1.0]),
            Dimension::bands("bands", vec!["B01".into()]),
            Dimension::temporal("time", vec![ts(2023, 1, 1), ts(2023, 4, 1), ts(2023, 10, 1)]),
        ]);

        let encoded = sin_cos_doy(&cube).unwrap();
        assert_eq!(encoded.shape(), vec![2, 2, 3]);
        for x in 0..2 {
            let expected = day_of_year_angle(&ts(2023, 10, 1)).sin() as f32;
            assert_eq!(encoded.value_at(&[0, x, 2]), Some(expected));
        }
    }

    #[test]
    fn test_sin_cos_doy_requires_time() {
        let cube = cube_with(vec![Dimension::bands("bands", vec!["B01".into()])]);
        assert_eq!(
            sin_cos_doy(&cube).unwrap_err(),
            ProcessError::DimensionNotAvailable("t".to_string())
        );
    }

    #[test]
    fn test_sin_cos_doy_requires_bands() {
        let cube = cube_with(vec![Dimension::temporal("t", vec![ts(2023, 1, 1)])]);
        assert_eq!(
            sin_cos_doy(&cube).unwrap_err(),
            ProcessError::DimensionNotAvailable("bands".to_string())
        );
    }

    #[test]
    fn test_sin_cos_doy_requires_temporal_labels() {
        let cube = cube_with(vec![
            Dimension::new("t", DimensionType::Other, Labels::Numeric(vec![1.0])),
            Dimension::bands("bands", vec!["B01".into()]),
        ]);
        assert_eq!(sin_cos_doy(&cube).unwrap_err(), ProcessError::ArrayNotLabeled);
    }
}
