//! Common test fixtures: small cubes shaped like real publication inputs.

use chrono::{DateTime, Duration, TimeZone, Utc};
use cube_common::{DataCube, Dimension};

use crate::generators::{create_axis, create_ndvi_values};

/// Collection id used across publication tests.
pub const NDVI_COLLECTION_ID: &str = "ndvi-2024";

/// `count` timestamps, ten days apart, starting 2024-01-01.
pub fn test_times(count: usize) -> Vec<DateTime<Utc>> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| start + Duration::days(10 * i as i64))
        .collect()
}

/// A `t/bands/y/x` NDVI cube over South Tyrol in EPSG:4326.
pub fn ndvi_cube(times: usize, width: usize, height: usize) -> DataCube {
    let dims = vec![
        Dimension::temporal("t", test_times(times)),
        Dimension::bands("bands", vec!["ndvi".to_string()]),
        Dimension::spatial_y("y", create_axis(46.9, -0.01, height)),
        Dimension::spatial_x("x", create_axis(10.4, 0.01, width)),
    ];
    let values = create_ndvi_values(&[times, 1, height, width]);
    DataCube::new(dims, values)
        .unwrap()
        .with_name("ndvi")
        .with_crs(4326)
}

/// A `bands/y/x` cube with no time dimension.
pub fn static_cube(width: usize, height: usize) -> DataCube {
    let dims = vec![
        Dimension::bands("bands", vec!["dem".to_string()]),
        Dimension::spatial_y("y", create_axis(46.9, -0.01, height)),
        Dimension::spatial_x("x", create_axis(10.4, 0.01, width)),
    ];
    let values = create_ndvi_values(&[1, height, width]);
    DataCube::new(dims, values).unwrap().with_crs(4326)
}

/// Newline-delimited item documents, one per id.
pub fn items_ndjson(collection_id: &str, count: usize) -> String {
    (1..=count)
        .map(|i| {
            serde_json::json!({
                "type": "Feature",
                "id": format!("{}_{}", collection_id, i),
                "collection": collection_id,
            })
            .to_string()
                + "\n"
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ndvi_cube_shape() {
        let cube = ndvi_cube(3, 4, 2);
        assert_eq!(cube.shape(), vec![3, 1, 2, 4]);
        assert_eq!(cube.crs(), Some(4326));
        assert_eq!(cube.temporal_extent().unwrap().end, test_times(3)[2]);
    }

    #[test]
    fn test_items_ndjson() {
        let ndjson = items_ndjson("c", 3);
        assert_eq!(ndjson.lines().count(), 3);
        assert!(ndjson.ends_with('\n'));
    }
}
