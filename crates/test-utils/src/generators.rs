//! Synthetic value generators for test cubes.
//!
//! Patterns are predictable so that tests can verify values after a
//! round trip through Zarr or JSON.

/// Values equal to their row-major position: `values[i] == i`.
///
/// # Example
///
/// ```
/// use test_utils::create_index_values;
///
/// let values = create_index_values(&[2, 3]);
/// assert_eq!(values.len(), 6);
/// assert_eq!(values[4], 4.0);
/// ```
pub fn create_index_values(shape: &[usize]) -> Vec<f32> {
    let len: usize = shape.iter().product();
    (0..len).map(|i| i as f32).collect()
}

/// NDVI-like values in `[-1, 1]`, varying smoothly along the last axis.
pub fn create_ndvi_values(shape: &[usize]) -> Vec<f32> {
    let len: usize = shape.iter().product();
    let width = shape.last().copied().unwrap_or(1).max(1);
    (0..len)
        .map(|i| {
            let col = (i % width) as f32;
            let t = if width > 1 { col / (width - 1) as f32 } else { 0.5 };
            -1.0 + 2.0 * t
        })
        .collect()
}

/// Coordinate labels `start, start + step, ...`.
pub fn create_axis(start: f64, step: f64, count: usize) -> Vec<f64> {
    (0..count).map(|i| start + step * i as f64).collect()
}
