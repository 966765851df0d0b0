//! Shared test utilities for the cube-stac workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic cube fixtures
//! - An in-process mock STAC catalog (axum)
//! - A recording `StacGenerator`
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{ndvi_cube, MockCatalog, RecordingGenerator};
//! ```

pub mod fixtures;
pub mod generators;
pub mod mock_catalog;
pub mod recording;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
pub use mock_catalog::{CatalogBehavior, MockCatalog, RecordedRequest};
pub use recording::RecordingGenerator;

/// Create a temporary directory that is removed when the guard drops.
pub fn temp_output_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("create temp dir")
}

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}
