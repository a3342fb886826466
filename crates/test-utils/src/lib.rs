//! Shared test utilities for the SOC workspace.
//!
//! This crate provides:
//! - A small GeoTIFF writer for building tile directories on the fly
//! - Grid generators with values that are easy to verify
//! - Common tile fixtures
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! ```ignore
//! use test_utils::{GeoTiffSpec, write_geotiff};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let spec = GeoTiffSpec::wgs84(10, 10, 0.0, 10.0, 1.0).filled(5.0).with_nodata(-1.0);
//! let path = write_geotiff(dir.path(), "a.tif", &spec).unwrap();
//! ```

pub mod fixtures;
pub mod generators;
pub mod geotiff;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
pub use geotiff::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
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
