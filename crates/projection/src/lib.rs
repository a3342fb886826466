//! Coordinate reference system transformations.
//!
//! The rest of the workspace only sees the [`Transformer`] trait: give it
//! points in one CRS and it hands back points in another, with `None` for
//! any point the target projection cannot represent. [`Proj4Transformer`]
//! is the pure-Rust implementation backed by `proj4rs` and the
//! `crs-definitions` EPSG database.

pub mod error;
pub mod proj4;
pub mod transform;

pub use error::{ProjectionError, ProjectionResult};
pub use proj4::Proj4Transformer;
pub use transform::{transform_point, IdentityTransformer, Transformer};
