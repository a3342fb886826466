//! Common types shared by the SOC raster crates and the API service.

pub mod bbox;
pub mod crs;
pub mod error;

pub use bbox::BoundingBox;
pub use crs::{Crs, CrsParseError};
pub use error::{NoDataReason, SocError, SocResult};
