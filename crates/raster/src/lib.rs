//! Raster I/O for georeferenced tiles.
//!
//! [`RasterSource`] is the narrow capability interface the tile index
//! needs from a raster dataset: extent, CRS, nodata sentinel, full band
//! reads, coordinate-to-pixel indexing and windowed reads.
//!
//! Two implementations ship here:
//! - [`GeoTiffSource`] decodes GeoTIFF files with the `tiff` crate
//! - [`MemoryRaster`] holds a grid built in memory

pub mod error;
pub mod geotiff;
pub mod geotransform;
pub mod memory;
pub mod source;

pub use error::{RasterError, RasterResult};
pub use geotiff::GeoTiffSource;
pub use geotransform::GeoTransform;
pub use memory::MemoryRaster;
pub use source::{Grid, RasterSource, Window};
