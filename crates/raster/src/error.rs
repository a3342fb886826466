//! Error types for raster access.

use soc_common::SocError;
use thiserror::Error;

/// Errors that can occur while opening or reading a raster.
#[derive(Error, Debug)]
pub enum RasterError {
    /// Failed to open the file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a decodable TIFF.
    #[error("failed to decode raster: {0}")]
    Decode(String),

    /// The file lacks the tags needed to place it on the map.
    #[error("missing georeferencing: {0}")]
    MissingGeoreference(String),

    /// The CRS could not be determined or is user-defined.
    #[error("unsupported CRS: {0}")]
    UnsupportedCrs(String),

    /// The requested band does not exist.
    #[error("band {band} out of range (raster has {count} bands)")]
    InvalidBand { band: usize, count: usize },

    /// Pixel data does not match the declared dimensions.
    #[error("grid shape mismatch: {0}")]
    Shape(String),
}

impl From<tiff::TiffError> for RasterError {
    fn from(err: tiff::TiffError) -> Self {
        RasterError::Decode(err.to_string())
    }
}

impl From<RasterError> for SocError {
    fn from(err: RasterError) -> Self {
        SocError::Raster(err.to_string())
    }
}

/// Result type for raster operations.
pub type RasterResult<T> = Result<T, RasterError>;
