//! A single georeferenced raster tile.

use std::fmt;
use std::path::Path;

use raster::{GeoTiffSource, RasterSource, Window};
use soc_common::{BoundingBox, Crs, NoDataReason, SocError, SocResult};

use crate::stats::TileStats;

/// Band holding the SOC values.
pub const SOC_BAND: usize = 1;

/// One opened raster plus the metadata needed to route queries to it.
///
/// The tile owns its raster source exclusively. Statistics are computed
/// once in the constructor and never change afterwards.
pub struct Tile {
    identifier: String,
    bounds: BoundingBox,
    crs: Crs,
    nodata: Option<f64>,
    stats: Option<TileStats>,
    source: Box<dyn RasterSource>,
}

impl fmt::Debug for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tile")
            .field("identifier", &self.identifier)
            .field("bounds", &self.bounds)
            .field("crs", &self.crs)
            .field("nodata", &self.nodata)
            .field("stats", &self.stats)
            .finish()
    }
}

impl Tile {
    /// Open a GeoTIFF. The file name becomes the tile identifier.
    pub fn open(path: &Path) -> SocResult<Self> {
        let identifier = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let source = GeoTiffSource::open(path)
            .map_err(|e| SocError::Raster(format!("{}: {}", path.display(), e)))?;

        Self::from_source(identifier, Box::new(source))
    }

    /// Wrap an already opened raster and compute its statistics.
    pub fn from_source(
        identifier: impl Into<String>,
        source: Box<dyn RasterSource>,
    ) -> SocResult<Self> {
        let identifier = identifier.into();
        let nodata = source.nodata();

        let band = source
            .read_band(SOC_BAND)
            .map_err(|e| SocError::Raster(format!("{}: {}", identifier, e)))?;
        let stats = TileStats::compute(&band.values, nodata);

        if stats.is_none() {
            tracing::warn!(tile = %identifier, "tile has no valid pixels");
        }

        Ok(Self {
            bounds: source.bounds(),
            crs: source.crs(),
            nodata,
            stats,
            source,
            identifier,
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Extent in the tile's native CRS.
    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    pub fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    /// Statistics over valid pixels, or `None` if the tile has none.
    pub fn stats(&self) -> Option<&TileStats> {
        self.stats.as_ref()
    }

    pub fn dimensions(&self) -> (usize, usize) {
        self.source.dimensions()
    }

    /// Inclusive on all four edges.
    pub fn bounds_contain(&self, x: f64, y: f64) -> bool {
        self.bounds.contains_point(x, y)
    }

    /// Read the pixel containing native coordinate `(x, y)`.
    pub fn read_pixel(&self, x: f64, y: f64) -> SocResult<f64> {
        let (row, col) = self.source.index(x, y);
        let window = self
            .source
            .read_window(SOC_BAND, Window::pixel(row, col))
            .map_err(|e| SocError::Raster(format!("{}: {}", self.identifier, e)))?;

        let Some(&value) = window.values.first() else {
            return Err(SocError::NoData {
                reason: NoDataReason::EmptyWindow,
            });
        };

        if self.nodata == Some(value) {
            return Err(SocError::NoData {
                reason: NoDataReason::NodataValue,
            });
        }
        if value.is_nan() {
            return Err(SocError::NoData {
                reason: NoDataReason::NotANumber,
            });
        }

        Ok(value)
    }

    /// Release the underlying raster.
    pub fn close(self) {
        tracing::debug!(tile = %self.identifier, "closing tile");
        self.source.close();
    }
}
