//! In-memory raster.

use soc_common::{BoundingBox, Crs};

use crate::error::{RasterError, RasterResult};
use crate::geotransform::GeoTransform;
use crate::source::{slice_window, Grid, RasterSource, Window};

/// A single-band raster held entirely in memory.
#[derive(Debug, Clone)]
pub struct MemoryRaster {
    width: usize,
    height: usize,
    transform: GeoTransform,
    crs: Crs,
    nodata: Option<f64>,
    values: Vec<f64>,
}

impl MemoryRaster {
    /// Create a raster from row-major `values`.
    pub fn new(
        width: usize,
        height: usize,
        transform: GeoTransform,
        crs: Crs,
        values: Vec<f64>,
    ) -> RasterResult<Self> {
        if values.len() != width * height {
            return Err(RasterError::Shape(format!(
                "{} values for a {}x{} grid",
                values.len(),
                width,
                height
            )));
        }
        if !transform.is_invertible() {
            return Err(RasterError::MissingGeoreference(
                "geotransform is not invertible".to_string(),
            ));
        }

        Ok(Self {
            width,
            height,
            transform,
            crs,
            nodata: None,
            values,
        })
    }

    /// A grid where every pixel has the same value.
    pub fn filled(
        width: usize,
        height: usize,
        transform: GeoTransform,
        crs: Crs,
        value: f64,
    ) -> RasterResult<Self> {
        Self::new(width, height, transform, crs, vec![value; width * height])
    }

    pub fn with_nodata(mut self, nodata: f64) -> Self {
        self.nodata = Some(nodata);
        self
    }

    /// Overwrite one pixel.
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        if row < self.height && col < self.width {
            self.values[row * self.width + col] = value;
        }
    }

    fn check_band(&self, band: usize) -> RasterResult<()> {
        if band != 1 {
            return Err(RasterError::InvalidBand { band, count: 1 });
        }
        Ok(())
    }
}

impl RasterSource for MemoryRaster {
    fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn bounds(&self) -> BoundingBox {
        self.transform.bounds(self.width, self.height)
    }

    fn crs(&self) -> Crs {
        self.crs
    }

    fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    fn band_count(&self) -> usize {
        1
    }

    fn read_band(&self, band: usize) -> RasterResult<Grid> {
        self.check_band(band)?;
        Ok(Grid::new(self.width, self.height, self.values.clone()))
    }

    fn index(&self, x: f64, y: f64) -> (i64, i64) {
        self.transform.index(x, y)
    }

    fn read_window(&self, band: usize, window: Window) -> RasterResult<Grid> {
        self.check_band(band)?;
        Ok(slice_window(&self.values, self.width, self.height, window))
    }
}
