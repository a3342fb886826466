//! The raster capability interface and its value types.

use soc_common::{BoundingBox, Crs};

use crate::error::RasterResult;

/// A rectangular block of pixels, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    pub values: Vec<f64>,
}

impl Grid {
    pub fn new(width: usize, height: usize, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), width * height);
        Self {
            width,
            height,
            values,
        }
    }

    pub fn empty() -> Self {
        Self::new(0, 0, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.values.get(row * self.width + col).copied()
    }
}

/// A pixel window. Offsets are signed so that windows computed from
/// off-grid coordinates can be expressed and then clipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub row: i64,
    pub col: i64,
    pub height: usize,
    pub width: usize,
}

impl Window {
    pub fn new(row: i64, col: i64, height: usize, width: usize) -> Self {
        Self {
            row,
            col,
            height,
            width,
        }
    }

    /// A single-pixel window.
    pub fn pixel(row: i64, col: i64) -> Self {
        Self::new(row, col, 1, 1)
    }

    /// Intersect with a `grid_width` x `grid_height` grid.
    ///
    /// Returns `(row, col, height, width)` in grid coordinates, or `None`
    /// when nothing of the window lies on the grid.
    pub fn clip(&self, grid_width: usize, grid_height: usize) -> Option<(usize, usize, usize, usize)> {
        let row0 = self.row.max(0);
        let col0 = self.col.max(0);
        let row1 = (self.row + self.height as i64).min(grid_height as i64);
        let col1 = (self.col + self.width as i64).min(grid_width as i64);

        if row0 >= row1 || col0 >= col1 {
            return None;
        }

        Some((
            row0 as usize,
            col0 as usize,
            (row1 - row0) as usize,
            (col1 - col0) as usize,
        ))
    }
}

/// Read access to one opened raster dataset.
///
/// Bands are numbered from 1. Implementations must support concurrent
/// reads through `&self`.
pub trait RasterSource: Send + Sync {
    /// Grid size as `(width, height)`.
    fn dimensions(&self) -> (usize, usize);

    /// Extent in the native CRS.
    fn bounds(&self) -> BoundingBox;

    /// Native coordinate reference system.
    fn crs(&self) -> Crs;

    /// Nodata sentinel, if the dataset declares one.
    fn nodata(&self) -> Option<f64>;

    fn band_count(&self) -> usize;

    /// Read a whole band.
    fn read_band(&self, band: usize) -> RasterResult<Grid>;

    /// `(row, col)` of the pixel containing native coordinate `(x, y)`.
    ///
    /// The result may lie outside the grid.
    fn index(&self, x: f64, y: f64) -> (i64, i64);

    /// Read a window of a band, clipped to the grid.
    ///
    /// A window entirely off the grid yields an empty [`Grid`], not an error.
    fn read_window(&self, band: usize, window: Window) -> RasterResult<Grid>;

    /// Release the dataset.
    fn close(self: Box<Self>) {}
}

/// Copy a clipped window out of a row-major band buffer.
pub(crate) fn slice_window(
    band: &[f64],
    grid_width: usize,
    grid_height: usize,
    window: Window,
) -> Grid {
    let Some((row, col, height, width)) = window.clip(grid_width, grid_height) else {
        return Grid::empty();
    };

    let mut values = Vec::with_capacity(width * height);
    for r in row..row + height {
        let start = r * grid_width + col;
        values.extend_from_slice(&band[start..start + width]);
    }
    Grid::new(width, height, values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_clip() {
        let w = Window::pixel(3, 4);
        assert_eq!(w.clip(10, 10), Some((3, 4, 1, 1)));

        // Off every edge
        assert_eq!(Window::pixel(10, 0).clip(10, 10), None);
        assert_eq!(Window::pixel(0, 10).clip(10, 10), None);
        assert_eq!(Window::pixel(-1, 0).clip(10, 10), None);
        assert_eq!(Window::pixel(0, -1).clip(10, 10), None);

        // Partially overlapping
        assert_eq!(Window::new(-1, -1, 3, 3).clip(10, 10), Some((0, 0, 2, 2)));
        assert_eq!(Window::new(8, 8, 5, 5).clip(10, 10), Some((8, 8, 2, 2)));
    }

    #[test]
    fn test_slice_window() {
        // 3x2 grid:
        // 0 1 2
        // 3 4 5
        let band: Vec<f64> = (0..6).map(f64::from).collect();
        let grid = slice_window(&band, 3, 2, Window::new(0, 1, 2, 2));
        assert_eq!(grid.width, 2);
        assert_eq!(grid.height, 2);
        assert_eq!(grid.values, vec![1.0, 2.0, 4.0, 5.0]);
        assert_eq!(grid.get(1, 0), Some(4.0));
        assert_eq!(grid.get(2, 0), None);

        assert!(slice_window(&band, 3, 2, Window::pixel(2, 0)).is_empty());
    }
}
