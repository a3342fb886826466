//! Affine pixel <-> map coordinate transforms.
//!
//! Coefficients use GDAL ordering:
//!
//! ```text
//! x = origin_x + col * pixel_width  + row * row_rotation
//! y = origin_y + col * col_rotation + row * pixel_height
//! ```
//!
//! For a north-up raster the rotation terms are zero and `pixel_height`
//! is negative.

use soc_common::BoundingBox;

use crate::error::{RasterError, RasterResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub pixel_width: f64,
    pub row_rotation: f64,
    pub origin_y: f64,
    pub col_rotation: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// North-up transform from the upper-left corner and square-ish pixel sizes.
    ///
    /// `pixel_size_y` is the positive height of a pixel; rows grow southward.
    pub fn north_up(origin_x: f64, origin_y: f64, pixel_size_x: f64, pixel_size_y: f64) -> Self {
        Self {
            origin_x,
            pixel_width: pixel_size_x,
            row_rotation: 0.0,
            origin_y,
            col_rotation: 0.0,
            pixel_height: -pixel_size_y,
        }
    }

    /// Build from GeoTIFF `ModelTiepointTag` and `ModelPixelScaleTag`.
    ///
    /// The tiepoint maps raster position `(i, j)` to model `(x, y)`; the
    /// scale gives pixel size with Y measured positive southward.
    pub fn from_tiepoint_and_scale(tiepoint: &[f64], scale: &[f64]) -> RasterResult<Self> {
        if tiepoint.len() < 6 || scale.len() < 2 {
            return Err(RasterError::MissingGeoreference(format!(
                "tiepoint has {} values and pixel scale has {}; need 6 and 2",
                tiepoint.len(),
                scale.len()
            )));
        }

        let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);
        let (sx, sy) = (scale[0], scale[1]);
        if sx == 0.0 || sy == 0.0 {
            return Err(RasterError::MissingGeoreference(
                "pixel scale is zero".to_string(),
            ));
        }

        Ok(Self::north_up(x - i * sx, y + j * sy, sx, sy))
    }

    /// Build from a GeoTIFF `ModelTransformationTag` (4x4 row-major matrix).
    pub fn from_model_transformation(matrix: &[f64]) -> RasterResult<Self> {
        if matrix.len() < 16 {
            return Err(RasterError::MissingGeoreference(format!(
                "model transformation has {} values; need 16",
                matrix.len()
            )));
        }

        Ok(Self {
            origin_x: matrix[3],
            pixel_width: matrix[0],
            row_rotation: matrix[1],
            origin_y: matrix[7],
            col_rotation: matrix[4],
            pixel_height: matrix[5],
        })
    }

    /// Map coordinate of fractional pixel position `(col, row)`.
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.origin_x + col * self.pixel_width + row * self.row_rotation,
            self.origin_y + col * self.col_rotation + row * self.pixel_height,
        )
    }

    fn determinant(&self) -> f64 {
        self.pixel_width * self.pixel_height - self.row_rotation * self.col_rotation
    }

    /// Fractional pixel position `(col, row)` of a map coordinate.
    pub fn invert(&self, x: f64, y: f64) -> (f64, f64) {
        let det = self.determinant();
        let dx = x - self.origin_x;
        let dy = y - self.origin_y;
        let col = (self.pixel_height * dx - self.row_rotation * dy) / det;
        let row = (-self.col_rotation * dx + self.pixel_width * dy) / det;
        (col, row)
    }

    /// Integer `(row, col)` of the pixel containing `(x, y)`.
    ///
    /// Uses floor, so a coordinate on the far right or bottom edge maps one
    /// past the last column or row.
    pub fn index(&self, x: f64, y: f64) -> (i64, i64) {
        let (col, row) = self.invert(x, y);
        (row.floor() as i64, col.floor() as i64)
    }

    /// Extent covered by a `width` x `height` grid.
    pub fn bounds(&self, width: usize, height: usize) -> BoundingBox {
        let (w, h) = (width as f64, height as f64);
        let corners = [
            self.apply(0.0, 0.0),
            self.apply(w, 0.0),
            self.apply(0.0, h),
            self.apply(w, h),
        ];
        // Four corners are always present.
        BoundingBox::from_points(corners).unwrap_or(BoundingBox::new(0.0, 0.0, 0.0, 0.0))
    }

    /// True when the transform can be inverted.
    pub fn is_invertible(&self) -> bool {
        let det = self.determinant();
        det.is_finite() && det != 0.0
    }
}
