//! Minimal GeoTIFF writer for tests.
//!
//! Writes single-band Float32 images with the georeferencing tags the
//! raster reader understands.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;
use tiff::TiffResult;

const TAG_MODEL_PIXEL_SCALE: u16 = 33550;
const TAG_MODEL_TIEPOINT: u16 = 33922;
const TAG_MODEL_TRANSFORMATION: u16 = 34264;
const TAG_GEO_KEY_DIRECTORY: u16 = 34735;
const TAG_GDAL_NODATA: u16 = 42113;

/// Description of a synthetic north-up GeoTIFF.
#[derive(Debug, Clone)]
pub struct GeoTiffSpec {
    pub epsg: u16,
    pub width: usize,
    pub height: usize,
    /// X of the upper-left corner.
    pub origin_x: f64,
    /// Y of the upper-left corner.
    pub origin_y: f64,
    pub pixel_size: f64,
    pub nodata: Option<f64>,
    pub values: Vec<f32>,
    /// Georeference with `ModelTransformationTag` instead of tiepoint + scale.
    pub use_model_transformation: bool,
    /// Leave out the GeoKey directory entirely.
    pub omit_geokeys: bool,
}

impl GeoTiffSpec {
    pub fn new(
        epsg: u16,
        width: usize,
        height: usize,
        origin_x: f64,
        origin_y: f64,
        pixel_size: f64,
    ) -> Self {
        Self {
            epsg,
            width,
            height,
            origin_x,
            origin_y,
            pixel_size,
            nodata: None,
            values: vec![0.0; width * height],
            use_model_transformation: false,
            omit_geokeys: false,
        }
    }

    /// A WGS84 tile.
    pub fn wgs84(width: usize, height: usize, west: f64, north: f64, pixel_size: f64) -> Self {
        Self::new(4326, width, height, west, north, pixel_size)
    }

    pub fn filled(mut self, value: f32) -> Self {
        self.values = crate::constant_grid(self.width, self.height, value);
        self
    }

    pub fn with_values(mut self, values: Vec<f32>) -> Self {
        assert_eq!(values.len(), self.width * self.height, "grid size mismatch");
        self.values = values;
        self
    }

    pub fn with_nodata(mut self, nodata: f64) -> Self {
        self.nodata = Some(nodata);
        self
    }

    pub fn with_pixel(mut self, row: usize, col: usize, value: f32) -> Self {
        self.values[row * self.width + col] = value;
        self
    }

    pub fn with_model_transformation(mut self) -> Self {
        self.use_model_transformation = true;
        self
    }

    pub fn without_geokeys(mut self) -> Self {
        self.omit_geokeys = true;
        self
    }

    /// Map coordinate of the center of pixel `(row, col)`.
    pub fn pixel_center(&self, row: usize, col: usize) -> (f64, f64) {
        (
            self.origin_x + (col as f64 + 0.5) * self.pixel_size,
            self.origin_y - (row as f64 + 0.5) * self.pixel_size,
        )
    }

    fn geo_keys(&self) -> Vec<u16> {
        let geographic = (4000..5000).contains(&self.epsg);
        // GTModelType: 1 = projected, 2 = geographic
        let model_type = if geographic { 2 } else { 1 };
        let crs_key = if geographic { 2048 } else { 3072 };
        vec![
            1, 1, 0, 3, //
            1024, 0, 1, model_type, //
            1025, 0, 1, 1, // PixelIsArea
            crs_key, 0, 1, self.epsg,
        ]
    }
}

/// Write `spec` to `dir/name` and return the full path.
pub fn write_geotiff(dir: &Path, name: &str, spec: &GeoTiffSpec) -> TiffResult<PathBuf> {
    let path = dir.join(name);
    let file = BufWriter::new(File::create(&path)?);
    let mut encoder = TiffEncoder::new(file)?;
    let mut image =
        encoder.new_image::<colortype::Gray32Float>(spec.width as u32, spec.height as u32)?;

    {
        let dir = image.encoder();
        if spec.use_model_transformation {
            let matrix = [
                spec.pixel_size, 0.0, 0.0, spec.origin_x, //
                0.0, -spec.pixel_size, 0.0, spec.origin_y, //
                0.0, 0.0, 0.0, 0.0, //
                0.0, 0.0, 0.0, 1.0,
            ];
            dir.write_tag(Tag::from_u16_exhaustive(TAG_MODEL_TRANSFORMATION), &matrix[..])?;
        } else {
            let scale = [spec.pixel_size, spec.pixel_size, 0.0];
            let tiepoint = [0.0, 0.0, 0.0, spec.origin_x, spec.origin_y, 0.0];
            dir.write_tag(Tag::from_u16_exhaustive(TAG_MODEL_PIXEL_SCALE), &scale[..])?;
            dir.write_tag(Tag::from_u16_exhaustive(TAG_MODEL_TIEPOINT), &tiepoint[..])?;
        }

        if !spec.omit_geokeys {
            let keys = spec.geo_keys();
            dir.write_tag(Tag::from_u16_exhaustive(TAG_GEO_KEY_DIRECTORY), &keys[..])?;
        }

        if let Some(nodata) = spec.nodata {
            let text = nodata.to_string();
            dir.write_tag(Tag::from_u16_exhaustive(TAG_GDAL_NODATA), text.as_str())?;
        }
    }

    image.write_data(&spec.values)?;
    Ok(path)
}

/// Write a file with a `.tif` extension that is not a TIFF.
pub fn write_corrupt_tiff(dir: &Path, name: &str) -> std::io::Result<PathBuf> {
    let path = dir.join(name);
    std::fs::write(&path, b"definitely not a tiff")?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_geotiff_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let spec = GeoTiffSpec::wgs84(4, 4, 0.0, 4.0, 1.0).filled(2.5).with_nodata(-1.0);
        let path = write_geotiff(dir.path(), "t.tif", &spec).unwrap();
        let size = std::fs::metadata(&path).unwrap().len();
        assert!(size > 64);
    }

    #[test]
    fn test_pixel_center() {
        let spec = GeoTiffSpec::wgs84(10, 10, 0.0, 10.0, 1.0);
        assert_eq!(spec.pixel_center(0, 0), (0.5, 9.5));
        assert_eq!(spec.pixel_center(9, 9), (9.5, 0.5));
    }
}
