//! GeoTIFF-backed raster source.
//!
//! Georeferencing is read from the standard GeoTIFF tags:
//! - `ModelPixelScaleTag` + `ModelTiepointTag`, or `ModelTransformationTag`
//! - the GeoKey directory for the EPSG code and raster type
//! - GDAL's `GDAL_NODATA` ASCII tag for the nodata sentinel
//!
//! Pixels are decoded once when the file is opened and served from memory
//! afterwards, so reads never touch the file again.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use soc_common::{BoundingBox, Crs};
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::tags::Tag;

use crate::error::{RasterError, RasterResult};
use crate::geotransform::GeoTransform;
use crate::source::{slice_window, Grid, RasterSource, Window};

pub const TAG_MODEL_PIXEL_SCALE: u16 = 33550;
pub const TAG_MODEL_TIEPOINT: u16 = 33922;
pub const TAG_MODEL_TRANSFORMATION: u16 = 34264;
pub const TAG_GEO_KEY_DIRECTORY: u16 = 34735;
pub const TAG_GDAL_NODATA: u16 = 42113;

// GeoKey IDs
const KEY_RASTER_TYPE: u16 = 1025;
const KEY_GEOGRAPHIC_TYPE: u16 = 2048;
const KEY_PROJECTED_CS_TYPE: u16 = 3072;

const RASTER_PIXEL_IS_POINT: u16 = 2;
const USER_DEFINED: u16 = 32767;

/// A GeoTIFF opened for point reads.
pub struct GeoTiffSource {
    path: PathBuf,
    width: usize,
    height: usize,
    transform: GeoTransform,
    crs: Crs,
    nodata: Option<f64>,
    bands: Vec<Vec<f64>>,
}

impl std::fmt::Debug for GeoTiffSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeoTiffSource")
            .field("path", &self.path)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("crs", &self.crs)
            .field("nodata", &self.nodata)
            .field("bands", &self.bands.len())
            .finish()
    }
}

impl GeoTiffSource {
    /// Open and decode a GeoTIFF.
    pub fn open(path: impl AsRef<Path>) -> RasterResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut decoder = Decoder::new(BufReader::new(file))?.with_limits(Limits::unlimited());

        let (width_u32, height_u32) = decoder.dimensions()?;
        let width = width_u32 as usize;
        let height = height_u32 as usize;

        let geo_keys = read_u16_tag(&mut decoder, TAG_GEO_KEY_DIRECTORY)?.ok_or_else(|| {
            RasterError::MissingGeoreference(format!("{} has no GeoKey directory", path.display()))
        })?;
        let keys = GeoKeys::parse(&geo_keys)?;

        let mut transform = read_transform(&mut decoder)?.ok_or_else(|| {
            RasterError::MissingGeoreference(format!(
                "{} has neither tiepoint/scale nor a model transformation",
                path.display()
            ))
        })?;
        if !transform.is_invertible() {
            return Err(RasterError::MissingGeoreference(format!(
                "{} has a degenerate geotransform",
                path.display()
            )));
        }
        if keys.get(KEY_RASTER_TYPE) == Some(RASTER_PIXEL_IS_POINT) {
            // Tiepoints refer to pixel centers; move the origin to the corner.
            let (x, y) = transform.apply(-0.5, -0.5);
            transform.origin_x = x;
            transform.origin_y = y;
        }

        let crs = keys.crs()?;
        let nodata = read_nodata(&mut decoder)?;

        let decoded = decoder.read_image()?;
        let nodata = nodata.map(|v| nodata_as_sample(v, &decoded));
        let samples = widen(decoded)?;
        let bands = split_bands(samples, width, height)?;

        tracing::debug!(
            path = %path.display(),
            width,
            height,
            bands = bands.len(),
            %crs,
            ?nodata,
            "opened GeoTIFF"
        );

        Ok(Self {
            path: path.to_path_buf(),
            width,
            height,
            transform,
            crs,
            nodata,
            bands,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn transform(&self) -> GeoTransform {
        self.transform
    }

    fn band_data(&self, band: usize) -> RasterResult<&[f64]> {
        band.checked_sub(1)
            .and_then(|i| self.bands.get(i))
            .map(Vec::as_slice)
            .ok_or(RasterError::InvalidBand {
                band,
                count: self.bands.len(),
            })
    }
}

impl RasterSource for GeoTiffSource {
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
        self.bands.len()
    }

    fn read_band(&self, band: usize) -> RasterResult<Grid> {
        let data = self.band_data(band)?;
        Ok(Grid::new(self.width, self.height, data.to_vec()))
    }

    fn index(&self, x: f64, y: f64) -> (i64, i64) {
        self.transform.index(x, y)
    }

    fn read_window(&self, band: usize, window: Window) -> RasterResult<Grid> {
        let data = self.band_data(band)?;
        Ok(slice_window(data, self.width, self.height, window))
    }

    fn close(self: Box<Self>) {
        tracing::debug!(path = %self.path.display(), "closed GeoTIFF");
    }
}

type TiffReader = BufReader<File>;

fn read_u16_tag(decoder: &mut Decoder<TiffReader>, tag: u16) -> RasterResult<Option<Vec<u16>>> {
    Ok(decoder
        .find_tag(Tag::from_u16_exhaustive(tag))?
        .map(|v| v.into_u16_vec())
        .transpose()?)
}

fn read_f64_tag(decoder: &mut Decoder<TiffReader>, tag: u16) -> RasterResult<Option<Vec<f64>>> {
    Ok(decoder
        .find_tag(Tag::from_u16_exhaustive(tag))?
        .map(|v| v.into_f64_vec())
        .transpose()?)
}

fn read_transform(decoder: &mut Decoder<TiffReader>) -> RasterResult<Option<GeoTransform>> {
    let scale = read_f64_tag(decoder, TAG_MODEL_PIXEL_SCALE)?;
    let tiepoint = read_f64_tag(decoder, TAG_MODEL_TIEPOINT)?;
    if let (Some(scale), Some(tiepoint)) = (scale, tiepoint) {
        return GeoTransform::from_tiepoint_and_scale(&tiepoint, &scale).map(Some);
    }

    match read_f64_tag(decoder, TAG_MODEL_TRANSFORMATION)? {
        Some(matrix) => GeoTransform::from_model_transformation(&matrix).map(Some),
        None => Ok(None),
    }
}

fn read_nodata(decoder: &mut Decoder<TiffReader>) -> RasterResult<Option<f64>> {
    let Some(value) = decoder.find_tag(Tag::from_u16_exhaustive(TAG_GDAL_NODATA))? else {
        return Ok(None);
    };
    let text = value.into_string()?;
    parse_nodata(&text).map(Some)
}

/// Parse a `GDAL_NODATA` string such as `"-9999"` or `"nan"`.
pub fn parse_nodata(text: &str) -> RasterResult<f64> {
    let trimmed = text.trim_matches(|c: char| c.is_whitespace() || c == '\0');
    trimmed
        .parse::<f64>()
        .map_err(|_| RasterError::Decode(format!("invalid GDAL_NODATA value '{}'", text)))
}

/// Round `nodata` the way the pixels were stored so the two compare equal
/// after widening. Integer samples widen exactly, so only Float32 needs it.
fn nodata_as_sample(nodata: f64, decoded: &DecodingResult) -> f64 {
    match decoded {
        DecodingResult::F32(_) => nodata as f32 as f64,
        _ => nodata,
    }
}

/// GeoKey directory entries whose value is stored inline.
struct GeoKeys {
    entries: Vec<(u16, u16)>,
}

impl GeoKeys {
    fn parse(directory: &[u16]) -> RasterResult<Self> {
        if directory.len() < 4 {
            return Err(RasterError::MissingGeoreference(
                "GeoKey directory header is truncated".to_string(),
            ));
        }

        let count = directory[3] as usize;
        let mut entries = Vec::with_capacity(count);
        for entry in directory[4..].chunks_exact(4).take(count) {
            let (key, location, value) = (entry[0], entry[1], entry[3]);
            // Location 0 means the value is the offset field itself
            if location == 0 {
                entries.push((key, value));
            }
        }
        Ok(Self { entries })
    }

    fn get(&self, key: u16) -> Option<u16> {
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }

    fn crs(&self) -> RasterResult<Crs> {
        let code = self
            .get(KEY_PROJECTED_CS_TYPE)
            .or_else(|| self.get(KEY_GEOGRAPHIC_TYPE))
            .ok_or_else(|| {
                RasterError::UnsupportedCrs("no EPSG code in GeoKey directory".to_string())
            })?;

        if code == USER_DEFINED {
            return Err(RasterError::UnsupportedCrs(
                "user-defined CRS is not supported".to_string(),
            ));
        }
        Ok(Crs::from_epsg(code))
    }
}

fn widen(decoded: DecodingResult) -> RasterResult<Vec<f64>> {
    #[allow(unreachable_patterns)]
    let values = match decoded {
        DecodingResult::U8(data) => data.into_iter().map(f64::from).collect(),
        DecodingResult::U16(data) => data.into_iter().map(f64::from).collect(),
        DecodingResult::U32(data) => data.into_iter().map(f64::from).collect(),
        DecodingResult::U64(data) => data.into_iter().map(|v| v as f64).collect(),
        DecodingResult::I8(data) => data.into_iter().map(f64::from).collect(),
        DecodingResult::I16(data) => data.into_iter().map(f64::from).collect(),
        DecodingResult::I32(data) => data.into_iter().map(f64::from).collect(),
        DecodingResult::I64(data) => data.into_iter().map(|v| v as f64).collect(),
        DecodingResult::F32(data) => data.into_iter().map(f64::from).collect(),
        DecodingResult::F64(data) => data,
        _ => {
            return Err(RasterError::Decode(
                "unsupported sample format".to_string(),
            ))
        }
    };
    Ok(values)
}

/// Split pixel-interleaved samples into one buffer per band.
fn split_bands(samples: Vec<f64>, width: usize, height: usize) -> RasterResult<Vec<Vec<f64>>> {
    let pixels = width * height;
    if pixels == 0 || samples.len() % pixels != 0 {
        return Err(RasterError::Shape(format!(
            "{} samples for a {}x{} grid",
            samples.len(),
            width,
            height
        )));
    }

    let count = samples.len() / pixels;
    if count == 1 {
        return Ok(vec![samples]);
    }

    let mut bands = vec![Vec::with_capacity(pixels); count];
    for pixel in samples.chunks_exact(count) {
        for (band, value) in bands.iter_mut().zip(pixel) {
            band.push(*value);
        }
    }
    Ok(bands)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nodata() {
        assert_eq!(parse_nodata("-9999").unwrap(), -9999.0);
        assert_eq!(parse_nodata(" -1 \0").unwrap(), -1.0);
        assert!(parse_nodata("nan").unwrap().is_nan());
        assert!(parse_nodata("none").is_err());
    }

    #[test]
    fn test_nodata_rounded_to_float32() {
        let decoded = DecodingResult::F32(vec![-3.4e38]);
        assert_eq!(nodata_as_sample(-3.4e38, &decoded), f64::from(-3.4e38_f32));
        assert_ne!(f64::from(-3.4e38_f32), -3.4e38);
        assert!(nodata_as_sample(f64::NAN, &decoded).is_nan());

        let decoded = DecodingResult::F64(vec![-3.4e38]);
        assert_eq!(nodata_as_sample(-3.4e38, &decoded), -3.4e38);

        let decoded = DecodingResult::I16(vec![-9999]);
        assert_eq!(nodata_as_sample(-9999.0, &decoded), -9999.0);
    }

    #[test]
    fn test_geokeys_projected_wins() {
        // header, then (key, location, count, value)
        let dir = [
            1, 1, 0, 3, //
            1024, 0, 1, 1, //
            2048, 0, 1, 4326, //
            3072, 0, 1, 32633,
        ];
        let keys = GeoKeys::parse(&dir).unwrap();
        assert_eq!(keys.crs().unwrap(), Crs::from_epsg(32633));
    }

    #[test]
    fn test_geokeys_geographic_only() {
        let dir = [1, 1, 0, 1, 2048, 0, 1, 4326];
        assert_eq!(GeoKeys::parse(&dir).unwrap().crs().unwrap(), Crs::WGS84);
    }

    #[test]
    fn test_geokeys_user_defined_rejected() {
        let dir = [1, 1, 0, 1, 3072, 0, 1, 32767];
        assert!(matches!(
            GeoKeys::parse(&dir).unwrap().crs(),
            Err(RasterError::UnsupportedCrs(_))
        ));
    }

    #[test]
    fn test_split_bands_interleaved() {
        // 2x1 grid, 2 bands: pixel0 = (1, 10), pixel1 = (2, 20)
        let bands = split_bands(vec![1.0, 10.0, 2.0, 20.0], 2, 1).unwrap();
        assert_eq!(bands, vec![vec![1.0, 2.0], vec![10.0, 20.0]]);

        assert!(split_bands(vec![1.0, 2.0, 3.0], 2, 1).is_err());
    }
}
