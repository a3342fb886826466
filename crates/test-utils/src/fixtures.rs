//! Common tile fixtures.

use crate::geotiff::GeoTiffSpec;

/// EPSG codes used across the tests.
pub mod epsg {
    pub const WGS84: u16 = 4326;
    pub const WEB_MERCATOR: u16 = 3857;
    pub const UTM_33N: u16 = 32633;
}

/// Nodata sentinel used by the fixture tiles.
pub const NODATA: f32 = -1.0;

/// Tile "A": a 10x10 WGS84 grid covering (0,0)-(10,10), every pixel 5.0,
/// nodata -1.
pub fn tile_a() -> GeoTiffSpec {
    GeoTiffSpec::wgs84(10, 10, 0.0, 10.0, 1.0)
        .filled(5.0)
        .with_nodata(NODATA as f64)
}

/// A 10x10 WGS84 grid covering (0,0)-(10,10) where every pixel is nodata.
pub fn empty_tile() -> GeoTiffSpec {
    GeoTiffSpec::wgs84(10, 10, 0.0, 10.0, 1.0)
        .filled(NODATA)
        .with_nodata(NODATA as f64)
}

/// A 4x4 Web Mercator tile around the origin, 1 km pixels, values `row * 4 + col`.
pub fn mercator_tile() -> GeoTiffSpec {
    GeoTiffSpec::new(epsg::WEB_MERCATOR, 4, 4, -2000.0, 2000.0, 1000.0)
        .with_values(crate::index_grid(4, 4))
}
