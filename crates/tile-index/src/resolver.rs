//! Resolution of a geographic point to the tile that covers it.

use std::collections::HashMap;

use projection::{transform_point, Transformer};
use soc_common::{Crs, SocError, SocResult};

use crate::registry::TileRegistry;
use crate::tile::Tile;

/// A query point located inside a tile.
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    pub tile: &'a Tile,
    /// X in the tile's native CRS.
    pub x: f64,
    /// Y in the tile's native CRS.
    pub y: f64,
}

impl Resolved<'_> {
    /// Read the pixel under the resolved point.
    pub fn read(&self) -> SocResult<f64> {
        self.tile.read_pixel(self.x, self.y)
    }
}

/// Finds the first tile, in registry order, that covers a lon/lat point.
///
/// No attempt is made to choose the smallest or finest tile: a linear scan
/// stops at the first match.
#[derive(Debug, Clone, Copy)]
pub struct PointResolver {
    reference: Crs,
}

impl Default for PointResolver {
    fn default() -> Self {
        Self::new(Crs::WGS84)
    }
}

impl PointResolver {
    /// `reference` is the CRS query points are expressed in.
    pub fn new(reference: Crs) -> Self {
        Self { reference }
    }

    pub fn reference(&self) -> Crs {
        self.reference
    }

    /// Check that a point lies within lon [-180, 180] and lat [-90, 90].
    pub fn validate(lon: f64, lat: f64) -> SocResult<()> {
        let lat_ok = (-90.0..=90.0).contains(&lat);
        let lon_ok = (-180.0..=180.0).contains(&lon);
        if lat_ok && lon_ok {
            Ok(())
        } else {
            Err(SocError::InvalidCoordinate { lat, lon })
        }
    }

    /// Resolve `(lon, lat)` against `registry`.
    ///
    /// A tile whose CRS cannot represent the point is skipped rather than
    /// failing the query.
    pub fn resolve<'r>(
        &self,
        registry: &'r TileRegistry,
        transformer: &dyn Transformer,
        lon: f64,
        lat: f64,
    ) -> SocResult<Resolved<'r>> {
        Self::validate(lon, lat)?;

        // Tiles often share a CRS; project once per CRS.
        let mut projected: HashMap<Crs, Option<(f64, f64)>> = HashMap::new();

        for tile in registry.iter() {
            let point = *projected.entry(tile.crs()).or_insert_with(|| {
                match transform_point(transformer, self.reference, tile.crs(), lon, lat) {
                    Ok(point) => point,
                    Err(e) => {
                        tracing::debug!(
                            tile = %tile.identifier(),
                            error = %e,
                            "reprojection failed, skipping tile"
                        );
                        None
                    }
                }
            });

            let Some((x, y)) = point else {
                tracing::debug!(
                    tile = %tile.identifier(),
                    lon,
                    lat,
                    "point undefined in tile CRS, skipping tile"
                );
                continue;
            };

            if tile.bounds_contain(x, y) {
                return Ok(Resolved { tile, x, y });
            }
        }

        Err(SocError::OutOfBounds { lat, lon })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use projection::{IdentityTransformer, ProjectionError, ProjectionResult};
    use raster::{GeoTransform, MemoryRaster};

    fn tile(id: &str, crs: Crs, west: f64, north: f64, size: usize, value: f64) -> Tile {
        let raster = MemoryRaster::filled(
            size,
            size,
            GeoTransform::north_up(west, north, 1.0, 1.0),
            crs,
            value,
        )
        .unwrap()
        .with_nodata(-1.0);
        Tile::from_source(id, Box::new(raster)).unwrap()
    }

    /// Fails every transform into one CRS, identity for the rest.
    struct BrokenFor(Crs);

    impl Transformer for BrokenFor {
        fn check(&self, _crs: Crs) -> ProjectionResult<()> {
            Ok(())
        }

        fn transform(
            &self,
            src: Crs,
            dst: Crs,
            points: &[(f64, f64)],
        ) -> ProjectionResult<Vec<Option<(f64, f64)>>> {
            if dst == self.0 {
                return Err(ProjectionError::UnknownCrs(dst));
            }
            IdentityTransformer.transform(src, dst, points)
        }
    }

    /// Reports every point as unrepresentable in one CRS, identity for the rest.
    struct UndefinedFor(Crs);

    impl Transformer for UndefinedFor {
        fn check(&self, _crs: Crs) -> ProjectionResult<()> {
            Ok(())
        }

        fn transform(
            &self,
            src: Crs,
            dst: Crs,
            points: &[(f64, f64)],
        ) -> ProjectionResult<Vec<Option<(f64, f64)>>> {
            if dst == self.0 {
                return Ok(vec![None; points.len()]);
            }
            IdentityTransformer.transform(src, dst, points)
        }
    }

    #[test]
    fn test_validate_ranges_inclusive() {
        assert!(PointResolver::validate(180.0, 90.0).is_ok());
        assert!(PointResolver::validate(-180.0, -90.0).is_ok());
        assert!(PointResolver::validate(0.0, 90.0001).is_err());
        assert!(PointResolver::validate(-180.0001, 0.0).is_err());
        assert!(PointResolver::validate(f64::NAN, 0.0).is_err());
        assert!(PointResolver::validate(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_invalid_coordinate_never_out_of_bounds() {
        let registry =
            TileRegistry::from_tiles(vec![tile("a", Crs::WGS84, 0.0, 10.0, 10, 5.0)]).unwrap();
        let resolver = PointResolver::default();
        for (lon, lat) in [(0.0, 91.0), (181.0, 0.0), (-200.0, -100.0)] {
            let err = resolver
                .resolve(&registry, &IdentityTransformer, lon, lat)
                .unwrap_err();
            assert!(matches!(err, SocError::InvalidCoordinate { .. }), "{err}");
        }
    }

    #[test]
    fn test_first_match_wins_regardless_of_size() {
        // "big" covers (0,0)-(10,10); "small" covers (4,4)-(6,6).
        let big = tile("big", Crs::WGS84, 0.0, 10.0, 10, 1.0);
        let small = tile("small", Crs::WGS84, 4.0, 6.0, 2, 2.0);
        let resolver = PointResolver::default();

        let registry = TileRegistry::from_tiles(vec![big, small]).unwrap();
        let hit = resolver
            .resolve(&registry, &IdentityTransformer, 5.0, 5.0)
            .unwrap();
        assert_eq!(hit.tile.identifier(), "big");
        assert_eq!(hit.read().unwrap(), 1.0);

        let big = tile("big", Crs::WGS84, 0.0, 10.0, 10, 1.0);
        let small = tile("small", Crs::WGS84, 4.0, 6.0, 2, 2.0);
        let registry = TileRegistry::from_tiles(vec![small, big]).unwrap();
        let hit = resolver
            .resolve(&registry, &IdentityTransformer, 5.0, 5.0)
            .unwrap();
        assert_eq!(hit.tile.identifier(), "small");
        assert_eq!(hit.read().unwrap(), 2.0);
    }

    #[test]
    fn test_projection_failure_skips_tile() {
        let broken = Crs::from_epsg(32633);
        let registry = TileRegistry::from_tiles(vec![
            tile("broken", broken, 0.0, 10.0, 10, 1.0),
            tile("good", Crs::WGS84, 0.0, 10.0, 10, 7.0),
        ])
        .unwrap();

        let hit = PointResolver::default()
            .resolve(&registry, &BrokenFor(broken), 5.0, 5.0)
            .unwrap();
        assert_eq!(hit.tile.identifier(), "good");
    }

    #[test]
    fn test_undefined_point_skips_tile() {
        // Both "undefined" tiles would cover (5, 5) if the point projected.
        let utm = Crs::from_epsg(32633);
        let registry = TileRegistry::from_tiles(vec![
            tile("undefined", utm, 0.0, 10.0, 10, 1.0),
            tile("undefined-too", utm, 0.0, 10.0, 10, 2.0),
            tile("good", Crs::WGS84, 0.0, 10.0, 10, 7.0),
        ])
        .unwrap();

        let hit = PointResolver::default()
            .resolve(&registry, &UndefinedFor(utm), 5.0, 5.0)
            .unwrap();
        assert_eq!(hit.tile.identifier(), "good");
        assert_eq!(hit.read().unwrap(), 7.0);

        let only_undefined =
            TileRegistry::from_tiles(vec![tile("undefined", utm, 0.0, 10.0, 10, 1.0)]).unwrap();
        let err = PointResolver::default()
            .resolve(&only_undefined, &UndefinedFor(utm), 5.0, 5.0)
            .unwrap_err();
        assert!(matches!(err, SocError::OutOfBounds { .. }), "{err}");
    }

    #[test]
    fn test_uncovered_point_is_out_of_bounds() {
        let registry =
            TileRegistry::from_tiles(vec![tile("a", Crs::WGS84, 0.0, 10.0, 10, 5.0)]).unwrap();
        let err = PointResolver::default()
            .resolve(&registry, &IdentityTransformer, -5.0, -5.0)
            .unwrap_err();
        assert!(matches!(err, SocError::OutOfBounds { .. }));
    }

    #[test]
    fn test_edges_are_covered() {
        let registry =
            TileRegistry::from_tiles(vec![tile("a", Crs::WGS84, 0.0, 10.0, 10, 5.0)]).unwrap();
        let resolver = PointResolver::default();
        for (lon, lat) in [(0.0, 0.0), (10.0, 10.0), (0.0, 10.0), (10.0, 0.0)] {
            let hit = resolver
                .resolve(&registry, &IdentityTransformer, lon, lat)
                .unwrap();
            assert_eq!(hit.tile.identifier(), "a");
        }
    }
}
