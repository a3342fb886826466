//! The ordered collection of tiles served by the process.

use std::path::Path;

use projection::Transformer;
use soc_common::{SocError, SocResult};

use crate::tile::Tile;

/// File extensions recognized as raster tiles by default.
pub const DEFAULT_EXTENSIONS: &[&str] = &["tif", "tiff"];

/// Tiles in resolution order. Never empty after a successful load.
///
/// Order is fixed once built: the first tile whose bounds contain a query
/// point wins, so order is the tie-break between overlapping tiles.
#[derive(Debug)]
pub struct TileRegistry {
    tiles: Vec<Tile>,
}

impl TileRegistry {
    /// Load every tile in `dir` (non-recursive).
    ///
    /// Files are matched by extension (case-insensitive) and loaded in file
    /// name order. Any tile that fails to open, or whose CRS the transformer
    /// cannot handle, aborts the whole load; tiles opened before the failure
    /// are released when they go out of scope.
    pub fn load(
        dir: &Path,
        transformer: &dyn Transformer,
        extensions: &[String],
    ) -> SocResult<Self> {
        let entries = std::fs::read_dir(dir).map_err(|e| {
            SocError::Config(format!("failed to read data directory {}: {}", dir.display(), e))
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && has_extension(&path, extensions) {
                paths.push(path);
            }
        }
        paths.sort();

        let mut tiles = Vec::with_capacity(paths.len());
        for path in &paths {
            let tile = Tile::open(path)?;
            transformer.check(tile.crs()).map_err(|e| {
                SocError::Projection(format!("{}: {}", tile.identifier(), e))
            })?;

            tracing::info!(
                tile = %tile.identifier(),
                crs = %tile.crs(),
                left = tile.bounds().left,
                bottom = tile.bounds().bottom,
                right = tile.bounds().right,
                top = tile.bounds().top,
                has_stats = tile.stats().is_some(),
                "loaded tile"
            );
            tiles.push(tile);
        }

        if tiles.is_empty() {
            return Err(SocError::NoDatasets(dir.display().to_string()));
        }

        Ok(Self { tiles })
    }

    /// Build a registry from tiles that are already open, keeping their order.
    pub fn from_tiles(tiles: Vec<Tile>) -> SocResult<Self> {
        if tiles.is_empty() {
            return Err(SocError::NoDatasets("<in-memory>".to_string()));
        }
        Ok(Self { tiles })
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Find a tile by identifier.
    pub fn get(&self, identifier: &str) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.identifier() == identifier)
    }

    /// Close every tile. Calling this again is a no-op.
    ///
    /// Returns the number of tiles closed by this call.
    pub fn shutdown(&mut self) -> usize {
        let count = self.tiles.len();
        for tile in self.tiles.drain(..) {
            tile.close();
        }
        if count > 0 {
            tracing::info!(count, "closed all tiles");
        }
        count
    }
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// The default extension list as owned strings.
pub fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_has_extension_case_insensitive() {
        let exts = default_extensions();
        assert!(has_extension(&PathBuf::from("a.tif"), &exts));
        assert!(has_extension(&PathBuf::from("a.TIFF"), &exts));
        assert!(!has_extension(&PathBuf::from("a.tif.aux.xml"), &exts));
        assert!(!has_extension(&PathBuf::from("README"), &exts));
    }

    #[test]
    fn test_from_tiles_rejects_empty() {
        let err = TileRegistry::from_tiles(Vec::new()).unwrap_err();
        assert!(matches!(err, SocError::NoDatasets(_)));
    }
}
