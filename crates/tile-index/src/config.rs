//! Service configuration.

use std::path::PathBuf;

use serde::Deserialize;
use soc_common::Crs;

use crate::registry::default_extensions;
use crate::stats::MeanPolicy;

/// Settings that shape tile loading and query answering.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Directory scanned for raster tiles.
    pub data_dir: PathBuf,

    /// CRS of incoming query points.
    pub reference_crs: Crs,

    /// How per-tile means combine into the global mean.
    pub mean_policy: MeanPolicy,

    /// File extensions treated as tiles.
    pub extensions: Vec<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("geodata"),
            reference_crs: Crs::WGS84,
            mean_policy: MeanPolicy::default(),
            extensions: default_extensions(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("geodata"));
        assert_eq!(config.reference_crs, Crs::WGS84);
        assert_eq!(config.mean_policy, MeanPolicy::AllTiles);
        assert_eq!(config.extensions, vec!["tif", "tiff"]);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "data_dir: /srv/soc\nmean_policy: pixel-weighted\n";
        let config: ServiceConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/soc"));
        assert_eq!(config.mean_policy, MeanPolicy::PixelWeighted);
        assert_eq!(config.reference_crs, Crs::WGS84);
    }

    #[test]
    fn test_yaml_reference_crs() {
        let yaml = "reference_crs: EPSG:3857\nextensions: [gtiff]\n";
        let config: ServiceConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.reference_crs, Crs::WEB_MERCATOR);
        assert_eq!(config.extensions, vec!["gtiff"]);
    }
}
