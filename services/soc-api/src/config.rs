//! Startup configuration: an optional YAML file overlaid with CLI/env values.

use std::path::{Path, PathBuf};

use soc_common::Crs;
use thiserror::Error;
use tile_index::{MeanPolicy, ServiceConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// Values given on the command line or through the environment.
///
/// Anything set here wins over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub data_dir: Option<PathBuf>,
    pub reference_crs: Option<Crs>,
    pub mean_policy: Option<MeanPolicy>,
}

impl Overrides {
    pub fn apply(self, mut config: ServiceConfig) -> ServiceConfig {
        if let Some(data_dir) = self.data_dir {
            config.data_dir = data_dir;
        }
        if let Some(crs) = self.reference_crs {
            config.reference_crs = crs;
        }
        if let Some(policy) = self.mean_policy {
            config.mean_policy = policy;
        }
        config
    }
}

/// Read a `ServiceConfig` from a YAML file. Missing keys take defaults.
pub fn load_file(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve the effective configuration.
pub fn resolve(file: Option<&Path>, overrides: Overrides) -> Result<ServiceConfig, ConfigError> {
    let base = match file {
        Some(path) => load_file(path)?,
        None => ServiceConfig::default(),
    };
    Ok(overrides.apply(base))
}
