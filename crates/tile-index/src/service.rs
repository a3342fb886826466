//! Query service with an explicit load/shutdown lifecycle.
//!
//! `SocService` owns everything computed at startup: the tile registry
//! and the global statistics. After `start` returns it is read-only, so it
//! can be shared behind an `Arc` by any number of concurrent handlers.
//! `shutdown` is the only mutating call and belongs after serving stops.

use std::sync::Arc;

use projection::Transformer;
use serde::Serialize;
use soc_common::{Crs, SocResult};

use crate::config::ServiceConfig;
use crate::registry::TileRegistry;
use crate::resolver::PointResolver;
use crate::stats::{aggregate, GlobalStats, MeanPolicy};
use crate::tile::Tile;

/// A successful point query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub value: f64,
    /// Identifier of the tile the value came from.
    pub source: String,
}

pub struct SocService {
    registry: TileRegistry,
    stats: GlobalStats,
    resolver: PointResolver,
    transformer: Arc<dyn Transformer>,
    mean_policy: MeanPolicy,
}

impl std::fmt::Debug for SocService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocService")
            .field("tiles", &self.registry.len())
            .field("stats", &self.stats)
            .field("resolver", &self.resolver)
            .field("mean_policy", &self.mean_policy)
            .finish()
    }
}

impl SocService {
    /// Load tiles from `config.data_dir` and compute global statistics.
    pub fn start(config: &ServiceConfig, transformer: Arc<dyn Transformer>) -> SocResult<Self> {
        tracing::info!(data_dir = %config.data_dir.display(), "loading tiles");

        transformer.check(config.reference_crs)?;
        let registry =
            TileRegistry::load(&config.data_dir, transformer.as_ref(), &config.extensions)?;

        Self::from_registry(
            registry,
            transformer,
            config.reference_crs,
            config.mean_policy,
        )
    }

    /// Wrap an already loaded registry.
    pub fn from_registry(
        registry: TileRegistry,
        transformer: Arc<dyn Transformer>,
        reference_crs: Crs,
        mean_policy: MeanPolicy,
    ) -> SocResult<Self> {
        let stats = aggregate(registry.tiles(), mean_policy)?;

        tracing::info!(
            tiles = registry.len(),
            min_soc = stats.min_soc,
            max_soc = stats.max_soc,
            mean_soc = stats.mean_soc,
            %mean_policy,
            "finished loading tiles"
        );

        Ok(Self {
            registry,
            stats,
            resolver: PointResolver::new(reference_crs),
            transformer,
            mean_policy,
        })
    }

    /// Value at `(lat, lon)` in the reference CRS.
    pub fn point_query(&self, lat: f64, lon: f64) -> SocResult<Measurement> {
        let resolved =
            self.resolver
                .resolve(&self.registry, self.transformer.as_ref(), lon, lat)?;
        let value = resolved.read()?;

        Ok(Measurement {
            value,
            source: resolved.tile.identifier().to_string(),
        })
    }

    /// Global statistics computed at startup.
    pub fn stats(&self) -> &GlobalStats {
        &self.stats
    }

    pub fn registry(&self) -> &TileRegistry {
        &self.registry
    }

    /// Loaded tiles in resolution order.
    pub fn tiles(&self) -> &[Tile] {
        self.registry.tiles()
    }

    pub fn reference_crs(&self) -> Crs {
        self.resolver.reference()
    }

    pub fn mean_policy(&self) -> MeanPolicy {
        self.mean_policy
    }

    /// Close all tiles. Safe to call more than once.
    pub fn shutdown(&mut self) -> usize {
        tracing::info!("shutting down, closing all tiles");
        self.registry.shutdown()
    }
}
