//! Point queries and statistics over a fixed set of raster tiles.
//!
//! A [`TileRegistry`] is loaded once from a directory of GeoTIFFs. Each
//! [`Tile`] keeps its own CRS and computes summary statistics when it is
//! opened. A query point in the reference CRS is reprojected into each
//! tile's CRS in registry order by the [`PointResolver`]; the first tile
//! whose bounds contain it answers the query. Per-tile statistics are
//! folded into [`GlobalStats`] by [`aggregate`].
//!
//! [`SocService`] ties these together with an explicit start/shutdown
//! lifecycle for the serving layer.
//!
//! # Example
//!
//! ```rust,ignore
//! use projection::Proj4Transformer;
//! use tile_index::{ServiceConfig, SocService};
//!
//! let mut service = SocService::start(&ServiceConfig::default(), Arc::new(Proj4Transformer::new()))?;
//! let measurement = service.point_query(52.1, 5.3)?;
//! println!("{} from {}", measurement.value, measurement.source);
//! service.shutdown();
//! ```

pub mod config;
pub mod registry;
pub mod resolver;
pub mod service;
pub mod stats;
pub mod tile;

pub use config::ServiceConfig;
pub use registry::TileRegistry;
pub use resolver::{PointResolver, Resolved};
pub use service::{Measurement, SocService};
pub use stats::{aggregate, GlobalStats, MeanPolicy, TileStats};
pub use tile::Tile;
