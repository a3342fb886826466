//! Pure-Rust reprojection using proj4rs and the crs-definitions EPSG database.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use proj4rs::proj::Proj;
use soc_common::Crs;

use crate::error::{ProjectionError, ProjectionResult};
use crate::transform::Transformer;

/// Transformer backed by `proj4rs`.
///
/// EPSG codes are resolved through `crs-definitions`, so anything in that
/// database (UTM zones, national grids, equal-area systems) works without
/// a system PROJ installation.
///
/// Parsed projections are cached per CRS. `check` fills the cache at load
/// time, so queries never re-parse a definition.
#[derive(Default)]
pub struct Proj4Transformer {
    cache: RwLock<HashMap<Crs, Arc<Endpoint>>>,
}

impl Proj4Transformer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of systems parsed so far.
    pub fn cached(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn endpoint(&self, crs: Crs) -> ProjectionResult<Arc<Endpoint>> {
        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(endpoint) = cache.get(&crs) {
                return Ok(Arc::clone(endpoint));
            }
        }

        let endpoint = Arc::new(Endpoint::parse(crs)?);
        tracing::debug!(%crs, "parsed projection definition");

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(cache.entry(crs).or_insert(endpoint)))
    }
}

impl fmt::Debug for Proj4Transformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proj4Transformer")
            .field("cached", &self.cached())
            .finish()
    }
}

/// Get the PROJ.4 definition for a CRS.
pub fn proj_string(crs: Crs) -> Option<&'static str> {
    crs_definitions::from_code(crs.epsg()).map(|def| def.proj4)
}

/// Check whether a CRS is geographic (lon/lat).
pub fn is_geographic(crs: Crs) -> bool {
    proj_string(crs)
        .map(|s| s.contains("+proj=longlat"))
        .unwrap_or(false)
}

struct Endpoint {
    proj: Proj,
    geographic: bool,
}

impl Endpoint {
    fn parse(crs: Crs) -> ProjectionResult<Self> {
        let definition = proj_string(crs).ok_or(ProjectionError::UnknownCrs(crs))?;
        let proj = Proj::from_proj_string(definition).map_err(|e| {
            ProjectionError::InvalidDefinition {
                crs,
                message: format!("{:?}", e),
            }
        })?;
        Ok(Self {
            proj,
            geographic: definition.contains("+proj=longlat"),
        })
    }
}

impl Transformer for Proj4Transformer {
    fn check(&self, crs: Crs) -> ProjectionResult<()> {
        self.endpoint(crs).map(|_| ())
    }

    fn transform(
        &self,
        src: Crs,
        dst: Crs,
        points: &[(f64, f64)],
    ) -> ProjectionResult<Vec<Option<(f64, f64)>>> {
        if src == dst {
            return Ok(points
                .iter()
                .map(|&(x, y)| (x.is_finite() && y.is_finite()).then_some((x, y)))
                .collect());
        }

        let source = self.endpoint(src)?;
        let target = self.endpoint(dst)?;

        let projected = points
            .iter()
            .map(|&(x, y)| {
                // proj4rs works in radians for geographic systems
                let mut point = if source.geographic {
                    (x.to_radians(), y.to_radians(), 0.0)
                } else {
                    (x, y, 0.0)
                };

                if let Err(e) = proj4rs::transform::transform(&source.proj, &target.proj, &mut point)
                {
                    tracing::trace!(%src, %dst, x, y, error = ?e, "point has no projection");
                    return None;
                }

                let (out_x, out_y) = if target.geographic {
                    (point.0.to_degrees(), point.1.to_degrees())
                } else {
                    (point.0, point.1)
                };

                (out_x.is_finite() && out_y.is_finite()).then_some((out_x, out_y))
            })
            .collect();

        Ok(projected)
    }
}
