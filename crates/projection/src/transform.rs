//! The transformer seam used by the point resolver.

use soc_common::Crs;

use crate::error::ProjectionResult;

/// Reprojects points between coordinate reference systems.
///
/// Implementations must be shareable across request handlers.
pub trait Transformer: Send + Sync {
    /// Verify that `crs` can be used as a source or target.
    fn check(&self, crs: Crs) -> ProjectionResult<()>;

    /// Transform `points` from `src` into `dst`.
    ///
    /// The output has one entry per input point. An entry is `None` when the
    /// point has no defined position in `dst` (outside the projection's
    /// domain, or the math produced a non-finite value). An `Err` means one
    /// of the two systems is unusable altogether.
    fn transform(
        &self,
        src: Crs,
        dst: Crs,
        points: &[(f64, f64)],
    ) -> ProjectionResult<Vec<Option<(f64, f64)>>>;
}

/// Transform a single point.
pub fn transform_point(
    transformer: &dyn Transformer,
    src: Crs,
    dst: Crs,
    x: f64,
    y: f64,
) -> ProjectionResult<Option<(f64, f64)>> {
    let mut out = transformer.transform(src, dst, &[(x, y)])?;
    Ok(out.pop().flatten())
}

/// A transformer that treats every CRS as the same plane.
///
/// Useful when tiles and queries already share a CRS, and in tests that
/// want to address tiles directly in native coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTransformer;

impl Transformer for IdentityTransformer {
    fn check(&self, _crs: Crs) -> ProjectionResult<()> {
        Ok(())
    }

    fn transform(
        &self,
        _src: Crs,
        _dst: Crs,
        points: &[(f64, f64)],
    ) -> ProjectionResult<Vec<Option<(f64, f64)>>> {
        Ok(points
            .iter()
            .map(|&(x, y)| (x.is_finite() && y.is_finite()).then_some((x, y)))
            .collect())
    }
}
