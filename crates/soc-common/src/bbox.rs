//! Axis-aligned extents in a raster's native coordinate system.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in some CRS.
///
/// Units follow the CRS: degrees for geographic systems, usually meters
/// for projected ones. Edges are named the way raster libraries report
/// dataset bounds (`left`, `bottom`, `right`, `top`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
}

impl BoundingBox {
    /// Create a new bounding box from its edges.
    pub fn new(left: f64, bottom: f64, right: f64, top: f64) -> Self {
        Self {
            left,
            bottom,
            right,
            top,
        }
    }

    /// Envelope of a set of points. Returns `None` for an empty set.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut iter = points.into_iter();
        let (x0, y0) = iter.next()?;
        let mut bbox = Self::new(x0, y0, x0, y0);
        for (x, y) in iter {
            bbox.left = bbox.left.min(x);
            bbox.right = bbox.right.max(x);
            bbox.bottom = bbox.bottom.min(y);
            bbox.top = bbox.top.max(y);
        }
        Some(bbox)
    }

    /// Width of the box in CRS units.
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Height of the box in CRS units.
    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    /// Inclusive containment test: a point on any edge is inside.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        self.left <= x && x <= self.right && self.bottom <= y && y <= self.top
    }
}
