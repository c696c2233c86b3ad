//! Projecting rings without drawing across the map seam.
//!
//! A ring that crosses the seam is split into a primary and a secondary
//! polygon: every time consecutive points jump across the seam the output
//! switches to the other polygon, so no edge spans the whole map.

use crate::geo::{Bounds, GeoPoint, ProjPoint};
use crate::projection::Projection;

/// Fewer points than this cannot enclose anything
pub const MIN_POLYGON_POINTS: usize = 3;

/// Projected polygon with its bounding box. The closing edge is implicit.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedPolygon {
    points: Vec<ProjPoint>,
    bounds: Bounds,
}

impl ProjectedPolygon {
    /// `None` for degenerate input (under three points)
    pub fn new(points: Vec<ProjPoint>) -> Option<Self> {
        if points.len() < MIN_POLYGON_POINTS {
            return None;
        }
        let bounds = Bounds::from_points(&points)?;
        Some(Self { points, bounds })
    }

    pub fn points(&self) -> &[ProjPoint] {
        &self.points
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Edges as point pairs, including the closing edge
    pub fn edges(&self) -> impl Iterator<Item = (ProjPoint, ProjPoint)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[(i + n - 1) % n], self.points[i]))
    }

    /// Even-odd containment, after a bounding box rejection
    pub fn contains(&self, p: ProjPoint) -> bool {
        if !self.bounds.contains(p) {
            return false;
        }
        let mut inside = false;
        for (a, b) in self.edges() {
            if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
                inside = !inside;
            }
        }
        inside
    }
}

/// Output of splitting one ring
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitRing {
    pub primary: Option<ProjectedPolygon>,
    pub secondary: Option<ProjectedPolygon>,
}

impl SplitRing {
    pub fn is_empty(&self) -> bool {
        self.primary.is_none() && self.secondary.is_none()
    }

    pub fn is_split(&self) -> bool {
        self.primary.is_some() && self.secondary.is_some()
    }
}

/// Project a ring, switching output polygons whenever it crosses the seam.
///
/// Points the projection cannot see are dropped. The first visible point
/// starts the current polygon; each later one is compared with the ring
/// point before it and flips the current polygon when the pair straddles
/// the seam. Polygons left with fewer than three points are discarded.
pub fn build_ring<P>(ring: &[GeoPoint], projection: &P) -> SplitRing
where
    P: Projection + ?Sized,
{
    let mut halves: [Vec<ProjPoint>; 2] = [Vec::with_capacity(ring.len()), Vec::new()];
    let mut current = 0;
    let mut started = false;
    let mut prev: Option<GeoPoint> = None;

    for &point in ring {
        let last = prev.replace(point);

        if !projection.is_visible(point) {
            continue;
        }
        let Some(projected) = projection.forward(point) else {
            continue;
        };

        if started {
            if let Some(last) = last {
                if projection.crosses_seam(point.lambda, last.lambda) {
                    current ^= 1;
                }
            }
        } else {
            started = true;
        }

        halves[current].push(projected);
    }

    let [primary, secondary] = halves;
    SplitRing {
        primary: ProjectedPolygon::new(primary),
        secondary: ProjectedPolygon::new(secondary),
    }
}
