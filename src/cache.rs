//! Memoized projected geometry.
//!
//! A [`ShapeCache`] holds the seam-split polygons of every region for one
//! projection instance. It is keyed by [`ProjectionId`], not by projection
//! parameters: moving a projection's center keeps its id, so callers must
//! call [`ShapeCache::invalidate`] after any parameter change. A different
//! projection instance (even with equal parameters) triggers a rebuild.
//!
//! Rebuilds run inline inside [`ShapeCache::get_shapes`]. The cache needs
//! `&mut self` and is meant to be owned by a single thread.

use std::sync::Arc;

use log::{debug, trace};
use rayon::prelude::*;

use crate::geo::{Bounds, GeoPoint, ProjPoint};
use crate::projection::{Projection, ProjectionId};
use crate::region::{MapContext, RegionFeature, RegionPolygon};
use crate::seam::{build_ring, ProjectedPolygon};

/// One projected polygon of a region.
///
/// The outer boundary is split at the seam into `primary` and `secondary`;
/// hole rings are split the same way and their halves kept in `holes`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedShape {
    feature: Arc<RegionFeature>,
    primary: ProjectedPolygon,
    secondary: Option<ProjectedPolygon>,
    holes: Vec<ProjectedPolygon>,
}

impl ProjectedShape {
    /// Project one polygon of `feature`. `None` when its outer boundary
    /// leaves nothing non-degenerate.
    pub fn build<P>(
        feature: &Arc<RegionFeature>,
        polygon: &RegionPolygon,
        projection: &P,
    ) -> Option<Self>
    where
        P: Projection + ?Sized,
    {
        let split = build_ring(&polygon.exterior, projection);
        let (primary, secondary) = match (split.primary, split.secondary) {
            (Some(primary), secondary) => (primary, secondary),
            (None, Some(secondary)) => (secondary, None),
            (None, None) => return None,
        };
        let holes = polygon
            .holes
            .iter()
            .flat_map(|hole| {
                let split = build_ring(hole, projection);
                split.primary.into_iter().chain(split.secondary)
            })
            .collect();

        Some(Self {
            feature: Arc::clone(feature),
            primary,
            secondary,
            holes,
        })
    }

    pub fn feature(&self) -> &Arc<RegionFeature> {
        &self.feature
    }

    pub fn primary(&self) -> &ProjectedPolygon {
        &self.primary
    }

    pub fn secondary(&self) -> Option<&ProjectedPolygon> {
        self.secondary.as_ref()
    }

    pub fn holes(&self) -> &[ProjectedPolygon] {
        &self.holes
    }

    /// Every projected ring: primary, secondary, then holes
    pub fn polygons(&self) -> impl Iterator<Item = &ProjectedPolygon> {
        std::iter::once(&self.primary)
            .chain(self.secondary.as_ref())
            .chain(self.holes.iter())
    }

    /// Extent of the outer boundary
    pub fn bounds(&self) -> Bounds {
        match &self.secondary {
            Some(secondary) => self.primary.bounds().union(&secondary.bounds()),
            None => self.primary.bounds(),
        }
    }

    pub fn point_count(&self) -> usize {
        self.polygons().map(|p| p.points().len()).sum()
    }

    /// Even-odd containment over all rings, so points inside a hole are outside
    pub fn contains(&self, point: ProjPoint) -> bool {
        self.polygons()
            .filter(|polygon| polygon.contains(point))
            .count()
            % 2
            == 1
    }
}

/// Counters describing the current cache contents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub shapes: usize,
    pub points: usize,
    pub rebuilds: u64,
}

#[derive(Debug)]
struct CacheEntry {
    /// Projection the shapes were built for, `None` once invalidated
    projection: Option<ProjectionId>,
    shapes: Arc<Vec<ProjectedShape>>,
    dirty: bool,
}

impl CacheEntry {
    fn empty() -> Self {
        Self {
            projection: None,
            shapes: Arc::new(Vec::new()),
            dirty: true,
        }
    }

    fn is_current(&self, id: ProjectionId) -> bool {
        !self.dirty && self.projection == Some(id)
    }
}

/// Lazily rebuilt projected shapes for every region of a [`MapContext`].
#[derive(Debug)]
pub struct ShapeCache {
    context: Arc<MapContext>,
    entry: CacheEntry,
    rebuilds: u64,
}

impl ShapeCache {
    pub fn new(context: Arc<MapContext>) -> Self {
        Self {
            context,
            entry: CacheEntry::empty(),
            rebuilds: 0,
        }
    }

    pub fn context(&self) -> &Arc<MapContext> {
        &self.context
    }

    /// Shapes for `projection`, rebuilding first if the cache is dirty or
    /// was built for another instance.
    ///
    /// Repeated calls without invalidation return the same `Arc`.
    pub fn get_shapes<P>(&mut self, projection: &P) -> Arc<Vec<ProjectedShape>>
    where
        P: Projection + ?Sized,
    {
        let id = projection.id();
        if self.entry.is_current(id) {
            trace!("shape cache hit for projection {id}");
        } else {
            self.rebuild(projection);
        }
        Arc::clone(&self.entry.shapes)
    }

    /// Mark the cache stale. Nothing is rebuilt until the next access.
    pub fn invalidate(&mut self) {
        self.entry.dirty = true;
        self.entry.projection = None;
    }

    pub fn is_dirty(&self) -> bool {
        self.entry.dirty
    }

    /// Projection the current shapes belong to
    pub fn projection_id(&self) -> Option<ProjectionId> {
        self.entry.projection
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            shapes: self.entry.shapes.len(),
            points: self.entry.shapes.iter().map(ProjectedShape::point_count).sum(),
            rebuilds: self.rebuilds,
        }
    }

    fn rebuild<P>(&mut self, projection: &P)
    where
        P: Projection + ?Sized,
    {
        let shapes: Vec<ProjectedShape> = self
            .context
            .regions()
            .par_iter()
            .flat_map_iter(|feature| {
                feature
                    .polygons
                    .iter()
                    .filter_map(move |polygon| {
                        ProjectedShape::build(feature, polygon, projection)
                    })
            })
            .collect();

        self.rebuilds += 1;
        debug!(
            "rebuilt shape cache for {} projection {}: {} shapes from {} regions",
            projection.kind().name(),
            projection.id(),
            shapes.len(),
            self.context.regions().len()
        );

        self.entry = CacheEntry {
            projection: Some(projection.id()),
            shapes: Arc::new(shapes),
            dirty: false,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::{MapProjection, Mercator, Orthographic, ProjectionKind};

    fn context() -> Arc<MapContext> {
        let mut context = MapContext::new();
        context.add_region(RegionFeature::from_degrees(
            "Square",
            "SQR",
            &[(-10.0, -10.0), (10.0, -10.0), (10.0, 10.0), (-10.0, 10.0)],
        ));
        context.add_region(RegionFeature::from_degrees(
            "Dateline",
            "DTL",
            &[
                (170.0, 50.0),
                (-170.0, 50.0),
                (-165.0, 60.0),
                (-170.0, 70.0),
                (170.0, 70.0),
                (165.0, 60.0),
            ],
        ));
        context.add_region(RegionFeature::from_degrees(
            "Sliver",
            "SLV",
            &[(0.0, 0.0), (1.0, 1.0)],
        ));
        Arc::new(context)
    }

    #[test]
    fn test_starts_dirty() {
        let cache = ShapeCache::new(context());
        assert!(cache.is_dirty());
        assert_eq!(cache.stats().rebuilds, 0);
    }

    #[test]
    fn test_repeated_access_is_memoized() {
        let mut cache = ShapeCache::new(context());
        let p = Mercator::new();
        let first = cache.get_shapes(&p);
        let second = cache.get_shapes(&p);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats().rebuilds, 1);
        // The sliver is degenerate and dropped
        assert_eq!(first.len(), 2);
        assert!(first[1].secondary().is_some());
    }

    #[test]
    fn test_invalidate_defers_rebuild() {
        let mut cache = ShapeCache::new(context());
        let p = Mercator::new();
        let first = cache.get_shapes(&p);

        cache.invalidate();
        assert!(cache.is_dirty());
        assert_eq!(cache.projection_id(), None);
        assert_eq!(cache.stats().rebuilds, 1);

        let second = cache.get_shapes(&p);
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
        assert_eq!(cache.stats().rebuilds, 2);
    }

    #[test]
    fn test_keyed_by_instance_not_value() {
        let mut cache = ShapeCache::new(context());
        let a = Mercator::new();
        let b = Mercator::new();
        let first = cache.get_shapes(&a);
        let second = cache.get_shapes(&b);
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
        assert_eq!(cache.projection_id(), Some(b.id()));
    }

    #[test]
    fn test_parameter_change_needs_invalidate() {
        let mut cache = ShapeCache::new(context());
        let mut p =
            MapProjection::new(ProjectionKind::Orthographic, GeoPoint::new(0.0, 0.0)).unwrap();
        let front = cache.get_shapes(&p);
        assert_eq!(front.len(), 1);

        p.recenter(GeoPoint::from_degrees(180.0, 60.0)).unwrap();
        // Same instance: stale shapes until invalidated
        assert!(Arc::ptr_eq(&front, &cache.get_shapes(&p)));

        cache.invalidate();
        let back = cache.get_shapes(&p);
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].feature().code, "DTL");
    }

    #[test]
    fn test_dyn_projection() {
        let mut cache = ShapeCache::new(context());
        let p: Box<dyn Projection> =
            Box::new(Orthographic::new(GeoPoint::new(0.0, 0.0)).unwrap());
        let shapes = cache.get_shapes(p.as_ref());
        assert_eq!(shapes.len(), 1);
        assert_eq!(cache.stats().points, 4);
    }

    #[test]
    fn test_point_in_hole_is_outside() {
        let region = RegionFeature::with_holes_degrees(
            "Frame",
            "FRM",
            &[(0.0, 0.0), (20.0, 0.0), (20.0, 20.0), (0.0, 20.0)],
            &[&[(5.0, 5.0), (15.0, 5.0), (15.0, 15.0), (5.0, 15.0)]],
        );
        let mut context = MapContext::new();
        context.add_region(region);
        let mut cache = ShapeCache::new(Arc::new(context));
        let p = Mercator::new();
        let shapes = cache.get_shapes(&p);

        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].holes().len(), 1);
        assert_eq!(cache.stats().points, 8);

        let inside_hole = p.forward(GeoPoint::from_degrees(10.0, 10.0)).unwrap();
        let inside_frame = p.forward(GeoPoint::from_degrees(2.0, 10.0)).unwrap();
        assert!(!shapes[0].contains(inside_hole));
        assert!(shapes[0].contains(inside_frame));
    }
}
