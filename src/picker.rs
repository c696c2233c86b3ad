use std::sync::Arc;

use crate::cache::{ProjectedShape, ShapeCache};
use crate::geo::ProjPoint;
use crate::projection::Projection;
use crate::region::RegionFeature;

/// Point-in-polygon lookup over the cached projected shapes.
///
/// Shapes are already split at the seam, so containment is a plain
/// even-odd test in projection space.
pub struct Picker<'a> {
    cache: &'a mut ShapeCache,
}

impl<'a> Picker<'a> {
    pub fn new(cache: &'a mut ShapeCache) -> Self {
        Self { cache }
    }

    /// Region under `point` (projection-space units), if any.
    ///
    /// Brings the cache up to date for `projection` first.
    pub fn pick<P>(&mut self, point: ProjPoint, projection: &P) -> Option<Arc<RegionFeature>>
    where
        P: Projection + ?Sized,
    {
        if !point.is_finite() {
            return None;
        }
        let shapes = self.cache.get_shapes(projection);
        pick_shape(&shapes, point).map(|shape| Arc::clone(shape.feature()))
    }
}

/// First shape whose primary or secondary polygon contains `point`
pub fn pick_shape(shapes: &[ProjectedShape], point: ProjPoint) -> Option<&ProjectedShape> {
    shapes
        .iter()
        .filter(|shape| shape.bounds().contains(point))
        .find(|shape| shape.contains(point))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoPoint;
    use crate::projection::Mercator;
    use crate::region::MapContext;

    fn cache() -> ShapeCache {
        let mut context = MapContext::new();
        context.add_region(RegionFeature::from_degrees(
            "West",
            "WST",
            &[(-40.0, -10.0), (-20.0, -10.0), (-20.0, 10.0), (-40.0, 10.0)],
        ));
        context.add_region(RegionFeature::from_degrees(
            "Dateline",
            "DTL",
            &[
                (170.0, -10.0),
                (179.0, -10.0),
                (-179.0, -10.0),
                (-170.0, -10.0),
                (-170.0, 10.0),
                (-179.0, 10.0),
                (179.0, 10.0),
                (170.0, 10.0),
            ],
        ));
        ShapeCache::new(Arc::new(context))
    }

    fn at(projection: &Mercator, lon: f64, lat: f64) -> ProjPoint {
        projection.forward(GeoPoint::from_degrees(lon, lat)).unwrap()
    }

    #[test]
    fn test_pick_simple_region() {
        let mut cache = cache();
        let p = Mercator::new();
        let mut picker = Picker::new(&mut cache);
        let hit = picker.pick(at(&p, -30.0, 0.0), &p).unwrap();
        assert_eq!(hit.code, "WST");
        assert!(picker.pick(at(&p, 0.0, 0.0), &p).is_none());
    }

    #[test]
    fn test_pick_both_halves_of_split_region() {
        let mut cache = cache();
        let p = Mercator::new();
        let mut picker = Picker::new(&mut cache);
        assert_eq!(picker.pick(at(&p, 175.0, 0.0), &p).unwrap().code, "DTL");
        assert_eq!(picker.pick(at(&p, -175.0, 0.0), &p).unwrap().code, "DTL");
        // Middle of the map, where a seam-spanning edge would have been
        assert!(picker.pick(at(&p, 100.0, 0.0), &p).is_none());
    }

    #[test]
    fn test_pick_rejects_non_finite() {
        let mut cache = cache();
        let p = Mercator::new();
        assert!(Picker::new(&mut cache).pick(ProjPoint::new(f64::NAN, 0.0), &p).is_none());
        // Rejected before touching the cache
        assert!(cache.is_dirty());
    }
}
