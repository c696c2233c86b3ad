use glam::DVec3;

use super::{
    azimuthal_inverse, ellipse_outline, validate_center, InstanceTag, Projection, ProjectionId,
    ProjectionKind,
};
use crate::error::AtlasError;
use crate::geo::{Bounds, GeoPoint, ProjPoint};

/// Slack for points that land a rounding error outside the unit disk
const DISK_EPSILON: f64 = 1e-12;

/// Orthographic view of the globe from infinitely far above `center`.
///
/// The view is stored as an orthonormal basis: `view` points from the
/// sphere center at the viewer, `east` and `north` span the image plane.
#[derive(Debug, Clone)]
pub struct Orthographic {
    center: GeoPoint,
    view: DVec3,
    east: DVec3,
    north: DVec3,
    tag: InstanceTag,
}

impl Orthographic {
    pub fn new(center: GeoPoint) -> Result<Self, AtlasError> {
        let center = validate_center(center)?;
        let (view, east, north) = basis(center);
        Ok(Self {
            center,
            view,
            east,
            north,
            tag: InstanceTag::new(),
        })
    }

    pub fn center(&self) -> GeoPoint {
        self.center
    }

    /// Look at a new point. Invalidate any shape cache afterwards.
    pub fn set_center(&mut self, center: GeoPoint) -> Result<(), AtlasError> {
        let center = validate_center(center)?;
        let (view, east, north) = basis(center);
        self.center = center;
        self.view = view;
        self.east = east;
        self.north = north;
        Ok(())
    }

    /// Cosine of the angle between the point's surface normal and the view
    /// direction. Non-negative on the near hemisphere.
    pub fn facing(&self, point: GeoPoint) -> f64 {
        to_vec3(point).dot(self.view)
    }
}

/// Unit sphere vector for a lon/lat in radians
#[inline(always)]
pub(crate) fn to_vec3(point: GeoPoint) -> DVec3 {
    let (sin_lon, cos_lon) = point.lambda.sin_cos();
    let (sin_lat, cos_lat) = point.phi.sin_cos();
    DVec3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat)
}

/// View direction plus east and north unit vectors at `center`
fn basis(center: GeoPoint) -> (DVec3, DVec3, DVec3) {
    let (sin_lon, cos_lon) = center.lambda.sin_cos();
    let (sin_lat, cos_lat) = center.phi.sin_cos();

    let view = DVec3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat);
    // Derivative of the view vector w.r.t. latitude, points north
    let north = DVec3::new(-sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat);
    let east = north.cross(view).normalize();
    (view, east, north.normalize())
}

impl Projection for Orthographic {
    fn id(&self) -> ProjectionId {
        self.tag.id()
    }

    fn kind(&self) -> ProjectionKind {
        ProjectionKind::Orthographic
    }

    fn forward(&self, point: GeoPoint) -> Option<ProjPoint> {
        if !self.is_visible(point) {
            return None;
        }
        let p = to_vec3(point);
        Some(ProjPoint::new(p.dot(self.east), p.dot(self.north)))
    }

    fn inverse(&self, point: ProjPoint) -> Option<GeoPoint> {
        if !self.is_on_map(point) {
            return None;
        }
        let rho = point.norm_squared().sqrt();
        if rho == 0.0 {
            return Some(self.center);
        }
        let c = rho.min(1.0).asin();
        Some(azimuthal_inverse(self.center, point, rho, c))
    }

    fn is_visible(&self, point: GeoPoint) -> bool {
        point.is_finite() && self.facing(point) >= 0.0
    }

    fn is_on_map(&self, point: ProjPoint) -> bool {
        point.is_finite() && point.norm_squared() <= 1.0 + DISK_EPSILON
    }

    fn bounds(&self) -> Bounds {
        Bounds::new(-1.0, -1.0, 1.0, 1.0)
    }

    fn outline(&self) -> Vec<ProjPoint> {
        ellipse_outline(1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_basis_matches_textbook_formulas() {
        let center = GeoPoint::from_degrees(20.0, 35.0);
        let p = Orthographic::new(center).unwrap();
        let point = GeoPoint::from_degrees(40.0, 50.0);
        let out = p.forward(point).unwrap();

        let dl = point.lambda - center.lambda;
        let x = point.phi.cos() * dl.sin();
        let y = center.phi.cos() * point.phi.sin() - center.phi.sin() * point.phi.cos() * dl.cos();
        assert_abs_diff_eq!(out.x, x, epsilon = 1e-12);
        assert_abs_diff_eq!(out.y, y, epsilon = 1e-12);
    }

    #[test]
    fn test_far_side_is_undefined() {
        let p = Orthographic::new(GeoPoint::new(0.0, 0.0)).unwrap();
        let behind = GeoPoint::new(PI, 0.0);
        assert!(!p.is_visible(behind));
        assert!(p.forward(behind).is_none());
    }

    #[test]
    fn test_disk_center_maps_to_center() {
        let center = GeoPoint::from_degrees(-70.0, -30.0);
        let p = Orthographic::new(center).unwrap();
        assert_eq!(p.inverse(ProjPoint::new(0.0, 0.0)), Some(p.center()));
    }

    #[test]
    fn test_inverse_outside_disk() {
        let p = Orthographic::new(GeoPoint::new(0.0, 0.0)).unwrap();
        assert!(p.inverse(ProjPoint::new(0.8, 0.8)).is_none());
        assert!(p.inverse(ProjPoint::new(1.0, 0.0)).is_some());
    }

    #[test]
    fn test_polar_center() {
        let p = Orthographic::new(GeoPoint::new(0.0, FRAC_PI_2)).unwrap();
        let point = GeoPoint::from_degrees(90.0, 60.0);
        let out = p.forward(point).unwrap();
        assert_abs_diff_eq!(out.norm_squared().sqrt(), 0.5, epsilon = 1e-12);

        let back = p.inverse(out).unwrap();
        assert_abs_diff_eq!(back.lambda, point.lambda, epsilon = 1e-9);
        assert_abs_diff_eq!(back.phi, point.phi, epsilon = 1e-9);
    }

    #[test]
    fn test_no_seam() {
        let p = Orthographic::new(GeoPoint::new(0.0, 0.0)).unwrap();
        assert!(!p.crosses_seam(179f64.to_radians(), (-179f64).to_radians()));
    }
}
