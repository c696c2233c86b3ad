use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use super::{
    crosses_meridian_seam, validate_meridian, InstanceTag, Projection, ProjectionId,
    ProjectionKind,
};
use crate::error::AtlasError;
use crate::geo::{wrap_longitude, Bounds, GeoPoint, ProjPoint};

/// Latitude cutoff; y grows without bound towards the poles
pub const MAX_LATITUDE: f64 = 85.0 * PI / 180.0;

#[inline(always)]
fn mercator_y(phi: f64) -> f64 {
    (FRAC_PI_4 + phi / 2.0).tan().ln()
}

/// Spherical Mercator with a movable central meridian.
///
/// x spans [-π, π] around the central meridian, y is clamped at ±85°.
#[derive(Debug, Clone)]
pub struct Mercator {
    central_meridian: f64,
    y_max: f64,
    tag: InstanceTag,
}

impl Mercator {
    pub fn new() -> Self {
        Self {
            central_meridian: 0.0,
            y_max: mercator_y(MAX_LATITUDE),
            tag: InstanceTag::new(),
        }
    }

    pub fn with_central_meridian(lambda: f64) -> Result<Self, AtlasError> {
        let mut projection = Self::new();
        projection.set_central_meridian(lambda)?;
        Ok(projection)
    }

    pub fn central_meridian(&self) -> f64 {
        self.central_meridian
    }

    /// Shift the central meridian. Invalidate any shape cache afterwards.
    pub fn set_central_meridian(&mut self, lambda: f64) -> Result<(), AtlasError> {
        self.central_meridian = validate_meridian(lambda)?;
        Ok(())
    }
}

impl Default for Mercator {
    fn default() -> Self {
        Self::new()
    }
}

impl Projection for Mercator {
    fn id(&self) -> ProjectionId {
        self.tag.id()
    }

    fn kind(&self) -> ProjectionKind {
        ProjectionKind::Mercator
    }

    fn forward(&self, point: GeoPoint) -> Option<ProjPoint> {
        if !point.is_finite() {
            return None;
        }
        let x = wrap_longitude(point.lambda - self.central_meridian);
        let phi = point.phi.clamp(-MAX_LATITUDE, MAX_LATITUDE);
        Some(ProjPoint::new(x, mercator_y(phi)))
    }

    fn inverse(&self, point: ProjPoint) -> Option<GeoPoint> {
        if !self.is_on_map(point) {
            return None;
        }
        let lambda = wrap_longitude(point.x + self.central_meridian);
        let phi = 2.0 * point.y.exp().atan() - FRAC_PI_2;
        Some(GeoPoint::new(lambda, phi))
    }

    fn is_on_map(&self, point: ProjPoint) -> bool {
        point.is_finite() && point.x.abs() <= PI && point.y.abs() <= self.y_max
    }

    fn crosses_seam(&self, lambda1: f64, lambda2: f64) -> bool {
        crosses_meridian_seam(self.central_meridian, lambda1, lambda2)
    }

    fn bounds(&self) -> Bounds {
        Bounds::new(-PI, -self.y_max, PI, self.y_max)
    }
}
