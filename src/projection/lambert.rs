use super::{
    azimuthal_inverse, ellipse_outline, validate_center, InstanceTag, Projection, ProjectionId,
    ProjectionKind,
};
use crate::error::AtlasError;
use crate::geo::{Bounds, GeoPoint, ProjPoint};

/// Radius of the disk the whole sphere maps onto
pub const RADIUS: f64 = 2.0;

/// `1 + cos c` below this is treated as the antipode
const ANTIPODE_EPSILON: f64 = 1e-12;

const DISK_EPSILON: f64 = 1e-12;

/// Image of the antipode. Every boundary point is equally valid, this one is fixed.
pub const ANTIPODE_IMAGE: ProjPoint = ProjPoint::new(0.0, -RADIUS);

/// Lambert azimuthal equal-area projection centered on `center`.
#[derive(Debug, Clone)]
pub struct LambertAzimuthal {
    center: GeoPoint,
    tag: InstanceTag,
}

impl LambertAzimuthal {
    pub fn new(center: GeoPoint) -> Result<Self, AtlasError> {
        Ok(Self {
            center: validate_center(center)?,
            tag: InstanceTag::new(),
        })
    }

    pub fn center(&self) -> GeoPoint {
        self.center
    }

    /// Move the projection center. Invalidate any shape cache afterwards.
    pub fn set_center(&mut self, center: GeoPoint) -> Result<(), AtlasError> {
        self.center = validate_center(center)?;
        Ok(())
    }
}

impl Projection for LambertAzimuthal {
    fn id(&self) -> ProjectionId {
        self.tag.id()
    }

    fn kind(&self) -> ProjectionKind {
        ProjectionKind::Lambert
    }

    fn forward(&self, point: GeoPoint) -> Option<ProjPoint> {
        if !point.is_finite() {
            return None;
        }
        let (sin_phi0, cos_phi0) = self.center.phi.sin_cos();
        let (sin_phi, cos_phi) = point.phi.sin_cos();
        let (sin_dl, cos_dl) = (point.lambda - self.center.lambda).sin_cos();

        let cos_c = sin_phi0 * sin_phi + cos_phi0 * cos_phi * cos_dl;
        let denominator = 1.0 + cos_c;
        if denominator < ANTIPODE_EPSILON {
            return Some(ANTIPODE_IMAGE);
        }

        let k = (2.0 / denominator).sqrt();
        let x = k * cos_phi * sin_dl;
        let y = k * (cos_phi0 * sin_phi - sin_phi0 * cos_phi * cos_dl);
        Some(ProjPoint::new(x, y))
    }

    fn inverse(&self, point: ProjPoint) -> Option<GeoPoint> {
        if !self.is_on_map(point) {
            return None;
        }
        let rho = point.norm_squared().sqrt();
        if rho == 0.0 {
            return Some(self.center);
        }
        let c = 2.0 * (rho / RADIUS).min(1.0).asin();
        Some(azimuthal_inverse(self.center, point, rho, c))
    }

    fn is_on_map(&self, point: ProjPoint) -> bool {
        point.is_finite() && point.norm_squared() <= RADIUS * RADIUS + DISK_EPSILON
    }

    fn bounds(&self) -> Bounds {
        Bounds::new(-RADIUS, -RADIUS, RADIUS, RADIUS)
    }

    fn outline(&self) -> Vec<ProjPoint> {
        ellipse_outline(RADIUS, RADIUS)
    }
}
