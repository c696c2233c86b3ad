//! Map projections between the unit sphere and the plane.
//!
//! Every projection implements [`Projection`]. Points a projection cannot
//! represent (far hemisphere, outside the valid plane region) come back as
//! `None` from [`Projection::forward`] and [`Projection::inverse`]; that is
//! the contract, not a failure.

mod lambert;
mod mercator;
mod mollweide;
mod orthographic;

pub use lambert::LambertAzimuthal;
pub use mercator::Mercator;
pub use mollweide::{solve_theta, Mollweide, ThetaSolution};
pub use orthographic::Orthographic;

use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::AtlasError;
use crate::geo::{wrap_longitude, Bounds, GeoPoint, ProjPoint};

/// Number of vertices used to trace curved projection outlines
const OUTLINE_SEGMENTS: usize = 128;

/// Identity of one projection instance.
///
/// Two projections with equal parameters still have different ids. Cloning
/// a projection mints a new id; changing its parameters keeps the old one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProjectionId(u64);

impl ProjectionId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ProjectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-instance identity holder embedded in every projection.
#[derive(Debug)]
pub(crate) struct InstanceTag(ProjectionId);

impl InstanceTag {
    pub(crate) fn new() -> Self {
        Self(ProjectionId::next())
    }

    pub(crate) fn id(&self) -> ProjectionId {
        self.0
    }
}

impl Clone for InstanceTag {
    fn clone(&self) -> Self {
        Self::new()
    }
}

/// The four projection families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectionKind {
    Mercator,
    Orthographic,
    Mollweide,
    Lambert,
}

impl ProjectionKind {
    pub const ALL: [ProjectionKind; 4] = [
        ProjectionKind::Mercator,
        ProjectionKind::Orthographic,
        ProjectionKind::Mollweide,
        ProjectionKind::Lambert,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ProjectionKind::Mercator => "Mercator",
            ProjectionKind::Orthographic => "Orthographic",
            ProjectionKind::Mollweide => "Mollweide",
            ProjectionKind::Lambert => "Lambert azimuthal",
        }
    }

    /// Next kind in display order, wrapping around
    pub fn next(&self) -> Self {
        match self {
            ProjectionKind::Mercator => ProjectionKind::Orthographic,
            ProjectionKind::Orthographic => ProjectionKind::Mollweide,
            ProjectionKind::Mollweide => ProjectionKind::Lambert,
            ProjectionKind::Lambert => ProjectionKind::Mercator,
        }
    }

    /// Whether the projection is centered on a point rather than a meridian
    pub fn is_azimuthal(&self) -> bool {
        matches!(self, ProjectionKind::Orthographic | ProjectionKind::Lambert)
    }
}

/// Forward and inverse mapping between the unit sphere and the plane.
pub trait Projection: Send + Sync {
    /// Identity of this instance, used to key cached geometry
    fn id(&self) -> ProjectionId;

    fn kind(&self) -> ProjectionKind;

    /// Sphere to plane. `None` when the point has no meaningful image.
    fn forward(&self, point: GeoPoint) -> Option<ProjPoint>;

    /// Plane to sphere. `None` outside the valid plane region.
    fn inverse(&self, point: ProjPoint) -> Option<GeoPoint>;

    /// Whether the point is on the representable part of the sphere
    fn is_visible(&self, point: GeoPoint) -> bool {
        point.is_finite()
    }

    /// Whether a plane point lies inside the valid region
    fn is_on_map(&self, point: ProjPoint) -> bool;

    /// Whether the path between two longitudes jumps across the map edge.
    ///
    /// Azimuthal projections have no seam to cross and keep this default.
    fn crosses_seam(&self, _lambda1: f64, _lambda2: f64) -> bool {
        false
    }

    /// Extent of the valid plane region
    fn bounds(&self) -> Bounds;

    /// Closed ring tracing the edge of the valid plane region
    fn outline(&self) -> Vec<ProjPoint> {
        let b = self.bounds();
        vec![
            ProjPoint::new(b.min_x, b.min_y),
            ProjPoint::new(b.max_x, b.min_y),
            ProjPoint::new(b.max_x, b.max_y),
            ProjPoint::new(b.min_x, b.max_y),
            ProjPoint::new(b.min_x, b.min_y),
        ]
    }
}

/// Reject centers that are not finite or have an out-of-range latitude
pub(crate) fn validate_center(center: GeoPoint) -> Result<GeoPoint, AtlasError> {
    if !center.is_finite() || center.phi.abs() > FRAC_PI_2 {
        return Err(AtlasError::InvalidCenter {
            lon: center.lambda,
            lat: center.phi,
        });
    }
    Ok(GeoPoint::new(wrap_longitude(center.lambda), center.phi))
}

pub(crate) fn validate_meridian(lambda: f64) -> Result<f64, AtlasError> {
    if !lambda.is_finite() {
        return Err(AtlasError::InvalidMeridian(lambda));
    }
    Ok(wrap_longitude(lambda))
}

/// Seam test for projections cut along the meridian opposite `central`.
///
/// Both longitudes are taken relative to the central meridian; a jump of
/// more than π between them means the segment wraps around the back.
#[inline(always)]
pub(crate) fn crosses_meridian_seam(central: f64, lambda1: f64, lambda2: f64) -> bool {
    let d1 = wrap_longitude(lambda1 - central);
    let d2 = wrap_longitude(lambda2 - central);
    (d1 - d2).abs() > PI
}

/// Closed ellipse centered on the origin
pub(crate) fn ellipse_outline(semi_x: f64, semi_y: f64) -> Vec<ProjPoint> {
    (0..=OUTLINE_SEGMENTS)
        .map(|i| {
            let angle = i as f64 / OUTLINE_SEGMENTS as f64 * TAU;
            ProjPoint::new(semi_x * angle.cos(), semi_y * angle.sin())
        })
        .collect()
}

/// Back-substitution shared by the azimuthal inverses.
///
/// `rho` is the plane distance from the origin, `c` the matching central angle.
pub(crate) fn azimuthal_inverse(center: GeoPoint, point: ProjPoint, rho: f64, c: f64) -> GeoPoint {
    let (sin_c, cos_c) = c.sin_cos();
    let (sin_phi0, cos_phi0) = center.phi.sin_cos();

    let phi = (cos_c * sin_phi0 + point.y * sin_c * cos_phi0 / rho)
        .clamp(-1.0, 1.0)
        .asin();
    let lambda = center.lambda
        + (point.x * sin_c).atan2(rho * cos_phi0 * cos_c - point.y * sin_phi0 * sin_c);

    GeoPoint::new(wrap_longitude(lambda), phi)
}

/// Any of the four projections, switchable at runtime
#[derive(Debug, Clone)]
pub enum MapProjection {
    Mercator(Mercator),
    Orthographic(Orthographic),
    Mollweide(Mollweide),
    Lambert(LambertAzimuthal),
}

macro_rules! dispatch {
    ($self:expr, $p:ident => $body:expr) => {
        match $self {
            MapProjection::Mercator($p) => $body,
            MapProjection::Orthographic($p) => $body,
            MapProjection::Mollweide($p) => $body,
            MapProjection::Lambert($p) => $body,
        }
    };
}

impl MapProjection {
    /// Build a projection of the given kind looking at `center`.
    ///
    /// Cylindrical kinds only use the center longitude.
    pub fn new(kind: ProjectionKind, center: GeoPoint) -> Result<Self, AtlasError> {
        let center = validate_center(center)?;
        Ok(match kind {
            ProjectionKind::Mercator => {
                MapProjection::Mercator(Mercator::with_central_meridian(center.lambda)?)
            }
            ProjectionKind::Orthographic => {
                MapProjection::Orthographic(Orthographic::new(center)?)
            }
            ProjectionKind::Mollweide => {
                MapProjection::Mollweide(Mollweide::with_central_meridian(center.lambda)?)
            }
            ProjectionKind::Lambert => MapProjection::Lambert(LambertAzimuthal::new(center)?),
        })
    }

    /// Point the map looks at. Cylindrical kinds report latitude 0.
    pub fn center(&self) -> GeoPoint {
        match self {
            MapProjection::Mercator(p) => GeoPoint::new(p.central_meridian(), 0.0),
            MapProjection::Orthographic(p) => p.center(),
            MapProjection::Mollweide(p) => GeoPoint::new(p.central_meridian(), 0.0),
            MapProjection::Lambert(p) => p.center(),
        }
    }

    /// Move the projection center in place.
    ///
    /// The instance keeps its id, so any `ShapeCache` built against it must
    /// be invalidated afterwards.
    pub fn recenter(&mut self, center: GeoPoint) -> Result<(), AtlasError> {
        match self {
            MapProjection::Mercator(p) => p.set_central_meridian(center.lambda),
            MapProjection::Orthographic(p) => p.set_center(center),
            MapProjection::Mollweide(p) => p.set_central_meridian(center.lambda),
            MapProjection::Lambert(p) => p.set_center(center),
        }
    }
}

impl Default for MapProjection {
    fn default() -> Self {
        MapProjection::Mercator(Mercator::new())
    }
}

impl Projection for MapProjection {
    fn id(&self) -> ProjectionId {
        dispatch!(self, p => p.id())
    }

    fn kind(&self) -> ProjectionKind {
        dispatch!(self, p => p.kind())
    }

    fn forward(&self, point: GeoPoint) -> Option<ProjPoint> {
        dispatch!(self, p => p.forward(point))
    }

    fn inverse(&self, point: ProjPoint) -> Option<GeoPoint> {
        dispatch!(self, p => p.inverse(point))
    }

    fn is_visible(&self, point: GeoPoint) -> bool {
        dispatch!(self, p => p.is_visible(point))
    }

    fn is_on_map(&self, point: ProjPoint) -> bool {
        dispatch!(self, p => p.is_on_map(point))
    }

    fn crosses_seam(&self, lambda1: f64, lambda2: f64) -> bool {
        dispatch!(self, p => p.crosses_seam(lambda1, lambda2))
    }

    fn bounds(&self) -> Bounds {
        dispatch!(self, p => p.bounds())
    }

    fn outline(&self) -> Vec<ProjPoint> {
        dispatch!(self, p => p.outline())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_per_instance() {
        let a = Mercator::new();
        let b = Mercator::new();
        assert_ne!(a.id(), b.id());

        let c = a.clone();
        assert_ne!(a.id(), c.id());
    }

    #[test]
    fn test_recenter_keeps_id() {
        let mut p =
            MapProjection::new(ProjectionKind::Orthographic, GeoPoint::new(0.0, 0.0)).unwrap();
        let id = p.id();
        p.recenter(GeoPoint::from_degrees(30.0, 20.0)).unwrap();
        assert_eq!(p.id(), id);
        assert!((p.center().lon_degrees() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_center_fails_fast() {
        for kind in ProjectionKind::ALL {
            assert!(MapProjection::new(kind, GeoPoint::new(f64::NAN, 0.0)).is_err());
            assert!(MapProjection::new(kind, GeoPoint::new(0.0, 2.0)).is_err());
        }
    }

    #[test]
    fn test_kind_cycle() {
        let mut kind = ProjectionKind::Mercator;
        for _ in 0..4 {
            kind = kind.next();
        }
        assert_eq!(kind, ProjectionKind::Mercator);
    }

    #[test]
    fn test_meridian_seam() {
        let deg = |d: f64| d.to_radians();
        assert!(crosses_meridian_seam(0.0, deg(179.0), deg(-179.0)));
        assert!(!crosses_meridian_seam(0.0, deg(10.0), deg(-10.0)));
        // Seam moves with the central meridian
        assert!(!crosses_meridian_seam(PI, deg(179.0), deg(-179.0)));
        assert!(crosses_meridian_seam(PI, deg(1.0), deg(-1.0)));
    }
}
