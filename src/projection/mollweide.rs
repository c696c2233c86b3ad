use std::f64::consts::{PI, SQRT_2};

use super::{
    crosses_meridian_seam, ellipse_outline, validate_meridian, InstanceTag, Projection,
    ProjectionId, ProjectionKind,
};
use crate::error::AtlasError;
use crate::geo::{wrap_longitude, Bounds, GeoPoint, ProjPoint};

/// Newton-Raphson iteration cap for the auxiliary angle
pub const MAX_ITERATIONS: usize = 20;

/// Step size below which the auxiliary angle is considered solved
pub const TOLERANCE: f64 = 1e-12;

/// Half-width of the ellipse, 2√2
const SEMI_X: f64 = 2.0 * SQRT_2;

/// Half-height of the ellipse, √2
const SEMI_Y: f64 = SQRT_2;

const ELLIPSE_EPSILON: f64 = 1e-12;

/// Result of solving `2θ + sin 2θ = π sin φ`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThetaSolution {
    pub theta: f64,
    /// Newton steps actually taken
    pub iterations: usize,
    /// Magnitude of the last step, 0 when the derivative vanished first
    pub last_step: f64,
}

/// Solve for the Mollweide auxiliary angle θ of latitude `phi`.
///
/// Starts from θ = φ and stops after [`MAX_ITERATIONS`] steps, once a step
/// drops under [`TOLERANCE`], or when `2 + 2cos 2θ` underflows (θ = ±π/2).
///
/// Convergence slows to linear next to the poles: within about 0.001° of
/// ±90° the step cap runs out with a residual step of 1e-8 or more. The
/// resulting θ is still accurate far beyond rendering precision.
pub fn solve_theta(phi: f64) -> ThetaSolution {
    let target = PI * phi.sin();
    let mut theta = phi;
    let mut last_step = 0.0;
    let mut iterations = 0;

    while iterations < MAX_ITERATIONS {
        let derivative = 2.0 + 2.0 * (2.0 * theta).cos();
        if derivative.abs() < f64::EPSILON {
            last_step = 0.0;
            break;
        }
        let step = (2.0 * theta + (2.0 * theta).sin() - target) / derivative;
        theta -= step;
        iterations += 1;
        last_step = step.abs();
        if last_step < TOLERANCE {
            break;
        }
    }

    ThetaSolution {
        theta,
        iterations,
        last_step,
    }
}

/// Mollweide pseudocylindrical equal-area projection.
#[derive(Debug, Clone)]
pub struct Mollweide {
    central_meridian: f64,
    tag: InstanceTag,
}

impl Mollweide {
    pub fn new() -> Self {
        Self {
            central_meridian: 0.0,
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

impl Default for Mollweide {
    fn default() -> Self {
        Self::new()
    }
}

impl Projection for Mollweide {
    fn id(&self) -> ProjectionId {
        self.tag.id()
    }

    fn kind(&self) -> ProjectionKind {
        ProjectionKind::Mollweide
    }

    fn forward(&self, point: GeoPoint) -> Option<ProjPoint> {
        if !point.is_finite() {
            return None;
        }
        let theta = solve_theta(point.phi).theta;
        let dl = wrap_longitude(point.lambda - self.central_meridian);
        let x = SEMI_X / PI * dl * theta.cos();
        let y = SQRT_2 * theta.sin();
        Some(ProjPoint::new(x, y))
    }

    fn inverse(&self, point: ProjPoint) -> Option<GeoPoint> {
        if !self.is_on_map(point) {
            return None;
        }
        let theta = (point.y / SQRT_2).clamp(-1.0, 1.0).asin();
        let phi = ((2.0 * theta + (2.0 * theta).sin()) / PI)
            .clamp(-1.0, 1.0)
            .asin();

        let cos_theta = theta.cos();
        let lambda = if cos_theta.abs() < 1e-12 {
            self.central_meridian
        } else {
            self.central_meridian + PI * point.x / (SEMI_X * cos_theta)
        };
        Some(GeoPoint::new(wrap_longitude(lambda), phi))
    }

    fn is_on_map(&self, point: ProjPoint) -> bool {
        if !point.is_finite() {
            return false;
        }
        let u = point.x / SEMI_X;
        let v = point.y / SEMI_Y;
        u * u + v * v <= 1.0 + ELLIPSE_EPSILON
    }

    fn crosses_seam(&self, lambda1: f64, lambda2: f64) -> bool {
        crosses_meridian_seam(self.central_meridian, lambda1, lambda2)
    }

    fn bounds(&self) -> Bounds {
        Bounds::new(-SEMI_X, -SEMI_Y, SEMI_X, SEMI_Y)
    }

    fn outline(&self) -> Vec<ProjPoint> {
        ellipse_outline(SEMI_X, SEMI_Y)
    }
}
