use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Geographic position on the unit sphere, in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// Longitude
    pub lambda: f64,
    /// Latitude
    pub phi: f64,
}

impl GeoPoint {
    pub const fn new(lambda: f64, phi: f64) -> Self {
        Self { lambda, phi }
    }

    /// Build from degrees (lon, lat), the order GeoJSON uses
    pub fn from_degrees(lon: f64, lat: f64) -> Self {
        Self::new(lon.to_radians(), lat.to_radians())
    }

    pub fn lon_degrees(&self) -> f64 {
        self.lambda.to_degrees()
    }

    pub fn lat_degrees(&self) -> f64 {
        self.phi.to_degrees()
    }

    #[inline(always)]
    pub fn is_finite(&self) -> bool {
        self.lambda.is_finite() && self.phi.is_finite()
    }

    /// Same point with longitude wrapped to (-π, π] and latitude clamped to [-π/2, π/2]
    pub fn normalized(&self) -> Self {
        Self::new(wrap_longitude(self.lambda), clamp_latitude(self.phi))
    }
}

/// Planar position in projection-space units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjPoint {
    pub x: f64,
    pub y: f64,
}

impl ProjPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline(always)]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Squared distance from the projection origin
    #[inline(always)]
    pub fn norm_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }
}

/// Wrap longitude into (-π, π]
#[inline(always)]
pub fn wrap_longitude(lambda: f64) -> f64 {
    let wrapped = (lambda + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        PI
    } else {
        wrapped
    }
}

/// Clamp latitude into [-π/2, π/2]
#[inline(always)]
pub fn clamp_latitude(phi: f64) -> f64 {
    phi.clamp(-FRAC_PI_2, FRAC_PI_2)
}

/// Axis-aligned rectangle in projection space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Smallest rectangle holding every point, `None` for an empty input
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a ProjPoint>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self::new(first.x, first.y, first.x, first.y);
        for p in iter {
            bounds.min_x = bounds.min_x.min(p.x);
            bounds.min_y = bounds.min_y.min(p.y);
            bounds.max_x = bounds.max_x.max(p.x);
            bounds.max_y = bounds.max_y.max(p.y);
        }
        Some(bounds)
    }

    #[inline(always)]
    pub fn contains(&self, p: ProjPoint) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> ProjPoint {
        ProjPoint::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Nearest point inside the rectangle
    pub fn clamp(&self, p: ProjPoint) -> ProjPoint {
        ProjPoint::new(
            p.x.clamp(self.min_x, self.max_x),
            p.y.clamp(self.min_y, self.max_y),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_wrap_longitude_range() {
        assert_abs_diff_eq!(wrap_longitude(0.0), 0.0);
        assert_abs_diff_eq!(wrap_longitude(PI), PI);
        assert_abs_diff_eq!(wrap_longitude(-PI), PI);
        assert_abs_diff_eq!(wrap_longitude(PI + 0.5), -PI + 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(wrap_longitude(-PI - 0.5), PI - 0.5, epsilon = 1e-12);

        for i in -1000..1000 {
            let w = wrap_longitude(i as f64 * 0.037);
            assert!(w > -PI && w <= PI, "{w} out of range");
        }
    }

    #[test]
    fn test_clamp_latitude() {
        assert_eq!(clamp_latitude(2.0), FRAC_PI_2);
        assert_eq!(clamp_latitude(-2.0), -FRAC_PI_2);
        assert_eq!(clamp_latitude(0.3), 0.3);
    }

    #[test]
    fn test_degrees() {
        let p = GeoPoint::from_degrees(-179.0, 45.0);
        assert_abs_diff_eq!(p.lon_degrees(), -179.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.lat_degrees(), 45.0, epsilon = 1e-12);
    }

    #[test]
    fn test_bounds() {
        let pts = [
            ProjPoint::new(1.0, 2.0),
            ProjPoint::new(-1.0, 0.5),
            ProjPoint::new(0.0, 3.0),
        ];
        let b = Bounds::from_points(&pts).unwrap();
        assert_eq!(b, Bounds::new(-1.0, 0.5, 1.0, 3.0));
        assert!(b.contains(ProjPoint::new(0.0, 1.0)));
        assert!(!b.contains(ProjPoint::new(2.0, 1.0)));
        assert!(Bounds::from_points(&Vec::<ProjPoint>::new()).is_none());
    }
}
