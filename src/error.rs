//! Error type used by the crate.

use thiserror::Error;

/// Configuration and data errors.
///
/// Numerical domain violations are not errors: projections return `None`
/// for points they cannot represent.
#[derive(Debug, Error)]
pub enum AtlasError {
    /// Projection center is not finite or its latitude is outside [-π/2, π/2].
    #[error("invalid projection center: lon {lon}, lat {lat} (radians)")]
    InvalidCenter { lon: f64, lat: f64 },

    /// Central meridian is not a finite value.
    #[error("invalid central meridian: {0}")]
    InvalidMeridian(f64),

    /// Input feature cannot be turned into a region.
    #[error("invalid region data: {0}")]
    Data(String),
}
