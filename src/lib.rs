//! Seam-aware map projections with a projected shape cache and region picking.
//!
//! Regions flow one way: [`region::MapContext`] → [`projection::Projection`]
//! → [`seam::build_ring`] → [`cache::ShapeCache`] → [`picker::Picker`] or a renderer.

pub mod cache;
pub mod data;
pub mod error;
pub mod geo;
pub mod picker;
pub mod projection;
pub mod region;
pub mod seam;

pub use cache::{CacheStats, ProjectedShape, ShapeCache};
pub use error::AtlasError;
pub use geo::{clamp_latitude, wrap_longitude, Bounds, GeoPoint, ProjPoint};
pub use picker::Picker;
pub use projection::{
    LambertAzimuthal, MapProjection, Mercator, Mollweide, Orthographic, Projection, ProjectionId,
    ProjectionKind,
};
pub use region::{City, MapContext, RegionFeature, RegionPolygon};
