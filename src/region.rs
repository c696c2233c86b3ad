use std::sync::Arc;

use crate::geo::GeoPoint;

/// One polygon of a region: an outer boundary and the holes cut out of it.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionPolygon {
    pub exterior: Vec<GeoPoint>,
    pub holes: Vec<Vec<GeoPoint>>,
}

impl RegionPolygon {
    pub fn new(exterior: Vec<GeoPoint>, holes: Vec<Vec<GeoPoint>>) -> Self {
        Self { exterior, holes }
    }

    /// Outer boundary first, then the holes
    pub fn rings(&self) -> impl Iterator<Item = &[GeoPoint]> {
        std::iter::once(self.exterior.as_slice()).chain(self.holes.iter().map(Vec::as_slice))
    }

    pub fn point_count(&self) -> usize {
        self.rings().map(<[GeoPoint]>::len).sum()
    }
}

/// A named polygonal region such as a country.
///
/// Multi-part regions carry one [`RegionPolygon`] per part.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionFeature {
    pub name: String,
    pub code: String,
    pub polygons: Vec<RegionPolygon>,
}

impl RegionFeature {
    pub fn new(
        name: impl Into<String>,
        code: impl Into<String>,
        polygons: Vec<RegionPolygon>,
    ) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            polygons,
        }
    }

    /// Region with a single hole-free polygon given in degrees
    pub fn from_degrees(name: &str, code: &str, ring: &[(f64, f64)]) -> Self {
        Self::new(name, code, vec![RegionPolygon::new(ring_from_degrees(ring), Vec::new())])
    }

    /// Region with one polygon and holes, all given in degrees
    pub fn with_holes_degrees(
        name: &str,
        code: &str,
        exterior: &[(f64, f64)],
        holes: &[&[(f64, f64)]],
    ) -> Self {
        let holes = holes.iter().map(|hole| ring_from_degrees(hole)).collect();
        Self::new(name, code, vec![RegionPolygon::new(ring_from_degrees(exterior), holes)])
    }

    pub fn point_count(&self) -> usize {
        self.polygons.iter().map(RegionPolygon::point_count).sum()
    }
}

fn ring_from_degrees(ring: &[(f64, f64)]) -> Vec<GeoPoint> {
    ring.iter()
        .map(|&(lon, lat)| GeoPoint::from_degrees(lon, lat).normalized())
        .collect()
}

/// A city marker with position, name, and population
#[derive(Debug, Clone, PartialEq)]
pub struct City {
    pub point: GeoPoint,
    pub name: String,
    pub population: u64,
}

/// Regions and cities shared by the shape cache, picker and renderer.
///
/// Filled once by a data source, then read-only.
#[derive(Debug, Default)]
pub struct MapContext {
    regions: Vec<Arc<RegionFeature>>,
    cities: Vec<City>,
}

impl MapContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_region(&mut self, region: RegionFeature) {
        self.regions.push(Arc::new(region));
    }

    pub fn add_city(&mut self, point: GeoPoint, name: &str, population: u64) {
        self.cities.push(City {
            point,
            name: name.to_string(),
            population,
        });
    }

    pub fn regions(&self) -> &[Arc<RegionFeature>] {
        &self.regions
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn has_regions(&self) -> bool {
        !self.regions.is_empty()
    }

    /// Cities with at least `min_population` inhabitants
    pub fn cities_above(&self, min_population: u64) -> impl Iterator<Item = &City> {
        self.cities
            .iter()
            .filter(move |c| c.population >= min_population)
    }
}
