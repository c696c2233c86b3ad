//! Region and city source backed by Natural Earth style GeoJSON.
//!
//! Coordinates are converted from degrees to radians and longitude-wrapped
//! here, so everything downstream receives normalized [`GeoPoint`]s.

use crate::error::AtlasError;
use crate::geo::GeoPoint;
use crate::region::{MapContext, RegionFeature, RegionPolygon};
use anyhow::Result;
use geojson::{Feature, GeoJson, PolygonType, Value};
use log::{info, warn};
use std::fs;
use std::path::Path;

/// Country files in order of preference; the first one found is loaded
const REGION_FILES: [&str; 3] = [
    "ne_50m_admin_0_countries.json",
    "ne_110m_admin_0_countries.json",
    "countries.geojson",
];

const CITY_FILES: [&str; 2] = ["ne_10m_populated_places.json", "ne_10m_cities.json"];

const NAME_KEYS: [&str; 4] = ["NAME", "name", "ADMIN", "admin"];
const CODE_KEYS: [&str; 4] = ["ISO_A3", "iso_a3", "ADM0_A3", "adm0_a3"];
const POPULATION_KEYS: [&str; 3] = ["pop_max", "pop_min", "population"];

/// Load every available region and city file from `data_dir`
pub fn load_all_geojson(context: &mut MapContext, data_dir: &Path) -> Result<()> {
    if let Some(path) = REGION_FILES
        .iter()
        .map(|name| data_dir.join(name))
        .find(|path| path.exists())
    {
        match load_regions(context, &path) {
            Ok(count) => info!("loaded {} regions from {}", count, path.display()),
            Err(e) => warn!("failed to load {}: {}", path.display(), e),
        }
    }

    if let Some(path) = CITY_FILES
        .iter()
        .map(|name| data_dir.join(name))
        .find(|path| path.exists())
    {
        match load_cities(context, &path) {
            Ok(count) => info!("loaded {} cities from {}", count, path.display()),
            Err(e) => warn!("failed to load {}: {}", path.display(), e),
        }
    }

    Ok(())
}

fn read_geojson(path: &Path) -> Result<GeoJson> {
    let mut bytes = fs::read(path)?;
    let geojson: GeoJson = simd_json::serde::from_slice(&mut bytes)?;
    Ok(geojson)
}

/// Load polygon features as regions, returning how many were added
pub fn load_regions(context: &mut MapContext, path: &Path) -> Result<usize> {
    let geojson = read_geojson(path)?;
    Ok(add_regions(context, &geojson))
}

/// Add every polygon feature of a parsed document, skipping broken ones
pub fn add_regions(context: &mut MapContext, geojson: &GeoJson) -> usize {
    let mut count = 0;
    for feature in features(geojson) {
        match region_from_feature(feature) {
            Ok(region) => {
                context.add_region(region);
                count += 1;
            }
            Err(e) => warn!("skipping feature: {}", e),
        }
    }
    count
}

/// Load point features as cities, returning how many were added
pub fn load_cities(context: &mut MapContext, path: &Path) -> Result<usize> {
    let geojson = read_geojson(path)?;
    let mut count = 0;

    for feature in features(&geojson) {
        let Some(Value::Point(coords)) = feature.geometry.as_ref().map(|g| &g.value) else {
            continue;
        };
        let Some(point) = to_geo_point(coords) else {
            continue;
        };

        let name = string_property(feature, &NAME_KEYS).unwrap_or_else(|| "Unknown".to_string());
        let population = POPULATION_KEYS
            .iter()
            .find_map(|key| feature.property(key).and_then(|v| v.as_f64()))
            .map(|v| v as u64)
            .unwrap_or(0);

        context.add_city(point, &name, population);
        count += 1;
    }

    Ok(count)
}

fn features(geojson: &GeoJson) -> Box<dyn Iterator<Item = &Feature> + '_> {
    match geojson {
        GeoJson::FeatureCollection(fc) => Box::new(fc.features.iter()),
        GeoJson::Feature(f) => Box::new(std::iter::once(f)),
        GeoJson::Geometry(_) => Box::new(std::iter::empty()),
    }
}

fn string_property(feature: &Feature, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| feature.property(key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

/// Build a region from a Polygon or MultiPolygon feature
pub fn region_from_feature(feature: &Feature) -> Result<RegionFeature, AtlasError> {
    let name = string_property(feature, &NAME_KEYS).unwrap_or_else(|| "Unnamed".to_string());
    let code = string_property(feature, &CODE_KEYS).unwrap_or_default();

    let geometry = feature
        .geometry
        .as_ref()
        .ok_or_else(|| AtlasError::Data(format!("{name}: feature has no geometry")))?;

    let polygons: Vec<RegionPolygon> = match &geometry.value {
        Value::Polygon(polygon) => convert_polygon(polygon).into_iter().collect(),
        Value::MultiPolygon(polygons) => polygons.iter().filter_map(convert_polygon).collect(),
        _ => {
            return Err(AtlasError::Data(format!(
                "{name}: only Polygon and MultiPolygon geometries form regions"
            )))
        }
    };

    if polygons.is_empty() {
        return Err(AtlasError::Data(format!("{name}: no usable rings")));
    }

    Ok(RegionFeature::new(name, code, polygons))
}

/// First ring is the exterior, the rest are holes. `None` without a usable exterior.
fn convert_polygon(polygon: &PolygonType) -> Option<RegionPolygon> {
    let mut rings = polygon
        .iter()
        .map(|ring| ring.iter().filter_map(|c| to_geo_point(c)).collect::<Vec<_>>());

    let exterior = rings.next().filter(|ring| ring.len() >= 3)?;
    let holes = rings.filter(|ring| ring.len() >= 3).collect();
    Some(RegionPolygon::new(exterior, holes))
}

fn to_geo_point(coords: &[f64]) -> Option<GeoPoint> {
    match coords {
        [lon, lat, ..] => {
            let point = GeoPoint::from_degrees(*lon, *lat);
            point.is_finite().then(|| point.normalized())
        }
        _ => None,
    }
}

/// Coarse built-in world for when no data files are available
pub fn generate_simple_world(context: &mut MapContext) {
    context.add_region(RegionFeature::from_degrees(
        "North America",
        "NAM",
        &[
            (-168.0, 65.0), (-166.0, 60.0), (-141.0, 60.0), (-130.0, 55.0),
            (-125.0, 48.0), (-124.0, 40.0), (-117.0, 32.0), (-110.0, 25.0),
            (-97.0, 25.0), (-97.0, 28.0), (-82.0, 24.0), (-80.0, 25.0),
            (-81.0, 31.0), (-75.0, 35.0), (-70.0, 41.0), (-67.0, 45.0),
            (-65.0, 47.0), (-55.0, 47.0), (-52.0, 47.0), (-55.0, 52.0),
            (-58.0, 55.0), (-64.0, 60.0), (-73.0, 62.0), (-80.0, 63.0),
            (-95.0, 62.0), (-110.0, 68.0), (-130.0, 70.0), (-145.0, 70.0),
        ],
    ));

    context.add_region(RegionFeature::from_degrees(
        "South America",
        "SAM",
        &[
            (-80.0, 10.0), (-75.0, 5.0), (-70.0, 5.0), (-60.0, 5.0),
            (-50.0, 0.0), (-35.0, -5.0), (-35.0, -10.0), (-38.0, -15.0),
            (-40.0, -22.0), (-48.0, -25.0), (-55.0, -34.0), (-58.0, -38.0),
            (-65.0, -42.0), (-68.0, -50.0), (-75.0, -52.0), (-75.0, -45.0),
            (-72.0, -40.0), (-72.0, -30.0), (-70.0, -20.0), (-70.0, -15.0),
            (-80.0, -5.0), (-80.0, 0.0),
        ],
    ));

    context.add_region(RegionFeature::from_degrees(
        "Europe",
        "EUR",
        &[
            (-10.0, 36.0), (-5.0, 36.0), (0.0, 38.0), (5.0, 43.0),
            (10.0, 44.0), (15.0, 45.0), (20.0, 40.0), (25.0, 37.0),
            (30.0, 40.0), (35.0, 42.0), (40.0, 43.0), (40.0, 55.0),
            (30.0, 60.0), (25.0, 65.0), (20.0, 70.0), (10.0, 71.0),
            (5.0, 62.0), (5.0, 58.0), (-5.0, 58.0), (-10.0, 52.0),
            (-5.0, 48.0), (-5.0, 43.0),
        ],
    ));

    context.add_region(RegionFeature::from_degrees(
        "Africa",
        "AFR",
        &[
            (-17.0, 15.0), (-17.0, 20.0), (-15.0, 28.0), (-5.0, 35.0),
            (10.0, 37.0), (20.0, 33.0), (25.0, 32.0), (35.0, 30.0),
            (35.0, 20.0), (42.0, 12.0), (50.0, 12.0), (45.0, 5.0),
            (40.0, -5.0), (35.0, -20.0), (35.0, -25.0), (30.0, -30.0),
            (20.0, -35.0), (18.0, -35.0), (15.0, -30.0), (10.0, -15.0),
            (10.0, 0.0), (5.0, 5.0), (-5.0, 5.0), (-10.0, 10.0),
        ],
    ));

    context.add_region(RegionFeature::from_degrees(
        "Asia",
        "ASI",
        &[
            (40.0, 43.0), (50.0, 40.0), (55.0, 37.0), (60.0, 25.0),
            (65.0, 25.0), (70.0, 20.0), (75.0, 15.0), (80.0, 8.0),
            (80.0, 15.0), (88.0, 22.0), (92.0, 22.0), (95.0, 16.0),
            (100.0, 14.0), (105.0, 10.0), (110.0, 20.0), (115.0, 22.0),
            (120.0, 22.0), (122.0, 25.0), (125.0, 30.0), (130.0, 35.0),
            (135.0, 35.0), (140.0, 40.0), (145.0, 45.0), (145.0, 50.0),
            (140.0, 55.0), (160.0, 60.0), (170.0, 65.0), (179.0, 68.0),
            (120.0, 73.0), (70.0, 72.0), (60.0, 68.0), (40.0, 65.0),
            (40.0, 55.0),
        ],
    ));

    // Crosses the antimeridian
    context.add_region(RegionFeature::from_degrees(
        "Chukotka",
        "CHK",
        &[
            (172.0, 64.0), (178.0, 62.5), (-178.0, 64.5), (-172.0, 64.3),
            (-170.0, 66.0), (-175.0, 67.5), (-180.0, 69.0), (175.0, 69.5),
            (170.0, 70.0), (168.0, 67.0),
        ],
    ));

    context.add_region(RegionFeature::from_degrees(
        "Australia",
        "AUS",
        &[
            (115.0, -20.0), (120.0, -18.0), (130.0, -12.0), (140.0, -12.0),
            (145.0, -15.0), (150.0, -25.0), (153.0, -30.0), (150.0, -35.0),
            (145.0, -38.0), (140.0, -38.0), (135.0, -35.0), (130.0, -32.0),
            (125.0, -32.0), (115.0, -35.0), (115.0, -25.0),
        ],
    ));

    // Also crosses the antimeridian
    context.add_region(RegionFeature::from_degrees(
        "Fiji",
        "FJI",
        &[
            (177.0, -16.0), (179.5, -16.2), (-179.8, -16.8), (-179.9, -18.5),
            (178.5, -18.8), (177.3, -18.0),
        ],
    ));

    let cities = [
        (-74.0, 40.7, "New York", 18_800_000),
        (-0.1, 51.5, "London", 9_000_000),
        (2.3, 48.9, "Paris", 11_000_000),
        (139.7, 35.7, "Tokyo", 37_400_000),
        (151.2, -33.9, "Sydney", 5_300_000),
        (-43.2, -22.9, "Rio", 13_500_000),
        (37.6, 55.8, "Moscow", 12_500_000),
        (116.4, 39.9, "Beijing", 21_500_000),
        (77.2, 28.6, "Delhi", 32_900_000),
        (-118.2, 34.0, "Los Angeles", 12_400_000),
        (-99.1, 19.4, "Mexico City", 21_800_000),
        (-58.4, -34.6, "Buenos Aires", 15_000_000),
        (178.4, -18.1, "Suva", 93_000),
        (177.5, 64.7, "Anadyr", 13_000),
    ];
    for (lon, lat, name, population) in cities {
        context.add_city(GeoPoint::from_degrees(lon, lat).normalized(), name, population);
    }
}
