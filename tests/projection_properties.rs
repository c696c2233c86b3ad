use approx::assert_abs_diff_eq;
use tui_atlas::projection::{solve_theta, ThetaSolution};
use tui_atlas::{
    wrap_longitude, Bounds, GeoPoint, MapProjection, ProjPoint, Projection, ProjectionKind,
};

fn grid(lat_limit: i32) -> impl Iterator<Item = GeoPoint> {
    (-lat_limit..=lat_limit).step_by(10).flat_map(|lat| {
        (-170..=170)
            .step_by(10)
            .map(move |lon| GeoPoint::from_degrees(lon as f64, lat as f64))
    })
}

/// Latitudes up to the edge of the round-trip domain, |lat| < 80
const ROUND_TRIP_LATS: [f64; 9] = [-79.0, -60.0, -45.0, -20.0, 0.0, 20.0, 45.0, 60.0, 79.0];

/// Centers in degrees; cylindrical kinds only use the longitude
const CENTERS: [(f64, f64); 5] = [
    (0.0, 0.0),
    (-120.0, -60.0),
    (45.0, 30.0),
    (165.0, 0.0),
    (0.0, 89.0),
];

fn round_trip_grid() -> impl Iterator<Item = GeoPoint> {
    ROUND_TRIP_LATS.iter().flat_map(|&lat| {
        (-170..=170)
            .step_by(10)
            .map(move |lon| GeoPoint::from_degrees(lon as f64, lat))
    })
}

fn projections() -> Vec<MapProjection> {
    ProjectionKind::ALL
        .iter()
        .map(|&kind| MapProjection::new(kind, GeoPoint::new(0.0, 0.0)).unwrap())
        .collect()
}

fn all_centered_projections() -> Vec<MapProjection> {
    CENTERS
        .iter()
        .flat_map(|&(lon, lat)| {
            ProjectionKind::ALL.iter().map(move |&kind| {
                MapProjection::new(kind, GeoPoint::from_degrees(lon, lat)).unwrap()
            })
        })
        .collect()
}

/// Cosine of the angular distance between two points
fn facing(center: GeoPoint, point: GeoPoint) -> f64 {
    center.phi.sin() * point.phi.sin()
        + center.phi.cos() * point.phi.cos() * (point.lambda - center.lambda).cos()
}

fn widened(bounds: Bounds) -> Bounds {
    let eps = 1e-9;
    Bounds::new(
        bounds.min_x - eps,
        bounds.min_y - eps,
        bounds.max_x + eps,
        bounds.max_y + eps,
    )
}

#[test]
fn forward_inverse_round_trip() {
    for projection in all_centered_projections() {
        let azimuthal = projection.kind().is_azimuthal();
        let center = projection.center();
        for point in round_trip_grid() {
            // Inverse loses precision right at the orthographic limb
            if azimuthal && facing(center, point) < 0.1 {
                continue;
            }
            let projected = projection
                .forward(point)
                .unwrap_or_else(|| panic!("{projection:?} has no image of {point:?}"));
            let back = projection
                .inverse(projected)
                .unwrap_or_else(|| panic!("{projection:?} cannot invert {projected:?}"));

            assert_abs_diff_eq!(back.phi, point.phi, epsilon = 1e-7);
            assert_abs_diff_eq!(
                wrap_longitude(back.lambda - point.lambda),
                0.0,
                epsilon = 1e-7
            );
        }
    }
}

#[test]
fn images_stay_inside_bounds() {
    for projection in all_centered_projections() {
        let bounds = widened(projection.bounds());
        for point in grid(90) {
            if let Some(projected) = projection.forward(point) {
                assert!(
                    bounds.contains(projected),
                    "{projection:?}: {projected:?} outside {bounds:?}"
                );
                assert!(projection.is_on_map(projected));
            }
        }
    }
}

#[test]
fn outline_points_stay_inside_bounds() {
    for projection in projections() {
        let bounds = widened(projection.bounds());
        let outline = projection.outline();
        assert!(outline.len() >= 4);
        assert!(outline.iter().all(|&p| bounds.contains(p)));
    }
}

#[test]
fn far_side_is_undefined_for_orthographic() {
    let projection =
        MapProjection::new(ProjectionKind::Orthographic, GeoPoint::new(0.0, 0.0)).unwrap();
    let far = GeoPoint::from_degrees(180.0, 0.0);
    assert!(!projection.is_visible(far));
    assert!(projection.forward(far).is_none());
    assert!(projection.inverse(ProjPoint::new(2.0, 0.0)).is_none());
}

#[test]
fn mollweide_solver_converges_everywhere() {
    for tenths in -900..=900 {
        let phi = (tenths as f64 / 10.0).to_radians();
        let ThetaSolution {
            theta,
            iterations,
            last_step,
        } = solve_theta(phi);

        assert!(iterations <= 20, "phi {phi}: {iterations} iterations");
        assert!(last_step < 1e-10, "phi {phi}: last step {last_step}");
        assert_abs_diff_eq!(
            2.0 * theta + (2.0 * theta).sin(),
            std::f64::consts::PI * phi.sin(),
            epsilon = 1e-9
        );
    }
}

#[test]
fn azimuthal_projections_report_no_seam() {
    for projection in projections() {
        if !projection.kind().is_azimuthal() {
            continue;
        }
        for a in (-180..=180).step_by(15) {
            for b in (-180..=180).step_by(15) {
                let (a, b) = ((a as f64).to_radians(), (b as f64).to_radians());
                assert!(!projection.crosses_seam(a, b));
            }
        }
    }
}

#[test]
fn cylindrical_seam_follows_central_meridian() {
    for kind in [ProjectionKind::Mercator, ProjectionKind::Mollweide] {
        let projection = MapProjection::new(kind, GeoPoint::from_degrees(90.0, 0.0)).unwrap();
        let (a, b) = (179f64.to_radians(), (-179f64).to_radians());
        // 180 is no longer the edge, -90 is
        assert!(!projection.crosses_seam(a, b));
        assert!(projection.crosses_seam((-89f64).to_radians(), (-91f64).to_radians()));
    }
}
