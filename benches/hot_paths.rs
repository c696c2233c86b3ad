use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use tui_atlas::data::generate_simple_world;
use tui_atlas::{
    GeoPoint, MapContext, MapProjection, Mollweide, Picker, ProjPoint, Projection,
    ProjectionKind, ShapeCache,
};

fn world() -> Arc<MapContext> {
    let mut context = MapContext::new();
    generate_simple_world(&mut context);
    Arc::new(context)
}

fn bench_mollweide_forward(c: &mut Criterion) {
    let projection = Mollweide::new();
    let points: Vec<GeoPoint> = (-89..=89)
        .map(|lat| GeoPoint::from_degrees(lat as f64 * 2.0, lat as f64))
        .collect();

    c.bench_function("mollweide_forward", |b| {
        b.iter(|| {
            for &p in &points {
                black_box(projection.forward(black_box(p)));
            }
        })
    });
}

fn bench_cache_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_rebuild");
    for kind in ProjectionKind::ALL {
        let projection = MapProjection::new(kind, GeoPoint::from_degrees(20.0, 30.0)).unwrap();
        let mut cache = ShapeCache::new(world());
        group.bench_function(kind.name(), |b| {
            b.iter(|| {
                cache.invalidate();
                black_box(cache.get_shapes(&projection));
            })
        });
    }
    group.finish();
}

fn bench_pick(c: &mut Criterion) {
    let projection = MapProjection::default();
    let mut cache = ShapeCache::new(world());
    let targets: Vec<ProjPoint> = [(10.0, 50.0), (-100.0, 40.0), (175.0, 67.0), (0.0, -80.0)]
        .iter()
        .filter_map(|&(lon, lat)| projection.forward(GeoPoint::from_degrees(lon, lat)))
        .collect();

    c.bench_function("pick", |b| {
        b.iter(|| {
            let mut picker = Picker::new(&mut cache);
            for &t in &targets {
                black_box(picker.pick(black_box(t), &projection));
            }
        })
    });
}

criterion_group!(benches, bench_mollweide_forward, bench_cache_rebuild, bench_pick);
criterion_main!(benches);
