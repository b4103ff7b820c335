use criterion::{black_box, criterion_group, criterion_main, Criterion};
use homefree::{nearest_within, resolve_nearest, Coordinate, Record};
use serde_json::json;

/// Build a synthetic grid of building records around central Melbourne.
fn create_buildings(count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| {
            let row = (i / 25) as f64;
            let col = (i % 25) as f64;
            let value = json!({
                "building_name": format!("Building {}", i),
                "latitude": format!("{:.6}", -37.82 + row * 0.0004),
                "longitude": 144.95 + col * 0.0004,
                "accessibility_rating": i % 4,
            });
            match value {
                serde_json::Value::Object(map) => map,
                _ => unreachable!(),
            }
        })
        .collect()
}

fn bench_resolve_500(c: &mut Criterion) {
    let buildings = create_buildings(500);
    let reference = Coordinate::new(-37.8136, 144.9631).unwrap();

    c.bench_function("resolve_nearest_500", |b| {
        b.iter(|| {
            black_box(resolve_nearest(
                black_box(reference),
                black_box(&buildings),
                200.0,
            ))
        })
    });
}

fn bench_nearest_scaling(c: &mut Criterion) {
    let reference = Coordinate::new(-37.8136, 144.9631).unwrap();
    let mut group = c.benchmark_group("nearest_within");

    for size in [100, 1_000, 10_000] {
        let buildings = create_buildings(size);
        group.bench_function(format!("{}", size), |b| {
            b.iter(|| black_box(nearest_within(black_box(reference), &buildings, 200.0)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_resolve_500, bench_nearest_scaling);
criterion_main!(benches);
