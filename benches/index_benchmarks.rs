use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use geo::polygon;
use imbibi::{parse_coordinates, Atlas, Feature, Location, SearchIndex, SpatialIndex};

const NAMES: [&str; 8] = [
    "Kigali", "Remera", "Gisozi", "Kimironko", "Nyamirambo", "Kacyiru", "Rukiri", "Amahoro",
];

/// `side * side` unit squares, named so that provinces, districts and sectors
/// repeat across the lattice the way real boundary data does.
fn lattice(side: usize) -> Vec<Feature> {
    let mut features = Vec::with_capacity(side * side);
    for row in 0..side {
        for col in 0..side {
            let (x, y) = (col as f64 * 0.01, row as f64 * 0.01);
            let n = row * side + col;
            features.push(Feature::new(
                polygon![
                    (x: x, y: y),
                    (x: x + 0.01, y: y),
                    (x: x + 0.01, y: y + 0.01),
                    (x: x, y: y + 0.01),
                ],
                [
                    ("NAME_1", format!("Province {}", row / 50)),
                    ("NAME_2", format!("District {}", row / 10)),
                    ("NAME_3", format!("Sector {}", col / 10)),
                    ("NAME_4", NAMES[n % NAMES.len()].to_string()),
                    ("NAME_5", format!("Village {}", n)),
                ],
            ));
        }
    }
    features
}

fn benchmark_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    group.sample_size(20);

    for side in [50, 150] {
        let features = lattice(side);
        group.bench_with_input(
            BenchmarkId::new("spatial_index", side * side),
            &features,
            |b, features| b.iter(|| SpatialIndex::new(black_box(features.clone()))),
        );
        group.bench_with_input(
            BenchmarkId::new("search_index", side * side),
            &features,
            |b, features| b.iter(|| SearchIndex::new(black_box(features))),
        );
    }

    group.finish();
}

fn benchmark_locate(c: &mut Criterion) {
    let mut group = c.benchmark_group("locate");
    let atlas = Atlas::new(lattice(150));

    group.bench_function("hit", |b| {
        let mut counter = 0u32;
        b.iter(|| {
            let offset = (counter % 1000) as f64 * 0.0014;
            counter += 1;
            atlas.locate(black_box(Location::new(0.005 + offset, 0.005 + offset)))
        })
    });

    group.bench_function("outside_bounds", |b| {
        b.iter(|| atlas.locate(black_box(Location::new(-45.0, 120.0))))
    });

    group.finish();
}

fn benchmark_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    let atlas = Atlas::new(lattice(150));

    for query in ["ki", "kimironko", "district 4", ":village 1200", ":sec"] {
        group.bench_with_input(BenchmarkId::from_parameter(query), &query, |b, query| {
            b.iter(|| atlas.search(black_box(query)).into_entries().len())
        });
    }

    group.finish();
}

fn benchmark_coordinates(c: &mut Criterion) {
    let mut group = c.benchmark_group("coordinates");

    group.bench_function("parse_decimal", |b| {
        b.iter(|| parse_coordinates(black_box("-1.9441, 30.0619")))
    });
    group.bench_function("parse_dms", |b| {
        b.iter(|| parse_coordinates(black_box("1°56'38.8\"S 30°03'42.8\"E")))
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_build,
    benchmark_locate,
    benchmark_search,
    benchmark_coordinates
);
criterion_main!(benches);
