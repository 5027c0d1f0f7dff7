use bin_grid::spatial::GridIndex;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn generate_random_points(n: usize, width: f64, height: f64) -> Vec<(f64, f64)> {
    let mut rng = StdRng::seed_from_u64(7);
    let mut points = Vec::with_capacity(n);

    for _ in 0..n {
        let x = rng.random_range(0.0..width);
        let y = rng.random_range(0.0..height);
        points.push((x, y));
    }

    points
}

fn build_index(points: &[(f64, f64)]) -> GridIndex {
    let mut index = GridIndex::configure(0.0, 1000.0, 0.0, 1000.0, 32, 32);
    for &(x, y) in points {
        index.insert(x, y);
    }
    index
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("Grid Insert");

    for &n in &[100, 1000, 10000] {
        group.bench_function(format!("insert_{}", n), |b| {
            let points = generate_random_points(n, 1000.0, 1000.0);
            b.iter(|| {
                black_box(build_index(&points));
            });
        });
    }

    group.finish();
}

fn bench_nearest(c: &mut Criterion) {
    let mut group = c.benchmark_group("Grid Nearest");

    for &n in &[100, 1000, 10000] {
        let points = generate_random_points(n, 1000.0, 1000.0);
        let index = build_index(&points);
        let queries = generate_random_points(64, 1000.0, 1000.0);

        group.bench_function(format!("nearest_{}", n), |b| {
            b.iter(|| {
                for &(x, y) in &queries {
                    black_box(index.nearest(x, y));
                }
            });
        });

        group.bench_function(format!("nearest_pruned_{}", n), |b| {
            b.iter(|| {
                for &(x, y) in &queries {
                    black_box(index.nearest_pruned(x, y));
                }
            });
        });

        group.bench_function(format!("nearest_batch_{}", n), |b| {
            b.iter(|| {
                black_box(index.nearest_batch(&queries));
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_insert, bench_nearest);
criterion_main!(benches);
