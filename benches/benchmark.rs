// Benchmarks for the pure parts of a shapeshift call: flattening and matching
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use serde_json::{json, Map, Value};
use shapeshift::{find_closest_match, flatten, unflatten, Matcher, Vector};
use std::hint::black_box;

fn generate_random_vector(rng: &mut impl Rng, dim: usize) -> Vector {
    Vector::new((0..dim).map(|_| rng.random_range(-1.0f32..1.0f32)).collect())
}

/// Object with `width` keys per level, `depth` levels deep.
fn generate_tree(width: usize, depth: usize) -> Map<String, Value> {
    let mut map = Map::new();
    for i in 0..width {
        let value = if depth == 0 {
            json!(format!("value {}", i))
        } else {
            Value::Object(generate_tree(width, depth - 1))
        };
        map.insert(format!("field_{}", i), value);
    }
    map
}

fn benchmark_flatten(c: &mut Criterion) {
    let mut group = c.benchmark_group("flatten");

    for (width, depth) in [(10, 1), (10, 2), (6, 4)] {
        let tree = generate_tree(width, depth);
        let label = format!("{}x{}", width, depth);

        group.bench_with_input(BenchmarkId::new("flatten", &label), &tree, |b, tree| {
            b.iter(|| flatten(black_box(tree)).unwrap());
        });

        let flat = flatten(&tree).unwrap();
        group.bench_with_input(BenchmarkId::new("unflatten", &label), &flat, |b, flat| {
            b.iter(|| unflatten(black_box(flat)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("matching");
    let mut rng = rand::rng();

    for dim in [256, 1024, 1536] {
        let query = generate_random_vector(&mut rng, dim);
        let targets: Vec<Vector> = (0..100).map(|_| generate_random_vector(&mut rng, dim)).collect();

        group.bench_with_input(BenchmarkId::new("closest_of_100", dim), &dim, |b, _| {
            b.iter(|| find_closest_match(black_box(&query), black_box(&targets), 0.5));
        });
    }

    // A realistic record: 50 source leaves against 50 target leaves.
    let sources: Vec<Vector> = (0..50).map(|_| generate_random_vector(&mut rng, 1024)).collect();
    let targets: Vec<Vector> = (0..50).map(|_| generate_random_vector(&mut rng, 1024)).collect();
    let matcher = Matcher::default();
    group.bench_function("assign_50x50_1024", |b| {
        b.iter(|| matcher.assign(black_box(&sources), black_box(&targets)));
    });

    group.finish();
}

criterion_group!(benches, benchmark_flatten, benchmark_matching);
criterion_main!(benches);
