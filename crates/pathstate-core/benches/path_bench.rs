//! # Path Benchmarks
//!
//! Performance benchmarks for path resolution and store writes.
//!
//! Run with: `cargo bench -p pathstate-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use pathstate_core::{Store, Value, json, path};
use std::hint::black_box;

/// Build a chain of nested objects `depth` levels deep.
fn create_nested(depth: usize) -> (Value, String) {
    let mut doc = json!({});
    let key = (0..depth)
        .map(|i| format!("k{}", i))
        .collect::<Vec<_>>()
        .join(".");
    path::set(&mut doc, key.as_str(), json!(1));
    (doc, key)
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_path_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("path_get");

    for depth in [1, 8, 32].iter() {
        let (doc, key) = create_nested(*depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &key, |b, key| {
            b.iter(|| black_box(path::get(&doc, key.as_str())));
        });
    }

    group.finish();
}

fn bench_path_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("path_set");

    for depth in [1, 8, 32].iter() {
        let (_, key) = create_nested(*depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &key, |b, key| {
            b.iter(|| {
                let mut doc = json!({});
                path::set(&mut doc, key.as_str(), json!("v"));
                black_box(doc)
            });
        });
    }

    group.finish();
}

fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("path_append");

    for size in [100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let mut doc = json!({});
                for i in 0..size {
                    path::set(&mut doc, "list[]", json!(i));
                }
                black_box(doc)
            });
        });
    }

    group.finish();
}

fn bench_store_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_set");

    for watchers in [0, 10, 100].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(watchers),
            watchers,
            |b, &watchers| {
                let store = Store::new();
                for _ in 0..watchers {
                    store.watch("user.name", |_| Ok(()));
                }
                let mut n = 0u64;
                b.iter(|| {
                    n = n.wrapping_add(1);
                    black_box(store.set("user.name", json!(n)))
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_path_get,
    bench_path_set,
    bench_append,
    bench_store_set,
);
criterion_main!(benches);
