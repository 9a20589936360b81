//! Engine Benchmark
//!
//! Measures the hot paths behind likes and identifier allocation:
//! - Binary search and sorted insertion on liker sets of growing size
//! - Quicksort on shuffled and already-sorted input
//! - Allocate/free cycles against the in-memory store

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use mynotes_core::{Id, IdAllocator, MemoryStore, OrderedSet};
use rand::Rng;
use rand::seq::SliceRandom;
use std::sync::Arc;

/// Builds a liker set holding every even ID below `2 * size`
fn even_set(size: u64) -> OrderedSet<Id> {
    (0..size).map(|i| Id(i * 2)).collect()
}

/// Benchmarks membership lookups on sets of different sizes
fn bi_search_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("bi_search");

    for size in [100u64, 1_000, 10_000] {
        let set = even_set(size);
        let mut rng = rand::thread_rng();

        group.bench_with_input(BenchmarkId::new("probe", size), &set, |b, set| {
            b.iter(|| {
                let probe = Id(rng.gen_range(0..size * 2));
                black_box(set.bi_search(&probe))
            })
        });
    }

    group.finish();
}

/// Benchmarks a like followed by an unlike of the same member
fn toggle_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("toggle");

    for size in [100u64, 1_000, 10_000] {
        let mut set = even_set(size);

        group.bench_function(BenchmarkId::new("insert_remove", size), |b| {
            b.iter(|| {
                let index = set.bi_insert(Id(size + 1));
                black_box(set.remove(index))
            })
        });
    }

    group.finish();
}

/// Benchmarks the in-place quicksort
fn sort_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort");

    for size in [1_000u64, 10_000] {
        let mut shuffled: Vec<Id> = (0..size).map(Id).collect();
        shuffled.shuffle(&mut rand::thread_rng());
        let sorted: Vec<Id> = (0..size).map(Id).collect();

        group.bench_with_input(BenchmarkId::new("shuffled", size), &shuffled, |b, input| {
            b.iter(|| {
                let mut set = OrderedSet::new();
                set.extend(input.iter().copied());
                set.sort();
                black_box(set)
            })
        });

        group.bench_with_input(BenchmarkId::new("sorted", size), &sorted, |b, input| {
            b.iter(|| {
                let mut set = OrderedSet::new();
                set.extend(input.iter().copied());
                set.sort();
                black_box(set)
            })
        });
    }

    group.finish();
}

/// Benchmarks allocate/free round trips through the compare-and-swap path
fn allocator_benchmark(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let allocator = IdAllocator::new(Arc::new(MemoryStore::new()), "notes");
    runtime.block_on(async {
        for _ in 0..1_000 {
            allocator.allocate().await.unwrap();
        }
    });

    c.bench_function("allocate_free", |b| {
        b.iter(|| {
            runtime.block_on(async {
                let id = allocator.allocate().await.unwrap();
                allocator.free(black_box(id)).await.unwrap();
            })
        })
    });
}

criterion_group!(
    benches,
    bi_search_benchmark,
    toggle_benchmark,
    sort_benchmark,
    allocator_benchmark,
);
criterion_main!(benches);
