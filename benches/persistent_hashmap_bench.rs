//! Benchmark for PersistentHashMap vs standard HashMap.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use lambars_collections::persistent::{PersistentHashMap, PersistentHashSet};
use lambars_collections::typeclass::CaseInsensitive;
use std::collections::HashMap;
use std::hint::black_box;

const SIZES: [u64; 3] = [100, 1_000, 10_000];

fn benchmark_insert(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("hashmap_insert");

    for size in SIZES {
        group.bench_with_input(
            BenchmarkId::new("PersistentHashMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut map = PersistentHashMap::new();
                    for index in 0..size {
                        map = map.insert(black_box(index), black_box(index * 2));
                    }
                    black_box(map)
                });
            },
        );

        group.bench_with_input(BenchmarkId::new("HashMap", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut map = HashMap::new();
                for index in 0..size {
                    map.insert(black_box(index), black_box(index * 2));
                }
                black_box(map)
            });
        });
    }

    group.finish();
}

fn benchmark_get(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("hashmap_get");

    for size in SIZES {
        let map: PersistentHashMap<u64, u64> = (0..size).map(|index| (index, index)).collect();
        let model: HashMap<u64, u64> = (0..size).map(|index| (index, index)).collect();

        group.bench_with_input(
            BenchmarkId::new("PersistentHashMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    for index in 0..size {
                        black_box(map.get(black_box(&index)));
                    }
                });
            },
        );

        group.bench_with_input(BenchmarkId::new("HashMap", size), &size, |bencher, &size| {
            bencher.iter(|| {
                for index in 0..size {
                    black_box(model.get(black_box(&index)));
                }
            });
        });
    }

    group.finish();
}

fn benchmark_remove(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("hashmap_remove");

    for size in SIZES {
        let map: PersistentHashMap<u64, u64> = (0..size).map(|index| (index, index)).collect();

        group.bench_with_input(
            BenchmarkId::new("PersistentHashMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut current = map.clone();
                    for index in (0..size).step_by(2) {
                        current = current.remove(black_box(&index));
                    }
                    black_box(current)
                });
            },
        );
    }

    group.finish();
}

fn benchmark_case_insensitive_contains(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("hashset_case_insensitive_contains");

    for size in SIZES {
        let words: Vec<String> = (0..size).map(|index| format!("Word{index}")).collect();
        let probes: Vec<String> = words.iter().map(|word| word.to_uppercase()).collect();
        let set: PersistentHashSet<String, CaseInsensitive> = words.into_iter().collect();

        group.bench_with_input(
            BenchmarkId::new("PersistentHashSet<CaseInsensitive>", size),
            &size,
            |bencher, _| {
                bencher.iter(|| {
                    for probe in &probes {
                        black_box(set.contains(black_box(probe.as_str())));
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_insert,
    benchmark_get,
    benchmark_remove,
    benchmark_case_insensitive_contains
);

criterion_main!(benches);
