//! Benchmark for the sequence collections vs standard Vec and VecDeque.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use lambars_collections::persistent::{PersistentList, PersistentQueue, PersistentVector};
use std::collections::VecDeque;
use std::hint::black_box;

const SIZES: [usize; 3] = [100, 1_000, 10_000];

fn benchmark_push(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("sequence_push");

    for size in SIZES {
        group.bench_with_input(
            BenchmarkId::new("PersistentVector::push_back", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut vector = PersistentVector::new();
                    for index in 0..size {
                        vector = vector.push_back(black_box(index));
                    }
                    black_box(vector)
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("PersistentList::cons", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut list = PersistentList::new();
                    for index in 0..size {
                        list = list.cons(black_box(index));
                    }
                    black_box(list)
                });
            },
        );

        group.bench_with_input(BenchmarkId::new("Vec::push", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut vector = Vec::new();
                for index in 0..size {
                    vector.push(black_box(index));
                }
                black_box(vector)
            });
        });
    }

    group.finish();
}

fn benchmark_vector_access(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("vector_access");

    for size in SIZES {
        let vector: PersistentVector<usize> = (0..size).collect();

        group.bench_with_input(BenchmarkId::new("get", size), &size, |bencher, &size| {
            bencher.iter(|| {
                for index in 0..size {
                    black_box(vector.get(black_box(index)));
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("update", size), &size, |bencher, &size| {
            bencher.iter(|| black_box(vector.update(size / 2, black_box(0))));
        });

        group.bench_with_input(BenchmarkId::new("iter", size), &size, |bencher, _| {
            bencher.iter(|| black_box(vector.iter().sum::<usize>()));
        });
    }

    group.finish();
}

fn benchmark_queue(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("queue_cycle");

    for size in SIZES {
        group.bench_with_input(
            BenchmarkId::new("PersistentQueue", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut queue = PersistentQueue::new();
                    for index in 0..size {
                        queue = queue.enqueue(black_box(index));
                    }
                    while let Ok((element, rest)) = queue.dequeue() {
                        black_box(element);
                        queue = rest;
                    }
                });
            },
        );

        group.bench_with_input(BenchmarkId::new("VecDeque", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut queue = VecDeque::new();
                for index in 0..size {
                    queue.push_back(black_box(index));
                }
                while let Some(element) = queue.pop_front() {
                    black_box(element);
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_push, benchmark_vector_access, benchmark_queue);

criterion_main!(benches);
