use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use tessellate::{AtomicInt32, AtomicInt32Array, AtomicInt64, AtomicReference};

const THREADS: usize = 4;
const OPS: usize = 10_000;

fn bench_counters(c: &mut Criterion) {
    let mut group = c.benchmark_group("counter");

    group.bench_function("std_atomic_i32_fetch_add", |b| {
        let counter = AtomicI32::new(0);
        b.iter(|| black_box(counter.fetch_add(1, Ordering::SeqCst)));
    });

    group.bench_function("atomic_int32_increment", |b| {
        let counter = AtomicInt32::new(0);
        b.iter(|| black_box(counter.increment_and_get()));
    });

    group.bench_function("atomic_int64_update_and_get", |b| {
        let counter = AtomicInt64::new(0);
        b.iter(|| black_box(counter.update_and_get(|v| v + 1)));
    });

    group.bench_function("contended_mutex_i32", |b| {
        b.iter(|| {
            let counter = Mutex::new(0_i32);
            thread::scope(|s| {
                for _ in 0..THREADS {
                    s.spawn(|| {
                        for _ in 0..OPS {
                            *counter.lock().unwrap() += 1;
                        }
                    });
                }
            });
            black_box(counter.into_inner().unwrap())
        });
    });

    group.bench_function("contended_atomic_int32", |b| {
        b.iter(|| {
            let counter = AtomicInt32::new(0);
            thread::scope(|s| {
                for _ in 0..THREADS {
                    s.spawn(|| {
                        for _ in 0..OPS {
                            counter.increment_and_get();
                        }
                    });
                }
            });
            black_box(counter.get())
        });
    });

    group.finish();
}

fn bench_arrays(c: &mut Criterion) {
    let mut group = c.benchmark_group("array");

    group.bench_function("int32_array_striped_increment", |b| {
        let slots = AtomicInt32Array::new(THREADS);
        b.iter(|| {
            thread::scope(|s| {
                for t in 0..THREADS {
                    let slots = &slots;
                    s.spawn(move || {
                        for _ in 0..OPS {
                            slots.increment_and_get(t).unwrap();
                        }
                    });
                }
            });
        });
    });

    group.bench_function("int32_array_render_1k", |b| {
        let slots: AtomicInt32Array = (0..1024).collect();
        b.iter(|| black_box(slots.to_string()));
    });

    group.finish();
}

fn bench_references(c: &mut Criterion) {
    let mut group = c.benchmark_group("reference");

    group.bench_function("get_uncontended", |b| {
        let cell = AtomicReference::from_value(42_u64);
        b.iter(|| black_box(cell.get()));
    });

    group.bench_function("with_uncontended", |b| {
        let cell = AtomicReference::from_value(42_u64);
        b.iter(|| black_box(cell.with(|v| v.copied())));
    });

    group.bench_function("publish_while_reading", |b| {
        let cell = Arc::new(AtomicReference::from_value(0_u64));
        b.iter(|| {
            thread::scope(|s| {
                s.spawn(|| {
                    for i in 0..OPS as u64 {
                        cell.set(Some(Arc::new(i)));
                    }
                });
                s.spawn(|| {
                    for _ in 0..OPS {
                        black_box(cell.get());
                    }
                });
            });
        });
    });

    group.finish();
}

criterion_group!(benches, bench_counters, bench_arrays, bench_references);
criterion_main!(benches);
