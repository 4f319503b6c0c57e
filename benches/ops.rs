//! Micro-operation benchmarks for the W-TinyLFU cache.
//!
//! Run with: `cargo bench --bench ops`
//!
//! Measures per-operation latency for get and insert, plus a mixed
//! workload with a shuffled key population to exercise the admission
//! tournament.

use std::hint::black_box;
use std::time::Instant;

use criterion::{BatchSize, Criterion, Throughput, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tinylfu::policy::tiny_lfu::TinyLfuCore;

const CAPACITY: usize = 16_384;
const OPS: u64 = 100_000;

// ============================================================================
// Get Hit Latency (ns/op)
// ============================================================================

fn bench_get_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_hit_ns");
    group.throughput(Throughput::Elements(OPS));

    group.bench_function("tiny_lfu", |b| {
        b.iter_custom(|iters| {
            let mut cache: TinyLfuCore<u64, u64> = TinyLfuCore::new(CAPACITY);
            for i in 0..CAPACITY as u64 {
                cache.insert(i, i);
            }
            let resident: Vec<u64> = (0..CAPACITY as u64).filter(|k| cache.contains(k)).collect();

            let start = Instant::now();
            for _ in 0..iters {
                for i in 0..OPS {
                    let key = resident[(i as usize) % resident.len()];
                    black_box(cache.get(&key));
                }
            }
            start.elapsed()
        })
    });

    group.finish();
}

// ============================================================================
// Insert Latency
// ============================================================================

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");

    group.bench_function("insert_new_with_eviction", |b| {
        b.iter_batched(
            || {
                let mut cache: TinyLfuCore<u64, u64> = TinyLfuCore::new(1024);
                for i in 0..1024u64 {
                    cache.insert(i, i);
                }
                cache
            },
            |mut cache| {
                for i in 0..1024u64 {
                    cache.insert(black_box(i + 1_000_000), i);
                }
            },
            BatchSize::SmallInput,
        )
    });

    group.bench_function("insert_update_in_place", |b| {
        b.iter_batched(
            || {
                let mut cache: TinyLfuCore<u64, u64> = TinyLfuCore::new(1024);
                for i in 0..1024u64 {
                    cache.insert(i, i);
                }
                cache
            },
            |mut cache| {
                for i in 0..1024u64 {
                    cache.insert(black_box(i % 16), i);
                }
            },
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

// ============================================================================
// Mixed Workload
// ============================================================================

fn bench_mixed_workload(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixed_workload");
    group.throughput(Throughput::Elements(OPS));

    // 80% reads over a shuffled hot set, 20% inserts from a cold stream.
    group.bench_function("read_heavy_shuffled", |b| {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut hot: Vec<u64> = (0..CAPACITY as u64 / 2).collect();
        hot.shuffle(&mut rng);
        let plan: Vec<(bool, u64)> = (0..OPS)
            .map(|i| {
                if rng.gen_range(0..10) < 8 {
                    (true, hot[(i as usize) % hot.len()])
                } else {
                    (false, 1_000_000 + i)
                }
            })
            .collect();

        b.iter_custom(|iters| {
            let mut cache: TinyLfuCore<u64, u64> = TinyLfuCore::new(CAPACITY);
            for &key in &hot {
                cache.insert(key, key);
            }

            let start = Instant::now();
            for _ in 0..iters {
                for &(is_read, key) in &plan {
                    if is_read {
                        black_box(cache.get(&key));
                    } else {
                        cache.insert(key, key);
                    }
                }
            }
            start.elapsed()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_get_hit, bench_insert, bench_mixed_workload);
criterion_main!(benches);
