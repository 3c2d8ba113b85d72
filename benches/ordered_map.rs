//! Benchmarks: OrderedMap vs ordermap::OrderMap vs std HashMap
//!
//! | Variant              | Removal                         | Order preserved |
//! |----------------------|---------------------------------|-----------------|
//! | `std::HashMap`       | O(1)                            | No              |
//! | `ordermap::OrderMap` | O(N) shift                      | Yes             |
//! | `OrderedMap`         | O(1) tombstone, amortized rebuild | Yes           |
//!
//! The churn benchmark is where the tombstone log should pull ahead of the
//! shifting `OrderMap`.

use std::collections::HashMap;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use ordered_collections::{CompactionPolicy, OrderedMap};

const N: usize = 10_000;

// ─── Insert ───────────────────────────────────────────────────────────────────

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("Map Insert (N=10k)");

    group.bench_function("std::HashMap", |b| {
        b.iter(|| {
            let mut m = HashMap::with_capacity(N);
            for i in 0..N {
                m.insert(black_box(i), black_box(i));
            }
            m
        })
    });

    group.bench_function("ordermap::OrderMap", |b| {
        b.iter(|| {
            let mut m = ordermap::OrderMap::with_capacity(N);
            for i in 0..N {
                m.insert(black_box(i), black_box(i));
            }
            m
        })
    });

    group.bench_function("OrderedMap", |b| {
        b.iter(|| {
            let mut m = OrderedMap::with_capacity(N);
            for i in 0..N {
                m.insert(black_box(i), black_box(i));
            }
            m
        })
    });

    group.finish();
}

// ─── Get ──────────────────────────────────────────────────────────────────────

fn bench_get(c: &mut Criterion) {
    let m_std: HashMap<usize, usize> = (0..N).map(|i| (i, i)).collect();
    let m_order: ordermap::OrderMap<usize, usize> = (0..N).map(|i| (i, i)).collect();
    let m_ours: OrderedMap<usize, usize> = (0..N).map(|i| (i, i)).collect();

    let mut group = c.benchmark_group("Map Get (N=10k, all-hit)");

    group.bench_function("std::HashMap", |b| {
        b.iter(|| {
            for i in 0..N {
                black_box(m_std.get(&black_box(i)));
            }
        })
    });

    group.bench_function("ordermap::OrderMap", |b| {
        b.iter(|| {
            for i in 0..N {
                black_box(m_order.get(&black_box(i)));
            }
        })
    });

    group.bench_function("OrderedMap", |b| {
        b.iter(|| {
            for i in 0..N {
                black_box(m_ours.get(&black_box(i)));
            }
        })
    });

    group.finish();
}

// ─── Remove from the front (shift-heavy) ─────────────────────────────────────

fn bench_remove_front(c: &mut Criterion) {
    let mut group = c.benchmark_group("Map Remove Oldest (N=10k)");

    group.bench_function("ordermap::OrderMap", |b| {
        b.iter_batched(
            || (0..N).map(|i| (i, i)).collect::<ordermap::OrderMap<usize, usize>>(),
            |mut m| {
                for i in 0..N / 2 {
                    black_box(m.remove(&i));
                }
                m
            },
            criterion::BatchSize::LargeInput,
        )
    });

    group.bench_function("OrderedMap (DeadExceedsLive)", |b| {
        b.iter_batched(
            || (0..N).map(|i| (i, i)).collect::<OrderedMap<usize, usize>>(),
            |mut m| {
                for i in 0..N / 2 {
                    black_box(m.remove(&i));
                }
                m
            },
            criterion::BatchSize::LargeInput,
        )
    });

    group.bench_function("OrderedMap (Manual)", |b| {
        b.iter_batched(
            || {
                let mut m: OrderedMap<usize, usize> = (0..N).map(|i| (i, i)).collect();
                m.set_policy(CompactionPolicy::Manual);
                m
            },
            |mut m| {
                for i in 0..N / 2 {
                    black_box(m.remove(&i));
                }
                m
            },
            criterion::BatchSize::LargeInput,
        )
    });

    group.finish();
}

// ─── Churn: insert new, evict oldest ─────────────────────────────────────────

fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("Map Churn (window=1k, 10k ops)");
    const WINDOW: usize = 1_000;

    group.bench_function("ordermap::OrderMap", |b| {
        b.iter(|| {
            let mut m = ordermap::OrderMap::with_capacity(WINDOW + 1);
            for i in 0..N {
                m.insert(i, i);
                if m.len() > WINDOW {
                    let oldest = *m.first().map(|(k, _)| k).unwrap();
                    m.remove(&oldest);
                }
            }
            m
        })
    });

    group.bench_function("OrderedMap", |b| {
        b.iter(|| {
            let mut m = OrderedMap::with_capacity(WINDOW + 1);
            for i in 0..N {
                m.insert(i, i);
                if m.len() > WINDOW {
                    black_box(m.pop_first());
                }
            }
            m
        })
    });

    group.finish();
}

// ─── Iterate ──────────────────────────────────────────────────────────────────

fn bench_iterate_after_removals(c: &mut Criterion) {
    let mut m_order: ordermap::OrderMap<usize, usize> = (0..N).map(|i| (i, i)).collect();
    let mut m_ours: OrderedMap<usize, usize> = (0..N).map(|i| (i, i)).collect();
    m_ours.set_policy(CompactionPolicy::Manual);
    for i in (0..N).step_by(3) {
        m_order.remove(&i);
        m_ours.remove(&i);
    }

    let mut group = c.benchmark_group("Map Iterate (1/3 removed)");

    group.bench_function("ordermap::OrderMap", |b| {
        b.iter(|| m_order.values().copied().sum::<usize>())
    });

    group.bench_function("OrderedMap (tombstones)", |b| {
        b.iter(|| m_ours.values().copied().sum::<usize>())
    });

    let mut compacted = m_ours.clone();
    compacted.compact();
    group.bench_function("OrderedMap (compacted)", |b| {
        b.iter(|| compacted.values().copied().sum::<usize>())
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_insert,
    bench_get,
    bench_remove_front,
    bench_churn,
    bench_iterate_after_removals
);
criterion_main!(benches);
