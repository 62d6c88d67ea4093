// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for allocation descent and release coalescing.

use buddy_arena::BuddyArena;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const ARENA_SIZE: usize = 1 << 20;

fn bench_alloc_free_single(c: &mut Criterion) {
    let mut group = c.benchmark_group("alloc_free_single");
    for request in [16usize, 4096, 256 * 1024] {
        group.bench_with_input(BenchmarkId::from_parameter(request), &request, |b, &request| {
            let mut arena = BuddyArena::new(ARENA_SIZE).unwrap();
            b.iter(|| {
                let a = arena.alloc(black_box(request)).unwrap();
                arena.free(a).unwrap();
            });
        });
    }
    group.finish();
}

fn bench_fill_and_drain(c: &mut Criterion) {
    c.bench_function("fill_and_drain_4k_blocks", |b| {
        b.iter(|| {
            let mut arena = BuddyArena::new(ARENA_SIZE).unwrap();
            let mut live = Vec::with_capacity(ARENA_SIZE / 4096);
            while let Ok(a) = arena.alloc(4096) {
                live.push(a);
            }
            for a in live.drain(..).rev() {
                arena.free(a).unwrap();
            }
            black_box(arena.node_count())
        });
    });
}

fn bench_fragmented_alloc(c: &mut Criterion) {
    // Every other 64-byte block occupied: each request must search.
    let mut arena = BuddyArena::new(64 * 1024).unwrap();
    let blocks: Vec<_> = (0..1024).map(|_| arena.alloc(64).unwrap()).collect();
    for a in blocks.into_iter().step_by(2) {
        arena.free(a).unwrap();
    }

    c.bench_function("fragmented_alloc_free_64", |b| {
        b.iter(|| {
            let a = arena.alloc(black_box(64)).unwrap();
            arena.free(a).unwrap();
        });
    });
}

criterion_group!(
    benches,
    bench_alloc_free_single,
    bench_fill_and_drain,
    bench_fragmented_alloc
);
criterion_main!(benches);
