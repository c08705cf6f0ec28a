//! Benchmarks for snapshottable lists:
//! - writer operations, snapshot capture, block search
//! - DeferredGuard vs EpochGuard reclamation
//!
//! Run with: cargo bench --package stampede-crossbeam --bench snapshot_benchmark

use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::black_box;
use criterion::criterion_group;
use criterion::criterion_main;
use mimalloc::MiMalloc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use stampede_core::{DeferredGuard, Guard, ScanDirection, SnapshottableList};
use stampede_crossbeam::EpochGuard;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const SIZES: [usize; 3] = [64, 1_024, 16_384];

// ============================================================================
// Generic helpers
// ============================================================================

fn filled<G: Guard>(len: usize) -> SnapshottableList<G> {
    let list = SnapshottableList::new(len, -1);
    let values: Vec<i64> = (0..len as i64).collect();
    list.extend_from_slice(&values).unwrap();
    list
}

fn bench_push<G: Guard>(count: usize) {
    let list = SnapshottableList::<G>::new(16, -1);
    for i in 0..count {
        list.push(i as i64).unwrap();
    }
    black_box(list.len());
}

/// Snapshot capture while a writer keeps the stamp moving.
fn bench_contended_snapshots<G: Guard + 'static>(len: usize, snapshots: usize) {
    let list = Arc::new(filled::<G>(len));
    let stop = Arc::new(AtomicBool::new(false));

    let writer = {
        let list = Arc::clone(&list);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            let mut i = 0usize;
            while !stop.load(Ordering::Relaxed) {
                list.set(i % len, i as i64).unwrap();
                i += 1;
                std::hint::spin_loop();
            }
        })
    };

    let mut reader = list.reader();
    for _ in 0..snapshots {
        black_box(reader.snapshot().len());
    }

    stop.store(true, Ordering::Relaxed);
    writer.join().unwrap();
}

// ============================================================================
// Benchmarks
// ============================================================================

fn writer_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("writer");

    group.bench_function("push_10000_deferred", |b| {
        b.iter(|| bench_push::<DeferredGuard>(10_000))
    });
    group.bench_function("push_10000_epoch", |b| {
        b.iter(|| bench_push::<EpochGuard>(10_000))
    });

    let list = filled::<DeferredGuard>(1_024);
    group.bench_function("insert_front_1024", |b| {
        b.iter(|| {
            list.insert(0, 1).unwrap();
            list.set_logical_size(1_024).unwrap();
        })
    });

    group.finish();
}

fn snapshot_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");

    for len in SIZES {
        let list = filled::<DeferredGuard>(len);
        let mut reader = list.reader();
        group.bench_with_input(BenchmarkId::new("cached", len), &len, |b, _| {
            b.iter(|| black_box(reader.snapshot().len()))
        });

        let mut reader = list.reader();
        group.bench_with_input(BenchmarkId::new("after_write", len), &len, |b, _| {
            b.iter(|| {
                list.set(0, 1).unwrap();
                black_box(reader.snapshot().len())
            })
        });

        group.bench_with_input(BenchmarkId::new("to_snapshot", len), &len, |b, _| {
            b.iter(|| black_box(list.to_snapshot().len()))
        });
    }

    group.sample_size(20);
    group.bench_function("contended_1024_deferred", |b| {
        b.iter(|| bench_contended_snapshots::<DeferredGuard>(1_024, 100))
    });
    group.bench_function("contended_1024_epoch", |b| {
        b.iter(|| bench_contended_snapshots::<EpochGuard>(1_024, 100))
    });

    group.finish();
}

fn block_search_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("binary_search_block");

    for len in SIZES {
        let list = filled::<DeferredGuard>(len);
        let snapshot = list.to_snapshot();
        let needle = (len / 3) as i64 & !1;

        group.bench_with_input(BenchmarkId::new("list_shl1", len), &len, |b, _| {
            b.iter(|| list.binary_search_block(0, 1, black_box(needle), ScanDirection::Up))
        });
        group.bench_with_input(BenchmarkId::new("snapshot_shl1", len), &len, |b, _| {
            b.iter(|| snapshot.binary_search_block(0, 1, black_box(needle), ScanDirection::Down))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    writer_benchmark,
    snapshot_benchmark,
    block_search_benchmark
);
criterion_main!(benches);
