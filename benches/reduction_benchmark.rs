#![allow(clippy::expect_used, clippy::unwrap_used, missing_docs)]
//! Benchmark for sum and argmin reductions.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trueno_acc::prelude::*;
use trueno_acc::utilities;

fn reduction_benchmark(c: &mut Criterion) {
    let stream = Stream::new().unwrap();
    let mut group = c.benchmark_group("reduction");

    for size in [1_000usize, 100_000, 1_000_000] {
        // Deterministic pseudo-random data
        let data: Vec<f32> = (0..size).map(|i| ((i * 7919) % 2003) as f32 - 1001.0).collect();
        let buffer = AccBuffer::from_slice(&data, &stream);

        group.bench_with_input(BenchmarkId::new("sum", size), &size, |b, _| {
            b.iter(|| utilities::get_sum_on_device(black_box(&buffer)).unwrap());
        });

        group.bench_with_input(BenchmarkId::new("arg_min", size), &size, |b, _| {
            b.iter(|| utilities::get_arg_min_on_device(black_box(&buffer)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, reduction_benchmark);
criterion_main!(benches);
