//! Benchmarks for parameter smoothing.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_fx::params::Smoother;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_smoother(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/smoother");

    for &size in BLOCK_SIZES {
        let mut out = vec![0.0f32; size];

        let mut linear = Smoother::linear(0.0, 10.0, SAMPLE_RATE);
        let mut flip = false;
        group.bench_with_input(BenchmarkId::new("linear", size), &size, |b, _| {
            b.iter(|| {
                if !linear.is_active() {
                    flip = !flip;
                    linear.set_target(if flip { 1.0 } else { 0.0 });
                }
                linear.fill(black_box(&mut out));
            })
        });

        let mut exponential = Smoother::exponential(20.0, 1.0, SAMPLE_RATE);
        exponential.set_target(20_000.0);
        group.bench_with_input(BenchmarkId::new("exponential", size), &size, |b, _| {
            b.iter(|| exponential.fill(black_box(&mut out)))
        });

        // Settled smoothers take the constant fill path
        let mut settled = Smoother::linear(0.5, 0.01, SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("settled", size), &size, |b, _| {
            b.iter(|| settled.fill(black_box(&mut out)))
        });
    }

    group.finish();
}
