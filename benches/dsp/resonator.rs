//! Benchmarks for the resonator bank at different voice counts.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_fx::{graph::node::StereoEffect, resonator::ResonatorBank};

use super::ramp;
use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_resonator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/resonator");

    for &size in BLOCK_SIZES {
        let input = ramp(size);
        let mut left = input.clone();
        let mut right = input.clone();

        for count in [8, 32, 64] {
            let mut bank = ResonatorBank::new(count, SAMPLE_RATE, 7).expect("bank");
            bank.set_decay(2.0);
            group.bench_with_input(BenchmarkId::new(format!("bank_{count}"), size), &size, |b, _| {
                b.iter(|| {
                    left.copy_from_slice(&input);
                    right.copy_from_slice(&input);
                    bank.process_stereo(black_box(&mut left), black_box(&mut right));
                })
            });
        }

        // Continuous retuning exercises the control-rate coefficient path
        let mut bank = ResonatorBank::new(32, SAMPLE_RATE, 7).expect("bank");
        let mut shift = 0.0;
        group.bench_with_input(BenchmarkId::new("bank_32_gliding", size), &size, |b, _| {
            b.iter(|| {
                shift = if shift > 12.0 { -12.0 } else { shift + 0.5 };
                bank.set_shift(shift);
                left.copy_from_slice(&input);
                right.copy_from_slice(&input);
                bank.process_stereo(black_box(&mut left), black_box(&mut right));
            })
        });
    }

    group.finish();
}
