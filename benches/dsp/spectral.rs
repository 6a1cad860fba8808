//! Benchmarks for the STFT mask filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_fx::{graph::node::Effect, spectral::SpectralFilter};

use super::ramp;
use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_spectral(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/spectral");

    for &size in BLOCK_SIZES {
        let input = ramp(size);
        let mut buffer = input.clone();

        for fft_size in [512, 1024, 2048] {
            let mut filter = SpectralFilter::new(fft_size, SAMPLE_RATE).expect("fft size");
            filter.mask_mut().fill_with(|bin| if bin % 8 < 4 { 1.0 } else { 0.1 });
            group.bench_with_input(BenchmarkId::new(format!("fft_{fft_size}"), size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    filter.process_block(black_box(&mut buffer));
                })
            });
        }
    }

    group.finish();
}
