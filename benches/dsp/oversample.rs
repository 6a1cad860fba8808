//! Benchmarks for oversampled drive.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_fx::{
    dsp::distortion::ShaperCurve,
    graph::{distortion::DriveNode, node::Effect, oversample::Oversampler},
};

use super::ramp;
use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_oversample(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oversample");

    for &size in BLOCK_SIZES {
        let input = ramp(size);
        let mut buffer = input.clone();

        for factor in [1, 2, 4, 8] {
            let mut drive = DriveNode::new(ShaperCurve::Tanh, SAMPLE_RATE);
            drive.set_drive_db(18.0);
            let mut node = Oversampler::new(drive, factor, SAMPLE_RATE).expect("factor");
            group.bench_with_input(BenchmarkId::new(format!("drive_x{factor}"), size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    node.process_block(black_box(&mut buffer));
                })
            });
        }
    }

    group.finish();
}
