//! Benchmarks for the state-variable filter, raw and smoothed.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_fx::dsp::filter::SVFilter;
use saavy_fx::graph::{filter::FilterNode, node::Effect};

use super::ramp;
use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        let input = ramp(size);

        let mut filter = SVFilter::lowpass(1000.0, SAMPLE_RATE);
        filter.set_resonance(0.5);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("svf_lowpass", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer));
            })
        });

        // Cutoff gliding the whole time, so coefficients refresh every interval
        let mut node = FilterNode::lowpass(200.0, SAMPLE_RATE).with_resonance(0.5);
        let mut buffer = input.clone();
        let mut blocks = 0usize;
        group.bench_with_input(BenchmarkId::new("node_sweeping", size), &size, |b, _| {
            b.iter(|| {
                if blocks % 64 == 0 {
                    let target = if blocks % 128 == 0 { 8_000.0 } else { 200.0 };
                    node.set_cutoff_with_time(target, 0.1);
                }
                blocks += 1;
                buffer.copy_from_slice(&input);
                node.process_block(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
