//! Benchmarks for DSP primitives and the full engine.
//!
//! Run with: cargo bench
//!
//! Reference timing at 48kHz sample rate:
//!   - 64 samples  = 1.33ms deadline
//!   - 128 samples = 2.67ms deadline
//!   - 256 samples = 5.33ms deadline
//!   - 512 samples = 10.67ms deadline
//!
//! Benchmark groups:
//!   - dsp/*        Nodes on their own (filter, resonator bank, spectral mask, etc.)
//!   - scenarios/*  The engine pipeline with voices and a live field

use criterion::{criterion_group, criterion_main};

mod dsp;
mod scenarios;

/// Common buffer sizes used in audio applications.
pub const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

pub const SAMPLE_RATE: f32 = 48_000.0;

criterion_group!(
    benches,
    // Nodes
    dsp::bench_smoother,
    dsp::bench_filter,
    dsp::bench_resonator,
    dsp::bench_spectral,
    dsp::bench_oversample,
    dsp::bench_field,
    // Full pipeline
    scenarios::bench_engine,
);
criterion_main!(benches);
