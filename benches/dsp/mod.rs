//! Benchmarks for individual nodes.

mod field;
mod filter;
mod oversample;
mod resonator;
mod smoother;
mod spectral;

pub use field::bench_field;
pub use filter::bench_filter;
pub use oversample::bench_oversample;
pub use resonator::bench_resonator;
pub use smoother::bench_smoother;
pub use spectral::bench_spectral;

/// Sawtooth-like ramp, repeated per block.
pub fn ramp(size: usize) -> Vec<f32> {
    (0..size).map(|i| (i as f32 / size as f32) * 2.0 - 1.0).collect()
}
