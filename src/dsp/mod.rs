//! Low-level DSP primitives used by the higher level graph nodes.
//!
//! These components are allocation-free once constructed and realtime-safe,
//! so they can be embedded directly inside voices and effect nodes. Each one
//! stays focused on the signal-processing math; smoothing, parameter plumbing
//! and the [`Effect`](crate::graph::node::Effect) trait live in `graph`.

/// Fixed-capacity circular sample store.
pub mod ring_buffer;

/// Damped feedback comb filter.
pub mod comb;
/// Feed-forward compressor with soft knee.
pub mod compressor;
/// Fractional feedback delay line.
pub mod delay;
/// Waveshaping transfer curves.
pub mod distortion;
/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// State-variable and one-pole filters.
pub mod filter;
/// Crossfade and pan-law helpers.
pub mod mix;
/// Oscillator waveforms and noise sources.
pub mod oscillator;
/// Two-pole resonant filter.
pub mod resonator;

pub use envelope::EnvelopeState;
