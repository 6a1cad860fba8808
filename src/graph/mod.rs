//! Composable building blocks for constructing effect graphs.
//!
//! Everything that processes audio implements [`node::Effect`] (mono) or
//! [`node::StereoEffect`] (two channels, possibly linked). Wrapper nodes own
//! the effect they wrap and add one concern each: serial chaining, dry/wet
//! crossfading, oversampling, or a dual-mono stereo pair. The `extensions`
//! module adds fluent helpers so graphs read left to right.

/// Serial composition of two effects.
pub mod chain;
/// Delay nodes: mono feedback delay, stereo ping-pong, comb lines.
pub mod delay;
/// Crossfade between the input and an inner effect.
pub mod dry_wet;
/// Effect implementations for the compressor.
pub mod dynamics;
/// Biquad bands and the three-band tone stage.
pub mod eq;
/// ADSR envelope as a VCA effect.
pub mod envelope;
/// Fluent combinators (`.then()`, `.dry_wet()`, etc.).
pub mod extensions;
/// Smoothed state-variable filter node.
pub mod filter;
/// Drive stage with smoothed gain.
pub mod distortion;
/// Core traits shared by all effects.
pub mod node;
/// Oscillators as generator effects.
pub mod oscillator;
/// Run an effect at an integer multiple of the sample rate.
pub mod oversample;
/// Dual-mono stereo wrapper.
pub mod stereo;

pub use chain::Chain;
pub use dry_wet::DryWet;
pub use extensions::EffectExt;
pub use node::{Effect, StereoEffect};
pub use oversample::Oversampler;
pub use stereo::DualMono;
