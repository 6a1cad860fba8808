pub mod dsp;
#[cfg(feature = "rtrb")]
pub mod engine; // Block pipeline and cross-thread control surface
pub mod error;
pub mod field; // Generative SmoothLife field
pub mod graph; // Effect trait and composable wrappers
pub mod params; // Smoothed, thread-safe parameters
pub mod resonator; // Resonant additive synthesis
pub mod spectral; // STFT masking

pub use error::{Error, Result};

#[cfg(feature = "rtrb")]
pub use engine::{AudioEngine, EngineConfig, EngineHandle};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;

/// Convert MIDI note number to frequency in Hz.
/// A4 = 440 Hz = MIDI note 69
#[inline]
pub fn midi_to_freq(note: f32) -> f32 {
    440.0 * 2.0_f32.powf((note - 69.0) / 12.0)
}

#[inline]
pub fn freq_to_midi(freq: f32) -> f32 {
    69.0 + 12.0 * (freq.max(f32::MIN_POSITIVE) / 440.0).log2()
}
