#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Lowest pitch the bank lays out (MIDI note, ~26 Hz).
pub const NOTE_MIN: f32 = 20.0;
/// Highest pitch the bank lays out (MIDI note, ~13.3 kHz).
pub const NOTE_MAX: f32 = 128.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scale {
    #[default]
    Chromatic,
    Major,
    NaturalMinor,
    HarmonicMinor,
    Dorian,
    Lydian,
    PentatonicMajor,
    PentatonicMinor,
    WholeTone,
}

impl Scale {
    /// Semitone offsets from the root within one octave.
    pub fn intervals(&self) -> &'static [u8] {
        match self {
            Scale::Chromatic => &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
            Scale::Major => &[0, 2, 4, 5, 7, 9, 11],
            Scale::NaturalMinor => &[0, 2, 3, 5, 7, 8, 10],
            Scale::HarmonicMinor => &[0, 2, 3, 5, 7, 8, 11],
            Scale::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            Scale::Lydian => &[0, 2, 4, 6, 7, 9, 11],
            Scale::PentatonicMajor => &[0, 2, 4, 7, 9],
            Scale::PentatonicMinor => &[0, 3, 5, 7, 10],
            Scale::WholeTone => &[0, 2, 4, 6, 8, 10],
        }
    }

    /// Nearest scale degree to `note`, both in (fractional) MIDI notes.
    pub fn quantise(&self, note: f32, root: f32) -> f32 {
        let relative = note - root;
        let octave = (relative / 12.0).floor();
        let within = relative - octave * 12.0;

        // Include the next octave's root so notes just below it can snap up.
        let nearest = self
            .intervals()
            .iter()
            .map(|&i| i as f32)
            .chain(std::iter::once(12.0))
            .min_by(|a, b| (a - within).abs().total_cmp(&(b - within).abs()))
            .unwrap_or(0.0);

        root + octave * 12.0 + nearest
    }
}

/// How the bank spreads its resonators across the keyboard.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchLayout {
    /// 0 keeps every pitch within one octave, 1 spans nine octaves.
    pub spread: f32,
    /// Semitones added to every pitch.
    pub shift: f32,
    pub quantise: bool,
    pub scale: Scale,
    /// MIDI note the scale is built on.
    pub root: f32,
    /// Blend from the quantised pitch (0) back to the raw pitch (1).
    pub inharm: f32,
}

impl Default for PitchLayout {
    fn default() -> Self {
        Self {
            spread: 0.5,
            shift: 0.0,
            quantise: false,
            scale: Scale::default(),
            root: 69.0,
            inharm: 0.0,
        }
    }
}

impl PitchLayout {
    /// Note range `(low, high)` covered at the current spread.
    pub fn range(&self) -> (f32, f32) {
        let spread = self.spread.clamp(0.0, 1.0);
        let low = 66.0 + (NOTE_MIN - 66.0) * spread;
        let high = 78.0 + (NOTE_MAX - 78.0) * spread;
        (low, high)
    }

    /// Map a normalised position in [0, 1] to a MIDI note.
    pub fn pitch_for(&self, position: f32) -> f32 {
        let (low, high) = self.range();
        let raw = low + position.clamp(0.0, 1.0) * (high - low) + self.shift;

        if !self.quantise {
            return raw;
        }
        let quantised = self.scale.quantise(raw, self.root);
        let inharm = self.inharm.clamp(0.0, 1.0);
        quantised + (raw - quantised) * inharm
    }
}
