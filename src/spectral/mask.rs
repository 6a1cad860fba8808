use crate::error::{Error, Result};

/// Largest per-bin gain a mask may hold (+12 dB).
pub const MAX_MASK_GAIN: f32 = 4.0;
/// Lowest frequency of the log-frequency layout.
pub const MASK_MIN_FREQ: f32 = 20.0;

/// Per-bin gains for one transform size (`fft_size / 2 + 1` bins).
///
/// Every value is clamped into `[0, MAX_MASK_GAIN]` on the way in; NaN
/// becomes 0. The length never changes after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralMask {
    gains: Vec<f32>,
}

#[inline]
fn clamp_gain(gain: f32) -> f32 {
    if gain.is_nan() {
        return 0.0;
    }
    gain.clamp(0.0, MAX_MASK_GAIN)
}

impl SpectralMask {
    /// Transparent (all ones) mask for `fft_size`.
    pub fn unity(fft_size: usize) -> Self {
        Self {
            gains: vec![1.0; fft_size / 2 + 1],
        }
    }

    pub fn len(&self) -> usize {
        self.gains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gains.is_empty()
    }

    pub fn gains(&self) -> &[f32] {
        &self.gains
    }

    pub fn gain(&self, bin: usize) -> f32 {
        self.gains.get(bin).copied().unwrap_or(0.0)
    }

    /// Copy `gains` in; the length must match exactly.
    pub fn copy_from(&mut self, gains: &[f32]) -> Result<()> {
        if gains.len() != self.gains.len() {
            return Err(Error::MaskLength {
                expected: self.gains.len(),
                actual: gains.len(),
            });
        }
        for (dst, &src) in self.gains.iter_mut().zip(gains) {
            *dst = clamp_gain(src);
        }
        Ok(())
    }

    pub fn set_bin(&mut self, bin: usize, gain: f32) -> Result<()> {
        let len = self.gains.len();
        let slot = self.gains.get_mut(bin).ok_or(Error::IndexOutOfRange {
            what: "mask bin",
            index: bin,
            len,
        })?;
        *slot = clamp_gain(gain);
        Ok(())
    }

    /// Fill every bin from `f(bin)`. Does not allocate.
    pub fn fill_with(&mut self, mut f: impl FnMut(usize) -> f32) {
        for (bin, gain) in self.gains.iter_mut().enumerate() {
            *gain = clamp_gain(f(bin));
        }
    }

    pub fn fill(&mut self, gain: f32) {
        let gain = clamp_gain(gain);
        self.gains.iter_mut().for_each(|g| *g = gain);
    }
}

/*
Log-frequency layout
====================

A field column is a vertical strip of cells. The top of the strip maps to
Nyquist and the bottom to MASK_MIN_FREQ, spaced logarithmically so each
octave gets the same number of cells:

    position(f) = ln(f / 20) / ln(nyquist / 20)      0 = 20 Hz, 1 = nyquist

Bins below 20 Hz (DC included) clamp to 0.
*/

/// Normalised log-frequency position of `bin` in [0, 1].
pub fn bin_position(bin: usize, fft_size: usize, sample_rate: f32) -> f32 {
    let nyquist = sample_rate * 0.5;
    if nyquist <= MASK_MIN_FREQ || fft_size == 0 {
        return 0.0;
    }
    let freq = bin as f32 * sample_rate / fft_size as f32;
    if freq <= MASK_MIN_FREQ {
        return 0.0;
    }
    ((freq / MASK_MIN_FREQ).ln() / (nyquist / MASK_MIN_FREQ).ln()).clamp(0.0, 1.0)
}
