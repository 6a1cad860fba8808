//! Distortion / Waveshaping
//!
//! Distortion adds harmonics by reshaping the waveform. The "drive" parameter
//! controls how aggressively the signal is pushed into the nonlinear region.
//!
//! # How Waveshaping Works
//!
//! A waveshaper applies a transfer function to each sample:
//!   output = f(input * drive + bias) - f(bias)
//!
//! A nonzero bias shifts the operating point so positive and negative half
//! cycles clip differently, which adds even harmonics. Subtracting `f(bias)`
//! keeps silence silent; the DC that remains on loud signals is left for a
//! downstream blocker.
//!
//! Every curve here generates harmonics above Nyquist when driven hard, which
//! is why the engine runs this stage inside an oversampler.
//!
//! # Curves
//!
//! Soft:     f(x) = x / (1 + |x|)       warm, gradual
//! Tanh:     f(x) = tanh(x)             smooth, tube-like
//! Hard:     f(x) = clamp(x, -1, 1)     buzzy, odd harmonics
//! Foldback: reflects at ±1             metallic, dense

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShaperCurve {
    #[default]
    Soft,
    Tanh,
    Hard,
    Foldback,
}

/// Soft clipping using x / (1 + |x|) transfer function.
#[inline]
pub fn soft_clip(x: f32) -> f32 {
    x / (1.0 + x.abs())
}

#[inline]
pub fn hard_clip(x: f32, threshold: f32) -> f32 {
    x.clamp(-threshold, threshold)
}

/// Foldback distortion - signal folds back when exceeding threshold.
///
/// Closed form of repeated reflection, so arbitrarily large inputs cost the
/// same as small ones.
#[inline]
pub fn foldback(x: f32, threshold: f32) -> f32 {
    if !x.is_finite() || threshold <= 0.0 {
        return 0.0;
    }
    if x.abs() <= threshold {
        return x;
    }
    let period = 4.0 * threshold;
    let phase = (x + threshold).rem_euclid(period);
    if phase < 2.0 * threshold {
        phase - threshold
    } else {
        3.0 * threshold - phase
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Waveshaper {
    pub curve: ShaperCurve,
    drive: f32,
    bias: f32,
    offset: f32,
}

impl Waveshaper {
    pub const MAX_DRIVE: f32 = 100.0;

    pub fn new(curve: ShaperCurve) -> Self {
        let mut shaper = Self {
            curve,
            drive: 1.0,
            bias: 0.0,
            offset: 0.0,
        };
        shaper.update_offset();
        shaper
    }

    #[inline]
    fn shape(&self, x: f32) -> f32 {
        match self.curve {
            ShaperCurve::Soft => soft_clip(x),
            ShaperCurve::Tanh => x.tanh(),
            ShaperCurve::Hard => hard_clip(x, 1.0),
            ShaperCurve::Foldback => foldback(x, 1.0),
        }
    }

    fn update_offset(&mut self) {
        self.offset = self.shape(self.bias);
    }

    pub fn set_curve(&mut self, curve: ShaperCurve) {
        self.curve = curve;
        self.update_offset();
    }

    /// Linear input gain, clamped to `[1, MAX_DRIVE]`.
    pub fn set_drive(&mut self, drive: f32) {
        self.drive = drive.clamp(1.0, Self::MAX_DRIVE);
    }

    /// Asymmetry in `[-0.5, 0.5]`.
    pub fn set_bias(&mut self, bias: f32) {
        self.bias = bias.clamp(-0.5, 0.5);
        self.update_offset();
    }

    pub fn drive(&self) -> f32 {
        self.drive
    }

    #[inline]
    pub fn process(&self, sample: f32) -> f32 {
        self.shape(sample * self.drive + self.bias) - self.offset
    }

    pub fn render(&self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }
}
