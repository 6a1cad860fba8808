use std::f32::consts::TAU;

use rand::{rngs::StdRng, Rng, SeedableRng};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Excitation waveforms.
///
/// Saw and square use a PolyBLEP correction at each discontinuity, which
/// removes most of the aliasing a naive ramp produces. Noise comes from a
/// seeded generator so a render is reproducible.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    Sine,
    Saw,
    Square,
    Triangle,
    #[default]
    Noise,
}

/// Two-sample polynomial band-limited step residual.
#[inline]
fn poly_blep(t: f32, dt: f32) -> f32 {
    if t < dt {
        let t = t / dt;
        t + t - t * t - 1.0
    } else if t > 1.0 - dt {
        let t = (t - 1.0) / dt;
        t * t + t + t + 1.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone)]
pub struct Oscillator {
    waveform: Waveform,
    phase: f32,
    frequency: f32,
    sample_rate: f32,
    seed: u64,
    rng: StdRng,
}

impl Oscillator {
    pub fn new(waveform: Waveform, sample_rate: f32, seed: u64) -> Self {
        Self {
            waveform,
            phase: 0.0,
            frequency: 440.0,
            sample_rate,
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency.clamp(0.0, 0.5 * self.sample_rate);
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.set_frequency(self.frequency);
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let dt = self.frequency / self.sample_rate;
        let t = self.phase;

        let out = match self.waveform {
            Waveform::Sine => (TAU * t).sin(),
            Waveform::Saw => (2.0 * t - 1.0) - poly_blep(t, dt),
            Waveform::Square => {
                let naive = if t < 0.5 { 1.0 } else { -1.0 };
                naive + poly_blep(t, dt) - poly_blep((t + 0.5).fract(), dt)
            }
            Waveform::Triangle => 1.0 - 4.0 * (t - 0.5).abs(),
            Waveform::Noise => self.rng.gen_range(-1.0..=1.0),
        };

        self.phase += dt;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        out
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample();
        }
    }

    /// Restart the phase at zero.
    pub fn retrigger(&mut self) {
        self.phase = 0.0;
    }

    /// Restart phase and reseed noise, so the next render repeats the first.
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.rng = StdRng::seed_from_u64(self.seed);
    }
}
