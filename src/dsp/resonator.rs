use std::f32::consts::TAU;

/*
Two-Pole Resonator
==================

    y[n] = b0·x[n] + a1·y[n-1] + a2·y[n-2]

    a1 = 2·r·cos θ      θ = 2π·f / fs
    a2 = -r²            r = 10^(-3 / (T60·fs))
    b0 = sin θ

The poles sit at r·e^(±jθ). The impulse response is r^n·sin((n+1)θ): a
sinusoid at f whose amplitude starts at (at most) 1 and falls by 60 dB after
T60 seconds. Stability only needs r < 1, so every setter clamps its inputs
before the radius is formed and the radius itself is capped at
1 - RADIUS_EPSILON.
*/

pub const MIN_FREQ_HZ: f32 = 20.0;
pub const MAX_FREQ_RATIO: f32 = 0.49;
/// Seconds for the ring to fall 60 dB.
pub const MIN_DECAY: f32 = 0.001;
pub const MAX_DECAY: f32 = 30.0;
pub const RADIUS_EPSILON: f32 = 1.0e-6;

/// ln(1000), the natural-log distance of a 60 dB drop.
const LN_1000: f32 = 6.907_755;

#[derive(Debug, Clone, Copy, Default)]
pub struct ResonatorCoeffs {
    pub b0: f32,
    pub a1: f32,
    pub a2: f32,
    pub radius: f32,
}

impl ResonatorCoeffs {
    /// Clamp `freq_hz` and `decay` into the stable range and derive the poles.
    pub fn from_freq_decay(freq_hz: f32, decay: f32, sample_rate: f32) -> Self {
        let freq_hz = clamp_frequency(freq_hz, sample_rate);
        let decay = clamp_decay(decay);

        let theta = TAU * freq_hz / sample_rate;
        let radius = (-LN_1000 / (decay * sample_rate))
            .exp()
            .min(1.0 - RADIUS_EPSILON);

        Self {
            b0: theta.sin(),
            a1: 2.0 * radius * theta.cos(),
            a2: -radius * radius,
            radius,
        }
    }
}

#[inline]
pub fn clamp_frequency(freq_hz: f32, sample_rate: f32) -> f32 {
    if !freq_hz.is_finite() {
        return MIN_FREQ_HZ;
    }
    freq_hz.clamp(MIN_FREQ_HZ, MAX_FREQ_RATIO * sample_rate)
}

#[inline]
pub fn clamp_decay(decay: f32) -> f32 {
    if !decay.is_finite() {
        return MIN_DECAY;
    }
    decay.clamp(MIN_DECAY, MAX_DECAY)
}

#[derive(Debug, Clone, Default)]
pub struct Resonator {
    coeffs: ResonatorCoeffs,
    y1: f32,
    y2: f32,
}

impl Resonator {
    pub fn new(freq_hz: f32, decay: f32, sample_rate: f32) -> Self {
        Self {
            coeffs: ResonatorCoeffs::from_freq_decay(freq_hz, decay, sample_rate),
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Swap in new coefficients; the filter memory carries over.
    pub fn set_coeffs(&mut self, coeffs: ResonatorCoeffs) {
        self.coeffs = coeffs;
    }

    pub fn tune(&mut self, freq_hz: f32, decay: f32, sample_rate: f32) {
        self.coeffs = ResonatorCoeffs::from_freq_decay(freq_hz, decay, sample_rate);
    }

    pub fn coeffs(&self) -> &ResonatorCoeffs {
        &self.coeffs
    }

    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        let c = &self.coeffs;
        let y = c.b0 * x + c.a1 * self.y1 + c.a2 * self.y2;
        self.y2 = self.y1;
        self.y1 = y;
        y
    }

    pub fn reset(&mut self) {
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}
