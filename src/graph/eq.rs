use crate::{
    dsp::filter::{Biquad, BiquadType},
    graph::node::Effect,
    params::Smoother,
};

/// Samples between coefficient updates while a band glides.
const COEFF_INTERVAL: usize = 16;

/// One biquad band with smoothed frequency and gain.
///
/// Frequency glides exponentially and gain linearly in dB. Coefficients are
/// refreshed every `COEFF_INTERVAL` samples while either is moving, once after
/// an instant change, and left alone otherwise.
#[derive(Debug, Clone)]
pub struct BiquadNode {
    filter: Biquad,
    freq: Smoother,
    gain_db: Smoother,
    countdown: usize,
    dirty: bool,
}

impl BiquadNode {
    pub fn new(filter: Biquad, sample_rate: f32) -> Self {
        Self {
            freq: Smoother::exponential(filter.frequency(), 0.02, sample_rate),
            gain_db: Smoother::linear(filter.gain_db(), 0.02, sample_rate),
            filter,
            countdown: 0,
            dirty: false,
        }
    }

    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.freq.set_target(freq_hz);
        self.dirty = true;
    }

    pub fn set_frequency_with_time(&mut self, freq_hz: f32, seconds: f32) {
        self.freq.set_target_with_time(freq_hz, seconds);
        self.dirty = true;
    }

    pub fn set_gain_db(&mut self, gain_db: f32) {
        self.gain_db.set_target(gain_db);
        self.dirty = true;
    }

    pub fn set_gain_db_with_time(&mut self, gain_db: f32, seconds: f32) {
        self.gain_db.set_target_with_time(gain_db, seconds);
        self.dirty = true;
    }

    pub fn filter(&self) -> &Biquad {
        &self.filter
    }

    #[inline]
    fn refresh(&mut self) {
        if self.countdown == 0 {
            if self.dirty || self.freq.is_active() || self.gain_db.is_active() {
                self.dirty = false;
                let freq = self.freq.skip(COEFF_INTERVAL);
                let gain_db = self.gain_db.skip(COEFF_INTERVAL);
                let q = self.filter.q();
                self.filter.set_params(freq, q, gain_db);
            }
            self.countdown = COEFF_INTERVAL;
        }
        self.countdown -= 1;
    }
}

impl Effect for BiquadNode {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        self.refresh();
        self.filter.process(input)
    }

    fn reset(&mut self) {
        self.filter.reset();
        self.freq.snap();
        self.gain_db.snap();
        let q = self.filter.q();
        self.filter.set_params(self.freq.value(), q, self.gain_db.value());
        self.countdown = 0;
        self.dirty = false;
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.filter.set_sample_rate(sample_rate);
        self.freq.set_sample_rate(sample_rate);
        self.gain_db.set_sample_rate(sample_rate);
    }
}

/*
Tone Stage
==========

  in → [ low cut ] → [ mid bell ] → [ high shelf ] → out
        12 dB/oct      ±dB, Q 0.9     ±dB above HIGH_SHELF_HZ

At its defaults (20 Hz cut, flat bell, flat shelf) the stage only removes
subsonic rumble.
*/

/// Three-band tone control that sits after the drive stage.
#[derive(Debug, Clone)]
pub struct ToneNode {
    low_cut: BiquadNode,
    mid: BiquadNode,
    high: BiquadNode,
}

impl ToneNode {
    pub const HIGH_SHELF_HZ: f32 = 6_000.0;
    const MID_Q: f32 = 0.9;

    pub fn new(sample_rate: f32) -> Self {
        Self {
            low_cut: BiquadNode::new(
                Biquad::highpass(20.0, std::f32::consts::FRAC_1_SQRT_2, sample_rate),
                sample_rate,
            ),
            mid: BiquadNode::new(Biquad::peak(1_000.0, Self::MID_Q, 0.0, sample_rate), sample_rate),
            high: BiquadNode::new(Biquad::high_shelf(Self::HIGH_SHELF_HZ, 0.0, sample_rate), sample_rate),
        }
    }

    pub fn low_cut_mut(&mut self) -> &mut BiquadNode {
        &mut self.low_cut
    }

    pub fn mid_mut(&mut self) -> &mut BiquadNode {
        &mut self.mid
    }

    pub fn high_mut(&mut self) -> &mut BiquadNode {
        &mut self.high
    }

    /// Combined linear magnitude of the three bands as currently set.
    pub fn magnitude_at(&self, freq_hz: f32) -> f32 {
        [&self.low_cut, &self.mid, &self.high]
            .iter()
            .map(|band| band.filter().magnitude_at(freq_hz))
            .product()
    }

    pub fn bands(&self) -> [BiquadType; 3] {
        [self.low_cut.filter().kind(), self.mid.filter().kind(), self.high.filter().kind()]
    }
}

impl Effect for ToneNode {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let x = self.low_cut.process(input);
        let x = self.mid.process(x);
        self.high.process(x)
    }

    fn reset(&mut self) {
        self.low_cut.reset();
        self.mid.reset();
        self.high.reset();
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.low_cut.set_sample_rate(sample_rate);
        self.mid.set_sample_rate(sample_rate);
        self.high.set_sample_rate(sample_rate);
    }
}
