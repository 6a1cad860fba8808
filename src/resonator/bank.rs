use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    dsp::{
        mix::pan_gains,
        resonator::{clamp_decay, clamp_frequency, Resonator, ResonatorCoeffs},
    },
    error::{Error, Result},
    freq_to_midi,
    graph::node::{Effect, StereoEffect},
    midi_to_freq,
    params::Smoother,
    resonator::tuning::{PitchLayout, Scale},
};

/*
Resonator Bank
==============

                    ┌→ [res 0] ─ gain, pan ─┐
  excitation ──────┼→ [res 1] ─ gain, pan ─┼──→ (Σ) ──→ left / right
                    └→ [res N] ─ gain, pan ─┘

Every slot is allocated up front (`capacity`), and only the first
`active_count` run. Pitches live in MIDI-note space: a linear glide there is
an exponential glide in Hz, which is what a pitch sweep should sound like.

Control rate
------------
Coefficient updates cost a sin, a cos and an exp. Instead of paying that per
sample, the bank advances its pitch/decay smoothers in steps of
CONTROL_INTERVAL samples and recomputes coefficients only at those
boundaries, and only for slots whose smoothers are still moving. Between
boundaries the committed coefficients are read-only.

Stereo
------
The bank is linked-stereo: one set of resonators is excited by the mid of
both inputs and each resonator's output is placed with an equal-power pan
law. The sum is scaled by 1/√N so density changes don't change loudness much.
*/

pub const MAX_RESONATORS: usize = 64;
/// Samples between coefficient refreshes.
pub const CONTROL_INTERVAL: usize = 32;

const PITCH_GLIDE: f32 = 0.05;
const DECAY_GLIDE: f32 = 0.05;

/// Explicit tuning for one slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResonatorSettings {
    pub freq_hz: f32,
    /// Seconds to decay by 60 dB.
    pub decay: f32,
    pub gain: f32,
    /// 0 = hard left, 0.5 = centre, 1 = hard right.
    pub pan: f32,
}

pub struct ResonatorBank {
    resonators: Vec<Resonator>,
    pitch: Vec<Smoother>,
    decay: Vec<Smoother>,
    gain: Vec<f32>,
    pan: Vec<f32>,
    pan_gain: Vec<(f32, f32)>,
    pan_offsets: Vec<f32>,
    pan_width: f32,
    positions: Vec<f32>,

    active: usize,
    norm: f32,
    layout: PitchLayout,
    sample_rate: f32,
    countdown: usize,
    rng: StdRng,
}

impl ResonatorBank {
    /// Allocates `capacity` slots. `seed` drives pitch and pan randomisation.
    pub fn new(capacity: usize, sample_rate: f32, seed: u64) -> Result<Self> {
        if capacity == 0 || capacity > MAX_RESONATORS {
            return Err(Error::CapacityExceeded {
                what: "resonator bank",
                requested: capacity,
                capacity: MAX_RESONATORS,
            });
        }
        crate::error::check_sample_rate(sample_rate)?;

        let mut bank = Self {
            resonators: vec![Resonator::default(); capacity],
            pitch: vec![Smoother::linear(69.0, PITCH_GLIDE, sample_rate); capacity],
            decay: vec![Smoother::linear(1.0, DECAY_GLIDE, sample_rate); capacity],
            gain: vec![1.0; capacity],
            pan: vec![0.5; capacity],
            pan_gain: vec![pan_gains(0.5); capacity],
            pan_offsets: vec![0.0; capacity],
            pan_width: 0.0,
            positions: vec![0.5; capacity],

            active: capacity,
            norm: 1.0 / (capacity as f32).sqrt(),
            layout: PitchLayout::default(),
            sample_rate,
            countdown: 0,
            rng: StdRng::seed_from_u64(seed),
        };

        bank.randomise_pitches();
        bank.randomise_pans(0.0);
        bank.snap();
        Ok(bank)
    }

    pub fn capacity(&self) -> usize {
        self.resonators.len()
    }

    pub fn active_count(&self) -> usize {
        self.active
    }

    /// Rejected (not truncated) when above capacity.
    pub fn set_active_count(&mut self, count: usize) -> Result<()> {
        if count > self.capacity() {
            return Err(Error::CapacityExceeded {
                what: "active resonators",
                requested: count,
                capacity: self.capacity(),
            });
        }
        // Glides freeze while a slot is inactive, so newly enabled slots land
        // on their targets and start silent.
        for i in self.active.min(count)..count {
            self.pitch[i].snap();
            self.decay[i].snap();
            let coeffs = self.coeffs_for(i);
            self.resonators[i].reset();
            self.resonators[i].set_coeffs(coeffs);
        }
        self.active = count;
        self.norm = 1.0 / (count.max(1) as f32).sqrt();
        Ok(())
    }

    pub fn set_resonator(&mut self, index: usize, settings: ResonatorSettings) -> Result<()> {
        if index >= self.capacity() {
            return Err(Error::IndexOutOfRange {
                what: "resonator",
                index,
                len: self.capacity(),
            });
        }
        let freq = clamp_frequency(settings.freq_hz, self.sample_rate);
        self.pitch[index].set_target(freq_to_midi(freq));
        self.decay[index].set_target(clamp_decay(settings.decay));
        self.gain[index] = if settings.gain.is_finite() { settings.gain.clamp(0.0, 4.0) } else { 0.0 };
        self.set_pan(index, settings.pan);
        Ok(())
    }

    /// Current (smoothed) tuning of a slot.
    pub fn resonator(&self, index: usize) -> Option<ResonatorSettings> {
        (index < self.capacity()).then(|| ResonatorSettings {
            freq_hz: midi_to_freq(self.pitch[index].value()),
            decay: self.decay[index].value(),
            gain: self.gain[index],
            pan: self.pan[index],
        })
    }

    fn set_pan(&mut self, index: usize, pan: f32) {
        let pan = if pan.is_finite() { pan.clamp(0.0, 1.0) } else { 0.5 };
        self.pan[index] = pan;
        self.pan_gain[index] = pan_gains(pan);
    }

    /// Ring time (T60 seconds) for every slot.
    pub fn set_decay(&mut self, decay: f32) {
        let decay = clamp_decay(decay);
        for smoother in &mut self.decay {
            smoother.set_target(decay);
        }
    }

    pub fn set_decay_with_time(&mut self, decay: f32, seconds: f32) {
        let decay = clamp_decay(decay);
        for smoother in &mut self.decay {
            smoother.set_target_with_time(decay, seconds);
        }
    }

    pub fn layout(&self) -> &PitchLayout {
        &self.layout
    }

    /// Retune every slot from its stored position under a new layout.
    pub fn set_layout(&mut self, layout: PitchLayout) {
        self.layout = layout;
        self.apply_layout();
    }

    pub fn set_spread(&mut self, spread: f32) {
        self.layout.spread = spread.clamp(0.0, 1.0);
        self.apply_layout();
    }

    pub fn set_shift(&mut self, semitones: f32) {
        self.layout.shift = semitones.clamp(-48.0, 48.0);
        self.apply_layout();
    }

    pub fn set_inharm(&mut self, inharm: f32) {
        self.layout.inharm = inharm.clamp(0.0, 1.0);
        self.apply_layout();
    }

    pub fn set_scale(&mut self, scale: Scale, root: f32, quantise: bool) {
        self.layout.scale = scale;
        self.layout.root = root;
        self.layout.quantise = quantise;
        self.apply_layout();
    }

    fn apply_layout(&mut self) {
        for (smoother, &position) in self.pitch.iter_mut().zip(self.positions.iter()) {
            let note = self.layout.pitch_for(position);
            let freq = clamp_frequency(midi_to_freq(note), self.sample_rate);
            smoother.set_target(freq_to_midi(freq));
        }
    }

    /// Draw new positions for every slot from the seeded generator.
    /// Control rate only.
    pub fn randomise_pitches(&mut self) {
        for position in &mut self.positions {
            *position = self.rng.gen::<f32>();
        }
        self.apply_layout();
    }

    /// Draw a new random pan direction for every slot, then spread them by
    /// `width`.
    pub fn randomise_pans(&mut self, width: f32) {
        for offset in &mut self.pan_offsets {
            *offset = self.rng.gen_range(-0.5..=0.5);
        }
        self.set_pan_width(width);
    }

    /// Scale the stored pan directions: 0 keeps every slot centred, 1 uses
    /// the full stereo field.
    pub fn set_pan_width(&mut self, width: f32) {
        self.pan_width = if width.is_finite() { width.clamp(0.0, 1.0) } else { 0.0 };
        for index in 0..self.capacity() {
            let pan = 0.5 + self.pan_offsets[index] * self.pan_width;
            self.set_pan(index, pan);
        }
    }

    /// Finish all glides and commit coefficients immediately.
    pub fn snap(&mut self) {
        for i in 0..self.capacity() {
            self.pitch[i].snap();
            self.decay[i].snap();
            let coeffs = self.coeffs_for(i);
            self.resonators[i].set_coeffs(coeffs);
        }
        self.countdown = 0;
    }

    fn coeffs_for(&self, index: usize) -> ResonatorCoeffs {
        ResonatorCoeffs::from_freq_decay(
            midi_to_freq(self.pitch[index].value()),
            self.decay[index].value(),
            self.sample_rate,
        )
    }

    #[inline]
    fn refresh_coefficients(&mut self) {
        if self.countdown > 0 {
            self.countdown -= 1;
            return;
        }
        self.countdown = CONTROL_INTERVAL - 1;

        for i in 0..self.active {
            let pitch = &mut self.pitch[i];
            let decay = &mut self.decay[i];
            if !(pitch.is_active() || decay.is_active()) {
                continue;
            }
            let note = pitch.skip(CONTROL_INTERVAL);
            let t60 = decay.skip(CONTROL_INTERVAL);
            self.resonators[i].set_coeffs(ResonatorCoeffs::from_freq_decay(
                midi_to_freq(note),
                t60,
                self.sample_rate,
            ));
        }
    }

    /// One excitation sample in, one panned stereo sample out.
    #[inline]
    pub fn process_sample(&mut self, input: f32) -> (f32, f32) {
        self.refresh_coefficients();

        let (mut left, mut right) = (0.0, 0.0);
        for i in 0..self.active {
            let y = self.resonators[i].process(input) * self.gain[i];
            let (gl, gr) = self.pan_gain[i];
            left += y * gl;
            right += y * gr;
        }
        (left * self.norm, right * self.norm)
    }
}

/// Mono: the unpanned sum of all active resonators.
impl Effect for ResonatorBank {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        self.refresh_coefficients();

        let mut out = 0.0;
        for i in 0..self.active {
            out += self.resonators[i].process(input) * self.gain[i];
        }
        out * self.norm
    }

    fn reset(&mut self) {
        for res in &mut self.resonators {
            res.reset();
        }
        self.snap();
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        for i in 0..self.capacity() {
            self.pitch[i].set_sample_rate(sample_rate);
            self.decay[i].set_sample_rate(sample_rate);
        }
        self.snap();
    }
}

/// Linked: excited by the mid signal, panned into both channels.
impl StereoEffect for ResonatorBank {
    fn process_stereo(&mut self, left: &mut [f32], right: &mut [f32]) {
        debug_assert_eq!(left.len(), right.len());
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let (out_l, out_r) = self.process_sample(0.5 * (*l + *r));
            *l = out_l;
            *r = out_r;
        }
    }

    fn reset(&mut self) {
        Effect::reset(self);
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        Effect::set_sample_rate(self, sample_rate);
    }
}
