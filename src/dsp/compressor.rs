use crate::MIN_TIME;

/*
Feed-forward Compressor
=======================

  input ──┬────────────────────────────────(×)──→ output
          │                                 ↑
          └→ |x| → dB → [gain computer] → [smooth] → dB → linear

Gain computer (soft knee of width W around threshold T, ratio R):

  gain reduction (dB)
     0 ┤────────╮
       │         ╲   knee: (1/R - 1) * (x - T + W/2)² / (2W)
       │          ╲
       │           ╲ above: (1/R - 1) * (x - T)
       └────────────────→ input level (dB)
             T-W/2  T+W/2

Smoothing happens on the gain reduction, not on the level: attack when the
reduction is deepening, release when it is recovering. Doing it in dB keeps
the release sounding even regardless of how far over threshold we were.

For stereo the detector is linked: both channels feed one detector (the
louder of the two) and receive the same gain, so the image doesn't shift.
*/

const MIN_DB: f32 = -120.0;

#[inline]
fn lin_to_db(x: f32) -> f32 {
    if x <= 1.0e-6 {
        MIN_DB
    } else {
        20.0 * x.log10()
    }
}

#[inline]
fn db_to_lin(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

#[derive(Debug, Clone)]
pub struct Compressor {
    threshold_db: f32,
    ratio: f32,
    knee_db: f32,
    makeup_db: f32,
    attack: f32,
    release: f32,
    sample_rate: f32,

    attack_coeff: f32,
    release_coeff: f32,
    reduction_db: f32, // current smoothed gain reduction, always <= 0
}

impl Compressor {
    pub fn new(sample_rate: f32) -> Self {
        let mut comp = Self {
            threshold_db: -12.0,
            ratio: 4.0,
            knee_db: 6.0,
            makeup_db: 0.0,
            attack: 0.005,
            release: 0.1,
            sample_rate,
            attack_coeff: 0.0,
            release_coeff: 0.0,
            reduction_db: 0.0,
        };
        comp.update_coefficients();
        comp
    }

    fn update_coefficients(&mut self) {
        self.attack_coeff = (-1.0 / (self.attack.max(MIN_TIME) * self.sample_rate)).exp();
        self.release_coeff = (-1.0 / (self.release.max(MIN_TIME) * self.sample_rate)).exp();
    }

    pub fn set_threshold_db(&mut self, threshold_db: f32) {
        self.threshold_db = threshold_db.clamp(-60.0, 0.0);
    }

    /// Ratio below 1 would expand; clamped to `[1, 50]`.
    pub fn set_ratio(&mut self, ratio: f32) {
        self.ratio = ratio.clamp(1.0, 50.0);
    }

    pub fn set_knee_db(&mut self, knee_db: f32) {
        self.knee_db = knee_db.clamp(0.0, 24.0);
    }

    pub fn set_makeup_db(&mut self, makeup_db: f32) {
        self.makeup_db = makeup_db.clamp(0.0, 24.0);
    }

    pub fn set_attack(&mut self, seconds: f32) {
        self.attack = seconds.clamp(0.0, 1.0);
        self.update_coefficients();
    }

    pub fn set_release(&mut self, seconds: f32) {
        self.release = seconds.clamp(0.0, 5.0);
        self.update_coefficients();
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.update_coefficients();
    }

    /// Static curve: gain reduction in dB (≤ 0) for an input level in dB.
    pub fn gain_computer(&self, level_db: f32) -> f32 {
        let slope = 1.0 / self.ratio - 1.0;
        let over = level_db - self.threshold_db;
        let half_knee = self.knee_db * 0.5;

        if self.knee_db > 0.0 && over.abs() <= half_knee {
            slope * (over + half_knee).powi(2) / (2.0 * self.knee_db)
        } else if over > 0.0 {
            slope * over
        } else {
            0.0
        }
    }

    /// Feed one detector sample and return the linear gain to apply.
    #[inline]
    pub fn next_gain(&mut self, detector: f32) -> f32 {
        let target = self.gain_computer(lin_to_db(detector.abs()));
        let coeff = if target < self.reduction_db {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.reduction_db = coeff * self.reduction_db + (1.0 - coeff) * target;
        db_to_lin(self.reduction_db + self.makeup_db)
    }

    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        sample * self.next_gain(sample)
    }

    /// Linked stereo: one detector, same gain on both channels.
    #[inline]
    pub fn process_pair(&mut self, left: f32, right: f32) -> (f32, f32) {
        let gain = self.next_gain(left.abs().max(right.abs()));
        (left * gain, right * gain)
    }

    /// Current gain reduction in dB.
    pub fn reduction_db(&self) -> f32 {
        self.reduction_db
    }

    pub fn reset(&mut self) {
        self.reduction_db = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_threshold_is_untouched() {
        let comp = Compressor::new(48_000.0);
        assert_eq!(comp.gain_computer(-40.0), 0.0);
    }

    #[test]
    fn above_knee_follows_ratio() {
        let mut comp = Compressor::new(48_000.0);
        comp.set_threshold_db(-20.0);
        comp.set_ratio(4.0);
        comp.set_knee_db(0.0);
        // 20 dB over at 4:1 leaves 5 dB over, i.e. 15 dB of reduction
        assert!((comp.gain_computer(0.0) + 15.0).abs() < 1e-4);
    }

    #[test]
    fn knee_is_continuous_at_both_edges() {
        let mut comp = Compressor::new(48_000.0);
        comp.set_threshold_db(-20.0);
        comp.set_knee_db(10.0);

        let lower = comp.gain_computer(-25.0);
        let upper = comp.gain_computer(-15.0);
        assert!(lower.abs() < 1e-5);
        assert!((upper - comp.gain_computer(-14.999)).abs() < 1e-2);
    }

    #[test]
    fn loud_signal_is_reduced_after_attack() {
        let mut comp = Compressor::new(48_000.0);
        comp.set_threshold_db(-20.0);
        comp.set_attack(0.001);

        let mut out = 0.0;
        for _ in 0..4_800 {
            out = comp.process(1.0);
        }
        assert!(out < 0.5, "expected gain reduction, got {}", out);
        assert!(comp.reduction_db() < -6.0);
    }

    #[test]
    fn linked_pair_applies_same_gain() {
        let mut comp = Compressor::new(48_000.0);
        comp.set_threshold_db(-30.0);
        let mut pair = (0.0, 0.0);
        for _ in 0..2_000 {
            pair = comp.process_pair(1.0, 0.25);
        }
        assert!((pair.0 / 1.0 - pair.1 / 0.25).abs() < 1e-5);
    }
}
