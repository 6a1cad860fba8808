#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Parameter Smoothing
===================

A control value that jumps from one block to the next produces a step in the
signal it scales, and a step is heard as a click ("zipper noise"). A smoother
sits between the target a user asked for and the value the DSP actually uses,
and walks the latter toward the former one sample at a time.

  value
   1.0 ┤          ┌────────────  target
       │         ╱ ···········  exponential (fast start, long tail)
       │       ╱ ·
       │     ╱ ·                linear (constant slope, lands exactly)
       │   ╱·
   0.0 ┼──┘────────────────────→ samples
       set_target()

Linear
------
A fixed increment per sample, chosen so the ramp lands on the target after
`ceil(time * sample_rate)` samples:

    step = (target - current) / steps

Exponential
-----------
A one-pole lowpass on the value:

    current += (target - current) * (1 - exp(-1 / (tau * sample_rate)))

The coefficient is in (0, 1], so every step closes part of the gap and none
can cross the target. The tail is infinite in theory; in practice we snap to
the target once the gap is below a relative epsilon, or once the increment
underflows and stops moving `current` at all.

Retargeting mid-transition always starts from the current value, never from
the previous target, so there is no discontinuity.
*/

/// Relative distance at which a smoother snaps onto its target.
pub const SNAP_EPSILON: f32 = 1.0e-6;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmoothingCurve {
    Linear,
    Exponential,
}

#[derive(Debug, Clone)]
pub struct Smoother {
    current: f32,
    target: f32,
    curve: SmoothingCurve,
    time: f32,
    sample_rate: f32,

    // Linear transition bookkeeping
    step: f32,
    steps_remaining: u32,

    // Exponential coefficient for the running transition
    coeff: f32,
}

impl Smoother {
    pub fn new(initial: f32, curve: SmoothingCurve, time: f32, sample_rate: f32) -> Self {
        let time = time.max(0.0);
        let mut smoother = Self {
            current: initial,
            target: initial,
            curve,
            time,
            sample_rate,
            step: 0.0,
            steps_remaining: 0,
            coeff: 1.0,
        };
        smoother.coeff = smoother.exp_coeff(time);
        smoother
    }

    pub fn linear(initial: f32, ramp_time: f32, sample_rate: f32) -> Self {
        Self::new(initial, SmoothingCurve::Linear, ramp_time, sample_rate)
    }

    pub fn exponential(initial: f32, time_constant: f32, sample_rate: f32) -> Self {
        Self::new(initial, SmoothingCurve::Exponential, time_constant, sample_rate)
    }

    fn exp_coeff(&self, tau: f32) -> f32 {
        let samples = tau * self.sample_rate;
        if samples <= 1.0e-3 {
            1.0
        } else {
            1.0 - (-1.0 / samples).exp()
        }
    }

    /// Changing the sample rate keeps the value and target, only the
    /// per-sample coefficients are rebuilt.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        let target = self.target;
        self.set_target_with_time(target, self.time);
    }

    /// Default transition time used by [`Smoother::set_target`].
    pub fn set_time(&mut self, time: f32) {
        self.time = time.max(0.0);
    }

    pub fn set_target(&mut self, target: f32) {
        self.set_target_with_time(target, self.time);
    }

    /// Retarget from the current value using a one-off transition time.
    pub fn set_target_with_time(&mut self, target: f32, time: f32) {
        self.target = target;
        let time = time.max(0.0);

        match self.curve {
            SmoothingCurve::Linear => {
                let steps = (time * self.sample_rate).ceil();
                if steps < 1.0 || self.current == target {
                    self.current = target;
                    self.steps_remaining = 0;
                    self.step = 0.0;
                } else {
                    let steps = steps.min(u32::MAX as f32) as u32;
                    self.step = (target - self.current) / steps as f32;
                    self.steps_remaining = steps;
                }
            }
            SmoothingCurve::Exponential => {
                self.coeff = self.exp_coeff(time);
                if self.coeff >= 1.0 {
                    self.current = target;
                }
            }
        }
    }

    /// Jump straight to `value`, cancelling any transition.
    pub fn reset_to(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.steps_remaining = 0;
        self.step = 0.0;
    }

    /// Finish the running transition immediately.
    pub fn snap(&mut self) {
        let target = self.target;
        self.reset_to(target);
    }

    #[inline]
    fn snap_threshold(&self) -> f32 {
        SNAP_EPSILON * self.target.abs().max(1.0)
    }

    /// Advance by one sample and return the new value.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        if self.current == self.target {
            return self.current;
        }

        match self.curve {
            SmoothingCurve::Linear => {
                if self.steps_remaining <= 1 {
                    self.snap();
                } else {
                    let next = self.current + self.step;
                    // Past the target (or float drift onto it): land exactly.
                    if (self.target - next) * self.step <= 0.0 {
                        self.snap();
                    } else {
                        self.current = next;
                        self.steps_remaining -= 1;
                    }
                }
            }
            SmoothingCurve::Exponential => {
                let next = self.current + (self.target - self.current) * self.coeff;
                if next == self.current || (self.target - next).abs() <= self.snap_threshold() {
                    self.current = self.target;
                } else {
                    self.current = next;
                }
            }
        }

        self.current
    }

    /// Advance by `n` samples at once. Equivalent to `n` calls to `advance`.
    pub fn skip(&mut self, n: usize) -> f32 {
        if n == 0 || self.current == self.target {
            return self.current;
        }

        match self.curve {
            SmoothingCurve::Linear => {
                if n as u64 >= self.steps_remaining as u64 {
                    self.snap();
                } else {
                    self.current += self.step * n as f32;
                    self.steps_remaining -= n as u32;
                }
            }
            SmoothingCurve::Exponential => {
                let decay = (1.0 - self.coeff).powi(n.min(i32::MAX as usize) as i32);
                let next = self.target + (self.current - self.target) * decay;
                if (self.target - next).abs() <= self.snap_threshold() {
                    self.current = self.target;
                } else {
                    self.current = next;
                }
            }
        }

        self.current
    }

    /// Write one smoothed value per output sample.
    pub fn fill(&mut self, out: &mut [f32]) {
        if !self.is_active() {
            out.fill(self.current);
            return;
        }
        for value in out.iter_mut() {
            *value = self.advance();
        }
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.current
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.current != self.target
    }

    pub fn curve(&self) -> SmoothingCurve {
        self.curve
    }
}
