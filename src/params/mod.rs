//! Parameters that move smoothly and can be steered from another thread.
//!
//! A [`Smoother`] is the thread-confined interpolation state owned by one
//! effect. An [`AtomicParam`] is the shared, lock-free target slot written by
//! the control thread. [`SmoothedParam`] glues the two together on the audio
//! side: poll once per block, then advance per sample.

/// Lock-free target slot plus its audio-side reader.
pub mod atomic;
/// Linear and exponential value smoothing.
pub mod smoother;

pub use atomic::{AtomicParam, ParamUpdate, SmoothedParam};
pub use smoother::{Smoother, SmoothingCurve};

/// Static description of a parameter: legal range, default and how it glides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub min: f32,
    pub max: f32,
    pub default: f32,
    pub curve: SmoothingCurve,
    /// Seconds. Ramp length for linear, time constant for exponential.
    pub smoothing_time: f32,
}

impl ParamSpec {
    pub const fn new(name: &'static str, min: f32, max: f32, default: f32) -> Self {
        Self {
            name,
            min,
            max,
            default,
            curve: SmoothingCurve::Linear,
            smoothing_time: 0.02,
        }
    }

    pub const fn exponential(mut self, time_constant: f32) -> Self {
        self.curve = SmoothingCurve::Exponential;
        self.smoothing_time = time_constant;
        self
    }

    pub const fn linear(mut self, ramp_time: f32) -> Self {
        self.curve = SmoothingCurve::Linear;
        self.smoothing_time = ramp_time;
        self
    }

    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    pub fn smoother(&self, sample_rate: f32) -> Smoother {
        Smoother::new(self.default, self.curve, self.smoothing_time, sample_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_respects_bounds() {
        let spec = ParamSpec::new("gain", 0.0, 2.0, 1.0);
        assert_eq!(spec.clamp(-1.0), 0.0);
        assert_eq!(spec.clamp(3.0), 2.0);
        assert_eq!(spec.clamp(0.5), 0.5);
    }

    #[test]
    fn builders_switch_curve() {
        let spec = ParamSpec::new("cutoff", 20.0, 20_000.0, 1_000.0).exponential(0.05);
        assert_eq!(spec.curve, SmoothingCurve::Exponential);
        assert_eq!(spec.smoothing_time, 0.05);

        let spec = spec.linear(0.01);
        assert_eq!(spec.curve, SmoothingCurve::Linear);
    }
}
