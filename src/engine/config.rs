#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::oscillator::Waveform,
    error::{check_sample_rate, Error, Result},
    graph::oversample::stages_for,
    resonator::MAX_RESONATORS,
    spectral::filter::check_fft_size,
    MAX_BLOCK_SIZE,
};

pub const MAX_VOICES: usize = 32;
/// Longest delay line the engine will allocate.
pub const MAX_DELAY_SECONDS: f32 = 10.0;
const MAX_QUEUE_CAPACITY: usize = 1 << 16;

/// Everything fixed when the engine is built. Changing any of it means
/// building a new engine.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f32,
    /// Frames per internal block; longer host buffers are split.
    pub max_block_size: usize,
    pub voices: usize,
    pub resonators: usize,
    pub fft_size: usize,
    /// 1, 2, 4 or 8.
    pub oversampling: usize,
    pub max_delay_seconds: f32,
    pub excitation: Waveform,
    /// Drives resonator pitch layout, pans and noise excitation.
    pub seed: u64,
    pub event_capacity: usize,
    pub report_capacity: usize,
    /// Time each host buffer and report overruns. Costs one monotonic clock
    /// read per buffer.
    pub report_overruns: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            max_block_size: 512,
            voices: 8,
            resonators: 16,
            fft_size: 1024,
            oversampling: 2,
            max_delay_seconds: 2.0,
            excitation: Waveform::Noise,
            seed: 1,
            event_capacity: 256,
            report_capacity: 64,
            report_overruns: true,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        check_sample_rate(self.sample_rate)?;
        if self.max_block_size == 0 || self.max_block_size > MAX_BLOCK_SIZE {
            return Err(Error::InvalidBlockSize {
                requested: self.max_block_size,
                max: MAX_BLOCK_SIZE,
            });
        }
        check_capacity("voices", self.voices, MAX_VOICES)?;
        check_capacity("resonators", self.resonators, MAX_RESONATORS)?;
        check_fft_size(self.fft_size)?;
        stages_for(self.oversampling)?;
        if !self.max_delay_seconds.is_finite() || self.max_delay_seconds <= 0.0 {
            return Err(Error::NonFiniteParameter("max_delay_seconds"));
        }
        if self.max_delay_seconds > MAX_DELAY_SECONDS {
            return Err(Error::CapacityExceeded {
                what: "delay seconds",
                requested: self.max_delay_seconds.ceil() as usize,
                capacity: MAX_DELAY_SECONDS as usize,
            });
        }
        check_capacity("event queue", self.event_capacity, MAX_QUEUE_CAPACITY)?;
        check_capacity("report queue", self.report_capacity, MAX_QUEUE_CAPACITY)?;
        Ok(())
    }
}

fn check_capacity(what: &'static str, requested: usize, capacity: usize) -> Result<()> {
    if requested == 0 || requested > capacity {
        return Err(Error::CapacityExceeded {
            what,
            requested,
            capacity,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn each_limit_is_enforced() {
        let base = EngineConfig::default();
        let cases = [
            EngineConfig { sample_rate: 0.0, ..base },
            EngineConfig { max_block_size: MAX_BLOCK_SIZE + 1, ..base },
            EngineConfig { voices: 0, ..base },
            EngineConfig { resonators: MAX_RESONATORS + 1, ..base },
            EngineConfig { fft_size: 1000, ..base },
            EngineConfig { oversampling: 3, ..base },
            EngineConfig { max_delay_seconds: f32::NAN, ..base },
            EngineConfig { max_delay_seconds: 60.0, ..base },
            EngineConfig { event_capacity: 0, ..base },
        ];
        for config in cases {
            assert!(config.validate().is_err(), "{:?} accepted", config);
        }
    }
}
