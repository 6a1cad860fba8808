//! Control-rate error values.
//!
//! Everything here is produced while configuring or steering the engine.
//! Audio-rate code never returns an error; its preconditions are enforced
//! by the setters that produce these values.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("sample rate must be finite and positive, got {0}")]
    InvalidSampleRate(f32),

    #[error("block size must be in 1..={max}, got {requested}")]
    InvalidBlockSize { requested: usize, max: usize },

    #[error("{what}: requested {requested} exceeds capacity {capacity}")]
    CapacityExceeded {
        what: &'static str,
        requested: usize,
        capacity: usize,
    },

    #[error("index {index} out of range for {what} (len {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("FFT size must be a power of two in {min}..={max}, got {size}")]
    InvalidFftSize { size: usize, min: usize, max: usize },

    #[error("oversampling factor must be 1, 2, 4 or 8, got {0}")]
    InvalidOversamplingFactor(usize),

    #[error("mask length {actual} does not match {expected} bins")]
    MaskLength { expected: usize, actual: usize },

    #[error("field must be at least {min}x{min} cells, got {width}x{height}")]
    InvalidFieldSize { width: usize, height: usize, min: usize },

    #[error("invalid SmoothLife rules: {0}")]
    InvalidRules(&'static str),

    #[error("parameter {0} received a non-finite value")]
    NonFiniteParameter(&'static str),

    #[error("{0} queue is full")]
    QueueFull(&'static str),

    #[error("failed to spawn {0} thread")]
    ThreadSpawn(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;

pub(crate) fn check_sample_rate(sample_rate: f32) -> Result<f32> {
    if sample_rate.is_finite() && sample_rate > 0.0 {
        Ok(sample_rate)
    } else {
        Err(Error::InvalidSampleRate(sample_rate))
    }
}
