//! A bank of tuned two-pole resonators with scale-aware pitch layout.

pub mod bank;
pub mod tuning;

pub use bank::{ResonatorBank, ResonatorSettings, CONTROL_INTERVAL, MAX_RESONATORS};
pub use tuning::{PitchLayout, Scale};
