//! The real-time engine: a fixed block pipeline on the audio thread and a
//! handle for everything else.
//!
//! [`AudioEngine`] owns the graph and must only be driven from the audio
//! callback. [`EngineHandle`] writes parameter targets into shared atomic
//! slots and sends note events over a wait-free SPSC queue; reports travel
//! back the same way.

pub mod audio;
pub mod config;
pub mod handle;
pub mod message;
pub mod params;
pub mod voice;

pub use audio::AudioEngine;
pub use config::EngineConfig;
pub use handle::EngineHandle;
pub use message::{EngineEvent, EngineReport, ParamMessage};
pub use params::{ParamBank, ParamId};
pub use voice::{Voice, VoicePool, VoiceState};
