#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::engine::params::ParamId;

/// A parameter change from the control side.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamMessage {
    pub id: ParamId,
    pub value: f32,
    /// Glide time in seconds for this change only; `None` uses the
    /// parameter's own smoothing time.
    pub transition: Option<f32>,
}

impl ParamMessage {
    pub fn new(id: ParamId, value: f32) -> Self {
        Self {
            id,
            value,
            transition: None,
        }
    }

    pub fn with_transition(mut self, seconds: f32) -> Self {
        self.transition = Some(seconds);
        self
    }
}

/// Already-decoded note events, delivered to the audio thread through a
/// wait-free queue and applied at the start of the next block.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum EngineEvent {
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8 },
    AllNotesOff,
    /// Clear every delay line, filter memory and FFT buffer.
    Reset,
}

/// Conditions the audio thread reports back without blocking.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum EngineReport {
    /// A render call took longer than the audio it produced.
    Overrun { frames: usize, elapsed_us: u32, budget_us: u32 },
    /// A note-on arrived with every voice busy and none releasing.
    VoiceStarved { note: u8 },
    /// Reports lost because the queue was full when they happened.
    Dropped { count: u64 },
}
