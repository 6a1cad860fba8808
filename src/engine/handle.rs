use std::sync::Arc;

use rtrb::{Consumer, Producer};

use crate::{
    engine::{
        message::{EngineEvent, EngineReport, ParamMessage},
        params::{ParamBank, ParamId},
    },
    error::{Error, Result},
};

/// Control-side surface of an [`AudioEngine`](crate::engine::AudioEngine).
///
/// Parameter writes go straight into lock-free atomic slots and are picked
/// up at the next block boundary. Note events travel through a wait-free
/// SPSC queue. Nothing here blocks, but it does need `&mut self` for the
/// queue ends, so share it behind your own synchronisation if several
/// threads need it.
pub struct EngineHandle {
    params: Arc<ParamBank>,
    events: Producer<EngineEvent>,
    reports: Consumer<EngineReport>,
}

impl EngineHandle {
    pub(crate) fn new(
        params: Arc<ParamBank>,
        events: Producer<EngineEvent>,
        reports: Consumer<EngineReport>,
    ) -> Self {
        Self {
            params,
            events,
            reports,
        }
    }

    /// Set a target. Returns the value stored after clamping to the range.
    pub fn set_param(&self, id: ParamId, value: f32) -> Result<f32> {
        self.params.get(id).set_target(value)
    }

    pub fn set_param_with_transition(&self, id: ParamId, value: f32, seconds: f32) -> Result<f32> {
        self.params
            .get(id)
            .set_target_with_transition(value, Some(seconds))
    }

    pub fn send(&self, message: ParamMessage) -> Result<f32> {
        self.params
            .get(message.id)
            .set_target_with_transition(message.value, message.transition)
    }

    /// Last target written (not the smoothed value the audio thread is at).
    pub fn param(&self, id: ParamId) -> f32 {
        self.params.get(id).target()
    }

    pub fn note_on(&mut self, note: u8, velocity: u8) -> Result<()> {
        self.push(EngineEvent::NoteOn { note, velocity })
    }

    pub fn note_off(&mut self, note: u8) -> Result<()> {
        self.push(EngineEvent::NoteOff { note })
    }

    pub fn all_notes_off(&mut self) -> Result<()> {
        self.push(EngineEvent::AllNotesOff)
    }

    /// Ask the audio thread to clear all DSP state at its next block.
    pub fn reset(&mut self) -> Result<()> {
        self.push(EngineEvent::Reset)
    }

    fn push(&mut self, event: EngineEvent) -> Result<()> {
        self.events.push(event).map_err(|_| {
            tracing::warn!(?event, "engine event queue full, event dropped");
            Error::QueueFull("engine event")
        })
    }

    /// Drain pending reports into `f`. Returns how many were handled.
    pub fn drain_reports(&mut self, mut f: impl FnMut(EngineReport)) -> usize {
        let mut count = 0;
        while let Ok(report) = self.reports.pop() {
            f(report);
            count += 1;
        }
        count
    }

    /// Drain pending reports into the log.
    pub fn poll_reports(&mut self) -> usize {
        self.drain_reports(|report| match report {
            EngineReport::Overrun {
                frames,
                elapsed_us,
                budget_us,
            } => tracing::warn!(frames, elapsed_us, budget_us, "audio render overran its budget"),
            EngineReport::VoiceStarved { note } => {
                tracing::debug!(note, "note dropped, no voice available")
            }
            EngineReport::Dropped { count } => {
                tracing::warn!(count, "engine reports lost, report queue was full")
            }
        })
    }
}
