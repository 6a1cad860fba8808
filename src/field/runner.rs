use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    field::{
        buffer::{FieldPublisher, FieldReader},
        grid::{FieldGrid, MIN_FIELD_SIZE},
        rules::SmoothLifeRules,
    },
};

/// Highest tick rate the runner accepts (ticks per second).
pub const MAX_TICK_RATE: f32 = 240.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldConfig {
    pub width: usize,
    pub height: usize,
    /// Generations per second.
    pub tick_rate: f32,
    pub rules: SmoothLifeRules,
    pub seed: u64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 64,
            tick_rate: 30.0,
            rules: SmoothLifeRules::default(),
            seed: 0x5EED,
        }
    }
}

impl FieldConfig {
    pub fn validate(&self) -> Result<()> {
        if self.width < MIN_FIELD_SIZE || self.height < MIN_FIELD_SIZE {
            return Err(Error::InvalidFieldSize {
                width: self.width,
                height: self.height,
                min: MIN_FIELD_SIZE,
            });
        }
        if !(self.tick_rate.is_finite() && self.tick_rate > 0.0 && self.tick_rate <= MAX_TICK_RATE) {
            return Err(Error::InvalidRules("tick rate must be in (0, 240] Hz"));
        }
        self.rules.validate()
    }

    fn period(&self) -> Duration {
        Duration::from_secs_f32(1.0 / self.tick_rate)
    }
}

/// Steps a [`FieldGrid`] on its own thread and publishes every generation.
///
/// The simulation runs until [`stop`](Self::stop) or drop, at `tick_rate`
/// regardless of the audio block rate. A tick that overruns its period is
/// followed immediately by the next one; ticks are never skipped.
pub struct FieldRunner {
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
    reader: FieldReader,
}

impl FieldRunner {
    pub fn spawn(config: FieldConfig) -> Result<Self> {
        config.validate()?;

        let mut grid = FieldGrid::new(config.width, config.height, config.rules, config.seed)?;
        grid.randomise();

        let (mut publisher, reader) = FieldPublisher::new(config.width, config.height);
        publisher.publish(&grid);

        let running = Arc::new(AtomicBool::new(true));
        let thread = thread::Builder::new()
            .name("saavy-field".to_string())
            .spawn({
                let running = Arc::clone(&running);
                move || run(grid, publisher, running, config.period())
            })
            .map_err(|err| {
                tracing::error!(%err, "could not start field thread");
                Error::ThreadSpawn("field")
            })?;

        tracing::info!(
            width = config.width,
            height = config.height,
            tick_rate = config.tick_rate,
            "field runner started"
        );

        Ok(Self {
            running,
            thread: Some(thread),
            reader,
        })
    }

    pub fn reader(&self) -> FieldReader {
        self.reader.clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Signal the thread and wait for it to finish its current tick.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            thread.thread().unpark();
            if thread.join().is_err() {
                tracing::error!("field thread panicked");
            }
            tracing::info!(generation = self.reader.generation(), "field runner stopped");
        }
    }
}

impl Drop for FieldRunner {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(mut grid: FieldGrid, mut publisher: FieldPublisher, running: Arc<AtomicBool>, period: Duration) {
    let mut next_tick = Instant::now() + period;

    while running.load(Ordering::Acquire) {
        let now = Instant::now();
        if now < next_tick {
            // Woken early by stop() or spuriously; either way re-check the flag.
            thread::park_timeout(next_tick - now);
            continue;
        }

        grid.step();
        publisher.publish(&grid);

        next_tick += period;
        if next_tick < Instant::now() {
            tracing::debug!(generation = grid.generation(), "field tick overran its period");
            next_tick = Instant::now();
        }
    }
}
