use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use atomic_float::AtomicF32;

use crate::{
    error::{Error, Result},
    params::{ParamSpec, Smoother},
};

/// Sentinel stored in the transition slot when the default time applies.
const DEFAULT_TRANSITION: f32 = -1.0;

/// Shared target slot for one parameter.
///
/// Writers (any thread) store the clamped target and an optional transition
/// time, then bump `version` with `Release`. The audio thread loads `version`
/// with `Acquire` once per block and only touches the float slots when it
/// changed, so an idle parameter costs a single atomic load.
#[derive(Debug)]
pub struct AtomicParam {
    spec: ParamSpec,
    target: AtomicF32,
    transition: AtomicF32,
    version: AtomicU32,
}

impl AtomicParam {
    pub fn new(spec: ParamSpec) -> Self {
        Self {
            spec,
            target: AtomicF32::new(spec.default),
            transition: AtomicF32::new(DEFAULT_TRANSITION),
            version: AtomicU32::new(0),
        }
    }

    pub fn spec(&self) -> &ParamSpec {
        &self.spec
    }

    /// Store a new target. Returns the value actually stored after clamping.
    pub fn set_target(&self, value: f32) -> Result<f32> {
        self.set_target_with_transition(value, None)
    }

    pub fn set_target_with_transition(&self, value: f32, transition: Option<f32>) -> Result<f32> {
        if !value.is_finite() {
            return Err(Error::NonFiniteParameter(self.spec.name));
        }
        let transition = match transition {
            Some(t) if !t.is_finite() => return Err(Error::NonFiniteParameter(self.spec.name)),
            Some(t) => t.max(0.0),
            None => DEFAULT_TRANSITION,
        };

        let value = self.spec.clamp(value);
        self.target.store(value, Ordering::Relaxed);
        self.transition.store(transition, Ordering::Relaxed);
        self.version.fetch_add(1, Ordering::Release);
        Ok(value)
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target.load(Ordering::Acquire)
    }

    #[inline]
    pub fn version(&self) -> u32 {
        self.version.load(Ordering::Acquire)
    }

    #[inline]
    fn transition(&self) -> Option<f32> {
        let t = self.transition.load(Ordering::Relaxed);
        (t >= 0.0).then_some(t)
    }

    /// Return the latest write if `version` moved past `seen`, updating `seen`.
    ///
    /// Lets an effect that smooths internally consume targets without a
    /// [`SmoothedParam`] in between.
    #[inline]
    pub fn poll(&self, seen: &mut u32) -> Option<ParamUpdate> {
        let version = self.version();
        if version == *seen {
            return None;
        }
        *seen = version;
        Some(ParamUpdate {
            target: self.target(),
            transition: self.transition(),
        })
    }
}

/// A target picked up from an [`AtomicParam`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamUpdate {
    pub target: f32,
    /// One-off transition time in seconds, `None` for the parameter default.
    pub transition: Option<f32>,
}

impl ParamUpdate {
    pub fn apply(&self, smoother: &mut Smoother) {
        match self.transition {
            Some(time) => smoother.set_target_with_time(self.target, time),
            None => smoother.set_target(self.target),
        }
    }
}

/// Audio-side view of an [`AtomicParam`].
///
/// Owns the thread-confined [`Smoother`]; the shared slot only ever carries
/// targets.
#[derive(Debug)]
pub struct SmoothedParam {
    shared: Arc<AtomicParam>,
    smoother: Smoother,
    seen_version: u32,
}

impl SmoothedParam {
    pub fn new(shared: Arc<AtomicParam>, sample_rate: f32) -> Self {
        let seen_version = shared.version();
        let mut smoother = shared.spec().smoother(sample_rate);
        smoother.reset_to(shared.target());

        Self {
            shared,
            smoother,
            seen_version,
        }
    }

    /// Pick up a new target if one was written since the last poll.
    /// Call once per block, before advancing.
    #[inline]
    pub fn poll(&mut self) -> bool {
        match self.shared.poll(&mut self.seen_version) {
            Some(update) => {
                update.apply(&mut self.smoother);
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn advance(&mut self) -> f32 {
        self.smoother.advance()
    }

    #[inline]
    pub fn skip(&mut self, n: usize) -> f32 {
        self.smoother.skip(n)
    }

    pub fn fill(&mut self, out: &mut [f32]) {
        self.smoother.fill(out);
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.smoother.value()
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.smoother.is_active()
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.smoother.set_sample_rate(sample_rate);
    }

    /// Jump to the latest shared target without gliding.
    pub fn reset(&mut self) {
        self.seen_version = self.shared.version();
        self.smoother.reset_to(self.shared.target());
    }

    pub fn shared(&self) -> &Arc<AtomicParam> {
        &self.shared
    }
}
