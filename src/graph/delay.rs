use crate::{
    dsp::{
        comb::CombFilter,
        delay::{DelayLine, MAX_FEEDBACK},
        mix::blend_dry_wet,
    },
    graph::node::{Effect, StereoEffect},
    params::Smoother,
};

/// Feedback delay with a gliding delay time.
///
/// The output is the wet signal only (the delayed taps); wrap it in
/// [`DryWet`](crate::graph::dry_wet::DryWet) to hear the source too. Moving
/// the time glides the fractional read head, which pitch-bends the repeats
/// the way a tape delay does instead of clicking.
#[derive(Debug, Clone)]
pub struct DelayNode {
    line: DelayLine,
    time: Smoother,
    feedback: Smoother,
    sample_rate: f32,
    max_seconds: f32,
}

impl DelayNode {
    /// Allocates the line for `max_seconds` at `sample_rate`. Configuration
    /// time only.
    pub fn new(max_seconds: f32, sample_rate: f32) -> Self {
        let max_seconds = max_seconds.max(0.001);
        let capacity = (max_seconds * sample_rate).ceil() as usize + 1;
        let initial = (0.25f32).min(max_seconds);

        Self {
            line: DelayLine::new(capacity),
            time: Smoother::linear(initial, 0.1, sample_rate),
            feedback: Smoother::linear(0.35, 0.02, sample_rate),
            sample_rate,
            max_seconds,
        }
    }

    pub fn set_time(&mut self, seconds: f32) {
        self.time.set_target(seconds.clamp(0.0, self.max_seconds));
    }

    pub fn set_time_with_glide(&mut self, seconds: f32, glide: f32) {
        self.time
            .set_target_with_time(seconds.clamp(0.0, self.max_seconds), glide);
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback.set_target(feedback);
    }

    pub fn set_feedback_with_time(&mut self, feedback: f32, seconds: f32) {
        self.feedback.set_target_with_time(feedback, seconds);
    }

    pub fn max_seconds(&self) -> f32 {
        self.max_seconds
    }
}

impl Effect for DelayNode {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let delay_samples = self.time.advance() * self.sample_rate;
        let feedback = self.feedback.advance();
        self.line.next_sample(input, delay_samples, feedback)
    }

    fn reset(&mut self) {
        self.line.reset();
        self.time.snap();
        self.feedback.snap();
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        if sample_rate == self.sample_rate {
            return;
        }
        // Capacity depends on the rate, rebuild the line.
        self.sample_rate = sample_rate;
        let capacity = (self.max_seconds * sample_rate).ceil() as usize + 1;
        self.line = DelayLine::new(capacity);
        self.time.set_sample_rate(sample_rate);
        self.feedback.set_sample_rate(sample_rate);
    }
}

/*
Ping-Pong Delay
===============

  left in  ──(+)──→ [ line L ] ──┬──→ wet L
              ↑  ╲               │
              │    fb · cross ───┼──┐
              │                  │  │
              └── fb · (1-cross) ┘  │
                                    ↓
  right in ──(+)──→ [ line R ] ──┬──→ wet R
          (same, mirrored)

At `cross = 1` the input is summed to mono into the left line and each line
is fed only by the other one's tap, so the repeats land left at D, right at
2D, left at 3D. At `cross = 0` the lines are two independent stereo echoes.

The feedback matrix has eigenvalues `fb` and `fb (1 - 2 cross)`, so the
loop decays for every cross amount as long as `fb < 1`.
*/

/// Stereo delay whose repeats bounce between the channels.
///
/// Unlike [`DelayNode`] it mixes dry and wet itself, since the wet side of
/// one channel depends on the input of the other.
#[derive(Debug, Clone)]
pub struct PingPongDelay {
    left: DelayLine,
    right: DelayLine,
    time: Smoother,
    feedback: Smoother,
    cross: Smoother,
    mix: Smoother,
    sample_rate: f32,
    max_seconds: f32,
}

impl PingPongDelay {
    /// Allocates both lines for `max_seconds` at `sample_rate`.
    /// Configuration time only.
    pub fn new(max_seconds: f32, sample_rate: f32) -> Self {
        let max_seconds = max_seconds.max(0.001);
        let capacity = (max_seconds * sample_rate).ceil() as usize + 1;
        let initial = (0.25f32).min(max_seconds);

        Self {
            left: DelayLine::new(capacity),
            right: DelayLine::new(capacity),
            time: Smoother::linear(initial, 0.1, sample_rate),
            feedback: Smoother::linear(0.35, 0.02, sample_rate),
            cross: Smoother::linear(1.0, 0.05, sample_rate),
            mix: Smoother::linear(0.5, 0.02, sample_rate),
            sample_rate,
            max_seconds,
        }
    }

    pub fn set_time(&mut self, seconds: f32) {
        self.time.set_target(seconds.clamp(0.0, self.max_seconds));
    }

    pub fn set_time_with_glide(&mut self, seconds: f32, glide: f32) {
        self.time
            .set_target_with_time(seconds.clamp(0.0, self.max_seconds), glide);
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback.set_target(feedback);
    }

    pub fn set_feedback_with_time(&mut self, feedback: f32, seconds: f32) {
        self.feedback.set_target_with_time(feedback, seconds);
    }

    /// 0 keeps the channels apart, 1 is a full ping-pong.
    pub fn set_cross(&mut self, cross: f32) {
        self.cross.set_target(cross.clamp(0.0, 1.0));
    }

    pub fn set_cross_with_time(&mut self, cross: f32, seconds: f32) {
        self.cross.set_target_with_time(cross.clamp(0.0, 1.0), seconds);
    }

    pub fn set_mix(&mut self, mix: f32) {
        self.mix.set_target(mix.clamp(0.0, 1.0));
    }

    pub fn set_mix_with_time(&mut self, mix: f32, seconds: f32) {
        self.mix.set_target_with_time(mix.clamp(0.0, 1.0), seconds);
    }

    pub fn max_seconds(&self) -> f32 {
        self.max_seconds
    }

    #[inline]
    fn next_frame(&mut self, in_l: f32, in_r: f32) -> (f32, f32) {
        let delay_samples = self.time.advance() * self.sample_rate;
        let feedback = self.feedback.advance().clamp(0.0, MAX_FEEDBACK);
        let cross = self.cross.advance();
        let mix = self.mix.advance();

        let wet_l = self.left.tap(delay_samples);
        let wet_r = self.right.tap(delay_samples);
        let straight = 1.0 - cross;
        let mono = 0.5 * (in_l + in_r);

        self.left
            .write(straight * in_l + cross * mono + feedback * (straight * wet_l + cross * wet_r));
        self.right
            .write(straight * in_r + feedback * (straight * wet_r + cross * wet_l));

        (blend_dry_wet(in_l, wet_l, mix), blend_dry_wet(in_r, wet_r, mix))
    }
}

impl StereoEffect for PingPongDelay {
    fn process_stereo(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            (*l, *r) = self.next_frame(*l, *r);
        }
    }

    fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
        self.time.snap();
        self.feedback.snap();
        self.cross.snap();
        self.mix.snap();
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        if sample_rate == self.sample_rate {
            return;
        }
        self.sample_rate = sample_rate;
        let capacity = (self.max_seconds * sample_rate).ceil() as usize + 1;
        self.left = DelayLine::new(capacity);
        self.right = DelayLine::new(capacity);
        self.time.set_sample_rate(sample_rate);
        self.feedback.set_sample_rate(sample_rate);
        self.cross.set_sample_rate(sample_rate);
        self.mix.set_sample_rate(sample_rate);
    }
}

impl Effect for CombFilter {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        self.next_sample(input)
    }

    fn reset(&mut self) {
        CombFilter::reset(self);
    }
}
