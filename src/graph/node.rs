/// Core trait for audio processing nodes.
///
/// An effect turns one input sample into one output sample and keeps whatever
/// state it needs between calls. `process_block` is the hot path; the default
/// loops over `process`, and nodes that can do better (block smoothing, FFT
/// framing) override it.
///
/// Generators implement `Effect` too: they ignore their input and write their
/// own signal, which lets a source sit at the head of a chain.
pub trait Effect: Send {
    fn process(&mut self, input: f32) -> f32;

    fn process_block(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Clear all internal state (filter memory, delay lines, envelope phase).
    fn reset(&mut self);

    /// Called at configuration time, never from the audio callback.
    fn set_sample_rate(&mut self, _sample_rate: f32) {
        // Default: rate independent
    }

    /// Delay in samples this node adds to the signal.
    fn latency(&self) -> usize {
        0
    }
}

/// Two-channel processing with state shared across channels.
///
/// Implemented by linked-stereo nodes (one resonator bank panned into both
/// sides, one compressor detector for both channels) and by
/// [`DualMono`](crate::graph::stereo::DualMono), which runs two independent
/// mono instances.
pub trait StereoEffect: Send {
    fn process_stereo(&mut self, left: &mut [f32], right: &mut [f32]);

    fn reset(&mut self);

    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    fn latency(&self) -> usize {
        0
    }
}

/// Allow boxed effects to be used as effects (for dynamic dispatch)
impl Effect for Box<dyn Effect> {
    fn process(&mut self, input: f32) -> f32 {
        (**self).process(input)
    }

    fn process_block(&mut self, buffer: &mut [f32]) {
        (**self).process_block(buffer)
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        (**self).set_sample_rate(sample_rate)
    }

    fn latency(&self) -> usize {
        (**self).latency()
    }
}

impl StereoEffect for Box<dyn StereoEffect> {
    fn process_stereo(&mut self, left: &mut [f32], right: &mut [f32]) {
        (**self).process_stereo(left, right)
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        (**self).set_sample_rate(sample_rate)
    }

    fn latency(&self) -> usize {
        (**self).latency()
    }
}

/// Pass-through. Useful as a placeholder stage and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Effect for Identity {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        input
    }

    fn process_block(&mut self, _buffer: &mut [f32]) {}

    fn reset(&mut self) {}
}

/// Multiply by a constant gain.
#[derive(Debug, Clone, Copy)]
pub struct Gain(pub f32);

impl Effect for Gain {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        input * self.0
    }

    fn reset(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boxed_effect_forwards_calls() {
        let mut fx: Box<dyn Effect> = Box::new(Gain(0.5));
        let mut buffer = [1.0, -2.0];
        fx.process_block(&mut buffer);
        assert_eq!(buffer, [0.5, -1.0]);
        assert_eq!(fx.latency(), 0);
    }

    #[test]
    fn identity_leaves_block_untouched() {
        let mut fx = Identity;
        let mut buffer = [0.25, 0.5];
        fx.process_block(&mut buffer);
        assert_eq!(buffer, [0.25, 0.5]);
        assert_eq!(fx.process(3.0), 3.0);
    }
}
