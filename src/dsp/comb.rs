use crate::dsp::ring_buffer::RingBuffer;

/// Damped feedback comb filter.
///
/// Resonates at `sample_rate / delay` and its harmonics. A one-pole lowpass
/// in the loop makes upper harmonics die faster, like a plucked string.
#[derive(Debug, Clone)]
pub struct CombFilter {
    ring: RingBuffer,
    delay_samples: f32,
    feedback: f32,
    damp: f32,
    filter_state: f32,
}

impl CombFilter {
    pub fn new(max_delay_samples: usize) -> Self {
        Self {
            ring: RingBuffer::new(max_delay_samples + 2),
            delay_samples: 1.0,
            feedback: 0.5,
            damp: 0.2,
            filter_state: 0.0,
        }
    }

    /// Tune the loop to a fundamental. Clamped to what the buffer can hold.
    pub fn set_frequency(&mut self, freq_hz: f32, sample_rate: f32) {
        let max = (self.ring.capacity() - 2) as f32;
        self.delay_samples = (sample_rate / freq_hz.max(1.0)).clamp(1.0, max);
    }

    pub fn set_delay(&mut self, delay_samples: f32) {
        let max = (self.ring.capacity() - 2) as f32;
        self.delay_samples = delay_samples.clamp(1.0, max);
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, 0.99);
    }

    pub fn set_damp(&mut self, damp: f32) {
        self.damp = damp.clamp(0.0, 1.0);
    }

    #[inline]
    pub fn next_sample(&mut self, input: f32) -> f32 {
        let output = self.ring.read_frac(self.delay_samples);
        self.filter_state = output * (1.0 - self.damp) + self.filter_state * self.damp;
        self.ring.push(input + self.filter_state * self.feedback);
        output
    }

    pub fn reset(&mut self) {
        self.ring.reset();
        self.filter_state = 0.0;
    }
}
