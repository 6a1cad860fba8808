use crate::dsp::ring_buffer::RingBuffer;

/*
Feedback Delay Line
===================

  input ──(+)──────────────┬──→ [ ring buffer ] ──┬──→ delayed
          ↑                                       │
          └──────────── (× feedback) ←────────────┘

The read position is fractional so the delay time can glide without the
stepping artifacts an integer tap produces. Feedback is clamped below 1 so
the loop gain can never reach unity.
*/

pub const MAX_FEEDBACK: f32 = 0.98;

#[derive(Debug, Clone)]
pub struct DelayLine {
    ring: RingBuffer,
}

impl DelayLine {
    /// `max_delay_samples` fixes the capacity for the lifetime of the line.
    pub fn new(max_delay_samples: usize) -> Self {
        Self {
            ring: RingBuffer::new(max_delay_samples + 2),
        }
    }

    /// Longest delay in samples this line can produce.
    pub fn max_delay(&self) -> f32 {
        (self.ring.capacity() - 2) as f32
    }

    /// Read the tap `delay_samples` behind, then write `sample` plus feedback.
    #[inline]
    pub fn next_sample(&mut self, sample: f32, delay_samples: f32, feedback: f32) -> f32 {
        let delayed = self.tap(delay_samples);
        let feedback = feedback.clamp(0.0, MAX_FEEDBACK);
        self.write(sample + delayed * feedback);
        delayed
    }

    /// Read the tap without advancing. Pair with [`DelayLine::write`] when the
    /// feedback comes from somewhere other than this line's own tap.
    #[inline]
    pub fn tap(&self, delay_samples: f32) -> f32 {
        self.ring.read_frac(delay_samples)
    }

    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.ring.push(sample);
    }

    pub fn render(&mut self, buffer: &mut [f32], delay_samples: f32, feedback: f32) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample, delay_samples, feedback);
        }
    }

    pub fn reset(&mut self) {
        self.ring.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impulse_comes_back_after_delay() {
        let mut line = DelayLine::new(64);
        let mut buffer = vec![0.0f32; 32];
        buffer[0] = 1.0;

        line.render(&mut buffer, 10.0, 0.0);

        assert_eq!(buffer[10], 1.0);
        assert!(buffer.iter().enumerate().all(|(i, &s)| i == 10 || s == 0.0));
    }

    #[test]
    fn feedback_repeats_decay() {
        let mut line = DelayLine::new(64);
        let mut buffer = vec![0.0f32; 40];
        buffer[0] = 1.0;

        line.render(&mut buffer, 10.0, 0.5);

        assert!((buffer[10] - 1.0).abs() < 1.0e-6);
        assert!((buffer[20] - 0.5).abs() < 1.0e-6);
        assert!((buffer[30] - 0.25).abs() < 1.0e-6);
    }

    #[test]
    fn feedback_is_clamped_below_unity() {
        let mut line = DelayLine::new(16);
        let mut buffer = vec![0.0f32; 4_000];
        buffer[0] = 1.0;

        line.render(&mut buffer, 8.0, 10.0);

        let tail = buffer[3_000..].iter().fold(0.0f32, |a, &s| a.max(s.abs()));
        assert!(tail < 1.0, "feedback loop must decay, tail peak {}", tail);
    }
}
