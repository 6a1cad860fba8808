use crate::{dsp::oscillator::Oscillator, graph::node::Effect};

/// A generator at the head of a chain: the input is discarded and replaced
/// by the oscillator's own signal.
impl Effect for Oscillator {
    #[inline]
    fn process(&mut self, _input: f32) -> f32 {
        self.next_sample()
    }

    fn process_block(&mut self, buffer: &mut [f32]) {
        self.render(buffer);
    }

    fn reset(&mut self) {
        Oscillator::reset(self);
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        Oscillator::set_sample_rate(self, sample_rate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::oscillator::Waveform;

    #[test]
    fn replaces_its_input() {
        let mut osc = Oscillator::new(Waveform::Sine, 48_000.0, 0);
        let mut buffer = vec![7.0f32; 16];
        osc.process_block(&mut buffer);
        assert_eq!(buffer[0], 0.0);
        assert!(buffer.iter().all(|s| s.abs() <= 1.0));
    }
}
