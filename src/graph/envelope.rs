use crate::{dsp::envelope::Envelope, graph::node::Effect};

/// As an effect the envelope is a VCA: each input sample is scaled by the
/// current level. Gate it with `note_on` / `note_off`.
impl Effect for Envelope {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        input * self.next_sample()
    }

    fn reset(&mut self) {
        Envelope::reset(self);
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        Envelope::set_sample_rate(self, sample_rate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gates_the_signal() {
        let mut env = Envelope::adsr(0.001, 0.01, 0.5, 0.01, 48_000.0);
        let mut buffer = vec![1.0f32; 64];
        env.process_block(&mut buffer);
        assert!(buffer.iter().all(|&s| s == 0.0), "idle envelope is silent");

        env.note_on();
        let mut buffer = vec![1.0f32; 4_800];
        env.process_block(&mut buffer);
        assert!((buffer[4_799] - 0.5).abs() < 1e-3, "sustain scales the input");
    }
}
