use crate::graph::node::Effect;

/*
Serial Chain
============

Chain connects two effects in series: the whole block runs through the first
stage, then through the second, in place.

  [First] ──→ [Second] ──→ output

  let post = FilterNode::lowpass(2_000.0, sr)
      .then(DriveNode::new(ShaperCurve::Tanh, sr).oversampled(4, sr)?)
      .then(DelayNode::new(1.0, sr));

Latency adds up, reset clears both.
*/

pub struct Chain<A, B> {
    first: A,
    second: B,
}

impl<A, B> Chain<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    pub fn first(&self) -> &A {
        &self.first
    }

    pub fn first_mut(&mut self) -> &mut A {
        &mut self.first
    }

    pub fn second(&self) -> &B {
        &self.second
    }

    pub fn second_mut(&mut self) -> &mut B {
        &mut self.second
    }
}

impl<A: Effect, B: Effect> Effect for Chain<A, B> {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        self.second.process(self.first.process(input))
    }

    fn process_block(&mut self, buffer: &mut [f32]) {
        self.first.process_block(buffer);
        self.second.process_block(buffer);
    }

    fn reset(&mut self) {
        self.first.reset();
        self.second.reset();
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.first.set_sample_rate(sample_rate);
        self.second.set_sample_rate(sample_rate);
    }

    fn latency(&self) -> usize {
        self.first.latency() + self.second.latency()
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::{
        extensions::EffectExt,
        node::{Effect, Gain},
    };

    #[test]
    fn runs_first_then_second() {
        let mut chain = Gain(2.0).then(Gain(0.25));
        let mut buffer = vec![1.0; 8];
        chain.process_block(&mut buffer);
        assert!(buffer.iter().all(|&s| (s - 0.5).abs() < 1e-6));
    }

    #[test]
    fn sample_and_block_paths_agree() {
        let mut a = Gain(3.0).then(Gain(-1.0));
        let mut b = Gain(3.0).then(Gain(-1.0));
        let mut block = [0.1, 0.2, 0.3];
        b.process_block(&mut block);
        for (i, &x) in [0.1f32, 0.2, 0.3].iter().enumerate() {
            assert_eq!(a.process(x), block[i]);
        }
    }
}
