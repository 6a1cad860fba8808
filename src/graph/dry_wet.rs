use crate::{
    dsp::{mix::blend_dry_wet, ring_buffer::RingBuffer},
    graph::node::Effect,
    params::Smoother,
    MAX_BLOCK_SIZE,
};

/*
Dry/Wet Wrapper
===============

  input ──┬──→ [inner effect] ──→ wet ──┐
          │                             (crossfade by mix) ──→ output
          └──→ [latency delay] ──→ dry ─┘

The mix glides through a linear smoother so automation doesn't zipper. The
endpoints are exact: mix = 0 returns the dry sample itself and mix = 1 the
wet sample itself, with no arithmetic in between.

If the inner effect reports latency (an oversampler, say), the dry path is
delayed by the same amount so the two stay phase aligned; with a
zero-latency inner the dry path is the untouched input.

The inner effect always runs, even fully dry, so tails and filter memory
are current when the mix comes back up.
*/

pub struct DryWet<E> {
    inner: E,
    mix: Smoother,
    dry: Vec<f32>,
    dry_delay: Option<RingBuffer>,
    dry_latency: usize,
}

impl<E: Effect> DryWet<E> {
    pub const DEFAULT_RAMP: f32 = 0.02;

    pub fn new(inner: E, mix: f32, sample_rate: f32) -> Self {
        let mut node = Self {
            inner,
            mix: Smoother::linear(mix.clamp(0.0, 1.0), Self::DEFAULT_RAMP, sample_rate),
            dry: vec![0.0; MAX_BLOCK_SIZE],
            dry_delay: None,
            dry_latency: 0,
        };
        node.rebuild_dry_delay();
        node
    }

    fn rebuild_dry_delay(&mut self) {
        let latency = self.inner.latency();
        self.dry_latency = latency;
        self.dry_delay = (latency > 0).then(|| RingBuffer::new(latency + 1));
    }

    pub fn set_mix(&mut self, mix: f32) {
        self.mix.set_target(mix.clamp(0.0, 1.0));
    }

    pub fn set_mix_with_time(&mut self, mix: f32, seconds: f32) {
        self.mix.set_target_with_time(mix.clamp(0.0, 1.0), seconds);
    }

    pub fn mix(&self) -> f32 {
        self.mix.value()
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut E {
        &mut self.inner
    }

    #[inline]
    fn delayed_dry(&mut self, input: f32) -> f32 {
        match self.dry_delay.as_mut() {
            Some(ring) => {
                let out = ring.read(self.dry_latency);
                ring.push(input);
                out
            }
            None => input,
        }
    }
}

impl<E: Effect> Effect for DryWet<E> {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let dry = self.delayed_dry(input);
        let wet = self.inner.process(input);
        blend_dry_wet(dry, wet, self.mix.advance())
    }

    fn process_block(&mut self, buffer: &mut [f32]) {
        for chunk in buffer.chunks_mut(MAX_BLOCK_SIZE) {
            let n = chunk.len();
            for (d, &x) in self.dry[..n].iter_mut().zip(chunk.iter()) {
                *d = x;
            }
            if self.dry_delay.is_some() {
                for i in 0..n {
                    let x = self.dry[i];
                    self.dry[i] = self.delayed_dry(x);
                }
            }

            self.inner.process_block(chunk);

            for (wet, &dry) in chunk.iter_mut().zip(self.dry[..n].iter()) {
                *wet = blend_dry_wet(dry, *wet, self.mix.advance());
            }
        }
    }

    fn reset(&mut self) {
        self.inner.reset();
        self.mix.snap();
        if let Some(ring) = self.dry_delay.as_mut() {
            ring.reset();
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.inner.set_sample_rate(sample_rate);
        self.mix.set_sample_rate(sample_rate);
        self.rebuild_dry_delay();
    }

    fn latency(&self) -> usize {
        self.inner.latency()
    }
}
