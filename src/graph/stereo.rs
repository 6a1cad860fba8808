use crate::graph::node::{Effect, StereoEffect};

/*
Stereo Policy
=============

  dual-mono      two independent instances, one per channel; nothing the
                 left instance does can be heard on the right
  linked-stereo  one instance sees both channels (shared detector, shared
                 resonator state panned into each side)

Every mono effect is dual-mono when placed in a stereo graph, through this
wrapper. The linked-stereo nodes implement `StereoEffect` themselves:
`ResonatorBank` and `Compressor`.

Because the two instances are independent, any internal state that evolves
on its own (noise generators, modulation phase) decorrelates between
channels. Seed them differently if that matters.
*/

pub struct DualMono<E> {
    left: E,
    right: E,
}

impl<E> DualMono<E> {
    pub fn new(left: E, right: E) -> Self {
        Self { left, right }
    }

    /// Build both channels from the same constructor.
    pub fn from_fn(mut make: impl FnMut() -> E) -> Self {
        let left = make();
        let right = make();
        Self { left, right }
    }

    pub fn left(&self) -> &E {
        &self.left
    }

    pub fn right(&self) -> &E {
        &self.right
    }

    /// Apply the same change to both channels.
    pub fn for_each(&mut self, mut f: impl FnMut(&mut E)) {
        f(&mut self.left);
        f(&mut self.right);
    }
}

impl<E: Effect> StereoEffect for DualMono<E> {
    fn process_stereo(&mut self, left: &mut [f32], right: &mut [f32]) {
        self.left.process_block(left);
        self.right.process_block(right);
    }

    fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.left.set_sample_rate(sample_rate);
        self.right.set_sample_rate(sample_rate);
    }

    fn latency(&self) -> usize {
        self.left.latency().max(self.right.latency())
    }
}
