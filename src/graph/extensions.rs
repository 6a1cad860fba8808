use crate::{
    error::Result,
    graph::{chain::Chain, dry_wet::DryWet, node::Effect, oversample::Oversampler, stereo::DualMono},
};

/// Fluent composition for any [`Effect`].
pub trait EffectExt: Effect + Sized {
    fn then<B: Effect>(self, next: B) -> Chain<Self, B> {
        Chain::new(self, next)
    }

    fn dry_wet(self, mix: f32, sample_rate: f32) -> DryWet<Self> {
        DryWet::new(self, mix, sample_rate)
    }

    fn oversampled(self, factor: usize, sample_rate: f32) -> Result<Oversampler<Self>> {
        Oversampler::new(self, factor, sample_rate)
    }

    /// Two independent copies, one per channel.
    fn dual_mono(self) -> DualMono<Self>
    where
        Self: Clone,
    {
        DualMono::new(self.clone(), self)
    }
}

impl<T: Effect + Sized> EffectExt for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::{Gain, StereoEffect};

    #[test]
    fn combinators_nest() {
        let mut fx = Gain(2.0)
            .oversampled(2, 48_000.0)
            .unwrap()
            .then(Gain(0.5))
            .dry_wet(1.0, 48_000.0);
        assert_eq!(fx.latency(), fx.inner().first().latency());

        let mut buffer = vec![0.0f32; 64];
        buffer[0] = 1.0;
        fx.process_block(&mut buffer);
        let energy: f32 = buffer.iter().sum();
        assert!((energy - 1.0).abs() < 0.05, "chain gain {}", energy);
    }

    #[test]
    fn dual_mono_channels_are_independent() {
        let mut pair = Gain(0.5).dual_mono();
        let mut left = [1.0, 1.0];
        let mut right = [4.0, -4.0];
        pair.process_stereo(&mut left, &mut right);
        assert_eq!(left, [0.5, 0.5]);
        assert_eq!(right, [2.0, -2.0]);
    }
}
