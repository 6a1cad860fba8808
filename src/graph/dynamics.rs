use crate::{
    dsp::compressor::Compressor,
    graph::node::{Effect, StereoEffect},
};

// Threshold and ratio changes reach the output through the attack/release
// smoothing of the gain, so the compressor needs no parameter smoothers.

impl Effect for Compressor {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        Compressor::process(self, input)
    }

    fn reset(&mut self) {
        Compressor::reset(self);
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        Compressor::set_sample_rate(self, sample_rate);
    }
}

/// Linked: the louder channel drives one detector, both channels get its gain.
impl StereoEffect for Compressor {
    fn process_stereo(&mut self, left: &mut [f32], right: &mut [f32]) {
        debug_assert_eq!(left.len(), right.len());
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let (out_l, out_r) = self.process_pair(*l, *r);
            *l = out_l;
            *r = out_r;
        }
    }

    fn reset(&mut self) {
        Compressor::reset(self);
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        Compressor::set_sample_rate(self, sample_rate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linked_stereo_keeps_the_image() {
        let mut comp = Compressor::new(48_000.0);
        comp.set_threshold_db(-24.0);

        let mut left = vec![0.9f32; 4_800];
        let mut right = vec![0.1f32; 4_800];
        comp.process_stereo(&mut left, &mut right);

        let ratio = left[4_799] / right[4_799];
        assert!((ratio - 9.0).abs() < 1e-3, "balance moved, ratio {}", ratio);
        assert!(right[4_799] < 0.1, "quiet side ducked by the loud one");
    }
}
