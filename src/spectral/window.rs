use std::f32::consts::TAU;

/// Periodic Hann window of length `len`.
///
/// The periodic form (denominator `len`, not `len - 1`) is the one whose
/// shifted copies sum to a constant, which overlap-add reconstruction needs.
pub fn hann_periodic(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| 0.5 * (1.0 - (TAU * i as f32 / len as f32).cos()))
        .collect()
}

/// Sum of `window[k]²` over every frame covering one sample, for a given hop.
/// Constant for any sample position when the window/hop pair satisfies COLA.
pub fn overlap_gain(window: &[f32], hop: usize) -> f32 {
    window.iter().step_by(hop.max(1)).map(|w| w * w).sum()
}
