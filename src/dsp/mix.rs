//! Crossfading and panning primitives.

use std::f32::consts::FRAC_PI_2;

/*
Dry/Wet Crossfade
=================

    output = dry × (1 - mix) + wet × mix

The weights sum to 1, so two full-scale inputs cannot exceed full scale.
At the endpoints we return the selected input itself rather than evaluating
the expression, so mix = 0 is bit-exact dry and mix = 1 is bit-exact wet
(even `0 × wet` would turn an infinite wet sample into NaN).

Equal-Power Pan
===============

    left  = cos(pan × π/2)
    right = sin(pan × π/2)        pan ∈ [0, 1], 0.5 = centre

left² + right² = 1 at every position, so a source keeps its perceived
loudness as it moves across the field. At centre each side gets √½ ≈ -3 dB.
*/

/// Blend one dry and one wet sample.
#[inline]
pub fn blend_dry_wet(dry: f32, wet: f32, mix: f32) -> f32 {
    if mix <= 0.0 {
        dry
    } else if mix >= 1.0 {
        wet
    } else {
        dry * (1.0 - mix) + wet * mix
    }
}

/// Blend with a constant mix: `wet[i] = blend(dry[i], wet[i], mix)`.
#[inline]
pub fn apply_dry_wet(dry: &[f32], wet: &mut [f32], mix: f32) {
    debug_assert_eq!(dry.len(), wet.len());

    if mix >= 1.0 {
        return; // 100% wet, nothing to do
    }
    if mix <= 0.0 {
        wet.copy_from_slice(dry);
        return;
    }

    let dry_amount = 1.0 - mix;
    for (wet_sample, &dry_sample) in wet.iter_mut().zip(dry.iter()) {
        *wet_sample = dry_sample * dry_amount + *wet_sample * mix;
    }
}

/// Add `b` into `a` in place.
///
/// Can exceed [-1.0, +1.0]; apply gain before or limiting after.
#[inline]
pub fn sum_in_place(a: &mut [f32], b: &[f32]) {
    debug_assert_eq!(a.len(), b.len());

    for (sa, &sb) in a.iter_mut().zip(b.iter()) {
        *sa += sb;
    }
}

/// Multiply a buffer by a constant gain.
#[inline]
pub fn apply_gain(buffer: &mut [f32], gain: f32) {
    if gain == 1.0 {
        return;
    }
    for sample in buffer.iter_mut() {
        *sample *= gain;
    }
}

/// Equal-power pan gains `(left, right)` for `pan` in [0, 1].
#[inline]
pub fn pan_gains(pan: f32) -> (f32, f32) {
    let angle = pan.clamp(0.0, 1.0) * FRAC_PI_2;
    (angle.cos(), angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_exact() {
        assert_eq!(blend_dry_wet(0.3, f32::INFINITY, 0.0), 0.3);
        assert_eq!(blend_dry_wet(f32::INFINITY, 0.7, 1.0), 0.7);
    }

    #[test]
    fn apply_dry_wet_endpoints() {
        let dry = [1.0, 0.5, -0.5, -1.0];
        let mut wet = [0.1, 0.2, 0.3, 0.4];
        apply_dry_wet(&dry, &mut wet, 0.0);
        assert_eq!(wet, dry);

        let mut wet = [0.1, 0.2, 0.3, 0.4];
        apply_dry_wet(&dry, &mut wet, 1.0);
        assert_eq!(wet, [0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn halfway_blend_is_average() {
        assert!((blend_dry_wet(1.0, 0.0, 0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn pan_law_preserves_power() {
        for i in 0..=10 {
            let (l, r) = pan_gains(i as f32 / 10.0);
            assert!((l * l + r * r - 1.0).abs() < 1e-5);
        }
        let (l, r) = pan_gains(0.5);
        assert!((l - r).abs() < 1e-6);
    }

    #[test]
    fn sum_adds_elementwise() {
        let mut a = [1.0, 2.0];
        sum_in_place(&mut a, &[0.5, -1.0]);
        assert_eq!(a, [1.5, 1.0]);
    }
}
