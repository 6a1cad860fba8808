#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Largest outer radius accepted; kernels grow with its square.
pub const MAX_RADIUS: f32 = 32.0;

/*
SmoothLife
==========

Each cell looks at two neighbourhoods:

        . . n n n . .
        . n n n n n .        m = mean of the inner disc   (radius ri)
        n n m m m n n        n = mean of the outer ring   (ri < d ≤ ra)
        n n m m m n n
        n n m m m n n
        . n n n n n .
        . . n n n . .

A cell is "alive" to the degree m is high. Birth happens when the ring fill
n lands in [b1, b2]; survival when it lands in [d1, d2]. Smooth sigmoids
replace the hard thresholds of Conway's Life:

    σ(x, a, α)    = 1 / (1 + e^(-(x - a)·4/α))
    σn(x, a, b)   = σ(x, a, αn) · (1 - σ(x, b, αn))       x inside [a, b]
    σm(x, y, m)   = x·(1 - σ(m, ½, αm)) + y·σ(m, ½, αm)   blend birth → death

    s(n, m) = σn(n, σm(b1, d1, m), σm(b2, d2, m))

and each tick moves the cell towards s:  g' = clamp(g + dt·(2s - 1), 0, 1).
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothLifeRules {
    pub inner_radius: f32,
    pub outer_radius: f32,
    /// Width of the ring-fill step.
    pub alpha_n: f32,
    /// Width of the alive/dead step.
    pub alpha_m: f32,
    pub birth_low: f32,
    pub birth_high: f32,
    pub death_low: f32,
    pub death_high: f32,
    pub dt: f32,
}

impl Default for SmoothLifeRules {
    fn default() -> Self {
        Self {
            inner_radius: 11.0 / 3.0,
            outer_radius: 11.0,
            alpha_n: 0.028,
            alpha_m: 0.147,
            birth_low: 0.278,
            birth_high: 0.365,
            death_low: 0.267,
            death_high: 0.445,
            dt: 0.04,
        }
    }
}

#[inline]
fn sigmoid(x: f32, a: f32, alpha: f32) -> f32 {
    1.0 / (1.0 + (-(x - a) * 4.0 / alpha).exp())
}

impl SmoothLifeRules {
    /// Scale the neighbourhood, keeping the inner radius at a third of the outer.
    pub fn with_outer_radius(self, outer_radius: f32) -> Self {
        Self {
            outer_radius,
            inner_radius: outer_radius / 3.0,
            ..self
        }
    }

    /// Step size per tick; larger is faster and rougher.
    pub fn with_dt(self, dt: f32) -> Self {
        Self { dt, ..self }
    }

    pub fn validate(&self) -> Result<()> {
        let all = [
            self.inner_radius,
            self.outer_radius,
            self.alpha_n,
            self.alpha_m,
            self.birth_low,
            self.birth_high,
            self.death_low,
            self.death_high,
            self.dt,
        ];
        if all.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidRules("values must be finite"));
        }
        if self.inner_radius <= 0.0 || self.outer_radius <= self.inner_radius {
            return Err(Error::InvalidRules("need 0 < inner radius < outer radius"));
        }
        if self.outer_radius > MAX_RADIUS {
            return Err(Error::InvalidRules("outer radius too large"));
        }
        if self.alpha_n <= 0.0 || self.alpha_m <= 0.0 {
            return Err(Error::InvalidRules("sigmoid widths must be positive"));
        }
        let in_unit = |v: f32| (0.0..=1.0).contains(&v);
        if !(in_unit(self.birth_low) && in_unit(self.birth_high) && in_unit(self.death_low) && in_unit(self.death_high)) {
            return Err(Error::InvalidRules("birth/death bounds must lie in [0, 1]"));
        }
        if self.birth_low > self.birth_high || self.death_low > self.death_high {
            return Err(Error::InvalidRules("interval bounds are reversed"));
        }
        if self.dt <= 0.0 || self.dt > 1.0 {
            return Err(Error::InvalidRules("dt must be in (0, 1]"));
        }
        Ok(())
    }

    /// Target aliveness in [0, 1] for ring fill `n` and disc fill `m`.
    #[inline]
    pub fn transition(&self, n: f32, m: f32) -> f32 {
        let alive = sigmoid(m, 0.5, self.alpha_m);
        let low = self.birth_low * (1.0 - alive) + self.death_low * alive;
        let high = self.birth_high * (1.0 - alive) + self.death_high * alive;
        sigmoid(n, low, self.alpha_n) * (1.0 - sigmoid(n, high, self.alpha_n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SmoothLifeRules::default().validate().is_ok());
        assert!(SmoothLifeRules::default().with_outer_radius(6.0).validate().is_ok());
    }

    #[test]
    fn bad_rules_are_rejected() {
        let rules = SmoothLifeRules::default();
        assert!(SmoothLifeRules { inner_radius: 12.0, ..rules }.validate().is_err());
        assert!(SmoothLifeRules { alpha_n: 0.0, ..rules }.validate().is_err());
        assert!(SmoothLifeRules { birth_low: 0.5, birth_high: 0.4, ..rules }.validate().is_err());
        assert!(SmoothLifeRules { dt: f32::NAN, ..rules }.validate().is_err());
        assert!(rules.with_outer_radius(64.0).validate().is_err());
    }

    #[test]
    fn birth_and_survival_windows() {
        let rules = SmoothLifeRules::default();

        // Dead cell: born only when the ring is within [b1, b2]
        assert!(rules.transition(0.32, 0.0) > 0.9);
        assert!(rules.transition(0.10, 0.0) < 0.1);
        assert!(rules.transition(0.60, 0.0) < 0.1);

        // Live cell survives across the wider [d1, d2]
        assert!(rules.transition(0.40, 1.0) > 0.9);
        assert!(rules.transition(0.60, 1.0) < 0.1);
    }

    #[test]
    fn transition_stays_in_unit_range() {
        let rules = SmoothLifeRules::default();
        for i in 0..=20 {
            for j in 0..=20 {
                let s = rules.transition(i as f32 / 20.0, j as f32 / 20.0);
                assert!((0.0..=1.0).contains(&s));
            }
        }
    }
}
