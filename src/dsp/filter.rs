use std::f32::consts::{FRAC_1_SQRT_2, PI, TAU};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
| type              | passes          | rejects      |
| ----------------- | --------------- | ------------ |
| low-pass          | below cutoff    | above cutoff |
| high-pass         | above cutoff    | below cutoff |
| band-pass         | around cutoff   | outside      |
| notch / band-stop | outside         | around       |

The state-variable filter below is the trapezoidal (TPT) form: two
integrators whose memories `ic1eq`/`ic2eq` are updated with the implicit
trapezoidal rule. It stays stable for any cutoff below Nyquist and any
damping `k > 0`, which is what lets us sweep it per block without blowing up.
*/

/// Highest cutoff as a fraction of the sample rate.
pub const MAX_CUTOFF_RATIO: f32 = 0.49;
pub const MIN_CUTOFF_HZ: f32 = 10.0;
/// Resonance is capped short of 1.0 so damping `k` never reaches zero.
pub const MAX_RESONANCE: f32 = 0.98;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    LowPass,
    HighPass,
    BandPass,
    Notch,
}

pub struct FilterOutputs {
    pub lowpass: f32,
    pub bandpass: f32,
    pub highpass: f32,
    pub notch: f32,
}

#[derive(Debug, Clone)]
pub struct SVFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory

    cutoff_hz: f32,
    resonance: f32,
    sample_rate: f32,
    filter_type: FilterType,

    // Cached coefficients, rebuilt when cutoff/resonance change
    g: f32,
    k: f32,
}

impl SVFilter {
    pub fn new(filter_type: FilterType, sample_rate: f32) -> Self {
        let mut filter = Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            cutoff_hz: 1000.0,
            resonance: 0.0,
            sample_rate,
            filter_type,
            g: 0.0,
            k: 2.0,
        };
        filter.update_coefficients();
        filter
    }

    pub fn lowpass(cutoff_hz: f32, sample_rate: f32) -> Self {
        let mut filter = Self::new(FilterType::LowPass, sample_rate);
        filter.set_cutoff(cutoff_hz);
        filter
    }

    pub fn highpass(cutoff_hz: f32, sample_rate: f32) -> Self {
        let mut filter = Self::new(FilterType::HighPass, sample_rate);
        filter.set_cutoff(cutoff_hz);
        filter
    }

    pub fn bandpass(cutoff_hz: f32, sample_rate: f32) -> Self {
        let mut filter = Self::new(FilterType::BandPass, sample_rate);
        filter.set_cutoff(cutoff_hz);
        filter
    }

    pub fn notch(cutoff_hz: f32, sample_rate: f32) -> Self {
        let mut filter = Self::new(FilterType::Notch, sample_rate);
        filter.set_cutoff(cutoff_hz);
        filter
    }

    #[inline]
    fn update_coefficients(&mut self) {
        self.g = (PI * self.cutoff_hz / self.sample_rate).tan();
        self.k = 2.0 - 2.0 * self.resonance;
    }

    #[inline]
    pub fn next_sample(&mut self, sample: f32) -> FilterOutputs {
        let (g, k) = (self.g, self.k);
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        FilterOutputs {
            lowpass: v2,
            bandpass: v1,
            highpass: sample - k * v1 - v2,
            notch: sample - k * v1,
        }
    }

    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        let outputs = self.next_sample(sample);
        match self.filter_type {
            FilterType::LowPass => outputs.lowpass,
            FilterType::HighPass => outputs.highpass,
            FilterType::BandPass => outputs.bandpass,
            FilterType::Notch => outputs.notch,
        }
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    /// Clamped to `[MIN_CUTOFF_HZ, MAX_CUTOFF_RATIO * sample_rate]`.
    pub fn set_cutoff(&mut self, cutoff: f32) {
        self.cutoff_hz = self.clamp_cutoff(cutoff);
        self.update_coefficients();
    }

    /// The cutoff `set_cutoff(cutoff)` would actually apply.
    #[inline]
    pub fn clamp_cutoff(&self, cutoff: f32) -> f32 {
        cutoff.clamp(MIN_CUTOFF_HZ, MAX_CUTOFF_RATIO * self.sample_rate)
    }

    pub fn set_resonance(&mut self, resonance: f32) {
        self.resonance = resonance.clamp(0.0, MAX_RESONANCE);
        self.update_coefficients();
    }

    pub fn set_filter_type(&mut self, filter_type: FilterType) {
        self.filter_type = filter_type;
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.set_cutoff(self.cutoff_hz);
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff_hz
    }

    pub fn resonance(&self) -> f32 {
        self.resonance
    }
}

/// First-order filter: one-pole lowpass, or the complementary highpass.
///
/// Used as a DC blocker in front of the resonators and as a gentle tone
/// control. `y = y1 + a * (x - y1)` with `a = 1 - exp(-2π fc / fs)`.
#[derive(Debug, Clone)]
pub struct OnePole {
    state: f32,
    coeff: f32,
    cutoff_hz: f32,
    sample_rate: f32,
    highpass: bool,
}

impl OnePole {
    pub fn lowpass(cutoff_hz: f32, sample_rate: f32) -> Self {
        let mut filter = Self {
            state: 0.0,
            coeff: 1.0,
            cutoff_hz,
            sample_rate,
            highpass: false,
        };
        filter.set_cutoff(cutoff_hz);
        filter
    }

    pub fn highpass(cutoff_hz: f32, sample_rate: f32) -> Self {
        let mut filter = Self::lowpass(cutoff_hz, sample_rate);
        filter.highpass = true;
        filter
    }

    /// Highpass at 10 Hz.
    pub fn dc_blocker(sample_rate: f32) -> Self {
        Self::highpass(10.0, sample_rate)
    }

    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        self.cutoff_hz = cutoff_hz.clamp(1.0, MAX_CUTOFF_RATIO * self.sample_rate);
        self.coeff = 1.0 - (-TAU * self.cutoff_hz / self.sample_rate).exp();
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.set_cutoff(self.cutoff_hz);
    }

    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        self.state += self.coeff * (sample - self.state);
        if self.highpass {
            sample - self.state
        } else {
            self.state
        }
    }

    pub fn reset(&mut self) {
        self.state = 0.0;
    }
}

/*
Biquad (RBJ cookbook)
=====================

  x ──┬──[b0]──(+)──────────────┬──→ y
      │         ↑ s1            │
      ├──[b1]──(+)←──[-a1]──────┤
      │         ↑ s2            │
      └──[b2]──(+)←──[-a2]──────┘

Transposed direct form II: two state words, and the coefficients can change
between samples without the state blowing up for the gentle moves a tone
stage makes. Coefficients are computed in f64; at low frequencies `cos w0`
is close enough to 1 that f32 loses the pole positions.

Shelves use Q = 1/√2, the steepest slope without a bump.
*/

pub const MIN_Q: f32 = 0.1;
pub const MAX_Q: f32 = 20.0;
pub const MAX_BIQUAD_GAIN_DB: f32 = 24.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiquadType {
    LowPass,
    HighPass,
    /// Bell boost or cut around the centre frequency.
    Peak,
    LowShelf,
    HighShelf,
}

impl BiquadType {
    /// Whether `gain_db` changes the response.
    pub fn uses_gain(self) -> bool {
        matches!(self, BiquadType::Peak | BiquadType::LowShelf | BiquadType::HighShelf)
    }
}

#[derive(Debug, Clone)]
pub struct Biquad {
    kind: BiquadType,
    freq_hz: f32,
    q: f32,
    gain_db: f32,
    sample_rate: f32,

    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,

    s1: f32,
    s2: f32,
}

impl Biquad {
    pub fn new(kind: BiquadType, freq_hz: f32, q: f32, gain_db: f32, sample_rate: f32) -> Self {
        let mut filter = Self {
            kind,
            freq_hz,
            q,
            gain_db,
            sample_rate,
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            s1: 0.0,
            s2: 0.0,
        };
        filter.set_params(freq_hz, q, gain_db);
        filter
    }

    pub fn peak(freq_hz: f32, q: f32, gain_db: f32, sample_rate: f32) -> Self {
        Self::new(BiquadType::Peak, freq_hz, q, gain_db, sample_rate)
    }

    pub fn low_shelf(freq_hz: f32, gain_db: f32, sample_rate: f32) -> Self {
        Self::new(BiquadType::LowShelf, freq_hz, FRAC_1_SQRT_2, gain_db, sample_rate)
    }

    pub fn high_shelf(freq_hz: f32, gain_db: f32, sample_rate: f32) -> Self {
        Self::new(BiquadType::HighShelf, freq_hz, FRAC_1_SQRT_2, gain_db, sample_rate)
    }

    pub fn lowpass(freq_hz: f32, q: f32, sample_rate: f32) -> Self {
        Self::new(BiquadType::LowPass, freq_hz, q, 0.0, sample_rate)
    }

    pub fn highpass(freq_hz: f32, q: f32, sample_rate: f32) -> Self {
        Self::new(BiquadType::HighPass, freq_hz, q, 0.0, sample_rate)
    }

    /// Set everything at once with a single coefficient update.
    pub fn set_params(&mut self, freq_hz: f32, q: f32, gain_db: f32) {
        self.freq_hz = freq_hz.clamp(MIN_CUTOFF_HZ, MAX_CUTOFF_RATIO * self.sample_rate);
        self.q = q.clamp(MIN_Q, MAX_Q);
        self.gain_db = gain_db.clamp(-MAX_BIQUAD_GAIN_DB, MAX_BIQUAD_GAIN_DB);
        self.update_coefficients();
    }

    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.set_params(freq_hz, self.q, self.gain_db);
    }

    pub fn set_q(&mut self, q: f32) {
        self.set_params(self.freq_hz, q, self.gain_db);
    }

    pub fn set_gain_db(&mut self, gain_db: f32) {
        self.set_params(self.freq_hz, self.q, gain_db);
    }

    pub fn set_kind(&mut self, kind: BiquadType) {
        self.kind = kind;
        self.update_coefficients();
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.set_params(self.freq_hz, self.q, self.gain_db);
    }

    fn update_coefficients(&mut self) {
        let w0 = 2.0 * std::f64::consts::PI * self.freq_hz as f64 / self.sample_rate as f64;
        let (sin, cos) = w0.sin_cos();
        let alpha = sin / (2.0 * self.q as f64);
        let a = 10f64.powf(self.gain_db as f64 / 40.0);
        let shelf = 2.0 * a.sqrt() * alpha;

        let (b0, b1, b2, a0, a1, a2) = match self.kind {
            BiquadType::LowPass => {
                let b = (1.0 - cos) / 2.0;
                (b, 2.0 * b, b, 1.0 + alpha, -2.0 * cos, 1.0 - alpha)
            }
            BiquadType::HighPass => {
                let b = (1.0 + cos) / 2.0;
                (b, -2.0 * b, b, 1.0 + alpha, -2.0 * cos, 1.0 - alpha)
            }
            BiquadType::Peak => (
                1.0 + alpha * a,
                -2.0 * cos,
                1.0 - alpha * a,
                1.0 + alpha / a,
                -2.0 * cos,
                1.0 - alpha / a,
            ),
            BiquadType::LowShelf => (
                a * ((a + 1.0) - (a - 1.0) * cos + shelf),
                2.0 * a * ((a - 1.0) - (a + 1.0) * cos),
                a * ((a + 1.0) - (a - 1.0) * cos - shelf),
                (a + 1.0) + (a - 1.0) * cos + shelf,
                -2.0 * ((a - 1.0) + (a + 1.0) * cos),
                (a + 1.0) + (a - 1.0) * cos - shelf,
            ),
            BiquadType::HighShelf => (
                a * ((a + 1.0) + (a - 1.0) * cos + shelf),
                -2.0 * a * ((a - 1.0) + (a + 1.0) * cos),
                a * ((a + 1.0) + (a - 1.0) * cos - shelf),
                (a + 1.0) - (a - 1.0) * cos + shelf,
                2.0 * ((a - 1.0) - (a + 1.0) * cos),
                (a + 1.0) - (a - 1.0) * cos - shelf,
            ),
        };

        self.b0 = (b0 / a0) as f32;
        self.b1 = (b1 / a0) as f32;
        self.b2 = (b2 / a0) as f32;
        self.a1 = (a1 / a0) as f32;
        self.a2 = (a2 / a0) as f32;
    }

    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        let out = self.b0 * sample + self.s1;
        self.s1 = self.b1 * sample - self.a1 * out + self.s2;
        self.s2 = self.b2 * sample - self.a2 * out;
        out
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    pub fn reset(&mut self) {
        self.s1 = 0.0;
        self.s2 = 0.0;
    }

    /// Linear magnitude of the current response at `freq_hz`.
    pub fn magnitude_at(&self, freq_hz: f32) -> f32 {
        let w = 2.0 * std::f64::consts::PI * freq_hz as f64 / self.sample_rate as f64;
        let (sin1, cos1) = w.sin_cos();
        let (sin2, cos2) = (2.0 * w).sin_cos();
        let (b0, b1, b2) = (self.b0 as f64, self.b1 as f64, self.b2 as f64);
        let (a1, a2) = (self.a1 as f64, self.a2 as f64);

        // H(e^jw) with z^-1 = cos w - j sin w
        let num_re = b0 + b1 * cos1 + b2 * cos2;
        let num_im = -(b1 * sin1 + b2 * sin2);
        let den_re = 1.0 + a1 * cos1 + a2 * cos2;
        let den_im = -(a1 * sin1 + a2 * sin2);

        ((num_re * num_re + num_im * num_im) / (den_re * den_re + den_im * den_im)).sqrt() as f32
    }

    pub fn kind(&self) -> BiquadType {
        self.kind
    }

    pub fn frequency(&self) -> f32 {
        self.freq_hz
    }

    pub fn q(&self) -> f32 {
        self.q
    }

    pub fn gain_db(&self) -> f32 {
        self.gain_db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn sine(freq: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (TAU * freq * i as f32 / SAMPLE_RATE).sin())
            .collect()
    }

    fn peak_after_transient(buffer: &[f32]) -> f32 {
        let skip = buffer.len().min(256);
        buffer
            .get(skip..)
            .unwrap_or(buffer)
            .iter()
            .fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    #[test]
    fn test_lowpass_basic() {
        let mut filter = SVFilter::lowpass(500.0, SAMPLE_RATE);
        let mut buffer = vec![1.0; 512];

        filter.render(&mut buffer);

        assert!(buffer[511] > 0.99, "DC should pass, got {}", buffer[511]);
    }

    #[test]
    fn test_highpass_basic() {
        let mut filter = SVFilter::highpass(500.0, SAMPLE_RATE);
        let mut buffer = vec![1.0; 512];

        filter.render(&mut buffer);

        assert!(buffer[511].abs() < 0.001, "DC should be blocked, got {}", buffer[511]);
    }

    #[test]
    fn test_lowpass_filters_high_freq() {
        let mut filter = SVFilter::lowpass(500.0, SAMPLE_RATE);
        let mut buffer = sine(5_000.0, 1024);

        filter.render(&mut buffer);

        let peak = peak_after_transient(&buffer);
        assert!(peak < 0.05, "Expected high freq attenuation, got peak: {}", peak);
    }

    #[test]
    fn test_bandpass_emphasizes_cutoff_frequency() {
        let mut filter = SVFilter::bandpass(1_000.0, SAMPLE_RATE);
        filter.set_resonance(0.5);

        let mut pass = sine(1_000.0, 2048);
        filter.render(&mut pass);
        let pass_peak = peak_after_transient(&pass);

        filter.reset();
        let mut off = sine(200.0, 2048);
        filter.render(&mut off);
        let off_peak = peak_after_transient(&off);

        assert!(
            pass_peak > off_peak * 2.0,
            "expected bandpass to emphasize cutoff freq, got pass_peak={}, off_peak={}",
            pass_peak,
            off_peak
        );
    }

    #[test]
    fn test_notch_rejects_cutoff_frequency() {
        let mut filter = SVFilter::notch(1_000.0, SAMPLE_RATE);
        filter.set_resonance(0.5);

        let mut center = sine(1_000.0, 4096);
        filter.render(&mut center);
        let center_peak = peak_after_transient(&center[2048..]);

        filter.reset();
        let mut off = sine(200.0, 4096);
        filter.render(&mut off);
        let off_peak = peak_after_transient(&off[2048..]);

        assert!(
            center_peak * 2.0 < off_peak,
            "expected notch to reject center freq, got center_peak={}, off_peak={}",
            center_peak,
            off_peak
        );
    }

    #[test]
    fn cutoff_is_clamped_below_nyquist() {
        let mut filter = SVFilter::lowpass(1_000.0, SAMPLE_RATE);
        filter.set_cutoff(1.0e9);
        assert!(filter.cutoff() <= MAX_CUTOFF_RATIO * SAMPLE_RATE);

        let mut buffer = sine(10_000.0, 4096);
        filter.set_resonance(10.0);
        filter.render(&mut buffer);
        assert!(buffer.iter().all(|s| s.is_finite()));
        assert!(filter.resonance() <= MAX_RESONANCE);
    }

    #[test]
    fn test_set_resonance_affects_peak() {
        let mut filter = SVFilter::lowpass(1_000.0, SAMPLE_RATE);
        filter.set_resonance(0.1);
        let mut low = sine(1_000.0, 2048);
        filter.render(&mut low);
        let peak_low_res = peak_after_transient(&low);

        filter.reset();
        filter.set_resonance(0.8);
        let mut high = sine(1_000.0, 2048);
        filter.render(&mut high);
        let peak_high_res = peak_after_transient(&high);

        assert!(
            peak_high_res > peak_low_res * 1.2,
            "High resonance should boost signal: high_res={}, low_res={}",
            peak_high_res,
            peak_low_res
        );
    }

    #[test]
    fn dc_blocker_removes_offset() {
        let mut filter = OnePole::dc_blocker(SAMPLE_RATE);
        let mut last = 0.0;
        for _ in 0..48_000 {
            last = filter.process(0.5);
        }
        assert!(last.abs() < 1.0e-3, "residual DC {}", last);
    }

    #[test]
    fn one_pole_lowpass_settles_to_input() {
        let mut filter = OnePole::lowpass(100.0, SAMPLE_RATE);
        let mut last = 0.0;
        for _ in 0..4_800 {
            last = filter.process(1.0);
        }
        assert!((last - 1.0).abs() < 1.0e-3);
    }
    fn db_to_gain(db: f32) -> f32 {
        10f32.powf(db / 20.0)
    }

    #[test]
    fn peak_boost_hits_its_gain_at_the_centre() {
        let filter = Biquad::peak(1_000.0, 1.0, 6.0, SAMPLE_RATE);
        let centre = filter.magnitude_at(1_000.0);
        assert!((centre - db_to_gain(6.0)).abs() < 1.0e-3, "centre magnitude {}", centre);

        // Far from the bell the response is flat
        assert!((filter.magnitude_at(20.0) - 1.0).abs() < 0.01);
        assert!((filter.magnitude_at(18_000.0) - 1.0).abs() < 0.02);
    }

    #[test]
    fn peak_boost_measured_on_a_sine() {
        let mut filter = Biquad::peak(1_000.0, 1.0, 6.0, SAMPLE_RATE);
        let mut buffer = sine(1_000.0, 8_192);
        filter.render(&mut buffer);

        let peak = peak_after_transient(&buffer[4_096..]);
        assert!((peak - db_to_gain(6.0)).abs() < 0.02, "measured peak {}", peak);
    }

    #[test]
    fn peak_cut_mirrors_boost() {
        let boost = Biquad::peak(2_500.0, 2.0, 9.0, SAMPLE_RATE);
        let cut = Biquad::peak(2_500.0, 2.0, -9.0, SAMPLE_RATE);
        let product = boost.magnitude_at(2_500.0) * cut.magnitude_at(2_500.0);
        assert!((product - 1.0).abs() < 1.0e-3, "boost x cut = {}", product);
    }

    #[test]
    fn shelves_lift_their_own_side() {
        let low = Biquad::low_shelf(200.0, 12.0, SAMPLE_RATE);
        assert!((low.magnitude_at(10.0) - db_to_gain(12.0)).abs() < 0.05);
        assert!((low.magnitude_at(10_000.0) - 1.0).abs() < 0.01);

        let high = Biquad::high_shelf(4_000.0, -12.0, SAMPLE_RATE);
        assert!((high.magnitude_at(20_000.0) - db_to_gain(-12.0)).abs() < 0.02);
        assert!((high.magnitude_at(50.0) - 1.0).abs() < 0.01);
    }

    #[test]
    fn zero_gain_bell_and_shelf_are_transparent() {
        for mut filter in [
            Biquad::peak(1_000.0, 0.7, 0.0, SAMPLE_RATE),
            Biquad::high_shelf(6_000.0, 0.0, SAMPLE_RATE),
        ] {
            let input = sine(440.0, 1_024);
            let mut buffer = input.clone();
            filter.render(&mut buffer);
            for (a, b) in input.iter().zip(&buffer) {
                assert!((a - b).abs() < 1.0e-5);
            }
        }
    }

    #[test]
    fn biquad_highpass_blocks_dc() {
        let mut filter = Biquad::highpass(80.0, FRAC_1_SQRT_2, SAMPLE_RATE);
        let mut buffer = vec![1.0f32; 48_000];
        filter.render(&mut buffer);
        assert!(buffer[47_999].abs() < 1.0e-3, "residual DC {}", buffer[47_999]);
        assert!((filter.magnitude_at(80.0) - FRAC_1_SQRT_2).abs() < 1.0e-3);
    }

    #[test]
    fn biquad_settings_are_clamped() {
        let mut filter = Biquad::peak(1_000.0, 1.0, 0.0, SAMPLE_RATE);
        filter.set_params(1.0e9, 1.0e3, 100.0);
        assert_eq!(filter.frequency(), MAX_CUTOFF_RATIO * SAMPLE_RATE);
        assert_eq!(filter.q(), MAX_Q);
        assert_eq!(filter.gain_db(), MAX_BIQUAD_GAIN_DB);

        let mut buffer = sine(20_000.0, 4_096);
        filter.render(&mut buffer);
        assert!(buffer.iter().all(|s| s.is_finite()));
    }
}
