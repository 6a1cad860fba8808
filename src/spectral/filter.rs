use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::{
    error::{check_sample_rate, Error, Result},
    graph::node::Effect,
    spectral::{
        mask::SpectralMask,
        window::{hann_periodic, overlap_gain},
    },
};

/*
STFT Mask Filter
================

  input ──→ [in ring, N] ──every hop──→ window → FFT → × mask → IFFT → window ──┐
                                                                                 │
  output ←── [out ring, N] ←──────────────── overlap-add ←───────────────────────┘

N = FFT size, hop = N/4. Each sample goes into the input ring and the output
ring slot it overwrites is read out (then cleared). Every `hop` samples the
last N inputs form a frame; the processed frame is added back into the output
ring starting at the oldest slot, so every sample comes out exactly N samples
after it went in.

Reconstruction
--------------
Analysis and synthesis both use a periodic Hann window. At 75% overlap the
squared windows sum to 1.5 at every position, and rustfft's inverse is
unnormalised (×N), so each frame is scaled by 1/(N·1.5). With an all-ones
mask the output is the input delayed by N, up to rounding.

Mask
----
Gains for bins 0..=N/2 apply to their mirrored negative-frequency bins too,
which keeps the spectrum Hermitian and the output real. The applied mask
follows the target mask with a one-pole per frame; that is the only smoothing
between frames. The mix control blends in the frequency domain,
`gain = 1 + mix·(mask − 1)`, so there is no dry path to latency-match.
*/

pub const MIN_FFT_SIZE: usize = 64;
pub const MAX_FFT_SIZE: usize = 8192;
pub const OVERLAP: usize = 4;

pub(crate) fn check_fft_size(fft_size: usize) -> Result<()> {
    if !fft_size.is_power_of_two() || !(MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&fft_size) {
        return Err(Error::InvalidFftSize {
            size: fft_size,
            min: MIN_FFT_SIZE,
            max: MAX_FFT_SIZE,
        });
    }
    Ok(())
}

pub struct SpectralFilter {
    fft_size: usize,
    hop: usize,
    sample_rate: f32,

    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    norm: f32,

    input: Vec<f32>,
    output: Vec<f32>,
    pos: usize,
    hop_counter: usize,

    frame: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,

    target: SpectralMask,
    applied: Vec<f32>,
    smoothing_time: f32,
    smoothing_coeff: f32,
    mix: f32,
}

impl SpectralFilter {
    /// `fft_size` must be a power of two in `[MIN_FFT_SIZE, MAX_FFT_SIZE]`.
    pub fn new(fft_size: usize, sample_rate: f32) -> Result<Self> {
        check_fft_size(fft_size)?;
        check_sample_rate(sample_rate)?;

        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(fft_size);
        let inverse = planner.plan_fft_inverse(fft_size);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());

        let hop = fft_size / OVERLAP;
        let window = hann_periodic(fft_size);
        let norm = 1.0 / (fft_size as f32 * overlap_gain(&window, hop));
        let bins = fft_size / 2 + 1;

        let mut filter = Self {
            fft_size,
            hop,
            sample_rate,
            forward,
            inverse,
            window,
            norm,
            input: vec![0.0; fft_size],
            output: vec![0.0; fft_size],
            pos: 0,
            hop_counter: 0,
            frame: vec![Complex::new(0.0, 0.0); fft_size],
            scratch: vec![Complex::new(0.0, 0.0); scratch_len],
            target: SpectralMask::unity(fft_size),
            applied: vec![1.0; bins],
            smoothing_time: 0.05,
            smoothing_coeff: 1.0,
            mix: 1.0,
        };
        filter.update_smoothing();
        Ok(filter)
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn hop_size(&self) -> usize {
        self.hop
    }

    pub fn bins(&self) -> usize {
        self.applied.len()
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn mask(&self) -> &SpectralMask {
        &self.target
    }

    /// Target mask; the applied mask glides toward it one frame at a time.
    pub fn mask_mut(&mut self) -> &mut SpectralMask {
        &mut self.target
    }

    pub fn set_mask(&mut self, gains: &[f32]) -> Result<()> {
        self.target.copy_from(gains)
    }

    /// 0 = bypass (mask ignored), 1 = full mask.
    pub fn set_mix(&mut self, mix: f32) {
        self.mix = if mix.is_finite() { mix.clamp(0.0, 1.0) } else { 0.0 };
    }

    pub fn mix(&self) -> f32 {
        self.mix
    }

    /// Time constant (seconds) of the per-frame mask glide. 0 applies every
    /// new mask on the next frame.
    pub fn set_mask_smoothing(&mut self, seconds: f32) {
        self.smoothing_time = seconds.max(0.0);
        self.update_smoothing();
    }

    fn update_smoothing(&mut self) {
        let frames_per_second = self.sample_rate / self.hop as f32;
        self.smoothing_coeff = if self.smoothing_time <= 0.0 {
            1.0
        } else {
            1.0 - (-1.0 / (self.smoothing_time * frames_per_second)).exp()
        };
    }

    fn process_frame(&mut self) {
        let n = self.fft_size;

        // `pos` now points at the oldest sample in the ring.
        for k in 0..n {
            let sample = self.input[(self.pos + k) % n];
            self.frame[k] = Complex::new(sample * self.window[k], 0.0);
        }

        self.forward
            .process_with_scratch(&mut self.frame, &mut self.scratch);

        let coeff = self.smoothing_coeff;
        for (applied, &target) in self.applied.iter_mut().zip(self.target.gains()) {
            *applied += (target - *applied) * coeff;
        }

        let half = n / 2;
        for k in 0..n {
            let bin = if k <= half { k } else { n - k };
            let gain = 1.0 + self.mix * (self.applied[bin] - 1.0);
            self.frame[k] *= gain;
        }

        self.inverse
            .process_with_scratch(&mut self.frame, &mut self.scratch);

        for k in 0..n {
            let slot = (self.pos + k) % n;
            self.output[slot] += self.frame[k].re * self.window[k] * self.norm;
        }
    }
}

impl Effect for SpectralFilter {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let out = self.output[self.pos];
        self.output[self.pos] = 0.0;
        self.input[self.pos] = input;

        self.pos += 1;
        if self.pos == self.fft_size {
            self.pos = 0;
        }

        self.hop_counter += 1;
        if self.hop_counter == self.hop {
            self.hop_counter = 0;
            self.process_frame();
        }
        out
    }

    fn reset(&mut self) {
        self.input.fill(0.0);
        self.output.fill(0.0);
        self.pos = 0;
        self.hop_counter = 0;
        self.applied.copy_from_slice(self.target.gains());
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.update_smoothing();
    }

    fn latency(&self) -> usize {
        self.fft_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn test_signal(len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE;
                0.5 * (std::f32::consts::TAU * 440.0 * t).sin()
                    + 0.25 * (std::f32::consts::TAU * 3_100.0 * t).sin()
            })
            .collect()
    }

    #[test]
    fn rejects_bad_sizes() {
        for size in [0, 32, 100, 16_384] {
            assert!(
                matches!(SpectralFilter::new(size, SAMPLE_RATE), Err(Error::InvalidFftSize { .. })),
                "size {} accepted",
                size
            );
        }
        assert!(SpectralFilter::new(1024, SAMPLE_RATE).is_ok());
    }

    #[test]
    fn unity_mask_is_transparent_after_latency() {
        let mut filter = SpectralFilter::new(512, SAMPLE_RATE).unwrap();
        let input = test_signal(8_192);
        let mut output = input.clone();
        filter.process_block(&mut output);

        let latency = filter.latency();
        assert_eq!(latency, 512);
        for i in latency..input.len() {
            let expected = input[i - latency];
            assert!(
                (output[i] - expected).abs() < 1e-4,
                "sample {}: got {} expected {}",
                i,
                output[i],
                expected
            );
        }
    }

    #[test]
    fn zero_mask_silences_once_settled() {
        let mut filter = SpectralFilter::new(256, SAMPLE_RATE).unwrap();
        filter.set_mask_smoothing(0.0);
        filter.mask_mut().fill(0.0);

        let mut buffer = test_signal(4_096);
        filter.process_block(&mut buffer);
        let tail_peak = buffer[1_024..].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(tail_peak < 1e-5, "tail peak {}", tail_peak);
    }

    #[test]
    fn zero_mix_bypasses_the_mask() {
        let mut filter = SpectralFilter::new(256, SAMPLE_RATE).unwrap();
        filter.set_mask_smoothing(0.0);
        filter.mask_mut().fill(0.0);
        filter.set_mix(0.0);

        let input = test_signal(2_048);
        let mut output = input.clone();
        filter.process_block(&mut output);
        for i in 256..input.len() {
            assert!((output[i] - input[i - 256]).abs() < 1e-4);
        }
    }

    #[test]
    fn lowpass_mask_removes_high_partial() {
        let n = 1024;
        let mut filter = SpectralFilter::new(n, SAMPLE_RATE).unwrap();
        filter.set_mask_smoothing(0.0);
        let cutoff_bin = (1_500.0 * n as f32 / SAMPLE_RATE) as usize;
        filter
            .mask_mut()
            .fill_with(|bin| if bin < cutoff_bin { 1.0 } else { 0.0 });

        let len = 16_384;
        let high: Vec<f32> = (0..len)
            .map(|i| (std::f32::consts::TAU * 6_000.0 * i as f32 / SAMPLE_RATE).sin())
            .collect();
        let mut output = high.clone();
        filter.process_block(&mut output);

        let rms = |s: &[f32]| (s.iter().map(|x| x * x).sum::<f32>() / s.len() as f32).sqrt();
        let ratio = rms(&output[4 * n..]) / rms(&high[4 * n..]);
        assert!(ratio < 0.01, "6 kHz leaked through at {}", ratio);
    }

    #[test]
    fn reset_clears_pending_output() {
        let mut filter = SpectralFilter::new(128, SAMPLE_RATE).unwrap();
        let mut buffer = test_signal(1_000);
        filter.process_block(&mut buffer);

        filter.reset();
        let mut silence = vec![0.0f32; 512];
        filter.process_block(&mut silence);
        assert!(silence.iter().all(|s| *s == 0.0));
    }
}
