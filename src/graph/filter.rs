use crate::{
    dsp::filter::{FilterType, OnePole, SVFilter, MAX_RESONANCE},
    graph::node::Effect,
    params::Smoother,
};

/// Samples between coefficient updates while cutoff or resonance glide.
const COEFF_INTERVAL: usize = 16;

/// State-variable filter with smoothed cutoff and resonance.
///
/// Cutoff glides exponentially (it is perceived logarithmically, and the
/// one-pole shape spends most of its time near the target), resonance
/// linearly. Coefficients involve a `tan`, so while either smoother is moving
/// they are refreshed every `COEFF_INTERVAL` samples rather than per sample.
#[derive(Debug, Clone)]
pub struct FilterNode {
    filter: SVFilter,
    cutoff: Smoother,
    resonance: Smoother,
    countdown: usize,
}

impl FilterNode {
    pub fn new(filter_type: FilterType, cutoff_hz: f32, sample_rate: f32) -> Self {
        let mut filter = SVFilter::new(filter_type, sample_rate);
        filter.set_cutoff(cutoff_hz);
        let cutoff_hz = filter.cutoff();

        Self {
            filter,
            cutoff: Smoother::exponential(cutoff_hz, 0.01, sample_rate),
            resonance: Smoother::linear(0.0, 0.02, sample_rate),
            countdown: 0,
        }
    }

    pub fn lowpass(cutoff_hz: f32, sample_rate: f32) -> Self {
        Self::new(FilterType::LowPass, cutoff_hz, sample_rate)
    }

    pub fn highpass(cutoff_hz: f32, sample_rate: f32) -> Self {
        Self::new(FilterType::HighPass, cutoff_hz, sample_rate)
    }

    pub fn bandpass(cutoff_hz: f32, sample_rate: f32) -> Self {
        Self::new(FilterType::BandPass, cutoff_hz, sample_rate)
    }

    pub fn with_resonance(mut self, resonance: f32) -> Self {
        self.resonance.reset_to(resonance);
        self.filter.set_resonance(resonance);
        self
    }

    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        self.cutoff.set_target(cutoff_hz);
    }

    pub fn set_cutoff_with_time(&mut self, cutoff_hz: f32, seconds: f32) {
        self.cutoff.set_target_with_time(cutoff_hz, seconds);
    }

    pub fn set_resonance(&mut self, resonance: f32) {
        self.resonance.set_target(resonance);
    }

    pub fn set_resonance_with_time(&mut self, resonance: f32, seconds: f32) {
        self.resonance.set_target_with_time(resonance, seconds);
    }

    pub fn set_filter_type(&mut self, filter_type: FilterType) {
        self.filter.set_filter_type(filter_type);
    }

    /// Cutoff currently in effect (after smoothing and clamping).
    pub fn cutoff(&self) -> f32 {
        self.filter.cutoff()
    }

    /// Targets outside the filter's range settle on the clamped value, so the
    /// comparison is against what the setters would apply.
    #[inline]
    fn is_stale(&self) -> bool {
        self.filter.cutoff() != self.filter.clamp_cutoff(self.cutoff.value())
            || self.filter.resonance() != self.resonance.value().clamp(0.0, MAX_RESONANCE)
    }

    #[inline]
    fn refresh(&mut self) {
        if self.countdown == 0 {
            if self.cutoff.is_active() || self.resonance.is_active() {
                let cutoff = self.cutoff.skip(COEFF_INTERVAL);
                let resonance = self.resonance.skip(COEFF_INTERVAL);
                self.filter.set_cutoff(cutoff);
                self.filter.set_resonance(resonance);
            } else if self.is_stale() {
                self.filter.set_cutoff(self.cutoff.value());
                self.filter.set_resonance(self.resonance.value());
            }
            self.countdown = COEFF_INTERVAL;
        }
        self.countdown -= 1;
    }
}

impl Effect for FilterNode {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        self.refresh();
        self.filter.process(input)
    }

    fn reset(&mut self) {
        self.filter.reset();
        self.cutoff.snap();
        self.resonance.snap();
        self.filter.set_cutoff(self.cutoff.value());
        self.filter.set_resonance(self.resonance.value());
        self.countdown = 0;
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.filter.set_sample_rate(sample_rate);
        self.cutoff.set_sample_rate(sample_rate);
        self.resonance.set_sample_rate(sample_rate);
    }
}

impl Effect for OnePole {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        OnePole::process(self, input)
    }

    fn reset(&mut self) {
        OnePole::reset(self);
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        OnePole::set_sample_rate(self, sample_rate);
    }
}
