use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::params::{AtomicParam, ParamSpec};

/// Every parameter the engine exposes to the control thread.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum ParamId {
    MasterGain,

    VoiceAttack,
    VoiceDecay,
    VoiceSustain,
    VoiceRelease,

    ResonatorMix,
    ResonatorDecay,
    ResonatorSpread,
    ResonatorShift,
    ResonatorInharm,
    ResonatorPanWidth,

    FilterCutoff,
    FilterResonance,

    DriveAmount,
    DriveMix,

    ToneLowCut,
    ToneMidFreq,
    ToneMidGain,
    ToneHighGain,

    DelayTime,
    DelayFeedback,
    DelayMix,
    DelayCross,

    CompThreshold,
    CompRatio,
    CompAttack,
    CompRelease,

    MaskMix,
    FieldScanRate,
    FieldModDepth,
}

impl ParamId {
    pub const COUNT: usize = 30;

    pub const ALL: [ParamId; Self::COUNT] = [
        ParamId::MasterGain,
        ParamId::VoiceAttack,
        ParamId::VoiceDecay,
        ParamId::VoiceSustain,
        ParamId::VoiceRelease,
        ParamId::ResonatorMix,
        ParamId::ResonatorDecay,
        ParamId::ResonatorSpread,
        ParamId::ResonatorShift,
        ParamId::ResonatorInharm,
        ParamId::ResonatorPanWidth,
        ParamId::FilterCutoff,
        ParamId::FilterResonance,
        ParamId::DriveAmount,
        ParamId::DriveMix,
        ParamId::ToneLowCut,
        ParamId::ToneMidFreq,
        ParamId::ToneMidGain,
        ParamId::ToneHighGain,
        ParamId::DelayTime,
        ParamId::DelayFeedback,
        ParamId::DelayMix,
        ParamId::DelayCross,
        ParamId::CompThreshold,
        ParamId::CompRatio,
        ParamId::CompAttack,
        ParamId::CompRelease,
        ParamId::MaskMix,
        ParamId::FieldScanRate,
        ParamId::FieldModDepth,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// Range, default and glide of each parameter.
    pub fn spec(self) -> ParamSpec {
        match self {
            ParamId::MasterGain => ParamSpec::new("master_gain", 0.0, 2.0, 0.8),

            ParamId::VoiceAttack => ParamSpec::new("voice_attack", 0.0005, 5.0, 0.002),
            ParamId::VoiceDecay => ParamSpec::new("voice_decay", 0.001, 5.0, 0.06),
            ParamId::VoiceSustain => ParamSpec::new("voice_sustain", 0.0, 1.0, 0.0),
            ParamId::VoiceRelease => ParamSpec::new("voice_release", 0.001, 10.0, 0.05),

            ParamId::ResonatorMix => ParamSpec::new("resonator_mix", 0.0, 1.0, 1.0),
            // Seconds to ring down by 60 dB
            ParamId::ResonatorDecay => ParamSpec::new("resonator_decay", 0.01, 10.0, 1.5).linear(0.05),
            ParamId::ResonatorSpread => ParamSpec::new("resonator_spread", 0.0, 1.0, 0.5),
            // Semitones
            ParamId::ResonatorShift => ParamSpec::new("resonator_shift", -24.0, 24.0, 0.0),
            ParamId::ResonatorInharm => ParamSpec::new("resonator_inharm", 0.0, 1.0, 0.0),
            ParamId::ResonatorPanWidth => ParamSpec::new("resonator_pan_width", 0.0, 1.0, 0.5),

            ParamId::FilterCutoff => ParamSpec::new("filter_cutoff", 20.0, 20_000.0, 8_000.0).exponential(0.01),
            ParamId::FilterResonance => ParamSpec::new("filter_resonance", 0.0, 0.95, 0.2),

            // dB of gain into the shaper
            ParamId::DriveAmount => ParamSpec::new("drive_amount", 0.0, 40.0, 6.0),
            ParamId::DriveMix => ParamSpec::new("drive_mix", 0.0, 1.0, 0.5),

            ParamId::ToneLowCut => ParamSpec::new("tone_low_cut", 20.0, 1_000.0, 20.0).exponential(0.02),
            ParamId::ToneMidFreq => ParamSpec::new("tone_mid_freq", 100.0, 10_000.0, 1_000.0).exponential(0.02),
            // dB
            ParamId::ToneMidGain => ParamSpec::new("tone_mid_gain", -18.0, 18.0, 0.0),
            ParamId::ToneHighGain => ParamSpec::new("tone_high_gain", -18.0, 18.0, 0.0),

            ParamId::DelayTime => ParamSpec::new("delay_time", 0.001, 4.0, 0.3).linear(0.1),
            ParamId::DelayFeedback => ParamSpec::new("delay_feedback", 0.0, 0.95, 0.35),
            ParamId::DelayMix => ParamSpec::new("delay_mix", 0.0, 1.0, 0.25),
            // 0 = independent stereo echoes, 1 = full ping-pong
            ParamId::DelayCross => ParamSpec::new("delay_cross", 0.0, 1.0, 1.0),

            ParamId::CompThreshold => ParamSpec::new("comp_threshold", -60.0, 0.0, -12.0),
            ParamId::CompRatio => ParamSpec::new("comp_ratio", 1.0, 20.0, 4.0),
            ParamId::CompAttack => ParamSpec::new("comp_attack", 0.0001, 0.5, 0.005),
            ParamId::CompRelease => ParamSpec::new("comp_release", 0.005, 2.0, 0.1),

            ParamId::MaskMix => ParamSpec::new("mask_mix", 0.0, 1.0, 0.0),
            // Field columns scanned per second
            ParamId::FieldScanRate => ParamSpec::new("field_scan_rate", 0.0, 4.0, 0.05),
            // Octaves of cutoff swing at full field mean
            ParamId::FieldModDepth => ParamSpec::new("field_mod_depth", 0.0, 4.0, 0.0),
        }
    }

    pub fn from_name(name: &str) -> Option<ParamId> {
        Self::ALL.iter().copied().find(|id| id.name() == name)
    }
}

/// One shared target slot per [`ParamId`], indexed by `id.index()`.
#[derive(Debug)]
pub struct ParamBank {
    params: Vec<Arc<AtomicParam>>,
}

impl ParamBank {
    pub fn new() -> Self {
        Self {
            params: ParamId::ALL
                .iter()
                .map(|id| Arc::new(AtomicParam::new(id.spec())))
                .collect(),
        }
    }

    #[inline]
    pub fn get(&self, id: ParamId) -> &AtomicParam {
        &self.params[id.index()]
    }

    /// Owned handle, for a [`SmoothedParam`](crate::params::SmoothedParam).
    pub fn shared(&self, id: ParamId) -> Arc<AtomicParam> {
        Arc::clone(&self.params[id.index()])
    }
}

impl Default for ParamBank {
    fn default() -> Self {
        Self::new()
    }
}
