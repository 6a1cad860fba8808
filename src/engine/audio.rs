use std::{sync::Arc, time::Instant};

use rtrb::{Consumer, Producer, RingBuffer};

use crate::{
    dsp::{compressor::Compressor, distortion::ShaperCurve, filter::OnePole, mix::blend_dry_wet},
    engine::{
        config::EngineConfig,
        handle::EngineHandle,
        message::{EngineEvent, EngineReport},
        params::{ParamBank, ParamId},
        voice::VoicePool,
    },
    error::Result,
    field::FieldReader,
    graph::{
        delay::PingPongDelay, distortion::DriveNode, dry_wet::DryWet, eq::ToneNode, filter::FilterNode,
        node::StereoEffect, oversample::Oversampler, stereo::DualMono,
    },
    params::{ParamUpdate, SmoothedParam, Smoother},
    resonator::ResonatorBank,
    spectral::{bin_position, SpectralFilter},
};

/*
Block Pipeline
==============

  input (process only)
    └→ DC block ─┐
                 (+) ←── voices (osc × ADSR)                        excitation
                  │
                  ├──────────────┐
                  ↓              │
           resonator bank        │  linked stereo, panned
                  ↓              │
           (resonator mix) ←─────┘
                  ↓
           SVF filter           dual mono   ← cutoff × field mean
                  ↓
           drive (oversampled)  dual mono, dry/wet
                  ↓
           tone (3 biquads)     dual mono
                  ↓
           ping-pong delay      linked stereo, dry/wet
                  ↓
           compressor           linked stereo
                  ↓
           spectral mask        dual mono   ← field column
                  ↓
           master gain ──→ left / right

Block start
-----------
1. Drain note events (wait-free SPSC queue).
2. Poll every parameter slot; changed targets are handed to the node that
   owns the smoother, so nothing jumps.
3. Read the field: its mean bends the filter cutoff, one scanned column
   becomes the spectral mask.

Host buffers longer than `max_block_size` are cut into blocks, so steps
1-3 run at least once per `max_block_size` frames. Planar buffers of
unequal length are rendered up to the shorter one and the longer one's tail
is zeroed.
*/

type DriveStage = DryWet<Oversampler<DriveNode>>;

/// Owns the whole graph. Lives on the audio thread once built.
pub struct AudioEngine {
    config: EngineConfig,

    params: Arc<ParamBank>,
    seen: [u32; ParamId::COUNT],
    events: Consumer<EngineEvent>,
    reports: Producer<EngineReport>,
    dropped_reports: u64,

    voices: VoicePool,
    adsr: [f32; 4],
    dc_block: DualMono<OnePole>,
    bank: ResonatorBank,
    resonator_mix: Smoother,
    filter: DualMono<FilterNode>,
    drive: DualMono<DriveStage>,
    tone: DualMono<ToneNode>,
    delay: PingPongDelay,
    compressor: Compressor,
    spectral: DualMono<SpectralFilter>,
    master: SmoothedParam,

    field: Option<FieldReader>,
    field_generation: u64,
    field_mean: f32,
    scan_phase: f32,
    scan_rate: f32,
    mod_depth: f32,
    cutoff_base: f32,
    cutoff_transition: Option<f32>,
    applied_cutoff: f32,

    excite_left: Vec<f32>,
    excite_right: Vec<f32>,
    voice_buf: Vec<f32>,
    gain_buf: Vec<f32>,
    bin_rows: Vec<f32>,
    mask_buf: Vec<f32>,

    frame_counter: u64,
}

impl AudioEngine {
    /// Build the graph and the control handle. All allocation happens here.
    pub fn new(config: EngineConfig) -> Result<(Self, EngineHandle)> {
        config.validate().inspect_err(|err| {
            tracing::error!(%err, "rejected engine configuration");
        })?;

        let sr = config.sample_rate;
        let params = Arc::new(ParamBank::new());
        let (event_tx, event_rx) = RingBuffer::new(config.event_capacity);
        let (report_tx, report_rx) = RingBuffer::new(config.report_capacity);

        let bank = ResonatorBank::new(config.resonators, sr, config.seed)?;
        let drive_stage = || -> Result<DriveStage> {
            let shaper = Oversampler::new(DriveNode::new(ShaperCurve::Tanh, sr), config.oversampling, sr)?;
            Ok(DryWet::new(shaper, 0.0, sr))
        };
        let drive = DualMono::new(drive_stage()?, drive_stage()?);
        let spectral = DualMono::new(
            SpectralFilter::new(config.fft_size, sr)?,
            SpectralFilter::new(config.fft_size, sr)?,
        );
        let bins = config.fft_size / 2 + 1;
        // Low frequencies at the bottom of the field
        let bin_rows = (0..bins)
            .map(|bin| 1.0 - bin_position(bin, config.fft_size, sr))
            .collect();

        let mut engine = Self {
            config,
            seen: [0; ParamId::COUNT],
            events: event_rx,
            reports: report_tx,
            dropped_reports: 0,

            voices: VoicePool::new(config.voices, config.excitation, sr, config.seed),
            adsr: [0.0; 4],
            dc_block: DualMono::from_fn(|| OnePole::dc_blocker(sr)),
            bank,
            resonator_mix: Smoother::linear(1.0, 0.02, sr),
            filter: DualMono::from_fn(|| FilterNode::lowpass(8_000.0, sr)),
            drive,
            tone: DualMono::from_fn(|| ToneNode::new(sr)),
            delay: PingPongDelay::new(config.max_delay_seconds, sr),
            compressor: Compressor::new(sr),
            spectral,
            master: SmoothedParam::new(params.shared(ParamId::MasterGain), sr),

            field: None,
            field_generation: 0,
            field_mean: 0.5,
            scan_phase: 0.0,
            scan_rate: 0.0,
            mod_depth: 0.0,
            cutoff_base: 8_000.0,
            cutoff_transition: None,
            applied_cutoff: 0.0,

            excite_left: vec![0.0; config.max_block_size],
            excite_right: vec![0.0; config.max_block_size],
            voice_buf: vec![0.0; config.max_block_size],
            gain_buf: vec![0.0; config.max_block_size],
            bin_rows,
            mask_buf: vec![1.0; bins],

            frame_counter: 0,
            params: Arc::clone(&params),
        };
        engine.apply_current_params();
        engine.reset();

        tracing::info!(
            sample_rate = sr,
            block = config.max_block_size,
            voices = config.voices,
            resonators = config.resonators,
            fft = config.fft_size,
            oversampling = config.oversampling,
            latency = engine.latency(),
            "audio engine ready"
        );

        let handle = EngineHandle::new(params, event_tx, report_rx);
        Ok((engine, handle))
    }

    /// Attach a field to modulate the mask and cutoff. Configuration time.
    pub fn with_field(mut self, reader: FieldReader) -> Self {
        self.set_field_reader(Some(reader));
        self
    }

    pub fn set_field_reader(&mut self, reader: Option<FieldReader>) {
        self.field = reader;
        self.field_generation = 0;
        if self.field.is_none() {
            self.field_mean = 0.5;
            self.mask_buf.fill(1.0);
            let mask = &self.mask_buf;
            self.spectral.for_each(|s| s.mask_mut().fill_with(|bin| mask[bin]));
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Samples from input to output (spectral frame plus oversampling filters).
    pub fn latency(&self) -> usize {
        self.drive.latency() + self.tone.latency() + self.delay.latency() + self.spectral.latency()
    }

    pub fn active_voices(&self) -> usize {
        self.voices.active_count()
    }

    /// Generation of the last field snapshot the engine mapped.
    pub fn field_generation(&self) -> u64 {
        self.field_generation
    }

    pub fn resonator_bank(&self) -> &ResonatorBank {
        &self.bank
    }

    /// Generate a block from the voices alone. Planar stereo; if the two
    /// buffers differ in length, frames past the shorter one are silenced.
    pub fn render(&mut self, left: &mut [f32], right: &mut [f32]) {
        self.run(left, right, false);
    }

    /// Use `left`/`right` as additional excitation, and write the result back.
    pub fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        self.run(left, right, true);
    }

    /// Clear every delay line, filter memory and FFT buffer and silence the
    /// voices. Parameters keep their targets and land on them immediately.
    pub fn reset(&mut self) {
        self.voices.reset();
        self.dc_block.reset();
        StereoEffect::reset(&mut self.bank);
        self.resonator_mix.snap();
        self.filter.reset();
        self.drive.reset();
        self.tone.reset();
        StereoEffect::reset(&mut self.delay);
        StereoEffect::reset(&mut self.compressor);
        self.spectral.reset();
        self.master.reset();
        self.scan_phase = 0.0;
    }

    /// Drop queued events and clear all state, so the next render starts
    /// from silence.
    pub fn stop(&mut self) {
        while self.events.pop().is_ok() {}
        self.reset();
        tracing::debug!(frames = self.frame_counter, "audio engine stopped");
    }

    fn run(&mut self, left: &mut [f32], right: &mut [f32], use_input: bool) {
        let frames = left.len().min(right.len());
        if left.len() != right.len() {
            left[frames..].fill(0.0);
            right[frames..].fill(0.0);
        }
        // One clock read per host buffer (a vDSO call on Linux); off entirely
        // when `report_overruns` is false.
        let started = self.config.report_overruns.then(Instant::now);

        let block = self.config.max_block_size;
        for (l, r) in left[..frames].chunks_mut(block).zip(right[..frames].chunks_mut(block)) {
            self.render_block(l, r, use_input);
        }

        let Some(started) = started else {
            return;
        };
        let elapsed = started.elapsed().as_secs_f32();
        let budget = frames as f32 / self.config.sample_rate;
        if frames > 0 && elapsed > budget {
            self.report(EngineReport::Overrun {
                frames,
                elapsed_us: (elapsed * 1e6) as u32,
                budget_us: (budget * 1e6) as u32,
            });
        }
    }

    fn render_block(&mut self, left: &mut [f32], right: &mut [f32], use_input: bool) {
        let n = left.len();
        self.handle_events();
        self.poll_params();
        self.update_modulation(n);

        let excite_l = &mut self.excite_left[..n];
        let excite_r = &mut self.excite_right[..n];
        if use_input {
            excite_l.copy_from_slice(left);
            excite_r.copy_from_slice(right);
            self.dc_block.process_stereo(excite_l, excite_r);
        } else {
            excite_l.fill(0.0);
            excite_r.fill(0.0);
        }

        let voice = &mut self.voice_buf[..n];
        voice.fill(0.0);
        self.voices.render_add(voice);
        for i in 0..n {
            excite_l[i] += voice[i];
            excite_r[i] += voice[i];
        }

        left.copy_from_slice(excite_l);
        right.copy_from_slice(excite_r);
        self.bank.process_stereo(left, right);
        for i in 0..n {
            let mix = self.resonator_mix.advance();
            left[i] = blend_dry_wet(excite_l[i], left[i], mix);
            right[i] = blend_dry_wet(excite_r[i], right[i], mix);
        }

        self.filter.process_stereo(left, right);
        self.drive.process_stereo(left, right);
        self.tone.process_stereo(left, right);
        self.delay.process_stereo(left, right);
        self.compressor.process_stereo(left, right);
        self.spectral.process_stereo(left, right);

        let gain = &mut self.gain_buf[..n];
        self.master.fill(gain);
        for i in 0..n {
            left[i] *= gain[i];
            right[i] *= gain[i];
        }

        self.frame_counter += n as u64;
    }

    fn handle_events(&mut self) {
        while let Ok(event) = self.events.pop() {
            match event {
                EngineEvent::NoteOn { note, velocity: 0 } | EngineEvent::NoteOff { note } => {
                    self.voices.note_off(note);
                }
                EngineEvent::NoteOn { note, velocity } => {
                    if !self.voices.note_on(note, velocity, self.frame_counter) {
                        self.report(EngineReport::VoiceStarved { note });
                    }
                }
                EngineEvent::AllNotesOff => self.voices.all_notes_off(),
                EngineEvent::Reset => self.reset(),
            }
        }
    }

    fn report(&mut self, report: EngineReport) {
        if self.dropped_reports > 0 && self.reports.slots() >= 2 {
            let dropped = EngineReport::Dropped {
                count: self.dropped_reports,
            };
            if self.reports.push(dropped).is_ok() {
                self.dropped_reports = 0;
            }
        }
        if self.reports.push(report).is_err() {
            self.dropped_reports += 1;
        }
    }

    fn poll_params(&mut self) {
        for id in ParamId::ALL {
            if id == ParamId::MasterGain {
                continue;
            }
            if let Some(update) = self.params.get(id).poll(&mut self.seen[id.index()]) {
                self.apply_param(id, update);
            }
        }
        self.master.poll();
    }

    /// Push every current target into the graph with no glide.
    fn apply_current_params(&mut self) {
        for id in ParamId::ALL {
            let shared = self.params.get(id);
            self.seen[id.index()] = shared.version();
            let update = ParamUpdate {
                target: shared.target(),
                transition: Some(0.0),
            };
            self.apply_param(id, update);
        }
        self.update_modulation(0);
    }

    fn apply_param(&mut self, id: ParamId, update: ParamUpdate) {
        let ParamUpdate { target: value, transition } = update;

        match id {
            ParamId::MasterGain => {}

            ParamId::VoiceAttack | ParamId::VoiceDecay | ParamId::VoiceSustain | ParamId::VoiceRelease => {
                let slot = id.index() - ParamId::VoiceAttack.index();
                self.adsr[slot] = value;
                let [a, d, s, r] = self.adsr;
                self.voices.set_adsr(a, d, s, r);
            }

            ParamId::ResonatorMix => update.apply(&mut self.resonator_mix),
            ParamId::ResonatorDecay => match transition {
                Some(t) => self.bank.set_decay_with_time(value, t),
                None => self.bank.set_decay(value),
            },
            ParamId::ResonatorSpread => self.bank.set_spread(value),
            ParamId::ResonatorShift => self.bank.set_shift(value),
            ParamId::ResonatorInharm => self.bank.set_inharm(value),
            ParamId::ResonatorPanWidth => self.bank.set_pan_width(value),

            ParamId::FilterCutoff => {
                self.cutoff_base = value;
                self.cutoff_transition = transition;
            }
            ParamId::FilterResonance => self.filter.for_each(|f| match transition {
                Some(t) => f.set_resonance_with_time(value, t),
                None => f.set_resonance(value),
            }),

            ParamId::DriveAmount => self.drive.for_each(|d| {
                let shaper = d.inner_mut().inner_mut();
                match transition {
                    Some(t) => shaper.set_drive_db_with_time(value, t),
                    None => shaper.set_drive_db(value),
                }
            }),
            ParamId::DriveMix => self.drive.for_each(|d| match transition {
                Some(t) => d.set_mix_with_time(value, t),
                None => d.set_mix(value),
            }),

            ParamId::ToneLowCut => self.tone.for_each(|t| match transition {
                Some(s) => t.low_cut_mut().set_frequency_with_time(value, s),
                None => t.low_cut_mut().set_frequency(value),
            }),
            ParamId::ToneMidFreq => self.tone.for_each(|t| match transition {
                Some(s) => t.mid_mut().set_frequency_with_time(value, s),
                None => t.mid_mut().set_frequency(value),
            }),
            ParamId::ToneMidGain => self.tone.for_each(|t| match transition {
                Some(s) => t.mid_mut().set_gain_db_with_time(value, s),
                None => t.mid_mut().set_gain_db(value),
            }),
            ParamId::ToneHighGain => self.tone.for_each(|t| match transition {
                Some(s) => t.high_mut().set_gain_db_with_time(value, s),
                None => t.high_mut().set_gain_db(value),
            }),

            ParamId::DelayTime => match transition {
                Some(t) => self.delay.set_time_with_glide(value, t),
                None => self.delay.set_time(value),
            },
            ParamId::DelayFeedback => match transition {
                Some(t) => self.delay.set_feedback_with_time(value, t),
                None => self.delay.set_feedback(value),
            },
            ParamId::DelayMix => match transition {
                Some(t) => self.delay.set_mix_with_time(value, t),
                None => self.delay.set_mix(value),
            },
            ParamId::DelayCross => match transition {
                Some(t) => self.delay.set_cross_with_time(value, t),
                None => self.delay.set_cross(value),
            },

            // Gain changes are already smoothed by attack/release
            ParamId::CompThreshold => self.compressor.set_threshold_db(value),
            ParamId::CompRatio => self.compressor.set_ratio(value),
            ParamId::CompAttack => self.compressor.set_attack(value),
            ParamId::CompRelease => self.compressor.set_release(value),

            ParamId::MaskMix => self.spectral.for_each(|s| s.set_mix(value)),
            ParamId::FieldScanRate => self.scan_rate = value,
            ParamId::FieldModDepth => self.mod_depth = value,
        }
    }

    /// Map the latest field snapshot onto the mask and cutoff.
    fn update_modulation(&mut self, frames: usize) {
        if let Some(reader) = self.field.as_ref() {
            let snapshot = reader.load();
            self.field_mean = snapshot.mean();

            let step = self.scan_rate * frames as f32 / self.config.sample_rate;
            let moved = step > 0.0;
            self.scan_phase = (self.scan_phase + step).fract();

            if moved || snapshot.generation() != self.field_generation {
                self.field_generation = snapshot.generation();
                let x = self.scan_phase;
                for (gain, &row) in self.mask_buf.iter_mut().zip(self.bin_rows.iter()) {
                    *gain = snapshot.sample(x, row);
                }
                let mask = &self.mask_buf;
                self.spectral.for_each(|s| s.mask_mut().fill_with(|bin| mask[bin]));
            }
        }

        // Mean 0.5 leaves the cutoff alone; 0 and 1 swing it by ±depth octaves
        let swing = self.mod_depth * (2.0 * self.field_mean - 1.0);
        let cutoff = self.cutoff_base * swing.exp2();
        if cutoff != self.applied_cutoff || self.cutoff_transition.is_some() {
            let transition = self.cutoff_transition.take();
            self.filter.for_each(|f| match transition {
                Some(t) => f.set_cutoff_with_time(cutoff, t),
                None => f.set_cutoff(cutoff),
            });
            self.applied_cutoff = cutoff;
        }
    }
}
