use crate::{
    dsp::{
        envelope::Envelope,
        oscillator::{Oscillator, Waveform},
    },
    midi_to_freq,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Free,      // Available for allocation
    Active,    // Gate held, envelope in attack/decay/sustain
    Releasing, // Gate released, envelope in release
}

/// One excitation source: an oscillator gated by an ADSR.
///
/// The voice does not make the final sound. Its output excites the resonator
/// bank, so a short noise burst ("pluck") is the typical patch.
#[derive(Debug, Clone)]
pub struct Voice {
    note: u8,
    gain: f32,
    state: VoiceState,
    age: u64,
    osc: Oscillator,
    env: Envelope,
}

impl Voice {
    pub fn new(waveform: Waveform, sample_rate: f32, seed: u64) -> Self {
        Self {
            note: 0,
            gain: 0.0,
            state: VoiceState::Free,
            age: 0,
            osc: Oscillator::new(waveform, sample_rate, seed),
            env: Envelope::new(sample_rate),
        }
    }

    pub fn start(&mut self, note: u8, velocity: u8, age: u64) {
        self.note = note;
        self.gain = velocity.min(127) as f32 / 127.0;
        self.state = VoiceState::Active;
        self.age = age;

        self.osc.set_frequency(midi_to_freq(note as f32));
        self.osc.retrigger();
        self.env.note_on();
    }

    pub fn release(&mut self) {
        if self.state == VoiceState::Active {
            self.state = VoiceState::Releasing;
            self.env.note_off();
        }
    }

    pub fn set_adsr(&mut self, attack: f32, decay: f32, sustain: f32, release: f32) {
        self.env.set_adsr(attack, decay, sustain, release);
    }

    /// Add this voice's output to `out`.
    pub fn render_add(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample += self.osc.next_sample() * self.env.next_sample() * self.gain;
        }

        // Free once a gated-off envelope (or a zero-sustain one) has finished
        if !self.env.is_active() {
            self.free();
        }
    }

    pub fn free(&mut self) {
        self.state = VoiceState::Free;
        self.note = 0;
        self.gain = 0.0;
    }

    pub fn reset(&mut self) {
        self.free();
        self.env.reset();
        self.osc.reset();
    }

    pub fn is_free(&self) -> bool {
        self.state == VoiceState::Free
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, VoiceState::Active | VoiceState::Releasing)
    }

    pub fn note(&self) -> u8 {
        self.note
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }
}

/// Fixed pool of voices with oldest-releasing voice stealing.
#[derive(Debug, Clone)]
pub struct VoicePool {
    voices: Vec<Voice>,
}

impl VoicePool {
    pub fn new(count: usize, waveform: Waveform, sample_rate: f32, seed: u64) -> Self {
        let voices = (0..count)
            .map(|i| Voice::new(waveform, sample_rate, seed.wrapping_add(i as u64)))
            .collect();
        Self { voices }
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn active_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    /// Start `note`. Returns false when every voice is held.
    pub fn note_on(&mut self, note: u8, velocity: u8, age: u64) -> bool {
        match self.allocate() {
            Some(voice) => {
                voice.start(note, velocity, age);
                true
            }
            None => false,
        }
    }

    pub fn note_off(&mut self, note: u8) {
        if let Some(voice) = self
            .voices
            .iter_mut()
            .find(|v| v.note() == note && v.state() == VoiceState::Active)
        {
            voice.release();
        }
    }

    pub fn all_notes_off(&mut self) {
        for voice in &mut self.voices {
            voice.release();
        }
    }

    pub fn set_adsr(&mut self, attack: f32, decay: f32, sustain: f32, release: f32) {
        for voice in &mut self.voices {
            voice.set_adsr(attack, decay, sustain, release);
        }
    }

    /// Sum every sounding voice into `out` (which is added to, not cleared).
    pub fn render_add(&mut self, out: &mut [f32]) {
        for voice in &mut self.voices {
            if voice.is_active() {
                voice.render_add(out);
            }
        }
    }

    pub fn reset(&mut self) {
        for voice in &mut self.voices {
            voice.reset();
        }
    }

    fn allocate(&mut self) -> Option<&mut Voice> {
        // First pass: find free voice index
        if let Some(idx) = self.voices.iter().position(|v| v.is_free()) {
            return Some(&mut self.voices[idx]);
        }

        // Second pass: steal oldest releasing voice
        let steal_idx = self
            .voices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.state() == VoiceState::Releasing)
            .min_by_key(|(_, v)| v.age())
            .map(|(idx, _)| idx);

        steal_idx.map(|idx| &mut self.voices[idx])
    }
}
