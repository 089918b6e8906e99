use crate::{
    dsp::{envelope::Envelope, oscillator::OscillatorBlock, EnvelopeState},
    render::{midi_note_to_freq, RenderCtx},
    synth::settings::{OscSettings, Settings},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Active,    // Playing, envelopes in attack/decay/sustain
    Releasing, // Key released, envelopes in release phase
    Finished,  // Both envelopes idle, slot can be reclaimed
}

/// One oscillator + envelope pair with its own copy of the settings.
#[derive(Debug, Clone, Copy)]
pub struct SubVoice {
    osc: OscillatorBlock,
    env: Envelope,
    gain: f32,
}

impl SubVoice {
    fn new(settings: &OscSettings, frequency: f32) -> Self {
        let e = settings.envelope;
        Self {
            osc: OscillatorBlock::new(settings.wave_type, frequency),
            env: Envelope::adsr(e.attack, e.decay, e.sustain, e.release),
            gain: settings.gain,
        }
    }

    /// Swap in new settings while keeping oscillator phase and envelope
    /// level, so the next attack ramps from where this one was.
    fn retune(&mut self, settings: &OscSettings, frequency: f32) {
        let e = settings.envelope;
        self.osc.wave_type = settings.wave_type;
        self.osc.set_frequency(frequency);
        self.env.set_adsr(e.attack, e.decay, e.sustain, e.release);
        self.gain = settings.gain;
    }

    #[inline]
    fn next_sample(&mut self, ctx: &RenderCtx) -> f32 {
        let sample = self.osc.next_sample(ctx.sample_rate);
        let level = self.env.next_sample(ctx);
        sample * level * self.gain
    }

    pub fn envelope_level(&self) -> f32 {
        self.env.level()
    }

    pub fn envelope_state(&self) -> EnvelopeState {
        self.env.state()
    }

    pub fn release_remaining(&self) -> u32 {
        self.env.release_remaining()
    }
}

/// A single sounding note: two independently shaped sub-voices.
///
/// The voice copies the settings it was started with; later settings
/// updates never touch a voice that is already playing.
#[derive(Debug, Clone, Copy)]
pub struct Voice {
    note: u8,
    frequency: f32,
    state: VoiceState,
    osc1: SubVoice,
    osc2: SubVoice,
    started_at: u64,
    released_at: Option<u64>,
}

impl Voice {
    pub fn start(note: u8, settings: &Settings, now: u64, ctx: &RenderCtx) -> Self {
        let frequency = midi_note_to_freq(note);
        let mut voice = Self {
            note,
            frequency,
            state: VoiceState::Active,
            osc1: SubVoice::new(&settings.osc1, frequency),
            osc2: SubVoice::new(&settings.osc2, frequency),
            started_at: now,
            released_at: None,
        };
        voice.osc1.env.note_on(ctx);
        voice.osc2.env.note_on(ctx);
        voice
    }

    /// Same note pressed again: take the current settings and restart both
    /// envelopes from their present level.
    pub fn retrigger(&mut self, settings: &Settings, now: u64, ctx: &RenderCtx) {
        self.osc1.retune(&settings.osc1, self.frequency);
        self.osc2.retune(&settings.osc2, self.frequency);
        self.osc1.env.note_on(ctx);
        self.osc2.env.note_on(ctx);
        self.state = VoiceState::Active;
        self.started_at = now;
        self.released_at = None;
    }

    /// Key up. Each sub-voice releases over its own release time.
    pub fn release(&mut self, now: u64, ctx: &RenderCtx) {
        if self.state != VoiceState::Active {
            return;
        }
        self.state = VoiceState::Releasing;
        self.released_at = Some(now);
        self.osc1.env.note_off(ctx);
        self.osc2.env.note_off(ctx);
        self.update_finished();
    }

    /// Render into `out` (overwrites). Returns false if the voice produced a
    /// non-finite sample; the caller should drop it.
    pub fn render(&mut self, out: &mut [f32], ctx: &RenderCtx) -> bool {
        let mut healthy = true;
        for sample in out.iter_mut() {
            let s = self.osc1.next_sample(ctx) + self.osc2.next_sample(ctx);
            healthy &= s.is_finite();
            *sample = s;
        }

        self.update_finished();
        healthy
    }

    fn update_finished(&mut self) {
        if self.state == VoiceState::Releasing
            && !self.osc1.env.is_active()
            && !self.osc2.env.is_active()
        {
            self.state = VoiceState::Finished;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state == VoiceState::Finished
    }

    pub fn note(&self) -> u8 {
        self.note
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn started_at(&self) -> u64 {
        self.started_at
    }

    pub fn released_at(&self) -> Option<u64> {
        self.released_at
    }

    pub fn osc1(&self) -> &SubVoice {
        &self.osc1
    }

    pub fn osc2(&self) -> &SubVoice {
        &self.osc2
    }
}
