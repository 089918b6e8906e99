use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use rtrb::Consumer;

use crate::{
    analysis::TapWriter,
    effects::EffectsStage,
    error::{Result, SynthError},
    render::RenderCtx,
    synth::{
        master::MasterBus,
        message::SynthMessage,
        settings::Settings,
        voice::{Voice, VoiceState},
    },
    MAX_BLOCK_SIZE, MAX_NOTE,
};

/// Number of voice slots: one per MIDI note.
pub const VOICE_SLOTS: usize = MAX_NOTE as usize + 1;

/*
Render Pipeline
===============

    control ring ──→ drain messages (note on/off, settings, volume)
                                   │
    voice[0..128] ──→ Σ ──→ lowpass ──→ dry/phaser ──→ master gain ──→ out
                                                                   └──→ analysis window

One slot per note number, so note lookup is an index and a retriggered note
reuses its slot. Slots hold plain `Copy` data: starting, finishing and
replacing voices never allocates on the audio thread.

Time is the sample clock (`frame_counter`). Voices expire when their
release ramps have run their sample count, checked after every render.
*/

pub struct PolySynth {
    ctx: RenderCtx,
    settings: Settings,
    voices: Vec<Option<Voice>>,
    effects: EffectsStage,
    master: MasterBus,
    rx: Option<Consumer<SynthMessage>>,
    tap: Option<TapWriter>,
    stop: Arc<AtomicBool>,
    halted: bool,
    temp_buffer: Vec<f32>,
    frame_counter: u64,
}

impl PolySynth {
    /// Standalone renderer driven only through its own methods.
    pub fn new(sample_rate: f32, settings: Settings) -> Self {
        Self {
            ctx: RenderCtx::new(sample_rate),
            settings,
            voices: vec![None; VOICE_SLOTS],
            effects: EffectsStage::new(&settings.filter, &settings.phaser),
            master: MasterBus::default(),
            rx: None,
            tap: None,
            stop: Arc::new(AtomicBool::new(false)),
            halted: false,
            temp_buffer: vec![0.0; MAX_BLOCK_SIZE],
            frame_counter: 0,
        }
    }

    /// Receive control messages from `rx` at the start of every block.
    pub fn with_messages(mut self, rx: Consumer<SynthMessage>) -> Self {
        self.rx = Some(rx);
        self
    }

    /// Publish every rendered chunk to the analysis window.
    pub fn with_tap(mut self, tap: TapWriter) -> Self {
        self.tap = Some(tap);
        self
    }

    /// Share a stop flag with a control handle.
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = stop;
        self
    }

    pub fn with_master(mut self, master: MasterBus) -> Self {
        self.master = master;
        self
    }

    pub fn render_block(&mut self, out: &mut [f32]) {
        if self.stop.load(Ordering::Acquire) {
            self.halt();
        }
        if self.halted {
            out.fill(0.0);
            return;
        }

        self.drain_messages();

        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            self.render_chunk(chunk);
        }
    }

    fn render_chunk(&mut self, out: &mut [f32]) {
        let ctx = self.ctx;

        // Mix voices
        out.fill(0.0);
        for slot in self.voices.iter_mut() {
            let Some(voice) = slot else { continue };

            let temp = &mut self.temp_buffer[..out.len()];
            if !voice.render(temp, &ctx) {
                // Bad voice: drop it, keep the stream
                *slot = None;
                continue;
            }
            for (o, v) in out.iter_mut().zip(temp.iter()) {
                *o += v;
            }
            if voice.is_finished() {
                *slot = None;
            }
        }

        self.effects.process(out, &ctx);
        self.master.process(out);

        if let Some(tap) = self.tap.as_mut() {
            tap.write(out);
        }

        self.frame_counter += out.len() as u64;
    }

    fn drain_messages(&mut self) {
        while let Some(msg) = self.rx.as_mut().and_then(|rx| rx.pop().ok()) {
            self.handle(msg);
        }
    }

    fn handle(&mut self, msg: SynthMessage) {
        // Messages were validated on the control side. A note error only means
        // "nothing to do"; a settings error is a bug upstream.
        let _ = match msg {
            SynthMessage::NoteOn { note } => self.note_on(note),
            SynthMessage::NoteOff { note } => self.note_off(note),
            SynthMessage::UpdateSettings(settings) => {
                let result = self.update_settings(settings);
                debug_assert!(result.is_ok(), "unvalidated settings reached the renderer");
                result
            }
            SynthMessage::SetMasterVolume(volume) => {
                self.set_master_volume(volume);
                Ok(())
            }
            SynthMessage::AllNotesOff => {
                self.all_notes_off();
                Ok(())
            }
        };
    }

    /// Start (or retrigger) the voice for `note` with the current settings.
    pub fn note_on(&mut self, note: u8) -> Result<()> {
        if note > MAX_NOTE {
            return Err(SynthError::InvalidNote { note });
        }
        let now = self.frame_counter;
        let ctx = self.ctx;
        let slot = &mut self.voices[note as usize];
        if let Some(voice) = slot.as_mut() {
            voice.retrigger(&self.settings, now, &ctx);
        } else {
            *slot = Some(Voice::start(note, &self.settings, now, &ctx));
        }
        Ok(())
    }

    /// Release the voice for `note`.
    pub fn note_off(&mut self, note: u8) -> Result<()> {
        let now = self.frame_counter;
        let ctx = self.ctx;
        match self.voices.get_mut(note as usize) {
            Some(Some(voice)) if voice.state() == VoiceState::Active => {
                voice.release(now, &ctx);
                if voice.is_finished() {
                    self.voices[note as usize] = None;
                }
                Ok(())
            }
            _ => Err(SynthError::NoActiveVoice { note }),
        }
    }

    pub fn all_notes_off(&mut self) {
        let now = self.frame_counter;
        let ctx = self.ctx;
        for slot in self.voices.iter_mut() {
            if let Some(voice) = slot {
                voice.release(now, &ctx);
                if voice.is_finished() {
                    *slot = None;
                }
            }
        }
    }

    /// Replace the settings snapshot. Sounding voices keep their own copy.
    pub fn update_settings(&mut self, settings: Settings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        self.effects.apply(&settings.filter, &settings.phaser);
        Ok(())
    }

    pub fn set_master_volume(&mut self, volume: f32) {
        self.master.set_gain(volume);
    }

    /// Stop every voice and the phaser LFO. Further blocks are silent.
    pub fn halt(&mut self) {
        if self.halted {
            return;
        }
        self.voices.fill(None);
        self.effects.stop();
        self.halted = true;
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Render `seconds` of audio into a fresh buffer.
    pub fn render_offline(&mut self, seconds: f32) -> Vec<f32> {
        let mut out = vec![0.0; self.ctx.samples_for(seconds) as usize];
        self.render_block(&mut out);
        out
    }

    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_some()).count()
    }

    pub fn voice(&self, note: u8) -> Option<&Voice> {
        self.voices.get(note as usize).and_then(|v| v.as_ref())
    }

    pub fn voice_state(&self, note: u8) -> Option<VoiceState> {
        self.voice(note).map(|v| v.state())
    }

    pub fn sample_clock(&self) -> u64 {
        self.frame_counter
    }

    pub fn sample_rate(&self) -> f32 {
        self.ctx.sample_rate
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn master_volume(&self) -> f32 {
        self.master.gain()
    }

    pub fn effects(&self) -> &EffectsStage {
        &self.effects
    }
}
