use crate::render::RenderCtx;

/*
ADSR Envelope Implementation
============================

This module implements a linear ADSR envelope generator - the workhorse of
synthesizer amplitude control.

Vocabulary
----------

  level       The envelope's current output value (0.0 to 1.0). This multiplies
              the audio signal to control its amplitude over time.

  stage       Which phase of the envelope we're in: Idle, Attack, Decay,
              Sustain, or Release. A state machine governs transitions.

  gate        The note on/off signal. Gate high (note_on) triggers Attack.
              Gate low (note_off) triggers Release from wherever we are.

  ramp        A straight line from `start_level` to a target level spanning
              `total` samples. Attack, Decay and Release are all ramps.


The Shape: Linear Ramps
-----------------------

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release
         (A)   (D)      (S)      (R)


Ramps Are Counted, Not Accumulated
----------------------------------

Every ramp snapshots its starting level and its length in samples when it
begins, then interpolates:

    level = start + (target - start) * elapsed / total

Nothing is summed sample by sample, so there is no float drift and each
stage ends after exactly `total` samples. A release of 0.2 s at 48 kHz is
over after 9600 samples no matter how small the level got on the way.
Voice expiry is driven by that count, not by comparing the level to an
epsilon.

A zero-length stage completes immediately: attack = 0 jumps to 1.0, and
decay = 0 drops straight to the sustain level.


The State Machine
-----------------

    ┌──────┐  note_on   ┌────────┐  ramp done ┌───────┐  ramp done ┌─────────┐
    │ Idle │ ─────────→ │ Attack │ ─────────→ │ Decay │ ─────────→ │ Sustain │
    └──────┘            └────────┘            └───────┘            └─────────┘
        ↑                    │ note_off           │ note_off            │ note_off
        │                    ↓                    ↓                     ↓
        │  ramp done    ┌─────────────────────────────────────────────────┐
        └────────────── │                     Release                     │
                        └─────────────────────────────────────────────────┘

note_off triggers Release from ANY active stage and always starts from the
CURRENT level. note_on likewise starts the attack from the current level, so
retriggering a sounding envelope never jumps.
*/

/// The current stage of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,    // Gate low, envelope inactive, level = 0
    Attack,  // Gate just went high, ramping up to 1.0
    Decay,   // Reached peak, ramping down to sustain level
    Sustain, // Holding at sustain level while gate is high
    Release, // Gate went low, ramping down to 0
}

#[derive(Debug, Clone, Copy)]
pub struct Envelope {
    // ADSR parameters (define the envelope shape)
    attack_time: f32,   // seconds to ramp current → 1
    decay_time: f32,    // seconds to ramp 1 → sustain
    sustain_level: f32, // level to hold (0.0 - 1.0)
    release_time: f32,  // seconds to ramp current → 0

    // Runtime state (changes every sample)
    stage: EnvelopeState,
    level: f32,

    // Active ramp bookkeeping
    start_level: f32,
    elapsed: u32,
    total: u32,
}

impl Envelope {
    pub fn new() -> Self {
        Self::adsr(0.01, 0.1, 0.7, 0.3)
    }

    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack_time: attack.max(0.0),
            decay_time: decay.max(0.0),
            sustain_level: sustain.clamp(0.0, 1.0),
            release_time: release.max(0.0),

            stage: EnvelopeState::Idle,
            level: 0.0,
            start_level: 0.0,
            elapsed: 0,
            total: 0,
        }
    }

    /// Replace the shape without touching stage or level.
    ///
    /// Takes effect from the next stage transition onwards.
    pub fn set_adsr(&mut self, attack: f32, decay: f32, sustain: f32, release: f32) {
        self.attack_time = attack.max(0.0);
        self.decay_time = decay.max(0.0);
        self.sustain_level = sustain.clamp(0.0, 1.0);
        self.release_time = release.max(0.0);
    }

    /// Gate high: ramp from the current level up to 1.0.
    pub fn note_on(&mut self, ctx: &RenderCtx) {
        self.enter(EnvelopeState::Attack, ctx);
    }

    /// Gate low: start the release phase from current level.
    pub fn note_off(&mut self, ctx: &RenderCtx) {
        if matches!(self.stage, EnvelopeState::Idle | EnvelopeState::Release) {
            return;
        }
        self.enter(EnvelopeState::Release, ctx);
    }

    fn enter(&mut self, stage: EnvelopeState, ctx: &RenderCtx) {
        self.stage = stage;
        self.start_level = self.level;
        self.elapsed = 0;
        self.total = match stage {
            EnvelopeState::Attack => ctx.samples_for(self.attack_time),
            EnvelopeState::Decay => ctx.samples_for(self.decay_time),
            EnvelopeState::Release => ctx.samples_for(self.release_time),
            EnvelopeState::Idle | EnvelopeState::Sustain => 0,
        };

        // Zero-length ramps resolve on the spot
        if self.total == 0 {
            match stage {
                EnvelopeState::Attack => {
                    self.level = 1.0;
                    self.enter(EnvelopeState::Decay, ctx);
                }
                EnvelopeState::Decay => {
                    self.level = self.sustain_level;
                    self.stage = EnvelopeState::Sustain;
                }
                EnvelopeState::Release => {
                    self.level = 0.0;
                    self.stage = EnvelopeState::Idle;
                }
                EnvelopeState::Idle => self.level = 0.0,
                EnvelopeState::Sustain => self.level = self.sustain_level,
            }
        }
    }

    #[inline]
    fn ramp_to(&mut self, target: f32) -> bool {
        self.elapsed = self.elapsed.saturating_add(1);
        let progress = self.elapsed as f32 / self.total as f32;
        self.level = self.start_level + (target - self.start_level) * progress;
        self.elapsed >= self.total
    }

    /// Advance the envelope by one sample and return the new level.
    pub fn next_sample(&mut self, ctx: &RenderCtx) -> f32 {
        match self.stage {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }

            EnvelopeState::Attack => {
                if self.ramp_to(1.0) {
                    self.level = 1.0;
                    self.enter(EnvelopeState::Decay, ctx);
                }
            }

            EnvelopeState::Decay => {
                if self.ramp_to(self.sustain_level) {
                    self.level = self.sustain_level;
                    self.stage = EnvelopeState::Sustain;
                }
            }

            EnvelopeState::Sustain => {
                // Hold at sustain level until gate goes low
                self.level = self.sustain_level;
            }

            EnvelopeState::Release => {
                if self.ramp_to(0.0) {
                    self.level = 0.0;
                    self.stage = EnvelopeState::Idle;
                }
            }
        }

        self.level = self.level.clamp(0.0, 1.0);
        self.level
    }

    /// Render a block of envelope values into the buffer.
    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(ctx);
        }
    }

    /// Returns true if the envelope is producing output (not idle).
    pub fn is_active(&self) -> bool {
        !matches!(self.stage, EnvelopeState::Idle)
    }

    /// Reset to idle state.
    pub fn reset(&mut self) {
        self.stage = EnvelopeState::Idle;
        self.level = 0.0;
        self.start_level = 0.0;
        self.elapsed = 0;
        self.total = 0;
    }

    /// Get the current envelope level (0.0 to 1.0)
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Get the current envelope stage
    pub fn state(&self) -> EnvelopeState {
        self.stage
    }

    /// Samples left until the release ramp reaches zero (0 outside Release).
    pub fn release_remaining(&self) -> u32 {
        match self.stage {
            EnvelopeState::Release => self.total - self.elapsed,
            _ => 0,
        }
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}
