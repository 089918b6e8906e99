use crate::{
    dsp::{filter::SVFilter, lfo::Lfo},
    render::RenderCtx,
    synth::settings::PhaserSettings,
};

/*
Phaser
======

    dry ──┬────────────────────────────┐
          │                            (1 - mix)
          └──→ all-pass(fc(t), Q) ──── mix ──→ (+) ──→ out
                      ↑
              fc(t) = 350 Hz + lfo(t) · depth · 1000 Hz

The all-pass flips phase by 180° at its centre frequency, so adding it back
to the dry path cancels that band. Sweeping the centre with the LFO moves
the notch up and down the spectrum. Q (feedback × 10) sets how narrow the
notch is.

The LFO is free-running and shared: it starts with the engine and keeps
going between notes.
*/

/// Resting centre frequency of the all-pass sweep.
pub const BASE_CENTRE_HZ: f32 = 350.0;
/// Sweep range in Hz at depth = 1.0.
pub const DEPTH_SCALE_HZ: f32 = 1_000.0;
/// All-pass Q at feedback = 1.0.
pub const FEEDBACK_SCALE_Q: f32 = 10.0;
/// Floor for the all-pass Q so feedback = 0 still yields a usable filter.
pub const MIN_ALLPASS_Q: f32 = 0.1;

#[derive(Debug, Clone)]
pub struct Phaser {
    lfo: Lfo,
    allpass: SVFilter,
    depth_hz: f32,
    mix: f32,
}

impl Phaser {
    pub fn new(settings: &PhaserSettings) -> Self {
        let mut phaser = Self {
            lfo: Lfo::sine(settings.rate),
            allpass: SVFilter::allpass(BASE_CENTRE_HZ),
            depth_hz: 0.0,
            mix: 0.0,
        };
        phaser.apply(settings);
        phaser
    }

    /// Live update: rate keeps the LFO phase, Q and depth change on the next
    /// sample.
    pub fn apply(&mut self, settings: &PhaserSettings) {
        self.lfo.set_rate(settings.rate);
        self.depth_hz = settings.depth * DEPTH_SCALE_HZ;
        self.allpass
            .set_q((settings.feedback * FEEDBACK_SCALE_Q).max(MIN_ALLPASS_Q));
        self.mix = settings.mix.clamp(0.0, 1.0);
    }

    /// Centre frequency for a given LFO value.
    #[inline]
    pub fn centre_for(&self, lfo: f32) -> f32 {
        BASE_CENTRE_HZ + lfo * self.depth_hz
    }

    pub fn process(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        let dry_gain = 1.0 - self.mix;
        for sample in buffer.iter_mut() {
            let lfo = self.lfo.next_sample(ctx.sample_rate);
            self.allpass.set_cutoff(self.centre_for(lfo));
            let wet = self.allpass.tick(*sample, ctx);
            *sample = dry_gain * *sample + self.mix * wet;
        }
    }

    pub fn stop(&mut self) {
        self.lfo.stop();
        self.allpass.reset();
    }

    pub fn is_running(&self) -> bool {
        self.lfo.is_running()
    }

    pub fn allpass_q(&self) -> f32 {
        self.allpass.q()
    }

    pub fn depth_hz(&self) -> f32 {
        self.depth_hz
    }
}
