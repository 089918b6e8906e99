//! Shared post-mix effects: one lowpass, then the phaser.
//!
//! Effects run once on the summed voices rather than per voice, so their
//! state lives here and nowhere else. Settings land immediately; there is no
//! parameter smoothing, so a large cutoff jump mid-note can click.

pub mod phaser;

use crate::{
    dsp::filter::SVFilter,
    render::RenderCtx,
    synth::settings::{FilterSettings, PhaserSettings},
};

pub use phaser::Phaser;

/// Lowpass Q at resonance = 1.0.
pub const RESONANCE_SCALE_Q: f32 = 30.0;
/// Floor for the lowpass Q; a touch under Butterworth so resonance = 0 is
/// flat rather than degenerate.
pub const MIN_LOWPASS_Q: f32 = 0.5;

/// Map the normalised resonance control onto a filter Q.
#[inline]
pub fn resonance_to_q(resonance: f32) -> f32 {
    (resonance * RESONANCE_SCALE_Q).max(MIN_LOWPASS_Q)
}

pub struct EffectsStage {
    lowpass: SVFilter,
    phaser: Phaser,
}

impl EffectsStage {
    pub fn new(filter: &FilterSettings, phaser: &PhaserSettings) -> Self {
        let mut stage = Self {
            lowpass: SVFilter::lowpass(filter.cutoff),
            phaser: Phaser::new(phaser),
        };
        stage.apply(filter, phaser);
        stage
    }

    pub fn apply(&mut self, filter: &FilterSettings, phaser: &PhaserSettings) {
        self.lowpass.set_cutoff(filter.cutoff);
        self.lowpass.set_q(resonance_to_q(filter.resonance));
        self.phaser.apply(phaser);
    }

    /// Voices → lowpass → dry/phaser sum, in place.
    pub fn process(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        self.lowpass.render(buffer, ctx);
        self.phaser.process(buffer, ctx);
    }

    /// Halt the phaser LFO and clear filter memory.
    pub fn stop(&mut self) {
        self.phaser.stop();
        self.lowpass.reset();
    }

    pub fn lowpass(&self) -> &SVFilter {
        &self.lowpass
    }

    pub fn phaser(&self) -> &Phaser {
        &self.phaser
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::oscillator::OscillatorBlock;

    const SR: f32 = 48_000.0;

    fn peak(buffer: &[f32]) -> f32 {
        buffer[1024..].iter().fold(0.0f32, |a, s| a.max(s.abs()))
    }

    #[test]
    fn resonance_scales_by_thirty() {
        assert_eq!(resonance_to_q(1.0), 30.0);
        assert_eq!(resonance_to_q(0.5), 15.0);
        assert_eq!(resonance_to_q(0.0), MIN_LOWPASS_Q);
    }

    #[test]
    fn settings_update_applies_live() {
        let mut stage = EffectsStage::new(&FilterSettings::default(), &PhaserSettings::default());
        stage.apply(
            &FilterSettings {
                cutoff: 800.0,
                resonance: 0.2,
            },
            &PhaserSettings {
                rate: 2.0,
                depth: 0.5,
                feedback: 0.3,
                mix: 0.5,
            },
        );
        assert_eq!(stage.lowpass().cutoff(), 800.0);
        assert!((stage.lowpass().q() - 6.0).abs() < 1e-5);
        assert!((stage.phaser().depth_hz() - 500.0).abs() < 1e-3);
    }

    #[test]
    fn lowpass_darkens_before_phaser() {
        let ctx = RenderCtx::new(SR);
        let filter = FilterSettings {
            cutoff: 300.0,
            resonance: 0.0,
        };
        let mut stage = EffectsStage::new(&filter, &PhaserSettings::bypassed());

        let mut high = OscillatorBlock::sine(6_000.0).generate(4096, SR);
        stage.process(&mut high, &ctx);
        assert!(peak(&high) < 0.02, "got {}", peak(&high));
    }

    #[test]
    fn open_filter_and_bypassed_phaser_pass_signal() {
        let ctx = RenderCtx::new(SR);
        let filter = FilterSettings {
            cutoff: 20_000.0,
            resonance: 0.0,
        };
        let mut stage = EffectsStage::new(&filter, &PhaserSettings::bypassed());

        let mut tone = OscillatorBlock::sine(440.0).generate(4096, SR);
        stage.process(&mut tone, &ctx);
        assert!((peak(&tone) - 1.0).abs() < 0.02);
    }
}
