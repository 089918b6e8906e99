use std::f32::consts::TAU;

use crate::render::RenderCtx;

/*
State-Variable Filter
=====================

A trapezoidal-integrated (topology-preserving) SVF. It is a second-order IIR
filter like an RBJ biquad, but it keeps its state in two integrators instead
of raw delay lines, so cutoff and Q can change every sample without the
zipper noise or blow-ups a direct-form biquad shows under modulation.

  g = tan(π·fc/sr)          prewarped integrator gain
  k = 1/Q                   damping

| response | tap                  | passes          | phase              |
| -------- | -------------------- | --------------- | ------------------ |
| low-pass | v2                   | below cutoff    | 0 → -180°          |
| all-pass | x − 2·k·v1           | everything      | 0 → -360° around fc|

The all-pass keeps magnitude flat and rotates phase; summing it back with
the dry signal carves the moving notches a phaser is made of.
*/

/// Lowest Q accepted; below this the damping term explodes.
pub const MIN_Q: f32 = 0.05;

/// Integrator state below this is flushed to zero. A decaying tail would
/// otherwise sink into subnormal floats, which are slow on most CPUs.
const DENORMAL_FLOOR: f32 = 1e-20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    LowPass,
    AllPass,
}

pub struct FilterOutputs {
    pub lowpass: f32,
    pub allpass: f32,
}

#[derive(Debug, Clone)]
pub struct SVFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory

    cutoff_hz: f32,
    q: f32,
    filter_type: FilterType,
}

impl SVFilter {
    pub fn new(filter_type: FilterType, cutoff_hz: f32, q: f32) -> Self {
        let mut filter = Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            cutoff_hz: 1000.0,
            q: std::f32::consts::FRAC_1_SQRT_2,
            filter_type,
        };
        filter.set_cutoff(cutoff_hz);
        filter.set_q(q);
        filter
    }

    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::LowPass, cutoff_hz, std::f32::consts::FRAC_1_SQRT_2)
    }

    pub fn allpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::AllPass, cutoff_hz, 1.0)
    }

    /// Prewarped integrator gain, with the cutoff kept inside (10 Hz, 0.45·sr)
    /// so `tan` stays finite.
    #[inline]
    fn compute_g(cutoff_hz: f32, ctx: &RenderCtx) -> f32 {
        let fc = cutoff_hz.clamp(10.0, ctx.sample_rate * 0.45);
        (TAU * fc / (2.0 * ctx.sample_rate)).tan()
    }

    #[inline]
    pub fn next_sample(&mut self, sample: f32, g: f32, k: f32) -> FilterOutputs {
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = flush_denormal(2.0 * v1 - self.ic1eq);
        self.ic2eq = flush_denormal(2.0 * v2 - self.ic2eq);

        FilterOutputs {
            lowpass: v2,
            allpass: sample - 2.0 * k * v1,
        }
    }

    /// Filter one sample, recomputing coefficients from the current cutoff.
    ///
    /// Used where the cutoff moves every sample (the phaser sweep).
    #[inline]
    pub fn tick(&mut self, sample: f32, ctx: &RenderCtx) -> f32 {
        let g = Self::compute_g(self.cutoff_hz, ctx);
        let k = 1.0 / self.q;
        let outputs = self.next_sample(sample, g, k);
        self.select(outputs)
    }

    /// Filter a block in place with coefficients held for the whole block.
    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        let g = Self::compute_g(self.cutoff_hz, ctx);
        let k = 1.0 / self.q;

        for sample in buffer.iter_mut() {
            let outputs = self.next_sample(*sample, g, k);
            *sample = self.select(outputs);
        }
    }

    #[inline]
    fn select(&self, outputs: FilterOutputs) -> f32 {
        match self.filter_type {
            FilterType::LowPass => outputs.lowpass,
            FilterType::AllPass => outputs.allpass,
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    pub fn set_cutoff(&mut self, cutoff: f32) {
        if cutoff.is_finite() {
            self.cutoff_hz = cutoff;
        }
    }

    pub fn set_q(&mut self, q: f32) {
        if q.is_finite() {
            self.q = q.max(MIN_Q);
        }
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff_hz
    }

    pub fn q(&self) -> f32 {
        self.q
    }
}

#[inline]
fn flush_denormal(x: f32) -> f32 {
    if x.abs() < DENORMAL_FLOOR {
        0.0
    } else {
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::oscillator::OscillatorBlock;

    const SR: f32 = 48_000.0;

    fn peak_after_transient(buffer: &[f32]) -> f32 {
        let skip = buffer.len().min(256);
        buffer
            .get(skip..)
            .unwrap_or(buffer)
            .iter()
            .fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    fn sine(freq: f32, len: usize) -> Vec<f32> {
        OscillatorBlock::sine(freq).generate(len, SR)
    }

    #[test]
    fn test_lowpass_passes_dc() {
        let mut filter = SVFilter::lowpass(500.0);
        let mut buffer = vec![1.0; 512];

        filter.render(&mut buffer, &RenderCtx::new(SR));

        assert!(buffer[511] > 0.99, "got {}", buffer[511]);
    }

    #[test]
    fn test_lowpass_filters_high_freq() {
        let mut filter = SVFilter::lowpass(500.0);
        let mut buffer = sine(5_000.0, 1024); // 10x cutoff

        filter.render(&mut buffer, &RenderCtx::new(SR));

        // ~12dB/octave: a bit over three octaves above cutoff
        let peak = peak_after_transient(&buffer);
        assert!(peak < 0.05, "Expected high freq attenuation, got peak: {}", peak);
    }

    #[test]
    fn test_resonance_boosts_cutoff() {
        let ctx = RenderCtx::new(SR);

        let mut flat = SVFilter::new(FilterType::LowPass, 1_000.0, 0.707);
        let mut buffer1 = sine(1_000.0, 2048);
        flat.render(&mut buffer1, &ctx);

        let mut peaky = SVFilter::new(FilterType::LowPass, 1_000.0, 6.0);
        let mut buffer2 = sine(1_000.0, 2048);
        peaky.render(&mut buffer2, &ctx);

        let low = peak_after_transient(&buffer1);
        let high = peak_after_transient(&buffer2);
        assert!(high > low * 3.0, "high_q={high}, low_q={low}");
    }

    #[test]
    fn test_allpass_keeps_magnitude() {
        let ctx = RenderCtx::new(SR);
        for freq in [200.0, 1_000.0, 5_000.0] {
            let mut filter = SVFilter::allpass(1_000.0);
            let mut buffer = sine(freq, 4096);
            filter.render(&mut buffer, &ctx);
            let peak = peak_after_transient(&buffer[1024..]);
            assert!((peak - 1.0).abs() < 0.02, "freq {freq}: peak {peak}");
        }
    }

    #[test]
    fn test_allpass_shifts_phase_at_cutoff() {
        // At fc the SVF all-pass is 180° out: dry + wet cancels
        let ctx = RenderCtx::new(SR);
        let dry = sine(1_000.0, 4096);
        let mut wet = dry.clone();
        let mut filter = SVFilter::allpass(1_000.0);
        filter.render(&mut wet, &ctx);

        let summed: Vec<f32> = dry.iter().zip(&wet).map(|(d, w)| 0.5 * (d + w)).collect();
        let peak = peak_after_transient(&summed[1024..]);
        assert!(peak < 0.05, "expected a notch at cutoff, got {peak}");
    }

    #[test]
    fn test_tick_matches_render_for_static_cutoff() {
        let ctx = RenderCtx::new(SR);
        let input = sine(440.0, 256);

        let mut a = SVFilter::lowpass(800.0);
        let mut rendered = input.clone();
        a.render(&mut rendered, &ctx);

        let mut b = SVFilter::lowpass(800.0);
        for (x, expected) in input.iter().zip(&rendered) {
            assert!((b.tick(*x, &ctx) - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_extreme_cutoff_stays_finite() {
        let ctx = RenderCtx::new(SR);
        let mut filter = SVFilter::lowpass(1_000_000.0);
        filter.set_q(30.0);
        let mut buffer = sine(440.0, 1024);
        filter.render(&mut buffer, &ctx);
        assert!(buffer.iter().all(|s| s.is_finite()));

        filter.set_cutoff(-5.0);
        filter.set_q(0.0);
        assert_eq!(filter.q(), MIN_Q);
        filter.render(&mut buffer, &ctx);
        assert!(buffer.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_tail_settles_to_exact_zero() {
        let ctx = RenderCtx::new(SR);
        let mut filter = SVFilter::lowpass(500.0);
        let mut impulse = vec![0.0; 48_000];
        impulse[0] = 1.0;
        filter.render(&mut impulse, &ctx);

        assert_eq!(filter.ic1eq, 0.0);
        assert_eq!(filter.ic2eq, 0.0);
        assert!(impulse[47_000..].iter().all(|&s| s == 0.0));
        assert!(impulse.iter().all(|s| !s.is_subnormal()));
    }
}
