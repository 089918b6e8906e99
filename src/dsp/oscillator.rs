use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Audio Oscillator
================

Every waveform is a pure function of the phase accumulator, which lives in
[0, 2π) and advances by 2π·f/sr each sample:

  sine      sin(phase)
  square    sign(sin(phase))                      odd harmonics, 1/n
  sawtooth  2·(p − floor(p + 0.5)),  p = phase/2π  all harmonics, 1/n
  triangle  1 − 2·|saw(p − 0.25)|                 odd harmonics, 1/n²

The triangle is folded out of a quarter-cycle-shifted sawtooth, so all four
shapes start at zero and rise together at phase 0.

These are naive (non band-limited) shapes. Bright waveforms alias at high
pitches, which the shared lowpass downstream mostly tames.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WaveType {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl WaveType {
    /// Evaluate the waveform at `phase` radians (expected in [0, 2π)).
    #[inline]
    pub fn sample(self, phase: f32) -> f32 {
        match self {
            WaveType::Sine => phase.sin(),
            WaveType::Square => {
                let s = phase.sin();
                if s > 0.0 {
                    1.0
                } else if s < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            }
            WaveType::Sawtooth => saw(phase / TAU),
            WaveType::Triangle => 1.0 - 2.0 * saw(phase / TAU - 0.25).abs(),
        }
    }
}

#[inline]
fn saw(p: f32) -> f32 {
    2.0 * (p - (p + 0.5).floor())
}

/// A single phase-accumulating oscillator.
#[derive(Debug, Clone, Copy)]
pub struct OscillatorBlock {
    pub wave_type: WaveType,
    frequency: f32,
    phase: f32,
}

impl OscillatorBlock {
    pub fn new(wave_type: WaveType, frequency: f32) -> Self {
        let mut osc = Self {
            wave_type,
            frequency: 0.0,
            phase: 0.0,
        };
        osc.set_frequency(frequency);
        osc
    }

    pub fn sine(frequency: f32) -> Self {
        Self::new(WaveType::Sine, frequency)
    }

    pub fn square(frequency: f32) -> Self {
        Self::new(WaveType::Square, frequency)
    }

    pub fn sawtooth(frequency: f32) -> Self {
        Self::new(WaveType::Sawtooth, frequency)
    }

    pub fn triangle(frequency: f32) -> Self {
        Self::new(WaveType::Triangle, frequency)
    }

    /// Non-positive or non-finite frequencies clamp to 0 Hz; a fresh
    /// oscillator at 0 Hz outputs silence.
    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = if frequency.is_finite() && frequency > 0.0 {
            frequency
        } else {
            0.0
        };
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Produce one sample and advance the phase.
    #[inline]
    pub fn next_sample(&mut self, sample_rate: f32) -> f32 {
        let value = self.wave_type.sample(self.phase);

        self.phase += TAU * self.frequency / sample_rate;
        if self.phase >= TAU {
            // Frequencies above the sample rate can jump more than one cycle
            self.phase = self.phase.rem_euclid(TAU);
        }

        value
    }

    pub fn render(&mut self, out: &mut [f32], sample_rate: f32) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(sample_rate);
        }
    }

    /// Allocating convenience for offline use; prefer [`render`](Self::render)
    /// on the audio thread.
    pub fn generate(&mut self, num_samples: usize, sample_rate: f32) -> Vec<f32> {
        let mut out = vec![0.0; num_samples];
        self.render(&mut out, sample_rate);
        out
    }
}
