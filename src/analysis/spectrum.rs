//! FFT magnitude spectrum quantised to bytes.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::{f32::consts::TAU, sync::Arc};

/*
Byte Spectrum
=============

  1. window       x[n]·w[n], Blackman: 0.42 − 0.5·cos(2πn/N) + 0.08·cos(4πn/N)
  2. FFT          N-point complex transform, keep bins 0..N/2
  3. magnitude    |X[k]| / N
  4. smoothing    m[k] = τ·m_prev[k] + (1 − τ)·m[k]
  5. decibels     20·log10(m[k])
  6. quantise     255 · (dB − min_db) / (max_db − min_db), clamped to 0..=255

Smoothing carries state between reads, so two analyzers fed the same
window but read at different times can disagree slightly.
*/

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectrumConfig {
    /// dB value mapped to byte 0
    pub min_db: f32,
    /// dB value mapped to byte 255
    pub max_db: f32,
    /// Averaging constant between reads, 0.0 (none) to just under 1.0
    pub smoothing: f32,
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            min_db: -100.0,
            max_db: -30.0,
            smoothing: 0.8,
        }
    }
}

impl SpectrumConfig {
    pub fn with_range(mut self, min_db: f32, max_db: f32) -> Self {
        self.min_db = min_db;
        self.max_db = max_db;
        self
    }

    pub fn with_smoothing(mut self, smoothing: f32) -> Self {
        self.smoothing = smoothing;
        self
    }
}

pub struct SpectrumAnalyzer {
    /// Blackman window coefficients
    window: Vec<f32>,
    /// FFT processor
    fft: Arc<dyn Fft<f32>>,
    /// Transform buffer
    buffer: Vec<Complex<f32>>,
    /// Scratch space for the in-place FFT
    scratch: Vec<Complex<f32>>,
    /// Smoothed linear magnitudes from the previous read
    magnitudes: Vec<f32>,
    config: SpectrumConfig,
}

impl SpectrumAnalyzer {
    /// `fft_size` must match the sample window length.
    pub fn new(fft_size: usize, config: SpectrumConfig) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        let n = fft_size as f32;
        let window = (0..fft_size)
            .map(|i| {
                let x = i as f32 / n;
                0.42 - 0.5 * (TAU * x).cos() + 0.08 * (2.0 * TAU * x).cos()
            })
            .collect();

        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        Self {
            window,
            fft,
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
            scratch,
            magnitudes: vec![0.0; fft_size / 2],
            config: SpectrumConfig {
                smoothing: config.smoothing.clamp(0.0, 0.999),
                ..config
            },
        }
    }

    pub fn bin_count(&self) -> usize {
        self.magnitudes.len()
    }

    /// Transform `samples` and write one byte per bin into `out`.
    pub fn compute(&mut self, samples: &[f32], out: &mut [u8]) {
        debug_assert_eq!(samples.len(), self.window.len());
        debug_assert_eq!(out.len(), self.magnitudes.len());

        // Apply window and prepare for FFT
        for ((slot, &sample), &w) in self.buffer.iter_mut().zip(samples).zip(&self.window) {
            *slot = Complex::new(sample * w, 0.0);
        }

        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        let scale = 1.0 / self.window.len() as f32;
        let tau = self.config.smoothing;
        let range = (self.config.max_db - self.config.min_db).max(f32::EPSILON);

        for ((bin, smoothed), byte) in self
            .buffer
            .iter()
            .zip(self.magnitudes.iter_mut())
            .zip(out.iter_mut())
        {
            let magnitude = bin.norm() * scale;
            *smoothed = tau * *smoothed + (1.0 - tau) * magnitude;
            if !smoothed.is_finite() {
                *smoothed = 0.0;
            }

            let db = 20.0 * smoothed.max(1e-12).log10();
            let scaled = 255.0 * (db - self.config.min_db) / range;
            *byte = scaled.clamp(0.0, 255.0) as u8;
        }
    }

    pub fn reset(&mut self) {
        self.magnitudes.fill(0.0);
    }
}
