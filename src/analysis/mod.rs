//! Snapshots of the master bus for visualisation.
//!
//! The audio thread overwrites a shared 2048-sample window with every block
//! it renders; each read here copies that window, so a read always sees the
//! latest audio however long ago the previous read was. Until enough audio
//! has played the window is zero-padded at the front.

pub mod spectrum;
pub mod tap;

pub use spectrum::{SpectrumAnalyzer, SpectrumConfig};
pub use tap::{TapReader, TapWriter};

/// Analysis window length in samples.
pub const FFT_SIZE: usize = 2048;
/// Bytes returned by the spectrum views.
pub const BIN_COUNT: usize = FFT_SIZE / 2;

pub struct Analyzer {
    tap: TapReader,
    spectrum: SpectrumAnalyzer,
    /// Second analyser with its own smoothing history
    spectrogram: SpectrumAnalyzer,
    scratch: Vec<f32>,
}

impl Analyzer {
    /// `tap` must come from a [`tap::window`] of [`FFT_SIZE`] samples.
    pub fn new(tap: TapReader, config: SpectrumConfig) -> Self {
        debug_assert_eq!(tap.len(), FFT_SIZE);
        Self {
            tap,
            spectrum: SpectrumAnalyzer::new(FFT_SIZE, config),
            spectrogram: SpectrumAnalyzer::new(FFT_SIZE, config),
            scratch: vec![0.0; FFT_SIZE],
        }
    }

    /// Most recent 2048 master-bus samples, oldest first.
    pub fn waveform_data(&mut self) -> Vec<f32> {
        self.tap.to_vec()
    }

    /// Same signal as [`waveform_data`](Self::waveform_data); a separate entry
    /// point so callers can draw the two views independently.
    pub fn phase_scope_data(&mut self) -> Vec<f32> {
        self.waveform_data()
    }

    /// 1024 byte magnitudes, low to high frequency.
    pub fn spectrum_data(&mut self) -> Vec<u8> {
        self.tap.snapshot(&mut self.scratch);
        let mut out = vec![0u8; BIN_COUNT];
        self.spectrum.compute(&self.scratch, &mut out);
        out
    }

    /// Identical computation to [`spectrum_data`](Self::spectrum_data), run
    /// through its own analyser so the two views smooth independently.
    pub fn spectrogram_data(&mut self) -> Vec<u8> {
        self.tap.snapshot(&mut self.scratch);
        let mut out = vec![0u8; BIN_COUNT];
        self.spectrogram.compute(&self.scratch, &mut out);
        out
    }

    /// Forget the smoothing history of both spectrum views.
    pub fn reset_smoothing(&mut self) {
        self.spectrum.reset();
        self.spectrogram.reset();
    }
}
