/// Convert MIDI note number to frequency in Hz.
/// A4 = 440 Hz = MIDI note 69
#[inline]
pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

/// Context passed to DSP blocks during rendering
///
/// The engine renders at a single, fixed sample rate, so this is the only
/// piece of shared timing information every block needs.
#[derive(Debug, Clone, Copy)]
pub struct RenderCtx {
    pub sample_rate: f32,
}

impl RenderCtx {
    pub fn new(sample_rate: f32) -> Self {
        Self { sample_rate }
    }

    /// Number of whole samples covering `seconds` (0 for non-positive input).
    #[inline]
    pub fn samples_for(&self, seconds: f32) -> u32 {
        if seconds.is_nan() || seconds <= 0.0 {
            return 0;
        }
        (seconds * self.sample_rate).round() as u32
    }

    #[inline]
    pub fn nyquist(&self) -> f32 {
        self.sample_rate * 0.5
    }
}
