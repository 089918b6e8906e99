use crate::{
    analysis::SpectrumConfig,
    error::{Result, SynthError},
    synth::master::DEFAULT_MASTER_VOLUME,
};

/// Construction-time knobs for [`SynthEngine`](super::SynthEngine).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Used by headless engines; a device-backed engine takes the device rate
    pub sample_rate: f32,
    /// Slots in the control → audio message ring
    pub message_capacity: usize,
    pub master_volume: f32,
    /// `tanh` on the master bus
    pub soft_clip: bool,
    pub spectrum: SpectrumConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            message_capacity: 256,
            master_volume: DEFAULT_MASTER_VOLUME,
            soft_clip: false,
            spectrum: SpectrumConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_message_capacity(mut self, capacity: usize) -> Self {
        self.message_capacity = capacity;
        self
    }

    pub fn with_master_volume(mut self, volume: f32) -> Self {
        self.master_volume = volume;
        self
    }

    pub fn with_soft_clip(mut self, enabled: bool) -> Self {
        self.soft_clip = enabled;
        self
    }

    pub fn with_spectrum(mut self, spectrum: SpectrumConfig) -> Self {
        self.spectrum = spectrum;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(SynthError::invalid("sample_rate", "must be a positive number"));
        }
        if self.message_capacity == 0 {
            return Err(SynthError::invalid("message_capacity", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.master_volume) {
            return Err(SynthError::invalid("master_volume", "must be in 0..=1"));
        }
        Ok(())
    }
}
