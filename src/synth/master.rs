/// Final gain stage in front of the device and the analysis taps.
#[derive(Debug, Clone, Copy)]
pub struct MasterBus {
    gain: f32,
    soft_clip: bool,
}

pub const DEFAULT_MASTER_VOLUME: f32 = 0.75;

impl MasterBus {
    pub fn new(gain: f32, soft_clip: bool) -> Self {
        let mut bus = Self {
            gain: DEFAULT_MASTER_VOLUME,
            soft_clip,
        };
        bus.set_gain(gain);
        bus
    }

    /// Clamped to [0, 1]; non-finite input is ignored.
    pub fn set_gain(&mut self, gain: f32) {
        if gain.is_finite() {
            self.gain = gain.clamp(0.0, 1.0);
        }
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn process(&self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            let scaled = *sample * self.gain;
            // tanh is ~linear below ±0.3, so quiet passages are untouched
            *sample = if self.soft_clip { scaled.tanh() } else { scaled };
        }
    }
}

impl Default for MasterBus {
    fn default() -> Self {
        Self::new(DEFAULT_MASTER_VOLUME, false)
    }
}
