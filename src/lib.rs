pub mod analysis; // FFT and time-domain snapshots of the master bus
pub mod dsp;
pub mod effects; // Shared lowpass + phaser stage
pub mod engine; // Control-side facade
pub mod error;
pub mod io;
pub mod render;
pub mod synth; // Voice management and polyphony

pub use engine::{EngineConfig, SynthEngine};
pub use error::{Result, SynthError};
pub use synth::poly::PolySynth;
pub use synth::settings::{
    EnvelopeSettings, FilterSettings, OscSettings, PhaserSettings, Settings, WaveType,
};

pub const MAX_BLOCK_SIZE: usize = 2048;

/// Highest valid MIDI note number.
pub const MAX_NOTE: u8 = 127;
