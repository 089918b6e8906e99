//! Full-engine scenario benchmarks.
//!
//! These drive `PolySynth` the way an audio callback does, with realistic
//! chord sizes and settings.

mod analysis;
mod voices;

pub use analysis::bench_analysis;
pub use voices::bench_voices;
