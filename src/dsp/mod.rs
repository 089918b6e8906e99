//! Low-level DSP primitives used by the voice and effects layers.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! embed directly inside voice structs. They intentionally stay focused on the
//! signal-processing math so the synth layer can handle note lifecycle and
//! parameter hand-off.

/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// State-variable filter with lowpass and allpass responses.
pub mod filter;
/// Free-running low frequency oscillator.
pub mod lfo;
/// Oscillator waveforms.
pub mod oscillator;

pub use envelope::EnvelopeState;
