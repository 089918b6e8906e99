//! Low Frequency Oscillator (LFO) for parameter modulation.

/*
Low Frequency Oscillators
=========================

An LFO is simply an oscillator running at sub-audio frequencies. The same
waveform math applies, but the output drives a parameter instead of the
speaker.

  audio-rate      ~20 Hz to ~20,000 Hz, the signal you hear
  control-rate    ~0.01 Hz to ~20 Hz, the signal that moves other things

Output is bipolar (-1.0 to +1.0), so a modulated parameter swings both
above and below its centre value.

FREE-RUNNING vs SYNCED
----------------------

A synced LFO resets its phase on every note_on. The phaser uses a
FREE-RUNNING LFO instead: it starts with the engine, ignores note events
entirely, and only stops when the engine is disposed. Every voice hears the
same sweep at the same point in time.
*/

use crate::dsp::oscillator::{OscillatorBlock, WaveType};

#[derive(Debug, Clone, Copy)]
pub struct Lfo {
    osc: OscillatorBlock,
    running: bool,
}

impl Lfo {
    pub fn new(wave_type: WaveType, rate_hz: f32) -> Self {
        Self {
            osc: OscillatorBlock::new(wave_type, rate_hz),
            running: true,
        }
    }

    pub fn sine(rate_hz: f32) -> Self {
        Self::new(WaveType::Sine, rate_hz)
    }

    /// Change the rate without resetting phase.
    pub fn set_rate(&mut self, rate_hz: f32) {
        self.osc.set_frequency(rate_hz);
    }

    pub fn rate(&self) -> f32 {
        self.osc.frequency()
    }

    /// Next bipolar modulation value; a stopped LFO holds 0.0.
    #[inline]
    pub fn next_sample(&mut self, sample_rate: f32) -> f32 {
        if !self.running {
            return 0.0;
        }
        self.osc.next_sample(sample_rate)
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.osc.reset();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}
