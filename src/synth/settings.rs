#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthError};

pub use crate::dsp::oscillator::WaveType;

/// Full sound configuration, swapped in atomically on update.
///
/// Everything is `Copy`, so a snapshot can travel to the audio thread by
/// value through the control queue without allocating.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub osc1: OscSettings,
    pub osc2: OscSettings,
    pub filter: FilterSettings,
    pub phaser: PhaserSettings,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OscSettings {
    pub wave_type: WaveType,
    /// Peak level of this oscillator (linear)
    pub gain: f32,
    pub envelope: EnvelopeSettings,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeSettings {
    pub attack: f32,  // seconds
    pub decay: f32,   // seconds
    pub sustain: f32, // ratio of peak, 0.0 - 1.0
    pub release: f32, // seconds
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSettings {
    /// Lowpass cutoff in Hz
    pub cutoff: f32,
    /// Normalised resonance, 0.0 - 1.0 (scaled to Q = resonance × 30)
    pub resonance: f32,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaserSettings {
    /// LFO rate in Hz
    pub rate: f32,
    /// Sweep depth, 0.0 - 1.0 (scaled to ± depth × 1000 Hz)
    pub depth: f32,
    /// All-pass sharpness, 0.0 - 1.0 (scaled to Q = feedback × 10)
    pub feedback: f32,
    /// Wet share of the phaser path, 0.0 = dry only
    #[cfg_attr(feature = "serde", serde(default = "PhaserSettings::default_mix"))]
    pub mix: f32,
}

impl Default for EnvelopeSettings {
    fn default() -> Self {
        Self {
            attack: 0.01,
            decay: 0.1,
            sustain: 0.7,
            release: 0.3,
        }
    }
}

impl Default for OscSettings {
    fn default() -> Self {
        Self {
            wave_type: WaveType::Sawtooth,
            gain: 0.5,
            envelope: EnvelopeSettings::default(),
        }
    }
}

impl OscSettings {
    /// An oscillator that contributes nothing to the mix.
    pub fn silent() -> Self {
        Self {
            gain: 0.0,
            ..Self::default()
        }
    }
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            cutoff: 2_000.0,
            resonance: 0.1,
        }
    }
}

impl PhaserSettings {
    pub(crate) fn default_mix() -> f32 {
        0.5
    }

    /// Phaser path switched off: the dry filtered signal passes untouched.
    pub fn bypassed() -> Self {
        Self {
            mix: 0.0,
            ..Self::default()
        }
    }
}

impl Default for PhaserSettings {
    fn default() -> Self {
        Self {
            rate: 0.5,
            depth: 0.3,
            feedback: 0.2,
            mix: Self::default_mix(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            osc1: OscSettings {
                wave_type: WaveType::Sawtooth,
                ..OscSettings::default()
            },
            osc2: OscSettings {
                wave_type: WaveType::Square,
                gain: 0.25,
                ..OscSettings::default()
            },
            filter: FilterSettings::default(),
            phaser: PhaserSettings::default(),
        }
    }
}

fn check_finite(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SynthError::invalid(field, "must be a finite number"))
    }
}

fn check_non_negative(field: &'static str, value: f32) -> Result<()> {
    check_finite(field, value)?;
    if value < 0.0 {
        return Err(SynthError::invalid(field, format!("must be >= 0, got {}", value)));
    }
    Ok(())
}

fn check_unit(field: &'static str, value: f32) -> Result<()> {
    check_finite(field, value)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(SynthError::invalid(
            field,
            format!("must be within 0.0..=1.0, got {}", value),
        ));
    }
    Ok(())
}

impl EnvelopeSettings {
    fn validate(&self, prefix: Prefix) -> Result<()> {
        check_non_negative(prefix.pick("osc1.envelope.attack", "osc2.envelope.attack"), self.attack)?;
        check_non_negative(prefix.pick("osc1.envelope.decay", "osc2.envelope.decay"), self.decay)?;
        check_unit(prefix.pick("osc1.envelope.sustain", "osc2.envelope.sustain"), self.sustain)?;
        check_non_negative(prefix.pick("osc1.envelope.release", "osc2.envelope.release"), self.release)
    }
}

#[derive(Clone, Copy)]
enum Prefix {
    Osc1,
    Osc2,
}

impl Prefix {
    fn pick(self, osc1: &'static str, osc2: &'static str) -> &'static str {
        match self {
            Prefix::Osc1 => osc1,
            Prefix::Osc2 => osc2,
        }
    }
}

impl OscSettings {
    fn validate(&self, prefix: Prefix) -> Result<()> {
        check_non_negative(prefix.pick("osc1.gain", "osc2.gain"), self.gain)?;
        self.envelope.validate(prefix)
    }
}

impl Settings {
    /// Reject anything the renderer cannot use as-is.
    pub fn validate(&self) -> Result<()> {
        self.osc1.validate(Prefix::Osc1)?;
        self.osc2.validate(Prefix::Osc2)?;

        check_finite("filter.cutoff", self.filter.cutoff)?;
        if self.filter.cutoff <= 0.0 {
            return Err(SynthError::invalid("filter.cutoff", "must be greater than 0"));
        }
        check_unit("filter.resonance", self.filter.resonance)?;

        check_non_negative("phaser.rate", self.phaser.rate)?;
        check_unit("phaser.depth", self.phaser.depth)?;
        check_unit("phaser.feedback", self.phaser.feedback)?;
        check_unit("phaser.mix", self.phaser.mix)
    }

    /// Parse and validate a JSON settings document.
    ///
    /// Every field except `phaser.mix` is required.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)
            .map_err(|err| SynthError::invalid("settings", err.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn rejects_sustain_above_one() {
        let mut settings = Settings::default();
        settings.osc2.envelope.sustain = 1.5;
        match settings.validate() {
            Err(SynthError::InvalidSettings { field, .. }) => {
                assert_eq!(field, "osc2.envelope.sustain")
            }
            other => panic!("expected InvalidSettings, got {other:?}"),
        }
    }

    #[test]
    fn rejects_non_finite_values() {
        let mut settings = Settings::default();
        settings.phaser.rate = f32::NAN;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.osc1.envelope.release = f32::INFINITY;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn rejects_zero_cutoff_and_negative_gain() {
        let mut settings = Settings::default();
        settings.filter.cutoff = 0.0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.osc1.gain = -0.1;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn zero_times_are_allowed() {
        let mut settings = Settings::default();
        settings.osc1.envelope = EnvelopeSettings {
            attack: 0.0,
            decay: 0.0,
            sustain: 1.0,
            release: 0.0,
        };
        assert!(settings.validate().is_ok());
    }

    #[cfg(feature = "serde")]
    mod json {
        use super::*;

        const FULL: &str = r#"{
            "osc1": {"waveType": "sine", "gain": 1.0,
                     "envelope": {"attack": 0.01, "decay": 0.1, "sustain": 0.7, "release": 0.2}},
            "osc2": {"waveType": "triangle", "gain": 0.0,
                     "envelope": {"attack": 0.02, "decay": 0.2, "sustain": 0.5, "release": 0.4}},
            "filter": {"cutoff": 1200.0, "resonance": 0.3},
            "phaser": {"rate": 0.5, "depth": 0.4, "feedback": 0.6}
        }"#;

        #[test]
        fn parses_full_document() {
            let settings = Settings::from_json(FULL).unwrap();
            assert_eq!(settings.osc1.wave_type, WaveType::Sine);
            assert_eq!(settings.osc2.wave_type, WaveType::Triangle);
            assert_eq!(settings.filter.cutoff, 1200.0);
            assert_eq!(settings.phaser.mix, 0.5);
        }

        #[test]
        fn missing_field_is_invalid_settings() {
            let json = FULL.replace(r#""cutoff": 1200.0, "#, "");
            assert!(matches!(
                Settings::from_json(&json),
                Err(SynthError::InvalidSettings { field: "settings", .. })
            ));
        }

        #[test]
        fn out_of_range_value_is_rejected_after_parse() {
            let json = FULL.replace(r#""depth": 0.4"#, r#""depth": 4.0"#);
            assert!(matches!(
                Settings::from_json(&json),
                Err(SynthError::InvalidSettings { field: "phaser.depth", .. })
            ));
        }
    }
}
