//! Control-side handle to the synth.
//!
//! [`SynthEngine`] never touches audio directly. It validates each request,
//! pushes a `Copy` message into an `rtrb` ring and returns; the [`PolySynth`]
//! on the audio thread drains the ring at the start of every block. Analysis
//! reads copy the window the master bus keeps overwriting.

pub mod config;

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use rtrb::{Producer, RingBuffer};

use crate::{
    analysis::{self, Analyzer, FFT_SIZE},
    error::{Result, SynthError},
    io::{OutputDevice, OutputStream},
    synth::{master::MasterBus, message::SynthMessage, poly::PolySynth, settings::Settings},
    MAX_NOTE,
};

pub use config::EngineConfig;

pub struct SynthEngine {
    tx: Producer<SynthMessage>,
    analyzer: Analyzer,
    /// Last accepted settings
    settings: Settings,
    master_volume: f32,
    stop: Arc<AtomicBool>,
    sample_rate: f32,
    output: Option<OutputStream>,
    disposed: bool,
}

impl SynthEngine {
    /// Headless engine at `sample_rate` with default settings.
    pub fn new(sample_rate: f32) -> Result<(Self, PolySynth)> {
        Self::headless(
            EngineConfig::default().with_sample_rate(sample_rate),
            Settings::default(),
        )
    }

    /// Build the control handle and the audio processor without a device.
    ///
    /// The caller owns the returned [`PolySynth`] and drives it with
    /// `render_block`, typically from its own audio callback.
    pub fn headless(config: EngineConfig, settings: Settings) -> Result<(Self, PolySynth)> {
        config.validate()?;
        settings.validate()?;

        let (tx, rx) = RingBuffer::<SynthMessage>::new(config.message_capacity);
        let (tap_tx, tap_rx) = analysis::tap::window(FFT_SIZE);
        let stop = Arc::new(AtomicBool::new(false));

        let synth = PolySynth::new(config.sample_rate, settings)
            .with_master(MasterBus::new(config.master_volume, config.soft_clip))
            .with_messages(rx)
            .with_tap(tap_tx)
            .with_stop_flag(Arc::clone(&stop));

        let engine = Self {
            tx,
            analyzer: Analyzer::new(tap_rx, config.spectrum),
            settings,
            master_volume: config.master_volume,
            stop,
            sample_rate: config.sample_rate,
            output: None,
            disposed: false,
        };

        log::debug!(
            "engine created at {} Hz (queue {})",
            config.sample_rate,
            config.message_capacity
        );
        Ok((engine, synth))
    }

    /// Open the default output device and start playing. The device's
    /// sample rate overrides `config.sample_rate`.
    pub fn with_default_output(config: EngineConfig, settings: Settings) -> Result<Self> {
        let device = OutputDevice::default_output()?;
        let sample_rate = device.sample_rate();
        let channels = device.channels();

        let (mut engine, synth) = Self::headless(config.with_sample_rate(sample_rate), settings)?;
        engine.output = Some(device.start(synth)?);

        log::info!("output started: {} Hz, {} channel(s)", sample_rate, channels);
        Ok(engine)
    }

    pub fn note_on(&mut self, note: u8) -> Result<()> {
        if note > MAX_NOTE {
            return Err(SynthError::InvalidNote { note });
        }
        self.send(SynthMessage::NoteOn { note })
    }

    /// Release `note`. A note that is not sounding is ignored on the audio
    /// side, so this only fails for out-of-range notes or a closed engine.
    pub fn note_off(&mut self, note: u8) -> Result<()> {
        if note > MAX_NOTE {
            return Err(SynthError::InvalidNote { note });
        }
        self.send(SynthMessage::NoteOff { note })
    }

    pub fn all_notes_off(&mut self) -> Result<()> {
        self.send(SynthMessage::AllNotesOff)
    }

    /// Replace the settings for subsequent notes and the shared effects.
    /// On error the previous settings stay in effect.
    pub fn update_settings(&mut self, settings: Settings) -> Result<()> {
        self.ensure_live()?;
        if let Err(err) = settings.validate() {
            log::warn!("settings rejected: {err}");
            return Err(err);
        }
        self.send(SynthMessage::UpdateSettings(settings))?;
        self.settings = settings;
        log::debug!("settings updated: {:?}", settings);
        Ok(())
    }

    /// Parse a JSON settings document and apply it.
    #[cfg(feature = "serde")]
    pub fn update_settings_json(&mut self, json: &str) -> Result<()> {
        let settings = Settings::from_json(json)?;
        self.update_settings(settings)
    }

    /// Clamped to [0, 1].
    pub fn set_master_volume(&mut self, volume: f32) -> Result<()> {
        if !volume.is_finite() {
            return Err(SynthError::invalid("master_volume", "must be a finite number"));
        }
        let volume = volume.clamp(0.0, 1.0);
        self.send(SynthMessage::SetMasterVolume(volume))?;
        self.master_volume = volume;
        Ok(())
    }

    pub fn waveform_data(&mut self) -> Vec<f32> {
        self.analyzer.waveform_data()
    }

    pub fn spectrum_data(&mut self) -> Vec<u8> {
        self.analyzer.spectrum_data()
    }

    pub fn spectrogram_data(&mut self) -> Vec<u8> {
        self.analyzer.spectrogram_data()
    }

    pub fn phase_scope_data(&mut self) -> Vec<f32> {
        self.analyzer.phase_scope_data()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn master_volume(&self) -> f32 {
        self.master_volume
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Silence the synth and release the device. Safe to call more than once
    /// and while the audio thread is mid-block: the processor sees the stop
    /// flag at its next block and renders silence from then on.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.stop.store(true, Ordering::Release);

        if let Some(output) = self.output.take() {
            if let Err(err) = output.pause() {
                log::warn!("{err}");
            }
        }
        log::info!("engine disposed");
    }

    fn ensure_live(&self) -> Result<()> {
        if self.disposed {
            Err(SynthError::Disposed)
        } else {
            Ok(())
        }
    }

    fn send(&mut self, msg: SynthMessage) -> Result<()> {
        self.ensure_live()?;
        self.tx.push(msg).map_err(|_| SynthError::QueueFull)
    }
}

impl Drop for SynthEngine {
    fn drop(&mut self) {
        self.dispose();
    }
}
