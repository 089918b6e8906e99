//! polysynth - play an arpeggio on the default output device
//!
//! Run with: RUST_LOG=info cargo run --bin polysynth

use std::{thread, time::Duration};

use color_eyre::eyre::{Result, WrapErr};
use polysynth::{
    analysis::FFT_SIZE, EngineConfig, FilterSettings, PhaserSettings, Settings, SynthEngine,
    WaveType,
};

const ARPEGGIO: [u8; 4] = [60, 64, 67, 72];
const ROUNDS: usize = 4;

fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::init();

    let mut settings = Settings::default();
    settings.osc2.wave_type = WaveType::Square;
    settings.filter = FilterSettings {
        cutoff: 1_800.0,
        resonance: 0.2,
    };
    settings.phaser = PhaserSettings {
        rate: 0.4,
        depth: 0.6,
        feedback: 0.3,
        mix: 0.5,
    };

    let mut engine = SynthEngine::with_default_output(EngineConfig::default(), settings)
        .wrap_err("failed to open audio output")?;
    let sample_rate = engine.sample_rate();

    println!("=== polysynth ===");
    println!("Sample rate: {} Hz", sample_rate);
    println!("Playing {} rounds...", ROUNDS);

    for round in 0..ROUNDS {
        for &note in &ARPEGGIO {
            engine.note_on(note)?;
            thread::sleep(Duration::from_millis(400));
            engine.note_off(note)?;
            thread::sleep(Duration::from_millis(50));
        }

        // Open the filter a little each round
        settings.filter.cutoff *= 1.5;
        engine.update_settings(settings)?;

        let spectrum = engine.spectrum_data();
        if let Some((bin, &level)) = spectrum.iter().enumerate().max_by_key(|&(_, b)| *b) {
            let hz = bin as f32 * sample_rate / FFT_SIZE as f32;
            log::info!("round {}: spectrum peak ~{:.0} Hz (level {})", round + 1, hz, level);
        }
    }

    // Let the last release ring out
    thread::sleep(Duration::from_millis(500));
    engine.dispose();
    Ok(())
}
