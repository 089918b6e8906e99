use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    SampleFormat, Stream, SupportedStreamConfig,
};

use crate::{
    error::{Result, SynthError},
    synth::poly::PolySynth,
    MAX_BLOCK_SIZE,
};

/// The host's default output device and the config it prefers.
pub struct OutputDevice {
    device: cpal::Device,
    config: SupportedStreamConfig,
}

impl OutputDevice {
    pub fn default_output() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| SynthError::Device("no default output device available".into()))?;
        let config = device
            .default_output_config()
            .map_err(|e| SynthError::Device(format!("failed to fetch default output config: {e}")))?;

        if config.sample_format() != SampleFormat::F32 {
            return Err(SynthError::Device(format!(
                "unsupported sample format {:?}; f32 output required",
                config.sample_format()
            )));
        }

        Ok(Self { device, config })
    }

    pub fn sample_rate(&self) -> f32 {
        self.config.sample_rate().0 as f32
    }

    pub fn channels(&self) -> usize {
        self.config.channels() as usize
    }

    /// Move `synth` into the device callback and start playback.
    pub fn start(self, mut synth: PolySynth) -> Result<OutputStream> {
        let channels = self.channels();
        // Buffer reused by audio callback
        let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = self
            .device
            .build_output_stream(
                &self.config.into(),
                move |data: &mut [f32], _| {
                    let total_frames = data.len() / channels;
                    let mut frames_written = 0;
                    while frames_written < total_frames {
                        let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);

                        let block = &mut render_buf[..frames_to_render];
                        synth.render_block(block);

                        // Duplicate mono to all channels
                        let out_off = frames_written * channels;
                        for (i, &s) in block.iter().enumerate() {
                            let frame = out_off + i * channels;
                            data[frame..frame + channels].fill(s);
                        }

                        frames_written += frames_to_render;
                    }
                },
                |err| log::error!("output stream error: {err}"),
                None,
            )
            .map_err(|e| SynthError::Device(format!("failed to build output stream: {e}")))?;

        stream
            .play()
            .map_err(|e| SynthError::Device(format!("failed to start output stream: {e}")))?;

        Ok(OutputStream { stream })
    }
}

/// A running device stream. Dropping it closes the device.
pub struct OutputStream {
    stream: Stream,
}

impl OutputStream {
    pub fn pause(&self) -> Result<()> {
        self.stream
            .pause()
            .map_err(|e| SynthError::Device(format!("failed to pause output stream: {e}")))
    }
}
