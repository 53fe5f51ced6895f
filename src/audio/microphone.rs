// Microphone capture via cpal
//
// cpal streams are not Send, so the whole recording runs on a blocking thread:
// open the default input device, collect samples for the configured duration,
// then mix down and resample to the target clip format.

use anyhow::{anyhow, bail, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use super::backend::{AudioCapture, AudioClip, CaptureConfig};
use super::file::{f32_to_i16, mix_to_mono, resample};

pub struct MicrophoneCapture {
    config: CaptureConfig,
}

impl MicrophoneCapture {
    pub fn new(config: CaptureConfig) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
impl AudioCapture for MicrophoneCapture {
    async fn capture(&mut self) -> Result<AudioClip> {
        let config = self.config.clone();
        tokio::task::spawn_blocking(move || record_blocking(&config))
            .await
            .context("Microphone task panicked")?
    }

    fn name(&self) -> &str {
        "microphone"
    }
}

fn record_blocking(config: &CaptureConfig) -> Result<AudioClip> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow!("No input device available"))?;

    let supported = device
        .default_input_config()
        .context("Failed to query default input config")?;
    let sample_format = supported.sample_format();
    let stream_config: cpal::StreamConfig = supported.into();
    let device_rate = stream_config.sample_rate.0;
    let channels = stream_config.channels;

    info!(
        "Recording {:.1}s from {} ({}Hz, {} channels, {:?})",
        config.duration.as_secs_f32(),
        device.name().unwrap_or_else(|_| "unknown device".to_string()),
        device_rate,
        channels,
        sample_format
    );

    let buffer: Arc<Mutex<Vec<i16>>> = Arc::new(Mutex::new(Vec::new()));
    let err_fn = |e: cpal::StreamError| warn!("Input stream error: {}", e);

    let stream = match sample_format {
        cpal::SampleFormat::F32 => {
            let buffer = Arc::clone(&buffer);
            device.build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = buffer.lock() {
                        buf.extend(data.iter().copied().map(f32_to_i16));
                    }
                },
                err_fn,
                None,
            )
        }
        cpal::SampleFormat::I16 => {
            let buffer = Arc::clone(&buffer);
            device.build_input_stream(
                &stream_config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = buffer.lock() {
                        buf.extend_from_slice(data);
                    }
                },
                err_fn,
                None,
            )
        }
        other => bail!("Unsupported input sample format: {:?}", other),
    }
    .context("Failed to build input stream")?;

    stream.play().context("Failed to start input stream")?;
    std::thread::sleep(config.duration);
    drop(stream);

    let raw = buffer
        .lock()
        .map_err(|_| anyhow!("Capture buffer poisoned"))?
        .clone();
    if raw.is_empty() {
        bail!("No audio captured from input device");
    }

    let mono = mix_to_mono(&raw, channels);
    let samples = resample(&mono, device_rate, config.sample_rate);
    let mut clip = AudioClip::new(samples, config.sample_rate);
    clip.truncate(config.duration);

    info!("Captured {:.1}s of audio", clip.duration_seconds());
    Ok(clip)
}
