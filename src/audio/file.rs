use anyhow::{bail, Context, Result};
use hound::{SampleFormat, WavReader};
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use tracing::info;

use super::backend::{AudioCapture, AudioClip, CaptureConfig};

/// A decoded WAV recording, samples interleaved
pub struct AudioFile {
    pub path: String,
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<i16>,
}

impl AudioFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening audio file: {}", path.display());

        let reader = WavReader::open(path).context("Failed to open WAV file")?;
        Self::decode(reader, path.display().to_string())
    }

    /// Decode a WAV file held in memory (e.g. an uploaded answer)
    pub fn from_wav_bytes(bytes: &[u8]) -> Result<Self> {
        let reader = WavReader::new(Cursor::new(bytes)).context("Failed to parse WAV data")?;
        Self::decode(reader, "<memory>".to_string())
    }

    fn decode<R: Read>(reader: WavReader<R>, path: String) -> Result<Self> {
        let spec = reader.spec();
        if spec.channels == 0 {
            bail!("WAV data declares zero channels");
        }

        let samples: Vec<i16> = match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Int, bits) if bits <= 16 => {
                // Narrower samples come back at their own scale
                let shift = 16 - bits;
                reader
                    .into_samples::<i16>()
                    .map(|s| s.map(|v| v << shift))
                    .collect::<Result<Vec<_>, _>>()
                    .context("Failed to read audio samples")?
            }
            (SampleFormat::Int, bits) if bits <= 32 => {
                let shift = bits - 16;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| (v >> shift) as i16))
                    .collect::<Result<Vec<_>, _>>()
                    .context("Failed to read audio samples")?
            }
            (SampleFormat::Float, _) => reader
                .into_samples::<f32>()
                .map(|s| s.map(f32_to_i16))
                .collect::<Result<Vec<_>, _>>()
                .context("Failed to read audio samples")?,
            (format, bits) => bail!("Unsupported WAV sample format: {:?} {}-bit", format, bits),
        };

        let duration_seconds =
            samples.len() as f64 / (spec.sample_rate as f64 * spec.channels as f64);

        info!(
            "Audio file loaded: {:.1}s, {}Hz, {} channels, {} samples",
            duration_seconds,
            spec.sample_rate,
            spec.channels,
            samples.len()
        );

        Ok(Self {
            path,
            duration_seconds,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            samples,
        })
    }

    /// Convert to a mono clip at the configured rate, cut to the configured length
    pub fn to_clip(&self, config: &CaptureConfig) -> Result<AudioClip> {
        if self.sample_rate == 0 {
            bail!("WAV data declares a zero sample rate");
        }

        let mono = mix_to_mono(&self.samples, self.channels);
        let samples = resample(&mono, self.sample_rate, config.sample_rate);

        let mut clip = AudioClip::new(samples, config.sample_rate);
        clip.truncate(config.duration);
        Ok(clip)
    }
}

/// Capture backend that replays a WAV file as the spoken answer
pub struct FileCapture {
    path: PathBuf,
    config: CaptureConfig,
}

impl FileCapture {
    pub fn new(path: impl Into<PathBuf>, config: CaptureConfig) -> Self {
        Self {
            path: path.into(),
            config,
        }
    }
}

#[async_trait::async_trait]
impl AudioCapture for FileCapture {
    async fn capture(&mut self) -> Result<AudioClip> {
        let path = self.path.clone();
        let audio = tokio::task::spawn_blocking(move || AudioFile::open(path))
            .await
            .context("Audio file task panicked")??;
        audio.to_clip(&self.config)
    }

    fn name(&self) -> &str {
        "file"
    }
}

pub(crate) fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// Average interleaved channels into one
pub(crate) fn mix_to_mono(samples: &[i16], channels: u16) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }

    samples
        .chunks_exact(channels as usize)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / channels as i32) as i16
        })
        .collect()
}

/// Linear-interpolation resampling of a mono signal
pub(crate) fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let out_len = (samples.len() as f64 / ratio).floor() as usize;
    let last = samples.len() - 1;

    (0..out_len)
        .map(|i| {
            let pos = i as f64 * ratio;
            let idx = pos.floor() as usize;
            let frac = pos - idx as f64;
            let a = samples[idx.min(last)] as f64;
            let b = samples[(idx + 1).min(last)] as f64;
            (a + (b - a) * frac).round() as i16
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stereo_mixes_to_average() {
        let mono = mix_to_mono(&[100, 300, -200, -400], 2);
        assert_eq!(mono, vec![200, -300]);
    }

    #[test]
    fn resample_halves_length_when_downsampling_by_two() {
        let samples: Vec<i16> = (0..3200).map(|i| (i % 100) as i16).collect();
        let out = resample(&samples, 32000, 16000);
        assert_eq!(out.len(), 1600);
        assert_eq!(out[0], samples[0]);
        assert_eq!(out[1], samples[2]);
    }

    #[test]
    fn resample_same_rate_is_identity() {
        let samples = vec![1, 2, 3];
        assert_eq!(resample(&samples, 16000, 16000), samples);
    }

    #[test]
    fn float_samples_clamp() {
        assert_eq!(f32_to_i16(2.0), i16::MAX);
        assert_eq!(f32_to_i16(0.0), 0);
    }
}
