use anyhow::{Context, Result};
use std::io::Cursor;
use std::path::PathBuf;
use std::time::Duration;

/// A captured answer: mono 16-bit PCM at a fixed sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    /// Raw audio samples (i16 PCM, mono)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl AudioClip {
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Drop everything past `duration`
    pub fn truncate(&mut self, duration: Duration) {
        let max_samples = (duration.as_secs_f64() * self.sample_rate as f64).round() as usize;
        self.samples.truncate(max_samples);
    }

    /// Encode as an in-memory 16-bit mono WAV file
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer =
                hound::WavWriter::new(&mut cursor, spec).context("Failed to create WAV writer")?;
            for &sample in &self.samples {
                writer
                    .write_sample(sample)
                    .context("Failed to write sample to WAV")?;
            }
            writer.finalize().context("Failed to finalize WAV data")?;
        }

        Ok(cursor.into_inner())
    }
}

/// Configuration for answer capture
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Sample rate of produced clips (speech APIs expect 16kHz)
    pub sample_rate: u32,
    /// Fixed recording length per answer
    pub duration: Duration,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,               // 16kHz for speech recognition
            duration: Duration::from_secs(5), // One spoken answer
        }
    }
}

/// Audio capture backend trait
///
/// Implementations:
/// - Microphone: cpal default input device (`microphone` feature)
/// - File: Read a WAV file (for testing/batch processing)
#[async_trait::async_trait]
pub trait AudioCapture: Send + Sync {
    /// Record one fixed-duration clip
    ///
    /// An error means no clip was produced.
    async fn capture(&mut self) -> Result<AudioClip>;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Where answers are captured from
#[derive(Debug, Clone)]
pub enum CaptureSource {
    /// Default microphone input
    Microphone,
    /// A prerecorded WAV file
    File(PathBuf),
}

/// Audio capture factory
pub struct AudioCaptureFactory;

impl AudioCaptureFactory {
    /// Create a capture backend for the given source
    pub fn create(source: CaptureSource, config: CaptureConfig) -> Result<Box<dyn AudioCapture>> {
        match source {
            CaptureSource::Microphone => {
                #[cfg(feature = "microphone")]
                {
                    use super::microphone::MicrophoneCapture;
                    Ok(Box::new(MicrophoneCapture::new(config)))
                }

                #[cfg(not(feature = "microphone"))]
                {
                    let _ = config;
                    anyhow::bail!(
                        "Microphone capture is not available; rebuild with the `microphone` feature"
                    )
                }
            }

            CaptureSource::File(path) => Ok(Box::new(super::file::FileCapture::new(path, config))),
        }
    }
}
