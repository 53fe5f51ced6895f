use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

use super::backend::AudioClip;

/// Saves captured answers to disk as WAV files
///
/// Files are named `<session>-<question-slug>.wav`; answering the same question
/// again overwrites the earlier recording.
pub struct ClipArchive {
    output_dir: PathBuf,
}

impl ClipArchive {
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir).context("Failed to create recordings directory")?;

        info!("Clip archive initialized: {}", output_dir.display());

        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path a clip for this session/question would be written to
    pub fn clip_path(&self, session_id: &str, label: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}-{}.wav", session_id, slugify(label)))
    }

    pub fn save(&self, session_id: &str, label: &str, clip: &AudioClip) -> Result<PathBuf> {
        let path = self.clip_path(session_id, label);

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: clip.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let file = File::create(&path)
            .with_context(|| format!("Failed to create WAV file: {:?}", path))?;
        let mut writer = hound::WavWriter::new(BufWriter::new(file), spec)
            .with_context(|| format!("Failed to create WAV writer: {:?}", path))?;

        for &sample in &clip.samples {
            writer
                .write_sample(sample)
                .context("Failed to write sample to WAV")?;
        }
        writer.finalize().context("Failed to finalize WAV file")?;

        info!(
            "Saved answer recording: {} ({:.1}s)",
            path.display(),
            clip.duration_seconds()
        );

        Ok(path)
    }
}

fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}
