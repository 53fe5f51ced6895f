use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

use crate::audio::CaptureConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub audio: AudioConfig,
    pub transcription: TranscriptionConfig,
    pub extraction: ExtractionConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub record_seconds: u64,
    pub recordings_path: String,
    /// Keep every captured answer as a WAV file under `recordings_path`
    pub keep_recordings: bool,
}

impl AudioConfig {
    pub fn capture_config(&self) -> CaptureConfig {
        CaptureConfig {
            sample_rate: self.sample_rate,
            duration: Duration::from_secs(self.record_seconds),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionConfig {
    /// Base URL of an OpenAI-compatible API
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    /// Base URL of an OpenAI-compatible API
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    /// Store the error text as the answer when extraction fails
    pub store_errors: bool,
    /// Move to the next question after a voice answer is stored
    pub advance_on_answer: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    pub title: String,
    pub file_name: String,
    /// TrueType font embedded in the PDF; needed for answers outside Latin-1
    #[serde(default)]
    pub font_path: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: "Medical Questionnaire Report".to_string(),
            file_name: "medical_report.pdf".to_string(),
            font_path: None,
        }
    }
}

impl Config {
    /// Load defaults, then `<path>.toml` (optional), then `INTAKE__*` env overrides
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("service.name", "medical-intake")?
            .set_default("service.http.bind", "127.0.0.1")?
            .set_default("service.http.port", 8080)?
            .set_default("audio.sample_rate", 16000)?
            .set_default("audio.record_seconds", 5)?
            .set_default("audio.recordings_path", "recordings")?
            .set_default("audio.keep_recordings", false)?
            .set_default("transcription.endpoint", "https://api.openai.com/v1")?
            .set_default("transcription.model", "gpt-4o-audio-preview")?
            .set_default("transcription.api_key_env", "OPENAI_API_KEY")?
            .set_default("extraction.endpoint", "https://api.openai.com/v1")?
            .set_default("extraction.model", "gpt-4o-mini")?
            .set_default("extraction.api_key_env", "OPENAI_API_KEY")?
            .set_default("extraction.store_errors", true)?
            .set_default("extraction.advance_on_answer", true)?
            .set_default("report.title", "Medical Questionnaire Report")?
            .set_default("report.file_name", "medical_report.pdf")?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("INTAKE").separator("__"))
            .build()
            .with_context(|| format!("Failed to load configuration from {}", path))?;

        Ok(settings.try_deserialize()?)
    }
}

/// Read an API key from the named environment variable
///
/// A missing or blank variable yields an empty key; clients refuse to send
/// requests without one.
pub fn api_key_from_env(var: &str) -> String {
    std::env::var(var)
        .map(|key| key.trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_a_config_file() {
        let cfg = Config::load("does/not/exist/medical-intake").unwrap();
        assert_eq!(cfg.audio.sample_rate, 16000);
        assert_eq!(cfg.report.title, "Medical Questionnaire Report");
        assert_eq!(cfg.report.file_name, "medical_report.pdf");
        assert!(cfg.extraction.store_errors);
        assert!(cfg.transcription.language.is_none());
        assert!(cfg.report.font_path.is_none());
        assert_eq!(cfg.audio.capture_config().duration, Duration::from_secs(5));
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("intake.toml");
        std::fs::write(
            &path,
            "[report]\ntitle = \"Clinic Intake\"\nfont_path = \"fonts/NotoSans.ttf\"\n\n\
             [service.http]\nport = 9100\n",
        )
        .unwrap();

        let stem = dir.path().join("intake");
        let cfg = Config::load(stem.to_str().unwrap()).unwrap();
        assert_eq!(cfg.report.title, "Clinic Intake");
        assert_eq!(cfg.report.font_path.as_deref(), Some("fonts/NotoSans.ttf"));
        assert_eq!(cfg.service.http.port, 9100);
        assert_eq!(cfg.service.http.bind, "127.0.0.1");
    }
}
