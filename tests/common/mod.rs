// Shared stubs for integration tests: scripted speech and extraction collaborators
#![allow(dead_code)]

use anyhow::{bail, Result};
use medical_intake::{AnswerExtractor, AudioClip, Question, Transcriber};
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn three_questions() -> Vec<Question> {
    vec![
        Question::text("Name"),
        Question::number("Age"),
        Question::text("Address"),
    ]
}

/// Returns the same transcript for every clip
pub struct StubTranscriber {
    pub transcript: String,
    pub calls: AtomicUsize,
}

impl StubTranscriber {
    pub fn new(transcript: &str) -> Self {
        Self {
            transcript: transcript.to_string(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl Transcriber for StubTranscriber {
    async fn transcribe(&self, _clip: &AudioClip) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.transcript.clone())
    }
}

/// Always fails, like an unreachable speech API
pub struct FailingTranscriber;

#[async_trait::async_trait]
impl Transcriber for FailingTranscriber {
    async fn transcribe(&self, _clip: &AudioClip) -> Result<String> {
        bail!("speech service unreachable")
    }
}

/// Answers with `<label>=<text>` so tests can see what was asked
pub struct EchoExtractor;

#[async_trait::async_trait]
impl AnswerExtractor for EchoExtractor {
    async fn extract(&self, text: &str, question: &Question) -> Result<String> {
        Ok(format!("{}={}", question.label, text))
    }
}

/// Finds no answer in anything, like an LLM replying with nothing
pub struct BlankExtractor;

#[async_trait::async_trait]
impl AnswerExtractor for BlankExtractor {
    async fn extract(&self, _text: &str, _question: &Question) -> Result<String> {
        Ok("  ".to_string())
    }
}

pub struct FailingExtractor;

#[async_trait::async_trait]
impl AnswerExtractor for FailingExtractor {
    async fn extract(&self, _text: &str, _question: &Question) -> Result<String> {
        bail!("rate limited")
    }
}

/// A quiet 440Hz tone encoded as a 16-bit WAV file
pub fn tone_wav_bytes(sample_rate: u32, channels: u16, seconds: f32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        let frames = (sample_rate as f32 * seconds) as usize;
        for i in 0..frames {
            let t = i as f32 / sample_rate as f32;
            let sample = ((t * 440.0 * 2.0 * std::f32::consts::PI).sin() * 3000.0) as i16;
            for _ in 0..channels {
                writer.write_sample(sample).unwrap();
            }
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}
