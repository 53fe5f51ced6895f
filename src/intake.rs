//! Voice answering: capture → transcribe → extract → store
//!
//! Resolution (the collaborator calls) is kept apart from application so a
//! caller can release any lock on the session while the remote calls run.
//! Nothing is written to the session unless an answer was produced.

use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::audio::{AudioCapture, AudioClip, ClipArchive};
use crate::config::Config;
use crate::extraction::{AnswerExtractor, LlmExtractor};
use crate::session::{Question, QuestionnaireSession};
use crate::transcription::{transcribe_or_empty, ApiTranscriber, Transcriber};

/// Result of resolving one spoken or typed answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VoiceOutcome {
    /// An answer was produced for `label`
    Answered {
        label: String,
        transcript: String,
        answer: String,
    },
    /// Extraction failed; the error text was kept as the answer
    StoredError {
        label: String,
        transcript: String,
        answer: String,
    },
    /// Transcription came back empty
    NoSpeech { label: String },
    /// Speech was heard but it held no answer to the question
    NoAnswer { label: String, transcript: String },
    /// Extraction failed and errors are not stored
    ExtractionFailed {
        label: String,
        transcript: String,
        error: String,
    },
}

impl VoiceOutcome {
    /// The answer to store, if any
    pub fn answer(&self) -> Option<(&str, &str)> {
        match self {
            VoiceOutcome::Answered { label, answer, .. }
            | VoiceOutcome::StoredError { label, answer, .. } => {
                Some((label.as_str(), answer.as_str()))
            }
            VoiceOutcome::NoSpeech { .. }
            | VoiceOutcome::NoAnswer { .. }
            | VoiceOutcome::ExtractionFailed { .. } => None,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            VoiceOutcome::Answered { label, .. }
            | VoiceOutcome::StoredError { label, .. }
            | VoiceOutcome::NoSpeech { label }
            | VoiceOutcome::NoAnswer { label, .. }
            | VoiceOutcome::ExtractionFailed { label, .. } => label,
        }
    }

    /// One-line message for the user
    pub fn message(&self) -> String {
        match self {
            VoiceOutcome::Answered { transcript, answer, .. } => {
                format!("Heard \"{}\" -> {}", transcript, answer)
            }
            VoiceOutcome::StoredError { answer, .. } => {
                format!("Could not extract an answer; stored \"{}\"", answer)
            }
            VoiceOutcome::NoSpeech { .. } => {
                "No speech recognised, please try again".to_string()
            }
            VoiceOutcome::NoAnswer { transcript, .. } => {
                format!("Heard \"{}\" but found no answer, please try again", transcript)
            }
            VoiceOutcome::ExtractionFailed { error, .. } => {
                format!("Could not extract an answer: {}", error)
            }
        }
    }
}

/// Policy knobs for the voice flow
#[derive(Debug, Clone, Copy)]
pub struct AssistantOptions {
    /// Keep extraction errors as answer text
    pub store_errors: bool,
    /// Move to the next question after storing an answer
    pub advance_on_answer: bool,
}

impl Default for AssistantOptions {
    fn default() -> Self {
        Self {
            store_errors: true,
            advance_on_answer: true,
        }
    }
}

/// Drives the speech and extraction collaborators for a session
pub struct IntakeAssistant {
    transcriber: Arc<dyn Transcriber>,
    extractor: Arc<dyn AnswerExtractor>,
    options: AssistantOptions,
    archive: Option<ClipArchive>,
}

impl IntakeAssistant {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        extractor: Arc<dyn AnswerExtractor>,
        options: AssistantOptions,
    ) -> Self {
        Self {
            transcriber,
            extractor,
            options,
            archive: None,
        }
    }

    /// Save every resolved clip under the archive directory
    pub fn with_archive(mut self, archive: ClipArchive) -> Self {
        self.archive = Some(archive);
        self
    }

    /// Assistant backed by the configured speech and LLM APIs
    pub fn from_config(config: &Config) -> Result<Self> {
        let transcriber = ApiTranscriber::from_config(&config.transcription)?;
        let extractor = LlmExtractor::from_config(&config.extraction)?;
        let options = AssistantOptions {
            store_errors: config.extraction.store_errors,
            advance_on_answer: config.extraction.advance_on_answer,
        };

        let assistant = Self::new(Arc::new(transcriber), Arc::new(extractor), options);
        if config.audio.keep_recordings {
            let archive = ClipArchive::new(&config.audio.recordings_path)
                .context("Failed to prepare recordings directory")?;
            return Ok(assistant.with_archive(archive));
        }
        Ok(assistant)
    }

    pub fn options(&self) -> AssistantOptions {
        self.options
    }

    /// Transcribe and extract an answer for `question` without touching any session
    pub async fn resolve_clip(
        &self,
        session_id: &str,
        question: &Question,
        clip: &AudioClip,
    ) -> VoiceOutcome {
        if let Some(archive) = &self.archive {
            if let Err(e) = archive.save(session_id, &question.label, clip) {
                warn!("Failed to archive answer recording: {:#}", e);
            }
        }

        let transcript = transcribe_or_empty(self.transcriber.as_ref(), clip).await;
        if transcript.trim().is_empty() {
            info!("No speech recognised for '{}'", question.label);
            return VoiceOutcome::NoSpeech {
                label: question.label.clone(),
            };
        }

        self.resolve_text(question, &transcript).await
    }

    /// Extract an answer for `question` from free text
    pub async fn resolve_text(&self, question: &Question, text: &str) -> VoiceOutcome {
        let label = question.label.clone();
        let transcript = text.trim().to_string();

        match self.extractor.extract(&transcript, question).await {
            Ok(answer) if answer.trim().is_empty() => {
                info!("No answer to '{}' in \"{}\"", question.label, transcript);
                VoiceOutcome::NoAnswer { label, transcript }
            }
            Ok(answer) => VoiceOutcome::Answered {
                label,
                transcript,
                answer,
            },
            Err(e) => {
                warn!("Answer extraction failed for '{}': {:#}", question.label, e);
                if self.options.store_errors {
                    VoiceOutcome::StoredError {
                        label,
                        transcript,
                        answer: format!("Error: {}", e),
                    }
                } else {
                    VoiceOutcome::ExtractionFailed {
                        label,
                        transcript,
                        error: e.to_string(),
                    }
                }
            }
        }
    }

    /// Store the outcome's answer and, if configured, advance
    ///
    /// Returns whether the session changed.
    pub fn apply(&self, session: &mut QuestionnaireSession, outcome: &VoiceOutcome) -> bool {
        let Some((label, answer)) = outcome.answer() else {
            return false;
        };

        session.set_answer(label, answer);
        if self.options.advance_on_answer && session.current_question().label == label {
            session.advance();
        }
        true
    }

    /// Capture a clip and answer the current question with it
    ///
    /// A capture failure is returned as an error and leaves the session as it was.
    pub async fn answer_by_voice(
        &self,
        session_id: &str,
        session: &mut QuestionnaireSession,
        capture: &mut dyn AudioCapture,
    ) -> Result<VoiceOutcome> {
        info!("Capturing answer with {} backend", capture.name());
        let clip = capture.capture().await.context("Audio capture failed")?;

        let question = session.current_question().clone();
        let outcome = self.resolve_clip(session_id, &question, &clip).await;
        self.apply(session, &outcome);
        Ok(outcome)
    }
}
