//! Speech-to-text for spoken answers
//!
//! `ApiTranscriber` uploads the clip as a base64 WAV to an OpenAI-compatible
//! chat endpoint that accepts `input_audio` parts.

use anyhow::Result;
use base64::Engine;
use tracing::{debug, info, warn};

use crate::audio::AudioClip;
use crate::config::{api_key_from_env, TranscriptionConfig};
use crate::llm::{ChatClient, ChatMessage, ContentPart, InputAudio};

const TRANSCRIBE_ONLY: &str =
    "Return only the transcribed text without any additional commentary.";

#[async_trait::async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe a clip; an empty string means nothing was recognised
    async fn transcribe(&self, clip: &AudioClip) -> Result<String>;
}

/// Transcribe, folding every failure into an empty transcript
pub async fn transcribe_or_empty(transcriber: &dyn Transcriber, clip: &AudioClip) -> String {
    match transcriber.transcribe(clip).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Transcription failed: {:#}", e);
            String::new()
        }
    }
}

pub struct ApiTranscriber {
    client: ChatClient,
    language: Option<String>,
}

impl ApiTranscriber {
    pub fn new(client: ChatClient, language: Option<String>) -> Self {
        Self { client, language }
    }

    pub fn from_config(config: &TranscriptionConfig) -> Result<Self> {
        let api_key = api_key_from_env(&config.api_key_env);
        if api_key.is_empty() {
            warn!(
                "{} is not set; voice answers will not be transcribed",
                config.api_key_env
            );
        }
        let client = ChatClient::new(&config.endpoint, &config.model, &api_key)?;
        Ok(Self::new(client, config.language.clone()))
    }

    fn prompt(&self) -> String {
        match self.language.as_deref() {
            Some(lang) if lang != "auto" && !lang.is_empty() => {
                format!("Transcribe this audio in {}. {}", lang, TRANSCRIBE_ONLY)
            }
            _ => format!("Transcribe this audio. {}", TRANSCRIBE_ONLY),
        }
    }

    fn message(&self, clip: &AudioClip) -> Result<ChatMessage> {
        let wav = clip.to_wav_bytes()?;
        Ok(ChatMessage::user_parts(vec![
            ContentPart::Text {
                text: self.prompt(),
            },
            ContentPart::InputAudio {
                input_audio: InputAudio {
                    data: base64::engine::general_purpose::STANDARD.encode(wav),
                    format: "wav".to_string(),
                },
            },
        ]))
    }
}

#[async_trait::async_trait]
impl Transcriber for ApiTranscriber {
    async fn transcribe(&self, clip: &AudioClip) -> Result<String> {
        if clip.is_empty() {
            return Ok(String::new());
        }

        debug!(
            "Transcribing {:.1}s clip with model {}",
            clip.duration_seconds(),
            self.client.model()
        );

        let message = self.message(clip)?;
        let text = self.client.complete(vec![message]).await?.unwrap_or_default();

        info!("Transcription complete ({} chars)", text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatContent;

    fn transcriber(language: Option<&str>) -> ApiTranscriber {
        let client = ChatClient::new("http://localhost:9/v1/", "audio-model", "").unwrap();
        ApiTranscriber::new(client, language.map(str::to_string))
    }

    #[test]
    fn prompt_mentions_language_when_set() {
        assert!(transcriber(Some("Hindi")).prompt().contains("in Hindi"));
        assert!(!transcriber(Some("auto")).prompt().contains(" in "));
        assert!(!transcriber(None).prompt().contains(" in "));
    }

    #[test]
    fn message_carries_wav_audio_part() {
        let clip = AudioClip::new(vec![0; 1600], 16000);
        let message = transcriber(None).message(&clip).unwrap();

        let ChatContent::Parts(parts) = message.content else {
            panic!("expected multipart content");
        };
        assert_eq!(parts.len(), 2);
        let ContentPart::InputAudio { input_audio } = &parts[1] else {
            panic!("expected audio part");
        };
        assert_eq!(input_audio.format, "wav");

        let wav = base64::engine::general_purpose::STANDARD
            .decode(&input_audio.data)
            .unwrap();
        assert_eq!(&wav[..4], b"RIFF");
    }

    #[tokio::test]
    async fn empty_clip_skips_the_request() {
        let text = transcriber(None)
            .transcribe(&AudioClip::new(Vec::new(), 16000))
            .await
            .unwrap();
        assert!(text.is_empty());
    }

    #[tokio::test]
    async fn missing_key_folds_to_empty_transcript() {
        let clip = AudioClip::new(vec![1; 160], 16000);
        let text = transcribe_or_empty(&transcriber(None), &clip).await;
        assert!(text.is_empty());
    }
}
