//! Answer extraction from free text with an LLM

use anyhow::Result;
use tracing::{debug, warn};

use crate::config::{api_key_from_env, ExtractionConfig};
use crate::llm::{ChatClient, ChatMessage};
use crate::session::{Question, QuestionKind};

const SYSTEM_PROMPT: &str = "You fill in a medical intake form. \
Given a question and what the patient said, reply with the answer to the question only, \
without labels, quotes or explanations.";

#[async_trait::async_trait]
pub trait AnswerExtractor: Send + Sync {
    /// Pull the answer to `question` out of `text`
    async fn extract(&self, text: &str, question: &Question) -> Result<String>;
}

pub struct LlmExtractor {
    client: ChatClient,
}

impl LlmExtractor {
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }

    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        let api_key = api_key_from_env(&config.api_key_env);
        if api_key.is_empty() {
            warn!(
                "{} is not set; answer extraction will fail",
                config.api_key_env
            );
        }
        Ok(Self::new(ChatClient::new(
            &config.endpoint,
            &config.model,
            &api_key,
        )?))
    }
}

/// User prompt for extracting one answer
pub fn build_prompt(text: &str, question: &Question) -> String {
    let format_hint = match question.kind {
        QuestionKind::Number => "Reply with the number only, written in digits.",
        QuestionKind::Text => "Reply with a short phrase.",
    };

    format!(
        "Question: {}\nExpected answer type: {}\nPatient said: \"{}\"\n\n{} \
If the patient did not answer the question, reply with nothing.",
        question.label,
        question.kind,
        text.trim(),
        format_hint
    )
}

#[async_trait::async_trait]
impl AnswerExtractor for LlmExtractor {
    async fn extract(&self, text: &str, question: &Question) -> Result<String> {
        debug!("Extracting answer for '{}'", question.label);

        let messages = vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(build_prompt(text, question)),
        ];
        let answer = self.client.complete(messages).await?.unwrap_or_default();

        Ok(answer.trim_matches('"').trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_includes_label_kind_and_text() {
        let prompt = build_prompt("  I am thirty four years old ", &Question::number("Age"));
        assert!(prompt.contains("Question: Age"));
        assert!(prompt.contains("Expected answer type: number"));
        assert!(prompt.contains("\"I am thirty four years old\""));
        assert!(prompt.contains("digits"));
    }

    #[test]
    fn text_prompt_asks_for_a_phrase() {
        let prompt = build_prompt("by bus", &Question::text("Means of transport to health center"));
        assert!(prompt.contains("short phrase"));
    }

    #[tokio::test]
    async fn missing_key_is_an_error() {
        let client = ChatClient::new("http://localhost:9/v1", "model", "").unwrap();
        let result = LlmExtractor::new(client)
            .extract("Alice", &Question::text("Name"))
            .await;
        assert!(result.is_err());
    }
}
