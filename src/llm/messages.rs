use serde::{Deserialize, Serialize};

/// Chat completion request sent to an OpenAI-compatible endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: ChatContent,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: ChatContent::Text(text.into()),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: ChatContent::Text(text.into()),
        }
    }

    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            role: "user".to_string(),
            content: ChatContent::Parts(parts),
        }
    }
}

/// Plain string content or a list of typed parts (text, audio)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    InputAudio { input_audio: InputAudio },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputAudio {
    pub data: String,   // Base64-encoded audio file
    pub format: String, // "wav"
}

/// Chat completion response; only the first choice is used
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatChoice {
    pub message: ResponseMessage,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Trimmed text of the first choice, if any
    pub fn first_text(&self) -> Option<String> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .map(|text| text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_messages_serialize_as_plain_strings() {
        let request = ChatCompletionRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![ChatMessage::system("Be brief"), ChatMessage::user("Hi")],
            temperature: None,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "model": "gpt-4o-mini",
                "messages": [
                    {"role": "system", "content": "Be brief"},
                    {"role": "user", "content": "Hi"}
                ]
            })
        );
    }

    #[test]
    fn audio_parts_are_tagged_by_type() {
        let message = ChatMessage::user_parts(vec![
            ContentPart::Text {
                text: "Transcribe".to_string(),
            },
            ContentPart::InputAudio {
                input_audio: InputAudio {
                    data: "UklGRg==".to_string(),
                    format: "wav".to_string(),
                },
            },
        ]);

        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(
            value,
            json!({
                "role": "user",
                "content": [
                    {"type": "text", "text": "Transcribe"},
                    {"type": "input_audio", "input_audio": {"data": "UklGRg==", "format": "wav"}}
                ]
            })
        );
    }

    #[test]
    fn content_deserializes_either_shape() {
        let text: ChatMessage =
            serde_json::from_value(json!({"role": "user", "content": "34"})).unwrap();
        assert!(matches!(text.content, ChatContent::Text(ref t) if t == "34"));

        let parts: ChatMessage = serde_json::from_value(json!({
            "role": "user",
            "content": [{"type": "input_audio", "input_audio": {"data": "AA==", "format": "wav"}}]
        }))
        .unwrap();
        match parts.content {
            ChatContent::Parts(parts) => assert!(matches!(
                &parts[..],
                [ContentPart::InputAudio { input_audio }] if input_audio.format == "wav"
            )),
            other => panic!("unexpected content: {:?}", other),
        }
    }

    #[test]
    fn first_text_is_trimmed() {
        let response: ChatCompletionResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "  Alice \n"}},
                {"index": 1, "message": {"role": "assistant", "content": "Bob"}}
            ]
        }))
        .unwrap();

        assert_eq!(response.first_text().as_deref(), Some("Alice"));
    }

    #[test]
    fn first_text_without_content() {
        let no_choices: ChatCompletionResponse =
            serde_json::from_value(json!({"choices": []})).unwrap();
        assert_eq!(no_choices.first_text(), None);

        let null_content: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": null}}]
        }))
        .unwrap();
        assert_eq!(null_content.first_text(), None);

        let refusal: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "refusal": "no"}}]
        }))
        .unwrap();
        assert_eq!(refusal.first_text(), None);
    }

    #[test]
    fn missing_choices_is_a_parse_error() {
        let result = serde_json::from_value::<ChatCompletionResponse>(json!({"error": "bad"}));
        assert!(result.is_err());
    }
}
