use anyhow::{bail, Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;
use tracing::{debug, error};

use super::messages::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};

/// Client for an OpenAI-compatible `chat/completions` endpoint
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    has_key: bool,
}

impl ChatClient {
    pub fn new(endpoint: &str, model: &str, api_key: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if !api_key.is_empty() {
            let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key))
                .context("Invalid API key header value")?;
            auth.set_sensitive(true);
            headers.insert(AUTHORIZATION, auth);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            has_key: !api_key.is_empty(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Build the request body for `messages` using this client's model
    pub fn request(&self, messages: Vec<ChatMessage>) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: Some(0.0),
        }
    }

    /// Send a completion request and return the first choice's text
    ///
    /// `Ok(None)` means the API answered without content.
    pub async fn complete(&self, messages: Vec<ChatMessage>) -> Result<Option<String>> {
        if !self.has_key {
            bail!("API key is not configured");
        }

        let url = self.completions_url();
        debug!("Sending chat completion request to: {} (model={})", url, self.model);

        let response = self
            .http
            .post(&url)
            .json(&self.request(messages))
            .send()
            .await
            .context("HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());
            error!("API request failed with status {}: {}", status, error_text);
            bail!("API request failed with status {}: {}", status, error_text);
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .context("Failed to parse API response")?;

        Ok(completion.first_text())
    }
}
