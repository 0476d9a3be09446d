// File: src/classify/openai.rs
//! OpenAI provider adapter (Chat Completions, JSON object mode).
use crate::classify::{
    Classify, ClassifyError, build_prompt, extract_error_message, parse_classified_envelope,
};
use crate::model::Classification;
use async_trait::async_trait;

/// Configuration for the OpenAI adapter.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Base URL (defaults to `https://api.openai.com`).
    pub base_url: String,
    /// The model to use.
    pub model: String,
}

impl OpenAiConfig {
    /// Create a new config with the given API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.openai.com".into(),
            model: model.into(),
        }
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

/// Build the Chat Completions request body asking for a JSON object answer.
pub fn build_request(model: &str, categories: &[String], task: &str) -> serde_json::Value {
    serde_json::json!({
        "model": model,
        "messages": [{
            "role": "user",
            "content": build_prompt(categories, task)
        }],
        "response_format": { "type": "json_object" }
    })
}

/// Pull the generated message content out of a Chat Completions response.
pub fn parse_response(body: &serde_json::Value) -> Result<Classification, ClassifyError> {
    let text = body
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|t| t.as_str())
        .ok_or_else(|| {
            ClassifyError::Malformed("chat completion has no message content".to_string())
        })?;
    parse_classified_envelope(text)
}

/// Map an HTTP error status to the appropriate ClassifyError.
fn map_http_error(status: reqwest::StatusCode, body: &str) -> ClassifyError {
    let message = extract_error_message(body);
    match status.as_u16() {
        401 | 403 => ClassifyError::Auth(format!("OpenAI rejected credentials: {message}")),
        429 => ClassifyError::Request(format!("OpenAI rate limited: {message}")),
        _ => ClassifyError::Provider(format!("OpenAI HTTP {}: {message}", status.as_u16())),
    }
}

/// OpenAI provider adapter.
pub struct OpenAiClient {
    config: OpenAiConfig,
    categories: Vec<String>,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("model", &self.config.model)
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig, categories: Vec<String>) -> Self {
        let client = reqwest::Client::new();
        Self {
            config,
            categories,
            client,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.config.base_url)
    }
}

#[async_trait]
impl Classify for OpenAiClient {
    async fn classify(&self, task: &str) -> Result<Classification, ClassifyError> {
        let body = build_request(&self.config.model, &self.categories, task);

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ClassifyError::Request(format!("OpenAI request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, &body_text));
        }

        let parsed: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ClassifyError::Malformed(format!("OpenAI response not JSON: {e}")))?;
        parse_response(&parsed)
    }

    fn name(&self) -> &str {
        "openai"
    }
}
