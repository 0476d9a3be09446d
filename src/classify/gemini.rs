// File: src/classify/gemini.rs
//! Gemini provider adapter (generateContent, JSON response mode).
use crate::classify::{
    Classify, ClassifyError, build_prompt, extract_error_message, parse_classified_envelope,
};
use crate::model::Classification;
use async_trait::async_trait;

/// Configuration for the Gemini adapter.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Base URL (defaults to `https://generativelanguage.googleapis.com`).
    pub base_url: String,
    /// The model to use.
    pub model: String,
}

impl GeminiConfig {
    /// Create a new config with the given API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://generativelanguage.googleapis.com".into(),
            model: model.into(),
        }
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

/// Build the generateContent request body asking for a JSON answer.
pub fn build_request(categories: &[String], task: &str) -> serde_json::Value {
    serde_json::json!({
        "contents": [{
            "parts": [{ "text": build_prompt(categories, task) }]
        }],
        "generationConfig": {
            "responseMimeType": "application/json"
        }
    })
}

/// Pull the generated text out of a generateContent response body.
pub fn parse_response(body: &serde_json::Value) -> Result<Classification, ClassifyError> {
    let text = body
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.get(0))
        .and_then(|p| p.get("text"))
        .and_then(|t| t.as_str())
        .ok_or_else(|| {
            ClassifyError::Malformed("generateContent response has no text part".to_string())
        })?;
    parse_classified_envelope(text)
}

/// Map an HTTP error status to the appropriate ClassifyError.
fn map_http_error(status: reqwest::StatusCode, body: &str) -> ClassifyError {
    let message = extract_error_message(body);
    match status.as_u16() {
        401 | 403 => ClassifyError::Auth(format!("Gemini rejected credentials: {message}")),
        429 => ClassifyError::Request(format!("Gemini rate limited: {message}")),
        _ => ClassifyError::Provider(format!("Gemini HTTP {}: {message}", status.as_u16())),
    }
}

/// Gemini provider adapter.
pub struct GeminiClient {
    config: GeminiConfig,
    categories: Vec<String>,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.config.model)
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

impl GeminiClient {
    pub fn new(config: GeminiConfig, categories: Vec<String>) -> Self {
        let client = reqwest::Client::new();
        Self {
            config,
            categories,
            client,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }
}

#[async_trait]
impl Classify for GeminiClient {
    async fn classify(&self, task: &str) -> Result<Classification, ClassifyError> {
        let body = build_request(&self.categories, task);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ClassifyError::Request(format!("Gemini request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, &body_text));
        }

        let parsed: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ClassifyError::Malformed(format!("Gemini response not JSON: {e}")))?;
        parse_response(&parsed)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
