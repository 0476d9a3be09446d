// File: src/classify/mod.rs
//! Classification providers: map a task title to a category/difficulty label.
//!
//! Providers form a closed set behind the [`Classify`] capability trait;
//! selection happens once, from the explicit `provider` config value, and is
//! exhaustively matched. No string-keyed dispatch.
pub mod gemini;
pub mod openai;

use crate::config::{Config, ProviderKind};
use crate::model::Classification;
use async_trait::async_trait;
use serde::Deserialize;
use strum::IntoEnumIterator;

pub use gemini::{GeminiClient, GeminiConfig};
pub use openai::{OpenAiClient, OpenAiConfig};

/// Errors produced by a classification provider.
///
/// `Auth` is fatal for the whole run (the provider is unusable without
/// credentials); everything else is recoverable per item.
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    /// Missing/invalid credentials, or the provider rejected them.
    #[error("authentication failed: {0}")]
    Auth(String),
    /// The request could not be completed (network, timeout, rate limit).
    #[error("request failed: {0}")]
    Request(String),
    /// The provider answered with an error status.
    #[error("provider error: {0}")]
    Provider(String),
    /// The provider answered, but not with a usable classification.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ClassifyError {
    /// Whether this error must abort the run instead of skipping one item.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ClassifyError::Auth(_))
    }
}

/// The single capability a classification provider exposes.
#[async_trait]
pub trait Classify: Send + Sync {
    async fn classify(&self, task: &str) -> Result<Classification, ClassifyError>;
    fn name(&self) -> &str;
}

/// Closed set of supported providers.
#[derive(Debug)]
pub enum Classifier {
    Gemini(GeminiClient),
    OpenAi(OpenAiClient),
}

impl Classifier {
    /// Build the configured provider. Fails up front when the selected
    /// provider has no API key; a run without credentials must never start.
    pub fn from_config(config: &Config) -> Result<Self, ClassifyError> {
        match config.provider {
            ProviderKind::Gemini => {
                if config.gemini_api_key.is_empty() {
                    return Err(ClassifyError::Auth(format!(
                        "no API key configured for provider 'gemini' (supported: {})",
                        supported_providers()
                    )));
                }
                Ok(Classifier::Gemini(GeminiClient::new(
                    GeminiConfig::new(&config.gemini_api_key, &config.gemini_model),
                    config.categories.clone(),
                )))
            }
            ProviderKind::OpenAi => {
                if config.openai_api_key.is_empty() {
                    return Err(ClassifyError::Auth(format!(
                        "no API key configured for provider 'openai' (supported: {})",
                        supported_providers()
                    )));
                }
                Ok(Classifier::OpenAi(OpenAiClient::new(
                    OpenAiConfig::new(&config.openai_api_key, &config.openai_model),
                    config.categories.clone(),
                )))
            }
        }
    }
}

#[async_trait]
impl Classify for Classifier {
    async fn classify(&self, task: &str) -> Result<Classification, ClassifyError> {
        match self {
            Classifier::Gemini(client) => client.classify(task).await,
            Classifier::OpenAi(client) => client.classify(task).await,
        }
    }

    fn name(&self) -> &str {
        match self {
            Classifier::Gemini(client) => client.name(),
            Classifier::OpenAi(client) => client.name(),
        }
    }
}

fn supported_providers() -> String {
    ProviderKind::iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// --- Shared prompt/envelope handling ---

/// Instruction prompt sent to every provider. The model must answer with the
/// JSON envelope parsed by [`parse_classified_envelope`].
pub(crate) fn build_prompt(categories: &[String], task: &str) -> String {
    format!(
        "You are a personal assistant that labels completed tasks.\n\
         The only categories you are aware of are: {cats}.\n\
         Pick exactly one of those categories for the task below, and rate \
         its difficulty as EASY, MEDIUM or HARD.\n\
         Answer with JSON of the form \
         {{\"classified\": [{{\"category\": \"...\", \"difficulty\": \"...\"}}]}}.\n\
         \n\
         ============\n\
         This is the task:\n\
         {task}\n",
        cats = categories.join(", "),
        task = task
    )
}

#[derive(Deserialize)]
struct ClassifiedEnvelope {
    classified: Vec<Classification>,
}

/// Parse the `{"classified": [...]}` envelope a provider answers with.
/// The last element wins when the model returns several.
pub(crate) fn parse_classified_envelope(text: &str) -> Result<Classification, ClassifyError> {
    let envelope: ClassifiedEnvelope = serde_json::from_str(text)
        .map_err(|e| ClassifyError::Malformed(format!("bad classification JSON: {}", e)))?;
    envelope
        .classified
        .into_iter()
        .last()
        .ok_or_else(|| ClassifyError::Malformed("empty 'classified' array".to_string()))
}

/// Extract a human-readable message from a provider error body, falling back
/// to the raw body.
pub(crate) fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_names_every_category_and_the_task() {
        let cats = vec!["Work".to_string(), "Health".to_string()];
        let prompt = build_prompt(&cats, "Coded side project");
        assert!(prompt.contains("Work, Health"));
        assert!(prompt.contains("Coded side project"));
        assert!(prompt.contains("EASY, MEDIUM or HARD"));
    }

    #[test]
    fn envelope_last_element_wins() {
        let text = r#"{"classified":[
            {"category":"Play","difficulty":"EASY"},
            {"category":"Work","difficulty":"HARD"}
        ]}"#;
        let c = parse_classified_envelope(text).expect("valid envelope");
        assert_eq!(c.category, "Work");
        assert_eq!(c.difficulty, "HARD");
    }

    #[test]
    fn empty_envelope_is_malformed() {
        let err = parse_classified_envelope(r#"{"classified":[]}"#).expect_err("empty");
        assert!(matches!(err, ClassifyError::Malformed(_)));
    }

    #[test]
    fn non_json_is_malformed() {
        let err = parse_classified_envelope("Sure! The category is Work.").expect_err("prose");
        assert!(matches!(err, ClassifyError::Malformed(_)));
        assert!(!err.is_fatal());
    }

    #[test]
    fn extract_error_from_json_body() {
        let body = r#"{"error":{"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(extract_error_message(body), "API key not valid");
        assert_eq!(extract_error_message("plain failure"), "plain failure");
    }

    #[test]
    fn from_config_requires_a_key() {
        let config = Config::default();
        let err = Classifier::from_config(&config).expect_err("no key configured");
        assert!(err.is_fatal());
        assert!(err.to_string().contains("gemini"));
    }

    #[test]
    fn from_config_matches_selected_provider() {
        let mut config = Config::default();
        config.gemini_api_key = "g-key".to_string();
        let classifier = Classifier::from_config(&config).expect("gemini configured");
        assert_eq!(classifier.name(), "gemini");

        config.provider = crate::config::ProviderKind::OpenAi;
        let err = Classifier::from_config(&config).expect_err("openai key missing");
        assert!(err.is_fatal());

        config.openai_api_key = "sk-key".to_string();
        let classifier = Classifier::from_config(&config).expect("openai configured");
        assert_eq!(classifier.name(), "openai");
    }
}
