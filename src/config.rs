// File: ./src/config.rs
// Handles configuration loading, saving, and defaults.
use crate::context::AppContext;
use crate::storage::LocalStorage;
use anyhow::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use strum::EnumIter;

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_window_days() -> u32 {
    7
}

fn default_categories() -> Vec<String> {
    vec![
        "Work".to_string(),
        "Play".to_string(),
        "Health".to_string(),
    ]
}

/// Which classification provider to use. A closed set: adding a provider
/// means adding a variant here and a match arm in `Classifier::from_config`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Gemini,
    #[serde(rename = "openai")]
    OpenAi,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Gemini => write!(f, "gemini"),
            ProviderKind::OpenAi => write!(f, "openai"),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderKind,
    #[serde(default)]
    pub gemini_api_key: String,
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,
    #[serde(default)]
    pub openai_api_key: String,
    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    /// OAuth bearer token for the task provider (acquired externally).
    #[serde(default)]
    pub tasks_token: String,

    /// Trailing window (in days before the most recent recorded date) within
    /// which reverted tasks are pruned from history.
    #[serde(default = "default_window_days")]
    pub prune_window_days: u32,

    /// Concurrent classification calls. 0 means "match available parallelism".
    #[serde(default)]
    pub classify_concurrency: usize,

    /// Categories offered to the classification provider.
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,

    /// Optional remote document endpoint the tracker is mirrored to after a
    /// successful local persist (best-effort).
    #[serde(default)]
    pub mirror_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            gemini_api_key: String::new(),
            gemini_model: default_gemini_model(),
            openai_api_key: String::new(),
            openai_model: default_openai_model(),
            tasks_token: String::new(),
            // Match the serde defaults
            prune_window_days: 7,
            classify_concurrency: 0,
            categories: default_categories(),
            mirror_url: None,
        }
    }
}

impl Config {
    /// Load the configuration from disk using an explicit context.
    /// Returns a contextualized error if reading or parsing fails.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_config_file_path()?;

        // Explicitly detect missing file so callers can behave accordingly.
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found"));
        }

        let contents = fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;

        Ok(config)
    }

    /// Helper to detect whether an anyhow::Error indicates that the config
    /// file was missing (as opposed to present but unreadable/invalid).
    pub fn is_missing_config_error(err: &Error) -> bool {
        if err.to_string().contains("Config file not found") {
            return true;
        }
        for cause in err.chain() {
            if let Some(io_err) = cause.downcast_ref::<std::io::Error>()
                && io_err.kind() == std::io::ErrorKind::NotFound
            {
                return true;
            }
        }
        false
    }

    /// Save configuration using an explicit context.
    pub fn save(&self, ctx: &dyn AppContext) -> Result<()> {
        let path = ctx.get_config_file_path()?;
        LocalStorage::with_lock(&path, || {
            let toml_str = toml::to_string_pretty(self)?;
            LocalStorage::atomic_write(&path, toml_str)?;
            Ok(())
        })?;
        Ok(())
    }

    /// Worker-pool size for classification calls: the configured value, or
    /// the runtime's available parallelism when left at 0.
    pub fn effective_concurrency(&self) -> usize {
        if self.classify_concurrency > 0 {
            return self.classify_concurrency;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TestContext;

    #[test]
    fn load_missing_config_is_detectable() {
        let ctx = TestContext::new();
        let err = Config::load(&ctx).expect_err("no config on disk");
        assert!(Config::is_missing_config_error(&err));
    }

    #[test]
    fn save_then_load_round_trips() {
        let ctx = TestContext::new();
        let mut config = Config::default();
        config.provider = ProviderKind::OpenAi;
        config.openai_api_key = "sk-test".to_string();
        config.prune_window_days = 3;
        config.save(&ctx).expect("save config");

        let loaded = Config::load(&ctx).expect("load config");
        assert_eq!(loaded.provider, ProviderKind::OpenAi);
        assert_eq!(loaded.openai_api_key, "sk-test");
        assert_eq!(loaded.prune_window_days, 3);
        // Untouched fields keep their defaults.
        assert_eq!(loaded.gemini_model, "gemini-2.0-flash");
        assert_eq!(loaded.categories, vec!["Work", "Play", "Health"]);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let ctx = TestContext::new();
        let path = ctx.get_config_file_path().expect("config path");
        std::fs::write(&path, "provider = \"openai\"\n").expect("write partial config");

        let loaded = Config::load(&ctx).expect("load partial config");
        assert_eq!(loaded.provider, ProviderKind::OpenAi);
        assert_eq!(loaded.prune_window_days, 7);
        assert_eq!(loaded.classify_concurrency, 0);
        assert!(loaded.mirror_url.is_none());
    }

    #[test]
    fn effective_concurrency_prefers_explicit_value() {
        let mut config = Config::default();
        config.classify_concurrency = 3;
        assert_eq!(config.effective_concurrency(), 3);
        config.classify_concurrency = 0;
        assert!(config.effective_concurrency() >= 1);
    }
}
