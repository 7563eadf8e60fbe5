use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::report::ReportConfig;
use crate::suggestions::InsightConfig;
use crate::text::WordCloudConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub endpoint: String,
    pub model: String,
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub network_backoff_ms: u64,
    pub max_tokens: u32,
    pub temperature: f64,
    /// Articles summarised in the user prompt.
    pub prompt_articles: usize,
    pub snippet_chars: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            model: "openai/gpt-4o-mini".to_string(),
            timeout_ms: 90_000,
            max_retries: 3,
            retry_backoff_ms: 2_000,
            network_backoff_ms: 3_000,
            max_tokens: 1_600,
            temperature: 0.2,
            prompt_articles: 8,
            snippet_chars: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/analyses.json"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub report: ReportConfig,
    pub word_cloud: WordCloudConfig,
    pub insights: InsightConfig,
    pub llm: LlmConfig,
    pub store: StoreConfig,
}

impl AnalyticsConfig {
    /// Reads `path` (or the default location) when it exists, falling back to
    /// defaults, then applies environment overrides. Returns the path used.
    pub fn load(path: Option<PathBuf>) -> Result<(Self, Option<PathBuf>)> {
        let config_path = path.or_else(default_config_path);
        let mut config = match config_path.as_ref() {
            Some(path) if path.exists() => Self::from_file(path)?,
            _ => AnalyticsConfig::default(),
        };

        config.apply_env_overrides();
        Ok((config, config_path))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let io_error = |source| Error::ConfigWrite {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        let payload = toml::to_string_pretty(self)?;
        std::fs::write(path, payload).map_err(io_error)?;
        Ok(())
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(endpoint) = env::var("OPENROUTER_BASE_URL") {
            if !endpoint.trim().is_empty() {
                self.llm.endpoint = endpoint;
            }
        }
        if let Ok(model) = env::var("OPENROUTER_MODEL") {
            if !model.trim().is_empty() {
                self.llm.model = model;
            }
        }
        if let Ok(max_tokens) = env::var("OPENROUTER_MAX_TOKENS") {
            if let Ok(value) = max_tokens.trim().parse::<u32>() {
                self.llm.max_tokens = value;
            }
        }
        if let Ok(temperature) = env::var("OPENROUTER_TEMPERATURE") {
            if let Ok(value) = temperature.trim().parse::<f64>() {
                self.llm.temperature = value;
            }
        }
        if let Ok(timeout) = env::var("OPENROUTER_TIMEOUT_MS") {
            if let Ok(value) = timeout.trim().parse::<u64>() {
                self.llm.timeout_ms = value;
            }
        }
        if let Ok(store_path) = env::var("TOPIC_STORE_PATH") {
            if !store_path.trim().is_empty() {
                self.store.path = PathBuf::from(store_path);
            }
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    env::var("ANALYTICS_CONFIG_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("config/analytics.toml")))
}
