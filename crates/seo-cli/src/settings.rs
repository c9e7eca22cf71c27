//! Layered settings for the seo-topics tool.
//!
//! Sources, later overriding earlier:
//! 1. Built-in defaults
//! 2. `~/.config/seo-topics/config.toml`
//! 3. File passed with `--config`
//! 4. Environment variables `SEO_TOPICS__*` (`__` separates nested keys,
//!    e.g. `SEO_TOPICS__TOPICS__CLUSTERING__MIN_SIMILARITY=0.8`)
//!
//! CLI flags are applied by the caller after loading.

use std::path::PathBuf;
use std::time::Duration;

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use seo_topics::{ApiLlmClientConfig, LlmProvider, TopicsConfig};
use thiserror::Error;

use crate::cli::OutputFormat;

/// Settings errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No API key: set llm.api_key, SEO_TOPICS__LLM__API_KEY or {0}")]
    MissingApiKey(&'static str),
}

impl From<config::ConfigError> for SettingsError {
    fn from(e: config::ConfigError) -> Self {
        SettingsError::Config(e.to_string())
    }
}

/// Language model connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Wire protocol ("openai" or "anthropic")
    #[serde(default)]
    pub provider: LlmProvider,

    /// Model name (e.g., "gpt-4o-mini")
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// API key (falls back to the provider's usual env var)
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL (for custom endpoints)
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// HTTP request timeout in seconds
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_llm_timeout_secs() -> u64 {
    60
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            model: default_llm_model(),
            api_key: None,
            api_base_url: None,
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

impl LlmSettings {
    /// Environment variable consulted when no key is configured.
    pub fn api_key_env_var(&self) -> &'static str {
        match self.provider {
            LlmProvider::OpenAi => "OPENAI_API_KEY",
            LlmProvider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    /// Build the API client configuration, resolving the key.
    pub fn client_config(&self) -> Result<ApiLlmClientConfig, SettingsError> {
        let api_key = self
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .or_else(|| std::env::var(self.api_key_env_var()).ok())
            .filter(|key| !key.is_empty())
            .ok_or(SettingsError::MissingApiKey(self.api_key_env_var()))?;

        let config = match self.provider {
            LlmProvider::OpenAi => ApiLlmClientConfig::openai(api_key, self.model.clone()),
            LlmProvider::Anthropic => ApiLlmClientConfig::claude(api_key, self.model.clone()),
        };
        let config = config.with_timeout(Duration::from_secs(self.timeout_secs));

        Ok(match &self.api_base_url {
            Some(base_url) => config.with_base_url(base_url.clone()),
            None => config,
        })
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Directory the output files are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Output file format
    #[serde(default)]
    pub format: OutputFormat,

    /// Clustering and labeling configuration
    #[serde(default)]
    pub topics: TopicsConfig,

    /// Language model connection
    #[serde(default)]
    pub llm: LlmSettings,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            output_dir: default_output_dir(),
            format: OutputFormat::default(),
            topics: TopicsConfig::default(),
            llm: LlmSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from defaults, config files and the environment.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, SettingsError> {
        let config_dir = ProjectDirs::from("", "", "seo-topics")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("log_level", default_log_level())?
            .set_default("output_dir", default_output_dir().to_string_lossy().to_string())?
            .set_default("format", "csv")?
            .set_default("llm.provider", "openai")?
            .set_default("llm.model", default_llm_model())?
            .set_default("llm.timeout_secs", default_llm_timeout_secs() as i64)?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("SEO_TOPICS")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings
            .topics
            .validate()
            .map_err(|e| SettingsError::Config(e.to_string()))?;

        Ok(settings)
    }
}
