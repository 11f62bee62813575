//! Generation configuration.
//!
//! Precedence follows the usual CLI layering: flags > environment >
//! optional `postforge.toml` file > defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Drafting model allow-list exposed on the CLI.
pub const OPENAI_MODEL_OPTIONS: [&str; 5] =
    ["gpt-4o-mini", "gpt-4o", "gpt-4.1-mini", "gpt-4.1", "gpt-4.1-nano"];

/// Evaluator model options.
pub const COHERE_MODEL_OPTIONS: [&str; 4] = [
    "command-a-03-2025",
    "command-r7b-12-2024",
    "command-r-plus-08-2024",
    "command-r-08-2024",
];

/// Default config file name, looked up in the working directory.
const CONFIG_FILE_NAME: &str = "postforge.toml";

/// Configuration errors. All of these are fatal and surfaced immediately;
/// none is retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The requested post type is not supported.
    #[error("unsupported post_type '{0}'; use one of: educational, thought_leadership, trend_commentary")]
    UnsupportedPostType(String),

    /// No credential available for a required provider.
    #[error("missing API key: set {0} or pass an explicit key")]
    MissingApiKey(String),

    /// A configuration value is out of range.
    #[error("invalid configuration value: {0}")]
    InvalidValue(String),

    /// The config file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file could not be parsed.
    #[error("failed to parse {0}: {1}")]
    Parse(String, String),
}

/// Model configuration for one pipeline run. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Drafting model ID.
    pub model: String,
    /// Evaluator model ID.
    pub cohere_model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Max completion tokens per call.
    pub max_tokens: u32,
    /// Total attempt budget per provider call.
    pub retries: u32,
    /// Fixed backoff between attempts, in seconds.
    pub retry_backoff_seconds: f64,
    /// Per-request timeout, in seconds.
    pub timeout_seconds: f64,
    /// Explicit drafting API key override; falls back to the environment.
    pub api_key: Option<String>,
    /// Explicit evaluator API key override; falls back to the environment.
    pub cohere_api_key: Option<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: OPENAI_MODEL_OPTIONS[0].to_string(),
            cohere_model: COHERE_MODEL_OPTIONS[0].to_string(),
            temperature: 0.7,
            max_tokens: 500,
            retries: 3,
            retry_backoff_seconds: 1.0,
            timeout_seconds: 60.0,
            api_key: None,
            cohere_api_key: None,
        }
    }
}

impl GenerationConfig {
    /// Per-request timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_seconds.max(0.0))
    }

    /// Backoff between retry attempts as a `Duration`.
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_secs_f64(self.retry_backoff_seconds.max(0.0))
    }

    /// Validates value ranges.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` for out-of-range settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::InvalidValue("model must not be empty".to_string()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::InvalidValue(format!(
                "temperature {} out of range [0.0, 2.0]",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::InvalidValue("max_tokens must be > 0".to_string()));
        }
        if self.timeout_seconds <= 0.0 {
            return Err(ConfigError::InvalidValue("timeout must be > 0".to_string()));
        }
        if self.retry_backoff_seconds < 0.0 {
            return Err(ConfigError::InvalidValue("retry backoff must be >= 0".to_string()));
        }
        Ok(())
    }
}

/// Optional `postforge.toml` file configuration.
///
/// Every field is optional; present values override defaults but never
/// explicit CLI flags (the CLI applies the file first, then its own args).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    /// Generation overrides.
    #[serde(default)]
    pub generation: GenerationOverrides,
    /// Directory overrides.
    #[serde(default)]
    pub paths: PathOverrides,
}

/// `[generation]` section of the config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationOverrides {
    /// Drafting model ID.
    pub model: Option<String>,
    /// Evaluator model ID.
    pub cohere_model: Option<String>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Max completion tokens per call.
    pub max_tokens: Option<u32>,
    /// Total attempt budget per provider call.
    pub retries: Option<u32>,
    /// Fixed backoff between attempts, in seconds.
    pub retry_backoff_seconds: Option<f64>,
    /// Per-request timeout, in seconds.
    pub timeout_seconds: Option<f64>,
}

/// `[paths]` section of the config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathOverrides {
    /// Prompt template directory.
    pub prompts_dir: Option<PathBuf>,
    /// Knowledge-base document directory.
    pub knowledge_dir: Option<PathBuf>,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    ///
    /// A missing file yields the empty (all-default) configuration.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(path.display().to_string(), e.to_string()))?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Loads `postforge.toml` from the working directory if present.
    ///
    /// # Errors
    /// Returns error if the file exists but is unreadable or malformed.
    pub fn discover() -> Result<Self, ConfigError> {
        Self::load(CONFIG_FILE_NAME)
    }

    /// Applies file overrides onto a config.
    pub fn apply_to(&self, config: &mut GenerationConfig) {
        let overrides = &self.generation;
        if let Some(model) = &overrides.model {
            config.model = model.clone();
        }
        if let Some(cohere_model) = &overrides.cohere_model {
            config.cohere_model = cohere_model.clone();
        }
        if let Some(temperature) = overrides.temperature {
            config.temperature = temperature;
        }
        if let Some(max_tokens) = overrides.max_tokens {
            config.max_tokens = max_tokens;
        }
        if let Some(retries) = overrides.retries {
            config.retries = retries;
        }
        if let Some(backoff) = overrides.retry_backoff_seconds {
            config.retry_backoff_seconds = backoff;
        }
        if let Some(timeout) = overrides.timeout_seconds {
            config.timeout_seconds = timeout;
        }
    }
}
