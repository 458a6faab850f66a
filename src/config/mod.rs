//! Configuration management
//!
//! Configuration is loaded from a TOML file with environment variable
//! overrides (`VEIL_*`). All sections have working defaults so the
//! pipeline can be constructed with no config file at all, in which case
//! the remote recognizer is disabled and the pipeline runs in pure
//! rule+heuristic mode with zero network dependency.

use crate::domain::{Language, Result, VeilError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level Veil configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VeilConfig {
    /// Remote recognizer configuration
    #[serde(default)]
    pub recognizer: RecognizerConfig,

    /// Masking policy configuration
    #[serde(default)]
    pub masking: MaskingConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl VeilConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            VeilError::Io(format!(
                "Failed to read config file {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: VeilConfig = toml::from_str(content)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.recognizer.validate()?;
        self.masking.validate()?;
        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.recognizer.apply_env_overrides()?;
        self.masking.apply_env_overrides()?;
        Ok(())
    }
}

/// Remote token-classification recognizer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizerConfig {
    /// Whether the remote model backend may ever be attempted.
    /// When false the pipeline runs rule+heuristic only.
    #[serde(default)]
    pub enabled: bool,

    /// Base URL of the hosted inference endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model id for English text
    #[serde(default = "default_model_en")]
    pub model_en: String,

    /// Model id for Spanish text
    #[serde(default = "default_model_es")]
    pub model_es: String,

    /// Model load timeout in seconds. Losing the race against this
    /// timeout commits the call to the heuristic fallback.
    #[serde(default = "default_load_timeout_secs")]
    pub load_timeout_secs: u64,

    /// Optional bearer token for the inference endpoint
    #[serde(default)]
    pub api_token: Option<String>,
}

fn default_endpoint() -> String {
    "https://api-inference.huggingface.co/models".to_string()
}

fn default_model_en() -> String {
    "dslim/bert-base-NER".to_string()
}

fn default_model_es() -> String {
    "PlanTL-GOB-ES/roberta-base-bne-ner".to_string()
}

fn default_load_timeout_secs() -> u64 {
    15
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_endpoint(),
            model_en: default_model_en(),
            model_es: default_model_es(),
            load_timeout_secs: default_load_timeout_secs(),
            api_token: None,
        }
    }
}

impl RecognizerConfig {
    /// Model id for the given language
    pub fn model_for(&self, language: Language) -> &str {
        match language {
            Language::English => &self.model_en,
            Language::Spanish => &self.model_es,
        }
    }

    /// Validate recognizer configuration
    pub fn validate(&self) -> Result<()> {
        if self.enabled {
            if self.endpoint.trim().is_empty() {
                return Err(VeilError::Configuration(
                    "recognizer.endpoint must not be empty when the recognizer is enabled"
                        .to_string(),
                ));
            }
            if self.model_en.trim().is_empty() || self.model_es.trim().is_empty() {
                return Err(VeilError::Configuration(
                    "recognizer model ids must not be empty when the recognizer is enabled"
                        .to_string(),
                ));
            }
            if self.load_timeout_secs == 0 {
                return Err(VeilError::Configuration(
                    "recognizer.load_timeout_secs must be greater than zero".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("VEIL_RECOGNIZER_ENABLED") {
            self.enabled = val.parse().map_err(|_| {
                VeilError::Configuration(format!("Invalid VEIL_RECOGNIZER_ENABLED value: {val}"))
            })?;
        }
        if let Ok(val) = std::env::var("VEIL_RECOGNIZER_ENDPOINT") {
            self.endpoint = val;
        }
        if let Ok(val) = std::env::var("VEIL_RECOGNIZER_MODEL_EN") {
            self.model_en = val;
        }
        if let Ok(val) = std::env::var("VEIL_RECOGNIZER_MODEL_ES") {
            self.model_es = val;
        }
        if let Ok(val) = std::env::var("VEIL_RECOGNIZER_LOAD_TIMEOUT_SECS") {
            self.load_timeout_secs = val.parse().map_err(|_| {
                VeilError::Configuration(format!(
                    "Invalid VEIL_RECOGNIZER_LOAD_TIMEOUT_SECS value: {val}"
                ))
            })?;
        }
        if let Ok(val) = std::env::var("VEIL_RECOGNIZER_API_TOKEN") {
            self.api_token = Some(val);
        }
        Ok(())
    }
}

/// Masking policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaskingConfig {
    /// Minimum span length (in characters) accepted by the masker.
    /// Shorter spans are treated as tokenization noise and dropped.
    #[serde(default = "default_min_span_chars")]
    pub min_span_chars: usize,
}

fn default_min_span_chars() -> usize {
    3
}

impl Default for MaskingConfig {
    fn default() -> Self {
        Self {
            min_span_chars: default_min_span_chars(),
        }
    }
}

impl MaskingConfig {
    /// Validate masking configuration
    pub fn validate(&self) -> Result<()> {
        if self.min_span_chars == 0 {
            return Err(VeilError::Configuration(
                "masking.min_span_chars must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("VEIL_MASKING_MIN_SPAN_CHARS") {
            self.min_span_chars = val.parse().map_err(|_| {
                VeilError::Configuration(format!(
                    "Invalid VEIL_MASKING_MIN_SPAN_CHARS value: {val}"
                ))
            })?;
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_log_path")]
    pub local_path: String,

    /// Log file rotation ("daily" or "hourly")
    #[serde(default = "default_log_rotation")]
    pub local_rotation: String,
}

fn default_log_path() -> String {
    "./logs".to_string()
}

fn default_log_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_log_path(),
            local_rotation: default_log_rotation(),
        }
    }
}
