//! Configuration types for Gupshup.
//!
//! `AppConfig` represents the optional `config.toml` in the data directory.
//! Every field has a default, so an absent file yields a working
//! configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default number of exchanges kept in the memory window.
pub const DEFAULT_MEMORY_WINDOW: usize = 5;

/// Default Gemini model.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Default public Gemini API endpoint.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Top-level configuration for a Gupshup process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Slug of the built-in persona to run.
    #[serde(default = "default_persona")]
    pub persona: String,

    /// Number of most recent exchanges supplied to the model as context.
    #[serde(default = "default_memory_window")]
    pub memory_window: usize,

    /// Whether new sessions start with the persona's welcome exchange.
    #[serde(default = "default_true")]
    pub seed_welcome: bool,

    /// Inputs that end the conversation without calling the model.
    #[serde(default = "default_exit_keywords")]
    pub exit_keywords: Vec<String>,

    /// Model gateway settings.
    #[serde(default)]
    pub model: ModelSettings,
}

fn default_persona() -> String {
    "rishta".to_string()
}

fn default_memory_window() -> usize {
    DEFAULT_MEMORY_WINDOW
}

fn default_true() -> bool {
    true
}

fn default_exit_keywords() -> Vec<String> {
    ["exit", "quit", "bye", "khuda hafiz", "allah hafiz"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            persona: default_persona(),
            memory_window: default_memory_window(),
            seed_welcome: true,
            exit_keywords: default_exit_keywords(),
            model: ModelSettings::default(),
        }
    }
}

impl AppConfig {
    /// Check value ranges. Persona existence is checked by the registry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.memory_window == 0 {
            return Err(ConfigError::Invalid(
                "memory_window must be at least 1".to_string(),
            ));
        }
        if self.exit_keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "exit_keywords must contain at least one keyword".to_string(),
            ));
        }
        self.model.validate()
    }
}

/// Generation parameters copied into every completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    #[serde(default = "default_model_name")]
    pub name: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Override the API endpoint (useful for proxies and tests).
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_model_name() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_output_tokens() -> u32 {
    8192
}

fn default_base_url() -> String {
    DEFAULT_GEMINI_BASE_URL.to_string()
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            name: default_model_name(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            base_url: default_base_url(),
        }
    }
}

impl ModelSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("model.name must not be empty".to_string()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Invalid(format!(
                "model.temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            )));
        }
        if self.max_output_tokens == 0 {
            return Err(ConfigError::Invalid(
                "model.max_output_tokens must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
