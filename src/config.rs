use crate::log_debug;

use anyhow::{Context, Result, anyhow};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default Gemini model used for both roasts and fixes
pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";
/// Default Gemini REST endpoint
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Environment variables checked for the API key, in order of precedence
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Configuration structure for GitMad
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Config {
    /// API key for the generation service
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_key: String,
    /// Model name passed to the generation endpoint
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Base URL of the generation API
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Per-request timeout for outbound HTTP calls
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// UX timing settings
    #[serde(default)]
    pub timing: TimingConfig,
    /// External image and raw-source collaborators
    #[serde(default)]
    pub services: ServiceConfig,
    /// Whether to enable verbose logging (includes HTTP client logs)
    #[serde(default)]
    pub verbose_logging: bool,
}

/// Minimum-delay and reveal pacing
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct TimingConfig {
    /// Minimum time the loading state stays visible
    pub min_loading_ms: u64,
    /// Delay between revealed characters of fixed code
    pub reveal_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            min_loading_ms: 2000,
            reveal_interval_ms: 10,
        }
    }
}

impl TimingConfig {
    pub fn min_loading(&self) -> Duration {
        Duration::from_millis(self.min_loading_ms)
    }

    /// Reveal tick, never shorter than one millisecond
    pub fn reveal_interval(&self) -> Duration {
        Duration::from_millis(self.reveal_interval_ms.max(1))
    }
}

/// Base URLs of the collaborating services
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct ServiceConfig {
    /// Primary image generator
    pub image_base: String,
    /// Fallback avatar generator
    pub avatar_base: String,
    /// Host serving raw repository file contents
    pub raw_host: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            image_base: "https://image.pollinations.ai".to_string(),
            avatar_base: "https://robohash.org".to_string(),
            raw_host: "raw.githubusercontent.com".to_string(),
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f32 {
    0.9
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Config {
    /// Load the configuration from the user config file, or defaults if none exists
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load the configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            toml::from_str(&content).map_err(|e| {
                anyhow!(
                    "Invalid configuration file format: {}. Please check {} for syntax errors.",
                    e,
                    path.display()
                )
            })?
        } else {
            Self::default()
        };

        log_debug!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Save the configuration to the user config file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        log_debug!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Get the path to the configuration file
    pub fn get_config_path() -> Result<PathBuf> {
        let mut path =
            config_dir().ok_or_else(|| anyhow!("Unable to determine config directory"))?;
        path.push("gitmad");
        path.push("config.toml");
        Ok(path)
    }

    /// Update the configuration with new values
    pub fn update(
        &mut self,
        api_key: Option<String>,
        model: Option<String>,
        temperature: Option<f32>,
        min_loading_ms: Option<u64>,
        reveal_interval_ms: Option<u64>,
    ) -> bool {
        let mut changed = false;

        if let Some(key) = api_key {
            self.api_key = key;
            changed = true;
        }
        if let Some(model) = model {
            self.model = model;
            changed = true;
        }
        if let Some(temperature) = temperature {
            self.temperature = temperature;
            changed = true;
        }
        if let Some(ms) = min_loading_ms {
            self.timing.min_loading_ms = ms;
            changed = true;
        }
        if let Some(ms) = reveal_interval_ms {
            self.timing.reveal_interval_ms = ms;
            changed = true;
        }

        log_debug!("Configuration updated (changed: {})", changed);
        changed
    }

    /// API key from the environment, falling back to the config file
    pub fn effective_api_key(&self) -> Option<String> {
        self.effective_api_key_with(|name| std::env::var(name).ok())
    }

    /// Same as [`Config::effective_api_key`] with an injectable environment lookup
    pub fn effective_api_key_with<F>(&self, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.trim().is_empty())
            .or_else(|| (!self.api_key.is_empty()).then(|| self.api_key.clone()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            temperature: default_temperature(),
            api_base: default_api_base(),
            request_timeout_secs: default_request_timeout_secs(),
            timing: TimingConfig::default(),
            services: ServiceConfig::default(),
            verbose_logging: false,
        }
    }
}

/// Mask an API key for display, keeping only the last four characters
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{tail}", "*".repeat(chars.len() - 4))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_api_key() {
        assert_eq!(mask_api_key("abcdefgh"), "****efgh");
        assert_eq!(mask_api_key("abc"), "***");
        assert_eq!(mask_api_key(""), "");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str("model = \"gemini-2.5-flash\"\n").expect("parse");
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.timing, TimingConfig::default());
        assert!((config.temperature - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn test_partial_nested_tables_fill_defaults() {
        let config: Config = toml::from_str(
            "[timing]\nmin_loading_ms = 500\n\n[services]\nraw_host = \"raw.example.com\"\n",
        )
        .expect("parse");
        assert_eq!(config.timing.min_loading_ms, 500);
        assert_eq!(config.timing.reveal_interval_ms, 10);
        assert_eq!(config.services.raw_host, "raw.example.com");
        assert_eq!(config.services.avatar_base, ServiceConfig::default().avatar_base);
    }

    #[test]
    fn test_zero_reveal_interval_is_floored() {
        let timing = TimingConfig {
            min_loading_ms: 0,
            reveal_interval_ms: 0,
        };
        assert_eq!(timing.reveal_interval(), Duration::from_millis(1));
        assert_eq!(timing.min_loading(), Duration::ZERO);
    }
}
