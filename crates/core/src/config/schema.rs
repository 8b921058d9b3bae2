//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    /// Country picker settings
    #[serde(default)]
    pub picker: PickerConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Contact form settings
    #[serde(default)]
    pub contact: ContactConfig,
}

/// Country picker configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickerConfig {
    /// Maximum number of suggestions to show (unset shows all)
    #[serde(default)]
    pub result_limit: Option<usize>,

    /// Strip surrounding whitespace from the search input
    #[serde(default = "default_true")]
    pub trim_query: bool,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            result_limit: None,
            trim_query: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable single-line output
    #[default]
    Compact,
    /// One JSON object per line
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive (overridden by `RUST_LOG`)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for stderr
    #[serde(default)]
    pub format: LogFormat,

    /// Also write logs to this file
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Contact question configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactConfig {
    /// Language used to resolve placeholders and labels
    #[serde(default = "default_language")]
    pub default_language: String,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            default_language: default_language(),
        }
    }
}

fn default_language() -> String {
    crate::contact::DEFAULT_LANGUAGE.to_string()
}
