use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Shape of the output CSV
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputLayout {
    /// `text,language` with one row per (unit, language)
    #[default]
    Long,
    /// One row per unit, one column per language
    Wide,
}

impl FromStr for OutputLayout {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "long" => Ok(Self::Long),
            "wide" => Ok(Self::Wide),
            other => Err(ConfigError::InvalidValue {
                field: "output_layout",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for OutputLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Long => "long",
            Self::Wide => "wide",
        })
    }
}

/// How the input file lists its units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// One unit per line
    Lines,
    /// CSV with `text` and `language` columns
    Csv,
}

impl FromStr for InputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lines" | "txt" => Ok(Self::Lines),
            "csv" => Ok(Self::Csv),
            other => Err(ConfigError::InvalidValue {
                field: "input_format",
                value: other.to_string(),
            }),
        }
    }
}

fn default_workers() -> usize {
    5
}

fn default_log_interval() -> usize {
    50
}

fn default_min_interval_ms() -> u64 {
    100
}

fn default_cache_path() -> String {
    "translation_cache.json".to_string()
}

fn default_output_path() -> String {
    "phrase_translation.csv".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of units translated concurrently
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Completed units between progress lines and cache checkpoints
    #[serde(default = "default_log_interval")]
    pub log_interval: usize,
    /// Minimum gap between two outbound translation calls
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
    #[serde(default = "default_cache_path")]
    pub cache_path: String,
    #[serde(default)]
    pub input_path: Option<String>,
    /// Inferred from the input extension when unset
    #[serde(default)]
    pub input_format: Option<InputFormat>,
    #[serde(default = "default_output_path")]
    pub output_path: String,
    #[serde(default)]
    pub output_layout: OutputLayout,
    /// Target language codes, every known language when empty
    #[serde(default)]
    pub languages: Vec<String>,
}

impl PipelineConfig {
    pub fn new() -> Self {
        let defaults = Self::default();

        let workers = env::var("POLYGLOT_WORKERS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.workers);

        let log_interval = env::var("POLYGLOT_LOG_INTERVAL")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.log_interval);

        let min_interval_ms = env::var("POLYGLOT_MIN_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.min_interval_ms);

        let cache_path = env::var("POLYGLOT_CACHE_PATH").unwrap_or(defaults.cache_path);

        let input_path = env::var("POLYGLOT_INPUT_PATH").ok();

        let output_path = env::var("POLYGLOT_OUTPUT_PATH").unwrap_or(defaults.output_path);

        let output_layout = env::var("POLYGLOT_OUTPUT_LAYOUT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();

        let languages = env::var("POLYGLOT_LANGUAGES")
            .map(|v| parse_language_list(&v))
            .unwrap_or_default();

        Self {
            workers,
            log_interval,
            min_interval_ms,
            cache_path,
            input_path,
            input_format: None,
            output_path,
            output_layout,
            languages,
        }
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            log_interval: default_log_interval(),
            min_interval_ms: default_min_interval_ms(),
            cache_path: default_cache_path(),
            input_path: None,
            input_format: None,
            output_path: default_output_path(),
            output_layout: OutputLayout::default(),
            languages: Vec::new(),
        }
    }
}

/// Split a comma separated list of language codes ("es, fr,ja")
pub fn parse_language_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|code| code.trim().to_ascii_lowercase())
        .filter(|code| !code.is_empty())
        .collect()
}
