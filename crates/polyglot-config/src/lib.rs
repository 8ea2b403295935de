use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use self::pipeline::PipelineConfig;
use self::translator::TranslatorConfig;

pub mod pipeline;
pub mod translator;

pub use pipeline::{InputFormat, OutputLayout, parse_language_list};
pub use translator::ProviderKind;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub translator: TranslatorConfig,
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Defaults overridden by `POLYGLOT_*` environment variables
    pub fn new() -> Self {
        Config {
            translator: TranslatorConfig::new(),
            pipeline: PipelineConfig::new(),
        }
    }

    /// Load a JSON config file; missing fields fall back to defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_json::from_reader(reader)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline.workers == 0 {
            return Err(ConfigError::InvalidValue {
                field: "workers",
                value: "0".to_string(),
            });
        }

        if self.pipeline.log_interval == 0 {
            return Err(ConfigError::InvalidValue {
                field: "log_interval",
                value: "0".to_string(),
            });
        }

        // A zero timeout fails every call and caches the source text in its place
        if self.translator.request_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_seconds",
                value: "0".to_string(),
            });
        }

        if self.pipeline.cache_path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "cache_path",
                value: self.pipeline.cache_path.clone(),
            });
        }

        Ok(())
    }
}
