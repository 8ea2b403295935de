use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Which translation backend serves the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Google,
    Deepl,
    Mock,
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "deepl" => Ok(Self::Deepl),
            "mock" => Ok(Self::Mock),
            other => Err(ConfigError::InvalidValue {
                field: "provider",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Google => "google",
            Self::Deepl => "deepl",
            Self::Mock => "mock",
        };
        f.write_str(name)
    }
}

fn default_provider() -> ProviderKind {
    ProviderKind::Google
}

fn default_source_lang() -> String {
    "en".to_string()
}

fn default_request_timeout_seconds() -> u64 {
    30
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TranslatorConfig {
    #[serde(default = "default_provider")]
    pub provider: ProviderKind,
    #[serde(default = "default_source_lang")]
    pub source_lang: String,
    #[serde(default)]
    pub api_key: String,
    /// Endpoint override, provider default when unset
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

impl TranslatorConfig {
    pub fn new() -> Self {
        let defaults = Self::default();

        let provider = env::var("POLYGLOT_PROVIDER")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.provider);

        let source_lang = env::var("POLYGLOT_SOURCE_LANG").unwrap_or(defaults.source_lang);

        let api_key = env::var("POLYGLOT_API_KEY").unwrap_or_default();

        let api_url = env::var("POLYGLOT_API_URL").ok();

        let request_timeout_seconds = env::var("POLYGLOT_REQUEST_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.request_timeout_seconds);

        Self {
            provider,
            source_lang,
            api_key,
            api_url,
            request_timeout_seconds,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            source_lang: default_source_lang(),
            api_key: String::new(),
            api_url: None,
            request_timeout_seconds: default_request_timeout_seconds(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_str() {
        assert_eq!("google".parse::<ProviderKind>().unwrap(), ProviderKind::Google);
        assert_eq!("DeepL".parse::<ProviderKind>().unwrap(), ProviderKind::Deepl);
        assert_eq!("mock".parse::<ProviderKind>().unwrap(), ProviderKind::Mock);
        assert!("bing".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: TranslatorConfig = serde_json::from_str(r#"{"provider": "deepl"}"#).unwrap();
        assert_eq!(config.provider, ProviderKind::Deepl);
        assert_eq!(config.source_lang, "en");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.api_url.is_none());
    }
}
