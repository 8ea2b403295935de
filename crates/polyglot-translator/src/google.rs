//! Google Translate through the public `translate_a/single` endpoint.
//!
//! No API key is needed, which is also why the endpoint throttles aggressive
//! clients; callers are expected to rate limit.

use std::time::Duration;

use async_trait::async_trait;

use crate::{ProviderMetadata, TranslateError, Translation, Translator, check_status};

const DEFAULT_API_URL: &str = "https://translate.googleapis.com/translate_a/single";

#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: reqwest::Client,
    api_url: String,
}

impl GoogleTranslator {
    pub fn new(api_url: Option<String>, timeout: Duration) -> Result<Self, TranslateError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_url: api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        })
    }

    /// Codes the endpoint spells differently from ISO 639-1
    fn provider_code(code: &str) -> &str {
        match code {
            "zh" => "zh-CN",
            "he" => "iw",
            other => other,
        }
    }

    /// The response is a nested array; `[0]` holds one `[translated, original, ...]`
    /// entry per sentence.
    fn parse_response(json: &serde_json::Value) -> Result<String, TranslateError> {
        let sentences = json
            .get(0)
            .and_then(|s| s.as_array())
            .ok_or_else(|| TranslateError::ApiError("No translation in response".to_string()))?;

        let text: String = sentences
            .iter()
            .filter_map(|sentence| sentence.get(0).and_then(|t| t.as_str()))
            .collect();

        if text.is_empty() {
            return Err(TranslateError::ApiError(
                "Empty translation in response".to_string(),
            ));
        }

        Ok(text)
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(
        &self,
        text: &str,
        from: &str,
        to: &str,
    ) -> Result<Translation, TranslateError> {
        if text.trim().is_empty() {
            return Ok(Translation {
                text: String::new(),
                from: from.to_string(),
                to: to.to_string(),
                provider: "google".to_string(),
            });
        }

        tracing::trace!(from, to, "Google Translate request");

        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("client", "gtx"),
                ("sl", Self::provider_code(from)),
                ("tl", Self::provider_code(to)),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        check_status("Google Translate", response.status())?;

        let json: serde_json::Value = response.json().await.map_err(|e| {
            TranslateError::ApiError(format!("Failed to parse response: {}", e))
        })?;

        Ok(Translation {
            text: Self::parse_response(&json)?,
            from: from.to_string(),
            to: to.to_string(),
            provider: "google".to_string(),
        })
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "Google Translate".to_string(),
            requires_api_key: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_provider_code() {
        assert_eq!(GoogleTranslator::provider_code("zh"), "zh-CN");
        assert_eq!(GoogleTranslator::provider_code("es"), "es");
    }

    #[test]
    fn test_parse_joins_sentences() {
        let body = json!([
            [
                ["Hola. ", "Hello. ", null, null, 10],
                ["¿Cómo estás?", "How are you?", null, null, 10]
            ],
            null,
            "en"
        ]);
        assert_eq!(
            GoogleTranslator::parse_response(&body).unwrap(),
            "Hola. ¿Cómo estás?"
        );
    }

    #[test]
    fn test_parse_rejects_unexpected_shape() {
        assert!(GoogleTranslator::parse_response(&json!({"error": "nope"})).is_err());
        assert!(GoogleTranslator::parse_response(&json!([[]])).is_err());
    }

    #[tokio::test]
    async fn test_blank_text_skips_request() {
        let translator =
            GoogleTranslator::new(Some("http://127.0.0.1:9".to_string()), Duration::from_secs(1))
                .unwrap();
        let result = translator.translate("   ", "en", "fr").await.unwrap();
        assert_eq!(result.text, "");
    }

    #[tokio::test]
    #[ignore] // needs network access
    async fn test_real_endpoint() {
        let translator = GoogleTranslator::new(None, Duration::from_secs(10)).unwrap();
        let result = translator.translate("cat", "en", "es").await.unwrap();
        assert!(!result.text.is_empty());
    }
}
