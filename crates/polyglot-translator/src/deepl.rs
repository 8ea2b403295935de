use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};

use crate::{ProviderMetadata, TranslateError, Translation, Translator, check_status};

const DEFAULT_API_URL: &str = "https://api-free.deepl.com/v2/translate";

#[derive(Clone)]
pub struct DeeplTranslator {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
}

impl DeeplTranslator {
    pub fn new(
        api_key: String,
        api_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, TranslateError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key,
            api_url: api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        })
    }

    /// DeepL wants upper-case codes and an explicit Portuguese variant
    fn target_code(code: &str) -> String {
        match code {
            "pt" => "PT-PT".to_string(),
            "zh" => "ZH-HANS".to_string(),
            other => other.to_uppercase(),
        }
    }
}

impl std::fmt::Debug for DeeplTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeeplTranslator")
            .field("api_key", &"***")
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// Form body of `POST /v2/translate`
#[derive(Serialize)]
struct TranslateRequest<'a> {
    text: &'a str,
    source_lang: String,
    target_lang: String,
}

#[derive(Deserialize)]
struct TranslateResponse {
    translations: Vec<TranslatedText>,
}

#[derive(Deserialize)]
struct TranslatedText {
    text: String,
}

impl DeeplTranslator {
    fn parse_response(body: &str) -> Result<String, TranslateError> {
        let reply: TranslateResponse = serde_json::from_str(body)
            .map_err(|e| TranslateError::ApiError(format!("Unexpected DeepL reply: {e}")))?;

        reply
            .translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .ok_or_else(|| TranslateError::ApiError("DeepL returned no translations".to_string()))
    }
}

#[async_trait]
impl Translator for DeeplTranslator {
    async fn translate(
        &self,
        text: &str,
        from: &str,
        to: &str,
    ) -> Result<Translation, TranslateError> {
        if self.api_key.is_empty() {
            return Err(TranslateError::AuthenticationError);
        }

        let request = TranslateRequest {
            text,
            source_lang: from.to_uppercase(),
            target_lang: Self::target_code(to),
        };
        tracing::trace!(target_lang = %request.target_lang, "DeepL request");

        let response = self
            .client
            .post(&self.api_url)
            .header(AUTHORIZATION, format!("DeepL-Auth-Key {}", self.api_key))
            .form(&request)
            .send()
            .await?;
        check_status("DeepL", response.status())?;

        let body = response.text().await?;
        Ok(Translation {
            text: Self::parse_response(&body)?,
            from: from.to_string(),
            to: to.to_string(),
            provider: "deepl".to_string(),
        })
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "DeepL".to_string(),
            requires_api_key: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_code() {
        assert_eq!(DeeplTranslator::target_code("es"), "ES");
        assert_eq!(DeeplTranslator::target_code("pt"), "PT-PT");
        assert_eq!(DeeplTranslator::target_code("zh"), "ZH-HANS");
    }

    #[test]
    fn test_parse_response() {
        let body = r#"{"translations": [{"detected_source_language": "EN", "text": "gato"}]}"#;
        assert_eq!(DeeplTranslator::parse_response(body).unwrap(), "gato");
    }

    #[test]
    fn test_parse_response_without_translations() {
        assert!(DeeplTranslator::parse_response(r#"{"translations": []}"#).is_err());
        assert!(DeeplTranslator::parse_response(r#"{"message": "Quota exceeded"}"#).is_err());
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_request() {
        let translator =
            DeeplTranslator::new(String::new(), None, Duration::from_secs(1)).unwrap();
        let result = translator.translate("cat", "en", "es").await;
        assert!(matches!(result, Err(TranslateError::AuthenticationError)));
    }

    #[test]
    fn test_debug_masks_key() {
        let translator =
            DeeplTranslator::new("secret".to_string(), None, Duration::from_secs(1)).unwrap();
        let debug = format!("{:?}", translator);
        assert!(debug.contains("***"));
        assert!(!debug.contains("secret"));
    }
}
