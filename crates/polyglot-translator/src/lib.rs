use std::time::Duration;

use reqwest::StatusCode;

pub mod deepl;
pub mod google;
pub mod mock;

pub use deepl::DeeplTranslator;
pub use google::GoogleTranslator;
pub use mock::MockTranslator;

/// Translation provider interface
#[async_trait::async_trait]
pub trait Translator: Send + Sync {
    /// Translate text from source to target language
    async fn translate(
        &self,
        text: &str,
        from: &str,
        to: &str,
    ) -> Result<Translation, TranslateError>;

    /// Provider metadata
    fn metadata(&self) -> ProviderMetadata;
}

#[derive(Debug, Clone)]
pub struct Translation {
    pub text: String,
    pub from: String,
    pub to: String,
    pub provider: String,
}

#[derive(Debug, Clone)]
pub struct ProviderMetadata {
    pub name: String,
    pub requires_api_key: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Authentication error")]
    AuthenticationError,

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

/// Turn a non-2xx reply into the matching error
pub(crate) fn check_status(provider: &str, status: StatusCode) -> Result<(), TranslateError> {
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::TOO_MANY_REQUESTS => Err(TranslateError::RateLimitExceeded),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(TranslateError::AuthenticationError)
        }
        s => {
            tracing::debug!(provider, status = %s, "Translation request rejected");
            Err(TranslateError::ApiError(format!("{provider} answered HTTP {s}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_status() {
        assert!(check_status("DeepL", StatusCode::OK).is_ok());
        assert!(matches!(
            check_status("DeepL", StatusCode::TOO_MANY_REQUESTS),
            Err(TranslateError::RateLimitExceeded)
        ));
        assert!(matches!(
            check_status("DeepL", StatusCode::FORBIDDEN),
            Err(TranslateError::AuthenticationError)
        ));
        match check_status("Google", StatusCode::BAD_GATEWAY) {
            Err(TranslateError::ApiError(msg)) => assert!(msg.contains("502")),
            other => panic!("unexpected {other:?}"),
        }
    }
}
