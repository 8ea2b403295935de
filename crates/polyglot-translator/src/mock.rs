//! Offline translator for dry runs and tests.
//!
//! Translates `text` into `"<to>:<text>"`, records every call, and can be told
//! to fail for specific pairs.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::{ProviderMetadata, TranslateError, Translation, Translator};

#[derive(Debug, Default)]
pub struct MockTranslator {
    delay: Duration,
    fail_all: bool,
    failing: HashSet<(String, String)>,
    total_calls: AtomicUsize,
    calls: Mutex<HashMap<(String, String), usize>>,
    call_starts: Mutex<Vec<Instant>>,
}

impl MockTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long inside every call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fail every call for `(text, to)`
    pub fn fail_on(mut self, text: &str, to: &str) -> Self {
        self.failing.insert((text.to_string(), to.to_string()));
        self
    }

    /// Fail every call
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    pub fn total_calls(&self) -> usize {
        self.total_calls.load(Ordering::SeqCst)
    }

    pub fn calls_for(&self, text: &str, to: &str) -> usize {
        let calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());
        calls
            .get(&(text.to_string(), to.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Start time of every call, in call order
    pub fn call_starts(&self) -> Vec<Instant> {
        self.call_starts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        from: &str,
        to: &str,
    ) -> Result<Translation, TranslateError> {
        self.call_starts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Instant::now());
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        *self
            .calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry((text.to_string(), to.to_string()))
            .or_insert(0) += 1;

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.fail_all || self.failing.contains(&(text.to_string(), to.to_string())) {
            return Err(TranslateError::ApiError(format!(
                "mock failure for {text:?} -> {to}"
            )));
        }

        Ok(Translation {
            text: format!("{to}:{text}"),
            from: from.to_string(),
            to: to.to_string(),
            provider: "mock".to_string(),
        })
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "Mock".to_string(),
            requires_api_key: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_prefixes_target_code() {
        let mock = MockTranslator::new();
        let result = mock.translate("cat", "en", "es").await.unwrap();
        assert_eq!(result.text, "es:cat");
        assert_eq!(mock.total_calls(), 1);
        assert_eq!(mock.calls_for("cat", "es"), 1);
        assert_eq!(mock.calls_for("cat", "fr"), 0);
    }

    #[tokio::test]
    async fn test_fail_on_pair() {
        let mock = MockTranslator::new().fail_on("cat", "fr");
        assert!(mock.translate("cat", "en", "fr").await.is_err());
        assert!(mock.translate("cat", "en", "es").await.is_ok());
        assert_eq!(mock.total_calls(), 2);
    }

    #[tokio::test]
    async fn test_failing_fails_everything() {
        let mock = MockTranslator::failing();
        assert!(mock.translate("dog", "en", "de").await.is_err());
        assert_eq!(mock.call_starts().len(), 1);
    }
}
