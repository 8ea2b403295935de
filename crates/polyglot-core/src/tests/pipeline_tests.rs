use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use polyglot_config::OutputLayout;
use polyglot_translator::{
    MockTranslator, ProviderMetadata, TranslateError, Translation, Translator,
};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use super::{context, dispatcher, es_fr, output_rows, units};
use crate::cache::{TranslationCache, TranslationKey};
use crate::context::PipelineContext;
use crate::error::PipelineError;
use crate::sink::OutputSink;

fn row(text: &str, language: &str) -> (String, String) {
    (text.to_string(), language.to_string())
}

#[tokio::test]
async fn test_cat_dog_scenario() {
    let dir = TempDir::new().unwrap();
    let mock = Arc::new(MockTranslator::new());
    let ctx = context(dir.path(), mock.clone(), Duration::ZERO);

    let summary = dispatcher(ctx.clone(), 2, 50)
        .run(units(&["cat", "dog"]))
        .await
        .unwrap();

    assert!(summary.is_complete());
    assert_eq!(summary.completed, 2);
    assert_eq!(summary.translated, 4);
    assert_eq!(summary.cache_entries, 4);
    assert_eq!(mock.total_calls(), 4);

    assert_eq!(
        output_rows(&dir.path().join("out.csv")),
        vec![
            row("cat", "English"),
            row("dog", "English"),
            row("es:cat", "Spanish"),
            row("es:dog", "Spanish"),
            row("fr:cat", "French"),
            row("fr:dog", "French"),
        ]
    );

    let persisted = TranslationCache::open(dir.path().join("cache.json"));
    let keys: Vec<String> = persisted.entries().into_keys().collect();
    assert_eq!(keys, vec!["cat_es", "cat_fr", "dog_es", "dog_fr"]);
}

#[tokio::test]
async fn test_second_run_makes_no_calls() {
    let dir = TempDir::new().unwrap();

    let first = Arc::new(MockTranslator::new());
    dispatcher(context(dir.path(), first.clone(), Duration::ZERO), 3, 50)
        .run(units(&["cat", "dog", "bird"]))
        .await
        .unwrap();
    assert_eq!(first.total_calls(), 6);

    let second = Arc::new(MockTranslator::new());
    let summary = dispatcher(context(dir.path(), second.clone(), Duration::ZERO), 3, 50)
        .run(units(&["cat", "dog", "bird"]))
        .await
        .unwrap();

    assert_eq!(second.total_calls(), 0);
    assert_eq!(summary.cache_hits, 6);
    assert_eq!(summary.translated, 0);
    // Output is regenerated in full from the cache
    assert_eq!(output_rows(&dir.path().join("out.csv")).len(), 9);
}

#[tokio::test]
async fn test_fallback_is_cached_across_runs() {
    let dir = TempDir::new().unwrap();

    let first = Arc::new(MockTranslator::new().fail_on("dog", "fr"));
    let summary = dispatcher(context(dir.path(), first.clone(), Duration::ZERO), 2, 50)
        .run(units(&["cat", "dog"]))
        .await
        .unwrap();
    assert_eq!(summary.fallbacks, 1);
    assert_eq!(summary.failed, 0);
    assert!(output_rows(&dir.path().join("out.csv")).contains(&row("dog", "French")));

    let persisted = TranslationCache::open(dir.path().join("cache.json"));
    let key = TranslationKey::new("dog", "fr").unwrap();
    assert_eq!(persisted.get(&key).as_deref(), Some("dog"));

    let second = Arc::new(MockTranslator::new());
    dispatcher(context(dir.path(), second.clone(), Duration::ZERO), 2, 50)
        .run(units(&["cat", "dog"]))
        .await
        .unwrap();
    assert_eq!(second.calls_for("dog", "fr"), 0);
    assert_eq!(second.total_calls(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_calls_respect_min_interval() {
    let dir = TempDir::new().unwrap();
    let interval = Duration::from_millis(25);
    let mock = Arc::new(MockTranslator::new());

    dispatcher(context(dir.path(), mock.clone(), interval), 4, 50)
        .run(units(&["a", "b", "c", "d"]))
        .await
        .unwrap();

    let mut starts = mock.call_starts();
    starts.sort();
    assert_eq!(starts.len(), 8);

    // Seven gaps between eight calls; allow a little scheduling slack
    let span = starts[7] - starts[0];
    assert!(span >= interval * 7 - Duration::from_millis(10), "span {span:?}");
}

/// Panics when asked to translate "boom"
struct PanickingTranslator {
    inner: MockTranslator,
}

#[async_trait]
impl Translator for PanickingTranslator {
    async fn translate(
        &self,
        text: &str,
        from: &str,
        to: &str,
    ) -> Result<Translation, TranslateError> {
        if text == "boom" {
            panic!("translator blew up");
        }
        self.inner.translate(text, from, to).await
    }

    fn metadata(&self) -> ProviderMetadata {
        self.inner.metadata()
    }
}

#[tokio::test]
async fn test_panicking_unit_does_not_stop_siblings() {
    let dir = TempDir::new().unwrap();
    let translator = Arc::new(PanickingTranslator {
        inner: MockTranslator::new(),
    });

    let summary = dispatcher(context(dir.path(), translator, Duration::ZERO), 2, 1)
        .run(units(&["cat", "boom", "dog"]))
        .await
        .unwrap();

    assert_eq!(summary.completed, 2);
    assert_eq!(summary.failed, 1);
    assert!(!summary.is_complete());
    assert_eq!(summary.cache_entries, 4);
}

#[tokio::test]
async fn test_cancelled_run_still_persists() {
    let dir = TempDir::new().unwrap();
    let mock = Arc::new(MockTranslator::new());
    let token = CancellationToken::new();
    token.cancel();

    let summary = dispatcher(context(dir.path(), mock.clone(), Duration::ZERO), 2, 50)
        .with_cancellation(token)
        .run(units(&["cat", "dog", "bird"]))
        .await
        .unwrap();

    assert!(summary.interrupted);
    assert_eq!(summary.completed, 0);
    assert_eq!(mock.total_calls(), 0);
    assert!(dir.path().join("cache.json").exists());
}

#[tokio::test]
async fn test_final_persist_failure_fails_the_run() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "").unwrap();

    let languages = es_fr();
    let cache = TranslationCache::empty(blocker.join("cache.json"));
    let sink = OutputSink::create(dir.path().join("out.csv"), OutputLayout::Long, &languages)
        .unwrap();
    let ctx = Arc::new(
        PipelineContext::new(
            Arc::new(cache),
            Arc::new(MockTranslator::new()),
            languages,
            Arc::new(sink),
        )
        .with_min_interval(Duration::ZERO),
    );

    // Checkpoints fail too, but only the final persist is fatal
    let result = dispatcher(ctx, 1, 1).run(units(&["cat"])).await;
    assert!(matches!(result, Err(PipelineError::Persist(_))));
}
