use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use polyglot_translator::Translator;
use polyglot_types::LanguageTable;

use crate::cache::TranslationCache;
use crate::rate_limit::RateLimiter;
use crate::sink::OutputSink;

const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(100);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything a worker needs, shared by all of them through an `Arc`
pub struct PipelineContext {
    pub cache: Arc<TranslationCache>,
    pub limiter: RateLimiter,
    pub translator: Arc<dyn Translator>,
    pub languages: LanguageTable,
    pub sink: Arc<OutputSink>,
    pub request_timeout: Duration,
    translated: AtomicUsize,
    fallbacks: AtomicUsize,
    cache_hits: AtomicUsize,
}

impl PipelineContext {
    pub fn new(
        cache: Arc<TranslationCache>,
        translator: Arc<dyn Translator>,
        languages: LanguageTable,
        sink: Arc<OutputSink>,
    ) -> Self {
        Self {
            cache,
            limiter: RateLimiter::new(DEFAULT_MIN_INTERVAL),
            translator,
            languages,
            sink,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            translated: AtomicUsize::new(0),
            fallbacks: AtomicUsize::new(0),
            cache_hits: AtomicUsize::new(0),
        }
    }

    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.limiter = RateLimiter::new(min_interval);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub(crate) fn record_translated(&self) {
        self.translated.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Successful translator calls in this process
    pub fn translated(&self) -> usize {
        self.translated.load(Ordering::Relaxed)
    }

    pub fn fallbacks(&self) -> usize {
        self.fallbacks.load(Ordering::Relaxed)
    }

    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::Relaxed)
    }
}
