use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use polyglot_config::OutputLayout;
use polyglot_config::pipeline::PipelineConfig;
use polyglot_translator::Translator;
use polyglot_types::{LanguageTable, TranslationUnit};

use crate::cache::TranslationCache;
use crate::context::PipelineContext;
use crate::dispatcher::Dispatcher;
use crate::sink::OutputSink;

mod pipeline_tests;

pub(crate) fn es_fr() -> LanguageTable {
    LanguageTable::default()
        .select(&["es".to_string(), "fr".to_string()])
        .unwrap()
}

pub(crate) fn units(texts: &[&str]) -> Vec<TranslationUnit> {
    texts
        .iter()
        .enumerate()
        .map(|(i, t)| TranslationUnit::new(i, *t))
        .collect()
}

pub(crate) fn pipeline_config(workers: usize, log_interval: usize) -> PipelineConfig {
    PipelineConfig {
        workers,
        log_interval,
        min_interval_ms: 0,
        ..PipelineConfig::default()
    }
}

/// Context over the cache file in `dir`, loading whatever a previous run left
pub(crate) fn context(
    dir: &Path,
    translator: Arc<dyn Translator>,
    min_interval: Duration,
) -> Arc<PipelineContext> {
    let languages = es_fr();
    let cache = TranslationCache::open(dir.join("cache.json"));
    let sink = OutputSink::create(dir.join("out.csv"), OutputLayout::Long, &languages).unwrap();

    Arc::new(
        PipelineContext::new(Arc::new(cache), translator, languages, Arc::new(sink))
            .with_min_interval(min_interval),
    )
}

pub(crate) fn dispatcher(ctx: Arc<PipelineContext>, workers: usize, log_interval: usize) -> Dispatcher {
    Dispatcher::new(ctx, &pipeline_config(workers, log_interval))
}

/// Data rows of a long-layout output file, sorted
pub(crate) fn output_rows(path: &Path) -> Vec<(String, String)> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let mut rows: Vec<(String, String)> = reader
        .records()
        .map(|r| {
            let r = r.unwrap();
            (r[0].to_string(), r[1].to_string())
        })
        .collect();
    rows.sort();
    rows
}
