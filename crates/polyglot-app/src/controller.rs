use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Args;
use polyglot_config::{Config, InputFormat, OutputLayout, ProviderKind, parse_language_list};
use polyglot_config::translator::TranslatorConfig;
use polyglot_core::input::load_units;
use polyglot_core::{
    Dispatcher, OutputSink, PipelineContext, RunSummary, TranslationCache, TranslationKey,
    format_minutes,
};
use polyglot_translator::{DeeplTranslator, GoogleTranslator, MockTranslator, Translator};
use polyglot_types::{LanguageTable, TranslationUnit};
use tokio_util::sync::CancellationToken;

/// Options of `polyglot run`; anything left unset comes from the config file or environment
#[derive(Debug, Default, Args)]
pub struct RunArgs {
    /// Word list (one unit per line) or `text,language` CSV
    #[arg(short, long)]
    pub input: Option<PathBuf>,
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    #[arg(long)]
    pub cache: Option<PathBuf>,
    #[arg(short, long)]
    pub workers: Option<usize>,
    #[arg(long)]
    pub log_interval: Option<usize>,
    #[arg(long)]
    pub min_interval_ms: Option<u64>,
    /// Comma separated target codes, e.g. `es,fr,ja`
    #[arg(short, long)]
    pub languages: Option<String>,
    #[arg(long)]
    pub layout: Option<OutputLayout>,
    #[arg(long)]
    pub provider: Option<ProviderKind>,
    #[arg(long)]
    pub input_format: Option<InputFormat>,
    /// JSON config file replacing the environment defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl RunArgs {
    /// Environment (or `--config` file) first, then command line flags on top
    pub fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => Config::new(),
        };
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply(&self, config: &mut Config) {
        let pipeline = &mut config.pipeline;

        if let Some(input) = &self.input {
            pipeline.input_path = Some(input.display().to_string());
        }
        if let Some(output) = &self.output {
            pipeline.output_path = output.display().to_string();
        }
        if let Some(cache) = &self.cache {
            pipeline.cache_path = cache.display().to_string();
        }
        if let Some(workers) = self.workers {
            pipeline.workers = workers;
        }
        if let Some(log_interval) = self.log_interval {
            pipeline.log_interval = log_interval;
        }
        if let Some(min_interval_ms) = self.min_interval_ms {
            pipeline.min_interval_ms = min_interval_ms;
        }
        if let Some(languages) = &self.languages {
            pipeline.languages = parse_language_list(languages);
        }
        if let Some(layout) = self.layout {
            pipeline.output_layout = layout;
        }
        if let Some(format) = self.input_format {
            pipeline.input_format = Some(format);
        }
        if let Some(provider) = self.provider {
            config.translator.provider = provider;
        }
    }
}

/// Owns the run configuration and its cancellation
pub struct RunController {
    config: Config,
    cancel_token: CancellationToken,
}

impl RunController {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }

    pub async fn run(&self) -> anyhow::Result<RunSummary> {
        let pipeline = &self.config.pipeline;

        let languages = LanguageTable::default()
            .select(&pipeline.languages)
            .context("invalid target languages")?;
        if self.config.translator.source_lang != languages.source().code {
            bail!(
                "unsupported source language {:?}, only {:?} is available",
                self.config.translator.source_lang,
                languages.source().code
            );
        }

        let input = pipeline
            .input_path
            .as_deref()
            .context("no input given, pass --input or set POLYGLOT_INPUT_PATH")?;
        let units = load_units(
            Path::new(input),
            pipeline.input_format,
            &languages.source().code,
        )?;

        let translator = build_translator(&self.config.translator)?;
        let cache = Arc::new(TranslationCache::open(&pipeline.cache_path));
        report_resume(&cache, &units, &languages)?;

        let sink = OutputSink::create(&pipeline.output_path, pipeline.output_layout, &languages)
            .with_context(|| format!("failed to create output {}", pipeline.output_path))?;

        let pairs = units.len() * languages.targets().len();
        let ctx = PipelineContext::new(cache.clone(), translator, languages, Arc::new(sink))
            .with_min_interval(pipeline.min_interval())
            .with_request_timeout(self.config.translator.request_timeout());

        let summary = Dispatcher::new(Arc::new(ctx), pipeline)
            .with_cancellation(self.cancel_token.clone())
            .run(units)
            .await?;

        tracing::info!("Done! Total translations: {}/{}", summary.translated, pairs);
        tracing::info!("Time taken: {}", format_minutes(summary.elapsed));
        tracing::info!(
            "Cache saved to {} with {} translations",
            cache.path().display(),
            summary.cache_entries
        );
        tracing::info!("Output written to {}", pipeline.output_path);

        Ok(summary)
    }
}

pub fn build_translator(config: &TranslatorConfig) -> anyhow::Result<Arc<dyn Translator>> {
    let timeout = config.request_timeout();

    let translator: Arc<dyn Translator> = match config.provider {
        ProviderKind::Google => Arc::new(GoogleTranslator::new(config.api_url.clone(), timeout)?),
        ProviderKind::Deepl => {
            if config.api_key.is_empty() {
                bail!("the deepl provider needs POLYGLOT_API_KEY");
            }
            Arc::new(DeeplTranslator::new(
                config.api_key.clone(),
                config.api_url.clone(),
                timeout,
            )?)
        }
        ProviderKind::Mock => Arc::new(MockTranslator::new()),
    };

    tracing::info!(provider = %translator.metadata().name, "Translator ready");
    Ok(translator)
}

fn report_resume(
    cache: &TranslationCache,
    units: &[TranslationUnit],
    languages: &LanguageTable,
) -> anyhow::Result<()> {
    let total = units.len() * languages.targets().len();

    let mut cached = 0usize;
    for unit in units {
        for language in languages.targets() {
            if cache.contains(&TranslationKey::new(&unit.text, &language.code)?) {
                cached += 1;
            }
        }
    }

    if cached > 0 {
        tracing::info!("RESUMING FROM PREVIOUS SESSION");
        tracing::info!("Already cached: {cached}/{total} translations");
    }
    tracing::info!(
        "Remaining to translate: {} across {} units",
        total - cached,
        units.len()
    );

    Ok(())
}
