//! Resolving every target language for one unit.

use polyglot_translator::{TranslateError, Translation};
use polyglot_types::{Language, OutputRow, TranslationUnit};

use crate::cache::TranslationKey;
use crate::context::PipelineContext;
use crate::error::PipelineError;

const LOG_PREVIEW_CHARS: usize = 50;

/// Where a cell's text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Cached,
    Translated,
    /// The call failed and the source text stands in for the translation
    Fallback,
}

/// Resolve one `(unit, language)` pair.
///
/// A cache hit never touches the network. A miss waits for the rate limiter and
/// calls the translator; whatever comes out, translation or fallback, is cached
/// so the pair is never requested again.
pub async fn resolve(
    ctx: &PipelineContext,
    unit: &TranslationUnit,
    language: &Language,
) -> Result<(String, Resolution), PipelineError> {
    let key = TranslationKey::new(&unit.text, &language.code)?;

    if let Some(text) = ctx.cache.get(&key) {
        ctx.record_cache_hit();
        return Ok((text, Resolution::Cached));
    }

    ctx.limiter.acquire().await;

    let source_code = &ctx.languages.source().code;
    match call_translator(ctx, &unit.text, source_code, &language.code).await {
        Ok(translation) => {
            ctx.record_translated();
            let text = ctx.cache.put(&key, translation.text.trim().to_string());
            Ok((text, Resolution::Translated))
        }
        Err(e) => {
            tracing::warn!(
                unit = %preview(&unit.text),
                language = %language.code,
                error = %e,
                "Translation failed, keeping source text"
            );
            ctx.record_fallback();
            let text = ctx.cache.put(&key, unit.text.clone());
            Ok((text, Resolution::Fallback))
        }
    }
}

async fn call_translator(
    ctx: &PipelineContext,
    text: &str,
    from: &str,
    to: &str,
) -> Result<Translation, TranslateError> {
    let translation = tokio::time::timeout(
        ctx.request_timeout,
        ctx.translator.translate(text, from, to),
    )
    .await
    .map_err(|_| TranslateError::Timeout(ctx.request_timeout))??;

    if translation.text.trim().is_empty() {
        return Err(TranslateError::ApiError("empty translation".to_string()));
    }

    Ok(translation)
}

/// Translate `unit` into every target language and append the row to the sink
pub async fn translate_unit(
    ctx: &PipelineContext,
    unit: &TranslationUnit,
) -> Result<OutputRow, PipelineError> {
    let mut row = OutputRow::new(unit.text.clone(), ctx.languages.source());

    for language in ctx.languages.targets() {
        let (text, _) = resolve(ctx, unit, language).await?;
        row.push(text, language);
    }

    ctx.sink.write_row(&row)?;
    Ok(row)
}

/// First 50 characters followed by "..."
pub fn preview(text: &str) -> String {
    let mut preview: String = text.chars().take(LOG_PREVIEW_CHARS).collect();
    preview.push_str("...");
    preview
}
