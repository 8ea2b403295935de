//! Dataset helpers run after (or between) translation runs.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, bail};
use polyglot_core::{TranslationCache, TranslationKey};
use polyglot_types::LanguageTable;

pub const DEFAULT_ROW_LIMIT: usize = 9999;

/// Pivot a cache file into one row per unit with a column per language.
///
/// Units come out sorted, missing translations are left empty and entries for
/// languages outside `languages` are skipped. Returns the number of rows written.
pub fn export_cache(
    cache_path: &Path,
    output: &Path,
    languages: &LanguageTable,
) -> anyhow::Result<usize> {
    if !cache_path.exists() {
        bail!("no cache at {}", cache_path.display());
    }
    let cache = TranslationCache::open(cache_path);

    let mut table: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut skipped = 0usize;

    for (raw, text) in cache.entries() {
        let Ok(key) = TranslationKey::parse(&raw) else {
            skipped += 1;
            continue;
        };
        let Some(column) = languages.position(key.language()) else {
            skipped += 1;
            continue;
        };

        let row = table
            .entry(key.unit().to_string())
            .or_insert_with(|| vec![String::new(); languages.targets().len()]);
        row[column] = text;
    }

    if skipped > 0 {
        tracing::warn!(skipped, "Cache entries outside the language table were not exported");
    }

    let mut writer = csv::Writer::from_path(output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    writer.write_record(languages.column_names())?;
    for (unit, translations) in &table {
        writer.write_record(std::iter::once(unit).chain(translations))?;
    }
    writer.flush()?;

    tracing::info!(rows = table.len(), output = %output.display(), "Exported cache");
    Ok(table.len())
}

/// Copy the header and the first `limit` data rows of a CSV
pub fn shrink(input: &Path, output: &Path, limit: usize) -> anyhow::Result<usize> {
    let mut reader = csv::Reader::from_path(input)
        .with_context(|| format!("failed to open {}", input.display()))?;
    let mut writer = csv::Writer::from_path(output)
        .with_context(|| format!("failed to create {}", output.display()))?;

    writer.write_record(reader.headers()?)?;

    let mut rows = 0;
    for record in reader.records().take(limit) {
        writer.write_record(&record?)?;
        rows += 1;
    }
    writer.flush()?;

    tracing::info!(rows, output = %output.display(), "Shrunk CSV");
    Ok(rows)
}

/// Turn a wide word table into `text,language` rows, one per translated cell.
///
/// The source-language column is dropped; empty cells are skipped. Stops after
/// `limit` rows.
pub fn explode(
    input: &Path,
    output: &Path,
    limit: usize,
    languages: &LanguageTable,
) -> anyhow::Result<usize> {
    let mut reader = csv::Reader::from_path(input)
        .with_context(|| format!("failed to open {}", input.display()))?;
    let headers = reader.headers()?.clone();
    let source_name = languages.source().name.as_str();

    let mut writer = csv::Writer::from_path(output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    writer.write_record(["text", "language"])?;

    let mut rows = 0;
    'records: for record in reader.records() {
        let record = record?;

        for (cell, language) in record.iter().zip(headers.iter()) {
            if language == source_name {
                continue;
            }
            let cell = cell.trim();
            if cell.is_empty() {
                continue;
            }
            if rows >= limit {
                break 'records;
            }
            writer.write_record([cell, language])?;
            rows += 1;
        }
    }
    writer.flush()?;

    tracing::info!(rows, output = %output.display(), "Exploded word table");
    Ok(rows)
}
