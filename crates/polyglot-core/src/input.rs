//! Reading translation units from a word list or a `text,language` CSV.

use std::collections::HashSet;
use std::fs::{self, File};
use std::path::Path;

use polyglot_config::InputFormat;
use polyglot_types::TranslationUnit;

use crate::error::InputError;
use crate::preprocess::{DefaultPreprocessor, Preprocessor};

/// `.csv` files are CSV, everything else is one unit per line
pub fn infer_format(path: &Path) -> InputFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => InputFormat::Csv,
        _ => InputFormat::Lines,
    }
}

/// Load, clean and de-duplicate the units in `path`.
///
/// CSV input keeps only rows whose `language` column equals `source_code`. Blank
/// units are dropped and repeated units keep their first occurrence, so each pair
/// is requested at most once per run. Indices are assigned after de-duplication.
pub fn load_units(
    path: &Path,
    format: Option<InputFormat>,
    source_code: &str,
) -> Result<Vec<TranslationUnit>, InputError> {
    let format = format.unwrap_or_else(|| infer_format(path));

    let raw = match format {
        InputFormat::Lines => read_lines(path)?,
        InputFormat::Csv => read_csv(path, source_code)?,
    };

    let preprocessor = DefaultPreprocessor;
    let mut seen = HashSet::new();
    let mut duplicates = 0usize;
    let mut units = Vec::with_capacity(raw.len());

    for text in raw {
        let text = preprocessor.process(&text);
        if text.is_empty() {
            continue;
        }
        if !seen.insert(text.clone()) {
            duplicates += 1;
            continue;
        }
        units.push(TranslationUnit::new(units.len(), text));
    }

    if duplicates > 0 {
        tracing::info!(duplicates, "Skipped repeated input units");
    }

    if units.is_empty() {
        return Err(InputError::Empty(path.to_path_buf()));
    }

    tracing::debug!(path = %path.display(), ?format, units = units.len(), "Loaded input units");
    Ok(units)
}

fn read_lines(path: &Path) -> Result<Vec<String>, InputError> {
    let content = fs::read_to_string(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(content.lines().map(str::to_string).collect())
}

fn read_csv(path: &Path, source_code: &str) -> Result<Vec<String>, InputError> {
    let file = File::open(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);

    let headers = reader.headers()?.clone();
    let text_col = headers
        .iter()
        .position(|h| h.trim() == "text")
        .ok_or(InputError::MissingColumn("text"))?;
    let language_col = headers.iter().position(|h| h.trim() == "language");

    let mut texts = Vec::new();
    for record in reader.records() {
        let record = record?;

        let keep = match language_col {
            Some(col) => record
                .get(col)
                .is_some_and(|l| l.trim().eq_ignore_ascii_case(source_code)),
            None => true,
        };

        if keep && let Some(text) = record.get(text_col) {
            texts.push(text.to_string());
        }
    }

    Ok(texts)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_infer_format() {
        assert_eq!(infer_format(Path::new("corpus.CSV")), InputFormat::Csv);
        assert_eq!(infer_format(Path::new("google-10000-english.txt")), InputFormat::Lines);
        assert_eq!(infer_format(Path::new("words")), InputFormat::Lines);
    }

    #[test]
    fn test_lines_skip_blank_and_duplicates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("words.txt");
        fs::write(&path, "the\n\nof\n  the  \nand\n").unwrap();

        let units = load_units(&path, None, "en").unwrap();
        let texts: Vec<_> = units.iter().map(|u| u.text.as_str()).collect();
        assert_eq!(texts, vec!["the", "of", "and"]);
        assert_eq!(units[2].index, 2);
    }

    #[test]
    fn test_csv_filters_source_language() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corpus.csv");
        fs::write(
            &path,
            "text,language\n\"Hello, friend\",en\nBonjour,fr\nGood morning,en\n",
        )
        .unwrap();

        let units = load_units(&path, None, "en").unwrap();
        let texts: Vec<_> = units.iter().map(|u| u.text.as_str()).collect();
        assert_eq!(texts, vec!["Hello, friend", "Good morning"]);
    }

    #[test]
    fn test_csv_without_text_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corpus.csv");
        fs::write(&path, "phrase,language\nhi,en\n").unwrap();

        assert!(matches!(
            load_units(&path, None, "en"),
            Err(InputError::MissingColumn("text"))
        ));
    }

    #[test]
    fn test_missing_input_is_error() {
        let dir = TempDir::new().unwrap();
        let result = load_units(&dir.path().join("absent.txt"), None, "en");
        assert!(matches!(result, Err(InputError::Read { .. })));
    }

    #[test]
    fn test_empty_input_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.txt");
        fs::write(&path, "\n  \n").unwrap();
        assert!(matches!(
            load_units(&path, Some(InputFormat::Lines), "en"),
            Err(InputError::Empty(_))
        ));
    }
}
