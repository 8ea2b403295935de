use serde::{Deserialize, Serialize};

/// Source language of every input unit
const SOURCE_LANGUAGE: (&str, &str) = ("en", "English");

/// Target languages in column order
const TARGET_LANGUAGES: [(&str, &str); 13] = [
    ("es", "Spanish"),
    ("fr", "French"),
    ("ar", "Arabic"),
    ("el", "Greek"),
    ("de", "German"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("zh", "Chinese"),
    ("ja", "Japanese"),
    ("id", "Indonesian"),
    ("hi", "Hindi"),
    ("bn", "Bengali"),
];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Language {
    /// Short code sent to the translation provider ("es", "zh", ...)
    pub code: String,
    /// Name written into the output files ("Spanish", "Chinese", ...)
    pub name: String,
}

impl Language {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LanguageError {
    #[error("Unknown language code: {0}")]
    UnknownCode(String),

    #[error("Invalid language code {0:?}: only ASCII letters, digits and '-' are allowed")]
    InvalidCode(String),

    #[error("Language table has no target languages")]
    NoTargets,
}

/// Returns true when `code` can be used as the language half of a cache key.
///
/// Codes never contain `_`, which is what keeps `<unit>_<code>` keys unambiguous.
pub fn is_valid_language_code(code: &str) -> bool {
    !code.is_empty() && code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Ordered set of languages a run translates into
///
/// The declared order of `targets` is the column order of every output row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageTable {
    source: Language,
    targets: Vec<Language>,
}

impl LanguageTable {
    pub fn new(source: Language, targets: Vec<Language>) -> Result<Self, LanguageError> {
        if targets.is_empty() {
            return Err(LanguageError::NoTargets);
        }

        for language in std::iter::once(&source).chain(targets.iter()) {
            if !is_valid_language_code(&language.code) {
                return Err(LanguageError::InvalidCode(language.code.clone()));
            }
        }

        Ok(Self { source, targets })
    }

    pub fn source(&self) -> &Language {
        &self.source
    }

    pub fn targets(&self) -> &[Language] {
        &self.targets
    }

    pub fn get(&self, code: &str) -> Option<&Language> {
        self.targets.iter().find(|l| l.code == code)
    }

    /// Column index of a target language (0-based, source column excluded)
    pub fn position(&self, code: &str) -> Option<usize> {
        self.targets.iter().position(|l| l.code == code)
    }

    /// Restrict the table to `codes`, keeping the declared order.
    ///
    /// An empty selection keeps every language.
    pub fn select(&self, codes: &[String]) -> Result<Self, LanguageError> {
        if codes.is_empty() {
            return Ok(self.clone());
        }

        if let Some(unknown) = codes.iter().find(|c| self.get(c).is_none()) {
            return Err(LanguageError::UnknownCode(unknown.clone()));
        }

        let targets = self
            .targets
            .iter()
            .filter(|l| codes.contains(&l.code))
            .cloned()
            .collect();

        Self::new(self.source.clone(), targets)
    }

    /// Header of the wide layout: source name then every target name
    pub fn column_names(&self) -> Vec<&str> {
        std::iter::once(self.source.name.as_str())
            .chain(self.targets.iter().map(|l| l.name.as_str()))
            .collect()
    }
}

impl Default for LanguageTable {
    fn default() -> Self {
        Self {
            source: Language::new(SOURCE_LANGUAGE.0, SOURCE_LANGUAGE.1),
            targets: TARGET_LANGUAGES
                .iter()
                .map(|(code, name)| Language::new(*code, *name))
                .collect(),
        }
    }
}

/// One word or phrase to translate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationUnit {
    /// Position in the input, used for progress accounting only
    pub index: usize,
    pub text: String,
}

impl TranslationUnit {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowCell {
    pub text: String,
    pub language: Language,
}

/// Result of translating one unit: the source cell followed by one cell per target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRow {
    cells: Vec<RowCell>,
}

impl OutputRow {
    pub fn new(source_text: impl Into<String>, source: &Language) -> Self {
        Self {
            cells: vec![RowCell {
                text: source_text.into(),
                language: source.clone(),
            }],
        }
    }

    pub fn push(&mut self, text: impl Into<String>, language: &Language) {
        self.cells.push(RowCell {
            text: text.into(),
            language: language.clone(),
        });
    }

    pub fn cells(&self) -> &[RowCell] {
        &self.cells
    }

    pub fn source_text(&self) -> &str {
        &self.cells[0].text
    }

    pub fn translations(&self) -> &[RowCell] {
        &self.cells[1..]
    }

    /// `(text, language name)` pairs, one per cell
    pub fn long_records(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells
            .iter()
            .map(|c| (c.text.as_str(), c.language.name.as_str()))
    }

    /// Cell texts in column order
    pub fn wide_record(&self) -> Vec<&str> {
        self.cells.iter().map(|c| c.text.as_str()).collect()
    }
}
