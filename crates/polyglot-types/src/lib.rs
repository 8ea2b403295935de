pub mod types;

pub use types::{
    Language, LanguageError, LanguageTable, OutputRow, RowCell, TranslationUnit,
    is_valid_language_code,
};
