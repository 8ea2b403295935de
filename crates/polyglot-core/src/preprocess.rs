use unicode_normalization::UnicodeNormalization;

pub trait Preprocessor {
    // Default unit cleanup
    fn process(&self, text: &str) -> String {
        let text = text.trim();

        if text.is_empty() {
            return String::new();
        }

        // Unicode normalization (NFC) so visually equal units share cache keys
        let text: String = text.nfc().collect();

        // Embedded line breaks would split CSV rows downstream
        text.replace(['\n', '\r'], " ").trim().to_string()
    }
}

pub struct DefaultPreprocessor;
impl Preprocessor for DefaultPreprocessor {}
