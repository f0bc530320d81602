//! Transcript normalization.
//!
//! The corpus ships transcripts with inconsistent punctuation and casing.
//! Training labels want a cleaned form; a transcript that cleans down to
//! nothing has no valid label and its row is excluded.

use regex::Regex;

/// Cleans a raw transcript into a training label.
pub trait TextNormalizer: Send + Sync {
    /// `None` means no valid label could be recovered from the text.
    fn normalize(&self, raw: &str) -> Option<String>;
}

/// Default label cleaner: punctuation stripped, hyphens and underscores
/// treated as word breaks, whitespace collapsed, lowercased. Non-Latin
/// scripts pass through untouched.
pub struct LabelNormalizer {
    punctuation: Regex,
}

impl LabelNormalizer {
    pub fn new() -> Self {
        Self {
            // ASCII punctuation plus the danda/double-danda sentence marks
            // common in Devanagari transcripts, and typographic quotes.
            punctuation: Regex::new(r#"[\[\]()*"'?!,.;:“”‘’।॥]"#)
                .expect("punctuation pattern is a valid literal"),
        }
    }
}

impl Default for LabelNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextNormalizer for LabelNormalizer {
    fn normalize(&self, raw: &str) -> Option<String> {
        let broken: String = raw.replace(['-', '_'], " ");
        let stripped = self.punctuation.replace_all(&broken, "");
        let label = stripped
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        if label.is_empty() {
            None
        } else {
            Some(label)
        }
    }
}
