//! Translation seam
//!
//! The engine never translates on its own. A [`Translator`] is injected
//! through the pipeline builder; when present, phrases containing non-Latin
//! letters are translated before lexicon scoring. A failed translation is a
//! recoverable stage failure and the original phrase is scored instead.

use crate::error::AnalysisError;

/// External translation collaborator
pub trait Translator: Send + Sync {
    /// Translate one phrase into English
    fn translate(&self, phrase: &str) -> Result<String, AnalysisError>;
}

/// Whether a phrase holds letters outside the Latin script blocks
pub fn needs_translation(phrase: &str) -> bool {
    phrase
        .chars()
        .any(|c| c.is_alphabetic() && c > '\u{024F}')
}

/// Translator backed by a fixed phrase table, for tests and offline use
#[derive(Debug, Default, Clone)]
pub struct TableTranslator {
    entries: Vec<(String, String)>,
}

impl TableTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.entries.push((source.into(), target.into()));
        self
    }
}

impl Translator for TableTranslator {
    fn translate(&self, phrase: &str) -> Result<String, AnalysisError> {
        let trimmed = phrase.trim();
        self.entries
            .iter()
            .find(|(source, _)| source == trimmed)
            .map(|(_, target)| target.clone())
            .ok_or_else(|| AnalysisError::Translation(format!("no entry for '{trimmed}'")))
    }
}
