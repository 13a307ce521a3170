// Tier 1: Input Normalizer
//
// Concept: Turn raw request text into the canonical form every later stage reads
// Synchronization: Accepts raw &str, returns NormalizedText or EmptyInput
//
// Truncation is a flagged degradation, never an error: the analysed prefix
// ends at the last line break before the limit when one exists.

use crate::error::{AnalysisError, AnalysisOutcome};

const ZERO_WIDTH: [char; 4] = ['\u{200B}', '\u{200C}', '\u{200D}', '\u{FEFF}'];

/// Normalised input text plus truncation bookkeeping
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedText {
    pub text: String,
    pub truncated: bool,
    pub original_chars: usize,
    pub analyzed_chars: usize,
}

/// Normalise line endings and whitespace, then truncate to `max_chars`
///
/// # Errors
/// `AnalysisError::EmptyInput` when nothing but whitespace remains.
pub fn normalize(raw: &str, max_chars: usize) -> AnalysisOutcome<NormalizedText> {
    let original_chars = raw.chars().count();

    let unified = raw
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\t', " ")
        .replace(ZERO_WIDTH, "");

    // Trim each line and collapse runs of blank lines to a single blank line
    let mut lines: Vec<&str> = Vec::new();
    for line in unified.lines() {
        let line = line.trim_end();
        let blank = line.trim().is_empty();
        if blank && lines.last().map_or(true, |prev| prev.trim().is_empty()) {
            continue;
        }
        lines.push(if blank { "" } else { line });
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    let text = lines.join("\n");
    if text.trim().is_empty() {
        return Err(AnalysisError::EmptyInput);
    }

    let (text, truncated) = truncate(text, max_chars);
    if truncated {
        tracing::warn!(
            "Input truncated from {} to {} characters",
            original_chars,
            text.chars().count()
        );
    }

    Ok(NormalizedText {
        analyzed_chars: text.chars().count(),
        text,
        truncated,
        original_chars,
    })
}

fn truncate(text: String, max_chars: usize) -> (String, bool) {
    if max_chars == 0 || text.chars().count() <= max_chars {
        return (text, false);
    }

    let byte_limit = text
        .char_indices()
        .nth(max_chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let prefix = &text[..byte_limit];

    let cut = prefix.rfind('\n').unwrap_or(byte_limit);

    (prefix[..cut].trim_end().to_string(), true)
}
