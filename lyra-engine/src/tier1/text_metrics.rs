// Tier 1: Text Metrics
//
// Concept: Token, syllable and punctuation measurements shared by the phrase
// extractor, the feature builder and the BPM estimator
// Synchronization: Pure functions over &str / &[Section]

use crate::lexicon;
use crate::types::Section;
use std::collections::HashSet;

/// Lowercase word tokens (letters, digits, inner apostrophes)
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '’'))
        .map(|t| t.trim_matches(|c| c == '\'' || c == '’'))
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn is_cjk_syllable(c: char) -> bool {
    matches!(c,
        '\u{AC00}'..='\u{D7A3}'   // Hangul syllables
        | '\u{4E00}'..='\u{9FFF}' // CJK unified ideographs
        | '\u{3040}'..='\u{30FF}' // Kana
    )
}

/// Approximate syllable count of one token
///
/// Hangul, kana and CJK characters count one syllable each; Latin text
/// counts vowel groups with a silent trailing "e" discount.
pub fn count_syllables(word: &str) -> usize {
    let cjk = word.chars().filter(|c| is_cjk_syllable(*c)).count();

    let latin: String = word
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if latin.is_empty() {
        return cjk.max(usize::from(word.chars().any(char::is_alphanumeric)));
    }

    let mut groups = 0;
    let mut prev_vowel = false;
    for c in latin.chars() {
        let vowel = matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
        if vowel && !prev_vowel {
            groups += 1;
        }
        prev_vowel = vowel;
    }
    if groups > 1 && latin.ends_with('e') && !latin.ends_with("le") && !latin.ends_with("ee") {
        groups -= 1;
    }

    cjk + groups.max(1)
}

/// Syllables in a whole line
pub fn line_syllables(line: &str) -> usize {
    tokenize(line).iter().map(|t| count_syllables(t)).sum()
}

/// Emphatic punctuation marks: `!`, `?`, ellipses and `~`
pub fn emphatic_marks(text: &str) -> usize {
    let ellipses = text.matches("...").count() + text.matches('…').count();
    let rest = text.replace("...", "");
    ellipses + rest.chars().filter(|c| matches!(c, '!' | '?' | '~' | '！' | '？')).count()
}

/// Density measurements over a group of lines
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LineDensity {
    pub line_count: usize,
    pub avg_syllables: f64,
    /// Emphatic marks per line
    pub punctuation_energy: f64,
}

impl LineDensity {
    pub fn of_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let lines: Vec<&str> = lines
            .iter()
            .map(AsRef::as_ref)
            .filter(|l| !l.trim().is_empty())
            .collect();
        if lines.is_empty() {
            return Self::default();
        }
        let n = lines.len() as f64;
        let syllables: usize = lines.iter().map(|l| line_syllables(l)).sum();
        let marks: usize = lines.iter().map(|l| emphatic_marks(l)).sum();
        Self {
            line_count: lines.len(),
            avg_syllables: syllables as f64 / n,
            punctuation_energy: marks as f64 / n,
        }
    }
}

/// Whole-text statistics used by genre feature extraction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextStats {
    pub density: LineDensity,
    pub token_count: usize,
    pub unique_ratio: f64,
    /// Share of lines that repeat an earlier line
    pub repeated_line_ratio: f64,
    /// Coefficient of variation of syllables per line
    pub line_length_cv: f64,
    pub question_ratio: f64,
    pub tech_hits: usize,
    pub dark_hits: usize,
    pub humor_hits: usize,
    pub swing_hits: usize,
    pub imagery_hits: usize,
    pub section_count: usize,
    pub distinct_tags: usize,
}

impl TextStats {
    pub fn from_sections(sections: &[Section]) -> Self {
        let lines: Vec<&str> = sections
            .iter()
            .flat_map(|s| s.lines.iter().map(String::as_str))
            .collect();
        let tokens: Vec<String> = lines.iter().flat_map(|l| tokenize(l)).collect();

        let unique: HashSet<&String> = tokens.iter().collect();
        let unique_ratio = if tokens.is_empty() {
            0.0
        } else {
            unique.len() as f64 / tokens.len() as f64
        };

        let mut seen = HashSet::new();
        let repeated = lines
            .iter()
            .filter(|l| !seen.insert(l.trim().to_lowercase()))
            .count();
        let line_n = lines.len().max(1) as f64;

        let per_line: Vec<f64> = lines.iter().map(|l| line_syllables(l) as f64).collect();
        let avg = crate::types::mean(&per_line);
        let cv = if avg > 0.0 {
            let var = per_line.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / line_n;
            var.sqrt() / avg
        } else {
            0.0
        };

        let questions = lines.iter().filter(|l| l.trim_end().ends_with('?')).count();
        let tags: HashSet<_> = sections.iter().map(|s| s.tag).collect();

        Self {
            density: LineDensity::of_lines(&lines),
            token_count: tokens.len(),
            unique_ratio,
            repeated_line_ratio: repeated as f64 / line_n,
            line_length_cv: cv,
            question_ratio: questions as f64 / line_n,
            tech_hits: lexicon::count_hits(lexicon::TECH_WORDS, &tokens),
            dark_hits: lexicon::count_hits(lexicon::DARK_WORDS, &tokens),
            humor_hits: lexicon::count_hits(lexicon::HUMOR_WORDS, &tokens),
            swing_hits: lexicon::count_hits(lexicon::SWING_WORDS, &tokens),
            imagery_hits: lexicon::count_hits(lexicon::IMAGERY_WORDS, &tokens),
            section_count: sections.len(),
            distinct_tags: tags.len(),
        }
    }

    /// Hits of a style word list per token, in [0, 1]
    pub fn rate(&self, hits: usize) -> f64 {
        if self.token_count == 0 {
            0.0
        } else {
            (hits as f64 / self.token_count as f64).min(1.0)
        }
    }
}
