// Tier 1: Phrase Emotion Extractor
//
// Concept: Score every phrase of every section on the Truth/Love/Pain axes
// and the ten emotion clusters
// Synchronization: Accepts &[Section], outputs one Vec<PhraseEmotionPacket>
// per section (index-aligned; empty sections yield an empty vector)
//
// Scoring (per phrase, pure function of the phrase string):
// 1. Tokenise and look every token up in the cluster lexicons
// 2. axis/cluster = clamp01(weighted_hits / tokens * 1.5 + emphasis * share)
// 3. valence = love - pain, arousal = mean of axes
// 4. weight rises with length and punctuation density, ~0 without hits

use crate::error::{AnalysisError, AnalysisOutcome, StageDiagnostic};
use crate::lexicon;
use crate::tier1::phrase_cache::PhraseCache;
use crate::tier1::text_metrics::{emphatic_marks, tokenize};
use crate::translate::{needs_translation, Translator};
use crate::types::{
    clamp01, ClusterVector, EmotionCluster, ImpactZone, PhraseEmotionPacket, Section, TlpAxis,
    TlpVector, CLUSTER_COUNT,
};

const RATIO_GAIN: f64 = 1.5;
const EMPHASIS_CAP: f64 = 1.5;
const IMPACT_MARGIN: f64 = 0.1;
const FULL_LENGTH_TOKENS: f64 = 8.0;

/// Source of per-phrase emotion vectors
///
/// The extractor depends only on this trait, so the lexicon model can be
/// swapped without touching aggregation or genre scoring.
pub trait EmotionVectorSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Score one phrase; must be a pure function of `phrase`
    fn score_phrase(&self, phrase: &str) -> PhraseEmotionPacket;
}

/// Default lexicon-based scorer
#[derive(Debug, Default, Clone, Copy)]
pub struct LexiconEmotionSource;

impl EmotionVectorSource for LexiconEmotionSource {
    fn name(&self) -> &'static str {
        "lexicon-v1"
    }

    fn score_phrase(&self, phrase: &str) -> PhraseEmotionPacket {
        score_with_lexicon(phrase)
    }
}

/// Additive emphasis bonus for punctuation and shouting, capped at 1.5
pub fn emphasis_score(phrase: &str) -> f64 {
    let ellipses = phrase.matches("...").count() + phrase.matches('…').count();
    let rest = phrase.replace("...", "");

    let mut score = 0.6 * ellipses as f64;
    for c in rest.chars() {
        score += match c {
            '!' | '！' => 0.5,
            '?' | '？' => 0.2,
            '~' => 0.15,
            '—' => 0.1,
            _ => 0.0,
        };
    }

    let letters: Vec<char> = phrase.chars().filter(|c| c.is_alphabetic()).collect();
    let cased: Vec<&char> = letters.iter().filter(|c| c.is_uppercase() || c.is_lowercase()).collect();
    if cased.len() >= 3 && cased.iter().all(|c| c.is_uppercase()) {
        score += 0.3;
    }

    let stretched = phrase.split_whitespace().any(|word| {
        let chars: Vec<char> = word.chars().filter(|c| c.is_alphabetic()).collect();
        chars.windows(3).any(|w| w[0] == w[1] && w[1] == w[2])
    });
    if stretched {
        score += 0.2;
    }

    score.min(EMPHASIS_CAP)
}

fn score_with_lexicon(phrase: &str) -> PhraseEmotionPacket {
    let tokens = tokenize(phrase);
    let emphasis = emphasis_score(phrase);

    let mut cluster_raw = [0.0; CLUSTER_COUNT];
    let mut axis_raw = [0.0; 3];
    let mut hits = 0usize;

    for token in &tokens {
        let memberships = lexicon::cluster_hits(token);
        if memberships.is_empty() {
            continue;
        }
        hits += 1;

        // A token counts once per axis, at its strongest cluster weight
        let mut per_axis = [0.0f64; 3];
        for (cluster, weight) in memberships {
            cluster_raw[cluster.index()] += weight;
            if let Some(axis) = cluster.axis() {
                let slot = axis_slot(axis);
                per_axis[slot] = per_axis[slot].max(weight);
            }
        }
        for (acc, w) in axis_raw.iter_mut().zip(per_axis) {
            *acc += w;
        }
    }

    let denom = tokens.len().max(1) as f64;
    let axis_total: f64 = axis_raw.iter().sum();
    let cluster_total: f64 = cluster_raw.iter().sum();

    let blend = |raw: f64, total: f64| {
        let share = if total > 0.0 { raw / total } else { 0.0 };
        clamp01(raw / denom * RATIO_GAIN + emphasis * share)
    };

    let tlp = TlpVector::new(
        blend(axis_raw[0], axis_total),
        blend(axis_raw[1], axis_total),
        blend(axis_raw[2], axis_total),
    );

    let mut clusters = ClusterVector::default();
    for cluster in EmotionCluster::ALL {
        clusters.set(cluster, blend(cluster_raw[cluster.index()], cluster_total));
    }

    let length_factor = (tokens.len() as f64 / FULL_LENGTH_TOKENS).min(1.0);
    let punct_density = emphatic_marks(phrase) as f64 / denom;
    let weight = if hits == 0 {
        0.1 * length_factor
    } else {
        clamp01(0.35 + 0.4 * length_factor + 0.25 * punct_density.min(1.0))
    };

    PhraseEmotionPacket {
        text: phrase.to_string(),
        valence: (tlp.love - tlp.pain).clamp(-1.0, 1.0),
        arousal: clamp01(tlp.mean()),
        impact_zone: impact_zone(&tlp),
        tlp,
        clusters,
        weight,
        lexicon_hits: hits,
        emphasis,
    }
}

fn axis_slot(axis: TlpAxis) -> usize {
    match axis {
        TlpAxis::Truth => 0,
        TlpAxis::Love => 1,
        TlpAxis::Pain => 2,
    }
}

fn impact_zone(tlp: &TlpVector) -> ImpactZone {
    let mut ranked = [
        (tlp.truth, ImpactZone::Truth),
        (tlp.love, ImpactZone::Love),
        (tlp.pain, ImpactZone::Pain),
    ];
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
    if ranked[0].0 > 0.0 && ranked[0].0 - ranked[1].0 >= IMPACT_MARGIN {
        ranked[0].1
    } else {
        ImpactZone::Mixed
    }
}

/// Split a line into phrases at sentence punctuation, keeping the marks
pub fn split_phrases(line: &str) -> Vec<String> {
    let is_terminal = |c: char| matches!(c, '.' | '!' | '?' | '…' | '。' | '！' | '？' | ';');

    let mut phrases = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        current.push(c);
        if is_terminal(c) {
            while let Some(&next) = chars.peek() {
                if !is_terminal(next) && next != '~' {
                    break;
                }
                current.push(next);
                chars.next();
            }
            let phrase = current.trim();
            if !phrase.is_empty() {
                phrases.push(phrase.to_string());
            }
            current.clear();
        }
    }
    let tail = current.trim();
    if !tail.is_empty() {
        phrases.push(tail.to_string());
    }
    phrases
}

fn check_bounds(packet: &PhraseEmotionPacket) -> AnalysisOutcome<()> {
    let unit = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);
    let ok = unit(packet.tlp.truth)
        && unit(packet.tlp.love)
        && unit(packet.tlp.pain)
        && unit(packet.arousal)
        && unit(packet.weight)
        && packet.valence.is_finite()
        && (-1.0..=1.0).contains(&packet.valence)
        && packet.clusters.0.iter().all(|v| unit(*v));
    if ok {
        Ok(())
    } else {
        Err(AnalysisError::EmotionExtraction(format!(
            "out-of-range vector for phrase '{}'",
            packet.text
        )))
    }
}

/// Per-section phrase packets plus recovered translation failures
#[derive(Debug, Default)]
pub struct PhraseExtraction {
    pub per_section: Vec<Vec<PhraseEmotionPacket>>,
    pub diagnostics: Vec<StageDiagnostic>,
}

impl PhraseExtraction {
    pub fn phrase_count(&self) -> usize {
        self.per_section.iter().map(Vec::len).sum()
    }
}

/// Phrase emotion extractor (Tier 1)
pub struct PhraseEmotionExtractor<'a> {
    source: &'a dyn EmotionVectorSource,
    translator: Option<&'a dyn Translator>,
}

impl<'a> PhraseEmotionExtractor<'a> {
    pub fn new(source: &'a dyn EmotionVectorSource) -> Self {
        Self {
            source,
            translator: None,
        }
    }

    pub fn with_translator(mut self, translator: Option<&'a dyn Translator>) -> Self {
        self.translator = translator;
        self
    }

    /// Score every phrase in every section
    ///
    /// # Errors
    /// `AnalysisError::EmotionExtraction` when no phrase could be extracted or
    /// the source produced an out-of-range vector.
    pub fn extract(
        &self,
        sections: &[Section],
        cache: &mut PhraseCache,
    ) -> AnalysisOutcome<PhraseExtraction> {
        let mut out = PhraseExtraction::default();

        for section in sections {
            let mut packets = Vec::new();
            for line in &section.lines {
                for phrase in split_phrases(line) {
                    let packet = cache.get_or_insert_with(&phrase, || {
                        self.score(&phrase, &mut out.diagnostics)
                    });
                    check_bounds(&packet)?;
                    packets.push(packet);
                }
            }
            out.per_section.push(packets);
        }

        if out.phrase_count() == 0 {
            return Err(AnalysisError::EmotionExtraction(
                "no phrases to score".to_string(),
            ));
        }

        tracing::debug!(
            "Scored {} phrases across {} sections with {}",
            out.phrase_count(),
            sections.len(),
            self.source.name()
        );
        Ok(out)
    }

    fn score(&self, phrase: &str, diagnostics: &mut Vec<StageDiagnostic>) -> PhraseEmotionPacket {
        let Some(translator) = self.translator.filter(|_| needs_translation(phrase)) else {
            return self.source.score_phrase(phrase);
        };

        match translator.translate(phrase) {
            Ok(translated) => {
                let mut packet = self.source.score_phrase(&translated);
                packet.text = phrase.to_string();
                packet
            }
            Err(e) => {
                tracing::warn!("Translation failed, scoring original phrase: {}", e);
                diagnostics.push(StageDiagnostic::new("translation", &e, "original phrase scored"));
                self.source.score_phrase(phrase)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::TableTranslator;
    use crate::types::SectionTag;

    fn section(lines: &[&str]) -> Section {
        Section {
            index: 0,
            tag: SectionTag::Body,
            label: "Body".into(),
            lines: lines.iter().map(|l| l.to_string()).collect(),
            repeat_of: None,
        }
    }

    #[test]
    fn test_split_phrases() {
        assert_eq!(
            split_phrases("I hate you! I will destroy you! Traitor!"),
            vec!["I hate you!", "I will destroy you!", "Traitor!"]
        );
        assert_eq!(split_phrases("wait... what?!"), vec!["wait...", "what?!"]);
        assert_eq!(split_phrases("no terminator"), vec!["no terminator"]);
        assert_eq!(split_phrases("!!!"), vec!["!!!"]);
    }

    #[test]
    fn test_emphasis_table() {
        assert!((emphasis_score("no!") - 0.5).abs() < 1e-9);
        assert!((emphasis_score("so...") - 0.6).abs() < 1e-9);
        assert!((emphasis_score("STOP IT") - 0.3).abs() < 1e-9);
        assert!((emphasis_score("nooo") - 0.2).abs() < 1e-9);
        assert_eq!(emphasis_score("!!!!!!!!"), 1.5);
        assert_eq!(emphasis_score("plain"), 0.0);
    }

    #[test]
    fn test_rage_phrase_is_pain_dominant() {
        let packet = LexiconEmotionSource.score_phrase("I hate you!");
        assert_eq!(packet.clusters.argmax(), EmotionCluster::Rage);
        assert_eq!(packet.impact_zone, ImpactZone::Pain);
        assert!(packet.valence < 0.0);
        assert!(packet.weight > 0.3);
    }

    #[test]
    fn test_no_hits_gives_low_weight() {
        let packet = LexiconEmotionSource.score_phrase("the table is made of wood");
        assert_eq!(packet.lexicon_hits, 0);
        assert_eq!(packet.tlp, TlpVector::default());
        assert!(packet.weight <= 0.1);
        assert_eq!(packet.impact_zone, ImpactZone::Mixed);
    }

    #[test]
    fn test_pathological_input_stays_in_bounds() {
        for phrase in ["!!!!!!!!!!!!", "HATE HATE HATE!!!", "ㅋㅋㅋㅋㅋ", "…………", "🔥🔥🔥"] {
            let packet = LexiconEmotionSource.score_phrase(phrase);
            assert!(check_bounds(&packet).is_ok(), "{phrase}");
        }
    }

    #[test]
    fn test_scoring_is_pure() {
        let a = LexiconEmotionSource.score_phrase("I miss you, my love...");
        let b = LexiconEmotionSource.score_phrase("I miss you, my love...");
        assert_eq!(a, b);
    }

    #[test]
    fn test_extract_aligns_with_sections() {
        let source = LexiconEmotionSource;
        let extractor = PhraseEmotionExtractor::new(&source);
        let mut cache = PhraseCache::new(16);
        let mut empty = section(&[]);
        empty.index = 1;
        let sections = vec![section(&["tears fall. tears fall."]), empty];

        let out = extractor.extract(&sections, &mut cache).unwrap();
        assert_eq!(out.per_section.len(), 2);
        assert_eq!(out.per_section[0].len(), 2);
        assert!(out.per_section[1].is_empty());
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_extract_fails_without_phrases() {
        let source = LexiconEmotionSource;
        let extractor = PhraseEmotionExtractor::new(&source);
        let mut cache = PhraseCache::new(16);
        let result = extractor.extract(&[section(&[])], &mut cache);
        assert!(matches!(result, Err(AnalysisError::EmotionExtraction(_))));
    }

    #[test]
    fn test_translation_failure_is_recorded() {
        let source = LexiconEmotionSource;
        let translator = TableTranslator::new().with_entry("너를 증오해", "I hate you");
        let extractor =
            PhraseEmotionExtractor::new(&source).with_translator(Some(&translator));
        let mut cache = PhraseCache::new(16);

        let out = extractor
            .extract(&[section(&["너를 증오해", "모르는 말"])], &mut cache)
            .unwrap();

        assert_eq!(out.per_section[0][0].text, "너를 증오해");
        assert_eq!(out.per_section[0][0].clusters.argmax(), EmotionCluster::Rage);
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].stage, "translation");
    }
}
