// Tier 3: Override Merger
//
// Concept: Layer user overrides, fusion hints and legacy estimates over the
// computed style
// Synchronization: Accepts MergedStyle + UserOverrides + optional
// SemanticHints/LegacyEstimate, mutates MergedStyle in place
//
// Precedence (highest first):
//   user override > upstream fusion summary > legacy engine > computed > fallback
//
// The merge is idempotent: MergedStyle keeps the report of the first apply()
// and a second call returns that report without touching anything. A BPM
// override rebases the whole curve onto the new estimate.

use crate::tier2::genre_scorer::{is_auto, GenreScorer};
use crate::tier2::genre_universe::find_genre;
use crate::tier2::legacy_engine::LegacyEstimate;
use crate::tier2::rhythm::RhythmSynthesizer;
use crate::types::{
    BpmProfile, GenreCandidate, GenreSource, InstrumentationProfile, MusicalKey, SemanticHints,
    TonalityProfile, UserOverrides, VocalProfile,
};
use serde::Serialize;

/// Layer that supplied a merged field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrecedenceLayer {
    User,
    Fusion,
    Legacy,
    Computed,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldProvenance {
    pub field: &'static str,
    pub layer: PrecedenceLayer,
}

/// Fields tracked for provenance, in output order
pub const MERGED_FIELDS: [&str; 8] = [
    "bpm",
    "key",
    "genre",
    "mood",
    "vocal_gender",
    "vocal_profile",
    "instrumentation",
    "structure",
];

/// Style values after Tier 2, before and after merging
#[derive(Debug, Clone, PartialEq)]
pub struct MergedStyle {
    pub bpm: BpmProfile,
    pub tonality: TonalityProfile,
    pub genre: GenreCandidate,
    /// Genre text shown to the user
    pub genre_label: String,
    pub mood: String,
    pub vocal: VocalProfile,
    pub instrumentation: InstrumentationProfile,
    pub structure_hints: Option<Vec<String>>,
    pub provenance: Vec<FieldProvenance>,
    /// Set by the first merge
    merged: Option<MergeReport>,
}

impl MergedStyle {
    pub fn new(
        bpm: BpmProfile,
        tonality: TonalityProfile,
        genre: GenreCandidate,
        mood: String,
        vocal: VocalProfile,
        instrumentation: InstrumentationProfile,
    ) -> Self {
        let genre_label = find_genre(&genre.genre_id)
            .map_or_else(|| genre.genre_id.clone(), |(_, g)| g.name.to_string());
        Self {
            bpm,
            tonality,
            genre,
            genre_label,
            mood,
            vocal,
            instrumentation,
            structure_hints: None,
            provenance: MERGED_FIELDS
                .iter()
                .map(|&field| FieldProvenance {
                    field,
                    layer: PrecedenceLayer::Computed,
                })
                .collect(),
            merged: None,
        }
    }

    /// Record that a field holds a hardcoded fallback value
    pub fn mark_fallback(&mut self, field: &str) {
        self.set_layer(field, PrecedenceLayer::Fallback);
    }

    pub fn layer_of(&self, field: &str) -> Option<PrecedenceLayer> {
        self.provenance
            .iter()
            .find(|p| p.field == field)
            .map(|p| p.layer)
    }

    /// Overrides have already been merged
    pub fn is_applied(&self) -> bool {
        self.merged.is_some()
    }

    fn set_layer(&mut self, field: &str, layer: PrecedenceLayer) {
        if let Some(entry) = self.provenance.iter_mut().find(|p| p.field == field) {
            entry.layer = layer;
        }
    }
}

/// Outcome of a merge
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeReport {
    /// Override values that were unusable and skipped
    pub ignored: Vec<String>,
}

/// Override merger (Tier 3)
#[derive(Default)]
pub struct OverrideMerger {
    rhythm: RhythmSynthesizer,
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// User overrides viewed as the top hint layer
fn user_hints(overrides: &UserOverrides) -> SemanticHints {
    SemanticHints {
        bpm: overrides.bpm,
        key: non_blank(&overrides.key),
        genre: non_blank(&overrides.genre),
        mood: non_blank(&overrides.mood),
        vocal_gender: overrides.preferred_gender,
        instrumentation: overrides.instrumentation.clone().unwrap_or_default(),
    }
}

/// Drop values the merger cannot use, noting each one
fn sanitize(mut hints: SemanticHints, layer: &str, ignored: &mut Vec<String>) -> SemanticHints {
    if let Some(bpm) = hints.bpm.filter(|v| !v.is_finite()) {
        ignored.push(format!("{layer} bpm {bpm} is not a number"));
        hints.bpm = None;
    }
    if let Some(key) = hints.key.clone().filter(|k| MusicalKey::parse(k).is_none()) {
        ignored.push(format!("{layer} key '{key}' not recognised"));
        hints.key = None;
    }
    hints.genre = hints.genre.filter(|g| !is_auto(g));
    hints.mood = non_blank(&hints.mood);
    hints
        .instrumentation
        .retain(|instrument| !instrument.trim().is_empty());
    hints
}

fn apply_key(tonality: &mut TonalityProfile, key: MusicalKey) {
    for section_key in tonality.section_keys.iter_mut() {
        *section_key = key;
    }
    tonality.mode = key.mode;
    tonality.modal_shifts.clear();
    tonality.primary_key = key;
}

impl OverrideMerger {
    pub fn new(section_delta: f64, fracture_threshold: f64) -> Self {
        Self {
            rhythm: RhythmSynthesizer::new(section_delta, fracture_threshold),
        }
    }

    /// Merge all layers into `style`
    pub fn apply(
        &self,
        style: &mut MergedStyle,
        overrides: &UserOverrides,
        hints: Option<&SemanticHints>,
        legacy: Option<&LegacyEstimate>,
    ) -> MergeReport {
        if let Some(report) = &style.merged {
            tracing::debug!("Overrides already applied, skipping");
            return report.clone();
        }

        let mut ignored = Vec::new();
        let user = sanitize(user_hints(overrides), "user", &mut ignored);
        let fusion = sanitize(hints.cloned().unwrap_or_default(), "fusion", &mut ignored);
        let effective = SemanticHints::merge(&fusion, &user);

        let upper = |user_set: bool| {
            if user_set {
                PrecedenceLayer::User
            } else {
                PrecedenceLayer::Fusion
            }
        };

        // BPM
        let bpm = match effective.bpm {
            Some(value) => Some((value, upper(user.bpm.is_some()))),
            None => legacy.map(|l| (l.bpm, PrecedenceLayer::Legacy)),
        };
        if let Some((value, layer)) = bpm {
            style.bpm = self.rhythm.rebase(&style.bpm, value);
            style.bpm.locks.user_locked = layer == PrecedenceLayer::User;
            style.set_layer("bpm", layer);
        }

        // Key
        if let Some(key) = effective.key.as_deref().and_then(MusicalKey::parse) {
            apply_key(&mut style.tonality, key);
            style.set_layer("key", upper(user.key.is_some()));
        }

        // Genre
        if let Some(name) = effective.genre.as_deref() {
            let candidate = GenreScorer::explicit_candidate(name);
            style.genre = GenreCandidate {
                domain_scores: std::mem::take(&mut style.genre.domain_scores),
                ..candidate
            };
            style.genre_label = name.to_string();
            style.set_layer("genre", upper(user.genre.is_some()));
        } else if let Some(estimate) = legacy {
            if let Some((entry, genre)) = find_genre(&estimate.genre_id) {
                let raw_score = style
                    .genre
                    .domain_scores
                    .iter()
                    .find(|s| s.domain == entry.domain)
                    .map_or(0.0, |s| s.score);
                style.genre = GenreCandidate {
                    domain: entry.domain,
                    genre_id: genre.id.to_string(),
                    raw_score,
                    threshold: entry.threshold,
                    source: GenreSource::Scored,
                    redirected_from: None,
                    domain_scores: std::mem::take(&mut style.genre.domain_scores),
                };
                style.genre_label = genre.name.to_string();
                style.set_layer("genre", PrecedenceLayer::Legacy);
            }
        }

        // Mood
        if let Some(mood) = effective.mood.clone() {
            style.mood = mood;
            style.set_layer("mood", upper(user.mood.is_some()));
        } else if let Some(estimate) = legacy {
            style.mood = estimate.mood.clone();
            style.set_layer("mood", PrecedenceLayer::Legacy);
        }

        // Vocal
        if let Some(gender) = effective.vocal_gender {
            style.vocal.gender = gender;
            style.set_layer("vocal_gender", upper(user.vocal_gender.is_some()));
        }
        if let Some(profile) = non_blank(&overrides.vocal_profile) {
            style.vocal.style = profile;
            style.set_layer("vocal_profile", PrecedenceLayer::User);
        }

        // Instrumentation
        if !effective.instrumentation.is_empty() {
            style.instrumentation = InstrumentationProfile {
                selection: effective.instrumentation.clone(),
                palette: "custom".to_string(),
            };
            style.set_layer("instrumentation", upper(!user.instrumentation.is_empty()));
        }

        // Structure
        if let Some(hints) = overrides.structure_hints.as_ref().filter(|h| !h.is_empty()) {
            style.structure_hints = Some(hints.iter().map(|h| h.trim().to_string()).collect());
            style.set_layer("structure", PrecedenceLayer::User);
        }

        for note in &ignored {
            tracing::warn!("Override ignored: {}", note);
        }

        let report = MergeReport { ignored };
        style.merged = Some(report.clone());
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BpmLocks, GenreDomain, Mode, VocalGender};

    fn style() -> MergedStyle {
        MergedStyle::new(
            BpmProfile {
                estimate: 140.0,
                curve: vec![137.0, 140.0, 145.0],
                locks: BpmLocks::default(),
                fracture: true,
            },
            TonalityProfile {
                mode: Mode::Minor,
                section_keys: vec![
                    MusicalKey::new(9, Mode::Minor),
                    MusicalKey::new(0, Mode::Major),
                    MusicalKey::new(9, Mode::Minor),
                ],
                modal_shifts: vec![1, 2],
                primary_key: MusicalKey::new(0, Mode::Major),
            },
            GenreScorer::explicit_candidate("metal"),
            "furious".to_string(),
            VocalProfile {
                gender: VocalGender::Male,
                vocal_type: "aggressive".into(),
                tone: "gritty".into(),
                style: "furious delivery".into(),
            },
            InstrumentationProfile {
                selection: vec!["guitar".into()],
                palette: "heavy".into(),
            },
        )
    }

    fn legacy() -> LegacyEstimate {
        LegacyEstimate {
            bpm: 90.0,
            genre_id: "swing".into(),
            mood: "somber".into(),
        }
    }

    #[test]
    fn test_bpm_override_rebases_curve() {
        let mut s = style();
        let overrides = UserOverrides {
            bpm: Some(95.0),
            ..Default::default()
        };
        OverrideMerger::default().apply(&mut s, &overrides, None, None);

        assert_eq!(s.bpm.estimate, 95.0);
        assert_eq!(s.bpm.curve.len(), 3);
        for v in &s.bpm.curve {
            assert!((v - 95.0).abs() <= 5.0);
        }
        assert!(s.bpm.locks.user_locked);
        assert_eq!(s.layer_of("bpm"), Some(PrecedenceLayer::User));
    }

    #[test]
    fn test_second_apply_returns_first_report() {
        let merger = OverrideMerger::default();
        let overrides = UserOverrides {
            bpm: Some(95.0),
            key: Some("H major".into()),
            genre: Some("jazz".into()),
            ..Default::default()
        };
        let mut s = style();
        assert!(!s.is_applied());
        let first = merger.apply(&mut s, &overrides, None, None);
        assert!(s.is_applied());
        assert_eq!(first.ignored.len(), 1);
        let once = s.clone();

        let second = merger.apply(&mut s, &overrides, None, Some(&legacy()));
        assert_eq!(second, first);
        assert_eq!(s, once);
    }

    #[test]
    fn test_precedence_order() {
        let merger = OverrideMerger::default();
        let user = UserOverrides {
            bpm: Some(100.0),
            ..Default::default()
        };
        let fusion = SemanticHints {
            bpm: Some(130.0),
            mood: Some("dreamy".into()),
            ..Default::default()
        };

        let mut s = style();
        merger.apply(&mut s, &user, Some(&fusion), Some(&legacy()));
        assert_eq!(s.bpm.estimate, 100.0);
        assert_eq!(s.mood, "dreamy");
        assert_eq!(s.layer_of("mood"), Some(PrecedenceLayer::Fusion));
        assert_eq!(s.genre.genre_id, "swing");
        assert_eq!(s.layer_of("genre"), Some(PrecedenceLayer::Legacy));

        let mut s = style();
        merger.apply(&mut s, &UserOverrides::default(), Some(&fusion), Some(&legacy()));
        assert_eq!(s.bpm.estimate, 130.0);
        assert!(!s.bpm.locks.user_locked);
        assert_eq!(s.layer_of("bpm"), Some(PrecedenceLayer::Fusion));

        let mut s = style();
        merger.apply(&mut s, &UserOverrides::default(), None, Some(&legacy()));
        assert_eq!(s.bpm.estimate, 90.0);
        assert_eq!(s.mood, "somber");
        assert_eq!(s.layer_of("bpm"), Some(PrecedenceLayer::Legacy));
    }

    #[test]
    fn test_key_override_applies_to_all_sections() {
        let mut s = style();
        let overrides = UserOverrides {
            key: Some("F# minor".into()),
            ..Default::default()
        };
        OverrideMerger::default().apply(&mut s, &overrides, None, None);

        let key = MusicalKey::new(6, Mode::Minor);
        assert!(s.tonality.section_keys.iter().all(|k| *k == key));
        assert_eq!(s.tonality.primary_key, key);
        assert!(s.tonality.modal_shifts.is_empty());
    }

    #[test]
    fn test_unusable_values_fall_through() {
        let mut s = style();
        let overrides = UserOverrides {
            bpm: Some(f64::NAN),
            key: Some("H lydian".into()),
            ..Default::default()
        };
        let fusion = SemanticHints {
            bpm: Some(120.0),
            ..Default::default()
        };
        let report = OverrideMerger::default().apply(&mut s, &overrides, Some(&fusion), None);

        assert_eq!(report.ignored.len(), 2);
        assert_eq!(s.bpm.estimate, 120.0);
        assert_eq!(s.layer_of("key"), Some(PrecedenceLayer::Computed));
        assert_eq!(s.tonality.primary_key, MusicalKey::new(0, Mode::Major));
    }

    #[test]
    fn test_genre_label_keeps_user_text() {
        let mut s = style();
        let overrides = UserOverrides {
            genre: Some("Space Polka".into()),
            ..Default::default()
        };
        OverrideMerger::default().apply(&mut s, &overrides, None, None);

        assert_eq!(s.genre_label, "Space Polka");
        assert_eq!(s.genre.domain, GenreDomain::Lyrical);
        assert_eq!(s.genre.source, GenreSource::Explicit);
    }

    #[test]
    fn test_auto_genre_is_not_an_override() {
        let mut s = style();
        let overrides = UserOverrides {
            genre: Some("auto".into()),
            ..Default::default()
        };
        OverrideMerger::default().apply(&mut s, &overrides, None, None);
        assert_eq!(s.genre.genre_id, "metal");
        assert_eq!(s.layer_of("genre"), Some(PrecedenceLayer::Computed));
    }

    #[test]
    fn test_fallback_provenance_survives_without_override() {
        let mut s = style();
        s.mark_fallback("instrumentation");
        OverrideMerger::default().apply(&mut s, &UserOverrides::default(), None, None);
        assert_eq!(
            s.layer_of("instrumentation"),
            Some(PrecedenceLayer::Fallback)
        );

        let mut s = style();
        s.mark_fallback("instrumentation");
        let overrides = UserOverrides {
            instrumentation: Some(vec!["harp".into()]),
            ..Default::default()
        };
        OverrideMerger::default().apply(&mut s, &overrides, None, None);
        assert_eq!(s.instrumentation.selection, vec!["harp".to_string()]);
        assert_eq!(s.layer_of("instrumentation"), Some(PrecedenceLayer::User));
    }
}
