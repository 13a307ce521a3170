// Tier 3: Consistency Validator
//
// Concept: Cross-check the merged style against the emotion curve
// Synchronization: Accepts &MergedStyle + &GlobalEmotionCurve + section count,
// returns ConsistencyReport. Read-only: nothing in MergedStyle is changed.
//
// Checks:
// - bpm_intensity: estimate within 35 BPM of 70 + 90 · mean intensity
//   (the expected value is reported as a suggestion, never applied)
// - genre_sections: chosen domain is a home domain of at least one section
// - tone_key: song valence and style key agree on minor vs major
// - low_bpm_major: below 60 BPM in a major key
// - structure_hints: hint count matches section count
// - truncation: input was cut to the configured maximum

use crate::tier2::genre_universe::home_domains;
use crate::tier3::override_merger::MergedStyle;
use crate::types::{EmotionCluster, GlobalEmotionCurve, Mode};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsistencyCheck {
    pub name: &'static str,
    pub passed: bool,
}

/// Validator output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsistencyReport {
    /// No warnings were raised
    pub ok: bool,
    pub warnings: Vec<String>,
    pub checks: Vec<ConsistencyCheck>,
    /// Tempo suggested by the intensity check, when it failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_bpm: Option<f64>,
}

/// What the validator needs to know about the request itself
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestFacts {
    pub section_count: usize,
    pub truncated: bool,
}

/// Consistency validator (Tier 3)
pub struct ConsistencyValidator {
    /// Allowed distance between estimate and intensity-implied tempo
    bpm_tolerance: f64,
    /// Below this, a major key reads as a mismatch
    low_bpm: f64,
    /// Valence magnitude needed before tone and key must agree
    tone_valence: f64,
}

impl Default for ConsistencyValidator {
    fn default() -> Self {
        Self {
            bpm_tolerance: 35.0,
            low_bpm: 60.0,
            tone_valence: 0.25,
        }
    }
}

impl ConsistencyValidator {
    pub fn validate(
        &self,
        style: &MergedStyle,
        curve: &GlobalEmotionCurve,
        facts: RequestFacts,
    ) -> ConsistencyReport {
        let mut warnings = Vec::new();
        let mut checks = Vec::new();
        let mut record = |name: &'static str, warning: Option<String>| {
            checks.push(ConsistencyCheck {
                name,
                passed: warning.is_none(),
            });
            if let Some(w) = warning {
                warnings.push(w);
            }
        };

        // BPM vs intensity
        let expected = (70.0 + 90.0 * curve.mean_intensity).round();
        let bpm_gap = (style.bpm.estimate - expected).abs();
        let suggested_bpm = (bpm_gap > self.bpm_tolerance).then_some(expected);
        record(
            "bpm_intensity",
            suggested_bpm.map(|s| {
                format!(
                    "BPM {:.0} does not match emotional intensity {:.2}; consider {:.0}",
                    style.bpm.estimate, curve.mean_intensity, s
                )
            }),
        );

        // Genre vs section universe
        let scored: Vec<EmotionCluster> = curve
            .waves
            .iter()
            .map(|w| w.dominant_cluster)
            .filter(|c| *c != EmotionCluster::Neutral)
            .collect();
        let at_home = scored.is_empty()
            || scored
                .iter()
                .any(|c| home_domains(*c).contains(&style.genre.domain));
        record(
            "genre_sections",
            (!at_home).then(|| {
                format!(
                    "Genre {} ({}) fits none of the section emotions",
                    style.genre_label, style.genre.domain
                )
            }),
        );

        // Tone vs key
        let key_mode = style.tonality.primary_key.mode;
        let tone_clash = match key_mode {
            Mode::Major => curve.valence <= -self.tone_valence,
            Mode::Minor => curve.valence >= self.tone_valence,
            Mode::Modal(_) => false,
        };
        record(
            "tone_key",
            tone_clash.then(|| {
                format!(
                    "Lyric tone (valence {:+.2}) disagrees with style key {}",
                    curve.valence, style.tonality.primary_key
                )
            }),
        );

        // Low BPM + major
        let low_major = style.bpm.estimate < self.low_bpm && key_mode == Mode::Major;
        record(
            "low_bpm_major",
            low_major.then(|| {
                format!(
                    "BPM {:.0} is very slow for a major key ({})",
                    style.bpm.estimate, style.tonality.primary_key
                )
            }),
        );

        // Structure hints
        let hint_mismatch = style
            .structure_hints
            .as_ref()
            .filter(|h| h.len() != facts.section_count)
            .map(|h| {
                format!(
                    "{} structure hints for {} sections; hints not used",
                    h.len(),
                    facts.section_count
                )
            });
        record("structure_hints", hint_mismatch);

        // Truncation
        record(
            "truncation",
            facts
                .truncated
                .then(|| "Input was truncated; analysis covers the leading part only".to_string()),
        );

        if !warnings.is_empty() {
            tracing::debug!("Consistency warnings: {}", warnings.len());
        }

        ConsistencyReport {
            ok: warnings.is_empty(),
            warnings,
            checks,
            suggested_bpm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tier2::genre_scorer::GenreScorer;
    use crate::types::{
        BpmLocks, BpmProfile, ClusterVector, DynamicBias, InstrumentationProfile, MusicalKey,
        SectionEmotionWave, SectionTag, TlpVector, TonalityProfile, VocalGender, VocalProfile,
        WaveShape,
    };

    fn style(bpm: f64, key: MusicalKey, genre: &str) -> MergedStyle {
        MergedStyle::new(
            BpmProfile {
                estimate: bpm,
                curve: vec![bpm, bpm],
                locks: BpmLocks::default(),
                fracture: false,
            },
            TonalityProfile {
                mode: key.mode,
                section_keys: vec![key, key],
                modal_shifts: Vec::new(),
                primary_key: key,
            },
            GenreScorer::explicit_candidate(genre),
            "calm".into(),
            VocalProfile {
                gender: VocalGender::Neutral,
                vocal_type: "natural".into(),
                tone: "balanced".into(),
                style: "plain".into(),
            },
            InstrumentationProfile {
                selection: vec!["piano".into()],
                palette: "piano".into(),
            },
        )
    }

    fn curve(clusters: &[EmotionCluster], intensity: f64, valence: f64) -> GlobalEmotionCurve {
        let waves: Vec<SectionEmotionWave> = clusters
            .iter()
            .enumerate()
            .map(|(i, &c)| SectionEmotionWave {
                section_index: i,
                tag: SectionTag::Verse,
                label: "Verse".into(),
                tlp: TlpVector::default(),
                clusters: ClusterVector::default(),
                dominant_cluster: c,
                intensity,
                valence,
                arousal: 0.5,
                shape: WaveShape::Flat,
                phrase_count: 1,
            })
            .collect();
        GlobalEmotionCurve {
            canonical_order: (0..waves.len()).collect(),
            waves,
            tlp: TlpVector::default(),
            cluster_means: ClusterVector::default(),
            dominant_cluster: clusters.first().copied().unwrap_or(EmotionCluster::Neutral),
            mean_intensity: intensity,
            valence,
            arousal: 0.5,
            peak_sections: Vec::new(),
            valley_sections: Vec::new(),
            resonance: 1.0,
            entropy: 0.0,
            bias: DynamicBias::default(),
        }
    }

    fn facts() -> RequestFacts {
        RequestFacts {
            section_count: 2,
            truncated: false,
        }
    }

    #[test]
    fn test_consistent_style_passes() {
        let s = style(150.0, MusicalKey::new(4, Mode::Minor), "metal");
        let c = curve(&[EmotionCluster::Rage, EmotionCluster::Rage], 0.8, -0.6);
        let report = ConsistencyValidator::default().validate(&s, &c, facts());
        assert!(report.ok, "{:?}", report.warnings);
        assert_eq!(report.checks.len(), 6);
        assert!(report.suggested_bpm.is_none());
    }

    #[test]
    fn test_bpm_suggestion_is_not_applied() {
        let s = style(60.0, MusicalKey::new(4, Mode::Minor), "metal");
        let c = curve(&[EmotionCluster::Rage, EmotionCluster::Rage], 1.0, -0.6);
        let report = ConsistencyValidator::default().validate(&s, &c, facts());
        assert!(!report.ok);
        assert_eq!(report.suggested_bpm, Some(160.0));
        assert_eq!(s.bpm.estimate, 60.0);
    }

    #[test]
    fn test_genre_outside_section_universe() {
        let s = style(100.0, MusicalKey::new(4, Mode::Minor), "novelty");
        let c = curve(&[EmotionCluster::Despair, EmotionCluster::Fear], 0.4, -0.6);
        let report = ConsistencyValidator::default().validate(&s, &c, facts());
        assert!(report.warnings.iter().any(|w| w.contains("Novelty")));
    }

    #[test]
    fn test_low_bpm_major_and_tone() {
        let s = style(55.0, MusicalKey::new(0, Mode::Major), "ballad");
        let c = curve(&[EmotionCluster::Despair, EmotionCluster::Despair], 0.0, -0.5);
        let report = ConsistencyValidator::default().validate(&s, &c, facts());
        let failed: Vec<&str> = report
            .checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| c.name)
            .collect();
        assert_eq!(failed, vec!["tone_key", "low_bpm_major"]);
    }

    #[test]
    fn test_structure_and_truncation_warnings() {
        let mut s = style(120.0, MusicalKey::new(4, Mode::Minor), "metal");
        s.structure_hints = Some(vec!["Intro".into()]);
        let c = curve(&[EmotionCluster::Rage, EmotionCluster::Rage], 0.55, -0.6);
        let report = ConsistencyValidator::default().validate(
            &s,
            &c,
            RequestFacts {
                section_count: 2,
                truncated: true,
            },
        );
        assert_eq!(report.warnings.len(), 2);
    }
}
