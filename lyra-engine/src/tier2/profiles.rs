// Tier 2: Optional Profile Engines
//
// Concept: Vocal, instrumentation and color descriptions derived from the
// chosen genre and the emotion curve
// Synchronization: Each engine sits behind a trait and returns
// AnalysisOutcome<T>; the pipeline runs them isolated and substitutes the
// documented default on Err
//
// Defaults on failure:
// - vocal: neutral gender, "natural" type, "balanced" tone
// - instrumentation: piano only
// - color: grey point for every section

use crate::error::{AnalysisError, AnalysisOutcome};
use crate::tier2::genre_universe::{find_genre, GenreEntry};
use crate::types::{
    ColorAnnotation, ColorPoint, ColorProfile, EmotionCluster, EmotionColor, GenreCandidate,
    GlobalEmotionCurve, InstrumentationProfile, Section, VocalGender, VocalProfile,
};

fn registry_genre(candidate: &GenreCandidate, stage: &'static str) -> AnalysisOutcome<&'static GenreEntry> {
    find_genre(&candidate.genre_id)
        .map(|(_, g)| g)
        .ok_or_else(|| AnalysisError::stage(stage, format!("genre '{}' not in registry", candidate.genre_id)))
}

// ============================================================================
// Vocal
// ============================================================================

pub fn default_vocal() -> VocalProfile {
    VocalProfile {
        gender: VocalGender::Neutral,
        vocal_type: "natural".to_string(),
        tone: "balanced".to_string(),
        style: "plain delivery".to_string(),
    }
}

/// Vocal description for the chosen genre
pub trait VocalProfiler: Send + Sync {
    fn profile(
        &self,
        genre: &GenreCandidate,
        curve: &GlobalEmotionCurve,
        preferred: Option<VocalGender>,
    ) -> AnalysisOutcome<VocalProfile>;
}

/// Vocal profile engine
#[derive(Debug, Default)]
pub struct VocalEngine;

impl VocalProfiler for VocalEngine {
    fn profile(
        &self,
        genre: &GenreCandidate,
        curve: &GlobalEmotionCurve,
        preferred: Option<VocalGender>,
    ) -> AnalysisOutcome<VocalProfile> {
        let entry = registry_genre(genre, "vocal")?;

        let tone = if curve.mean_intensity > 0.7 {
            format!("intense {}", entry.vocal_tone)
        } else if curve.mean_intensity < 0.2 {
            format!("restrained {}", entry.vocal_tone)
        } else {
            entry.vocal_tone.to_string()
        };

        Ok(VocalProfile {
            gender: preferred.unwrap_or(entry.vocal),
            vocal_type: entry.vocal_type.to_string(),
            tone,
            style: format!("{} delivery", curve.dominant_cluster.mood()),
        })
    }
}

// ============================================================================
// Instrumentation
// ============================================================================

pub fn default_instrumentation() -> InstrumentationProfile {
    InstrumentationProfile {
        selection: vec!["piano".to_string()],
        palette: "piano".to_string(),
    }
}

fn accent_instrument(cluster: EmotionCluster) -> Option<&'static str> {
    match cluster {
        EmotionCluster::Rage => Some("feedback guitar"),
        EmotionCluster::Despair => Some("cello"),
        EmotionCluster::Fear => Some("dissonant strings"),
        EmotionCluster::Tenderness => Some("acoustic piano"),
        EmotionCluster::Longing => Some("violin"),
        EmotionCluster::Joy => Some("hand claps"),
        EmotionCluster::Hope => Some("glockenspiel"),
        EmotionCluster::Epic => Some("timpani"),
        EmotionCluster::Reflection => Some("rhodes piano"),
        EmotionCluster::Neutral => None,
    }
}

/// Instrument selection for the chosen genre
pub trait InstrumentationProfiler: Send + Sync {
    fn profile(
        &self,
        genre: &GenreCandidate,
        curve: &GlobalEmotionCurve,
    ) -> AnalysisOutcome<InstrumentationProfile>;
}

/// Instrumentation engine
#[derive(Debug, Default)]
pub struct InstrumentationEngine;

impl InstrumentationProfiler for InstrumentationEngine {
    fn profile(
        &self,
        genre: &GenreCandidate,
        curve: &GlobalEmotionCurve,
    ) -> AnalysisOutcome<InstrumentationProfile> {
        let entry = registry_genre(genre, "instrumentation")?;

        let mut selection: Vec<String> = entry.instruments.iter().map(|s| s.to_string()).collect();
        if let Some(accent) = accent_instrument(curve.dominant_cluster) {
            if !selection.iter().any(|s| s == accent) {
                selection.push(accent.to_string());
            }
        }

        Ok(InstrumentationProfile {
            selection,
            palette: entry.palette.to_string(),
        })
    }
}

// ============================================================================
// Color
// ============================================================================

pub fn default_color(sections: &[Section]) -> ColorAnnotation {
    let grey = EmotionColor::Grey;
    ColorAnnotation {
        wave: sections
            .iter()
            .map(|s| ColorPoint {
                section_index: s.index,
                label: s.label.clone(),
                color: grey,
                hex: grey.hex().to_string(),
            })
            .collect(),
        profile: ColorProfile {
            dominant: grey,
            secondary: None,
            hex: grey.hex().to_string(),
        },
    }
}

/// Per-section color wave plus song-level color profile
pub trait ColorAnnotator: Send + Sync {
    fn annotate(&self, curve: &GlobalEmotionCurve) -> AnalysisOutcome<ColorAnnotation>;
}

/// Color annotation engine
#[derive(Debug, Default)]
pub struct ColorEngine;

impl ColorAnnotator for ColorEngine {
    fn annotate(&self, curve: &GlobalEmotionCurve) -> AnalysisOutcome<ColorAnnotation> {
        if curve.waves.is_empty() {
            return Err(AnalysisError::stage("color", "emotion curve has no waves"));
        }

        let wave: Vec<ColorPoint> = curve
            .waves
            .iter()
            .map(|w| {
                let color = w.dominant_cluster.color();
                ColorPoint {
                    section_index: w.section_index,
                    label: w.label.clone(),
                    color,
                    hex: color.hex().to_string(),
                }
            })
            .collect();

        let dominant = curve.dominant_cluster.color();

        // Most frequent other color; first appearance wins ties
        let mut counts: Vec<(EmotionColor, usize)> = Vec::new();
        for point in wave.iter().filter(|p| p.color != dominant) {
            match counts.iter_mut().find(|(c, _)| *c == point.color) {
                Some(entry) => entry.1 += 1,
                None => counts.push((point.color, 1)),
            }
        }
        let secondary = counts
            .iter()
            .fold(None, |best: Option<(EmotionColor, usize)>, &(c, n)| match best {
                Some((_, bn)) if bn >= n => best,
                _ => Some((c, n)),
            })
            .map(|(c, _)| c);

        Ok(ColorAnnotation {
            wave,
            profile: ColorProfile {
                dominant,
                secondary,
                hex: dominant.hex().to_string(),
            },
        })
    }
}
