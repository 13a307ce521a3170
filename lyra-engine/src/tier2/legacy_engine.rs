// Tier 2: Legacy Engine
//
// Concept: Keyword-driven estimates from the first-generation analyzer
// Synchronization: Accepts &[Section] + &GlobalEmotionCurve, outputs LegacyEstimate
//
// Only runs under EngineStrategy::LegacyBlend. Its estimates form the
// "legacy" precedence layer of the override merger: below user overrides and
// fusion hints, above the computed values.

use crate::tier1::text_metrics::TextStats;
use crate::tier2::genre_universe::domain_entry;
use crate::types::{GlobalEmotionCurve, Section};
use serde::Serialize;

/// Legacy estimates for the three fields the old analyzer produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyEstimate {
    pub bpm: f64,
    pub genre_id: String,
    pub mood: String,
}

/// Keyword-based estimator
pub struct LegacyEngine {
    /// Style words needed before a keyword genre is trusted
    min_keyword_hits: usize,
    min_bpm: f64,
    max_bpm: f64,
}

impl Default for LegacyEngine {
    fn default() -> Self {
        Self {
            min_keyword_hits: 2,
            min_bpm: 60.0,
            max_bpm: 168.0,
        }
    }
}

impl LegacyEngine {
    pub fn estimate(&self, sections: &[Section], curve: &GlobalEmotionCurve) -> LegacyEstimate {
        let stats = TextStats::from_sections(sections);

        // First listed wins ties
        let keyword_genres = [
            (stats.tech_hits, "synthpop"),
            (stats.dark_hits, "gothic_metal"),
            (stats.swing_hits, "swing"),
            (stats.humor_hits, "novelty"),
            (stats.imagery_hits, "indie_folk"),
        ];
        let best = keyword_genres
            .iter()
            .fold(None, |best: Option<(usize, &str)>, &(hits, id)| match best {
                Some((b, _)) if b >= hits => best,
                _ => Some((hits, id)),
            });

        let genre_id = match best {
            Some((hits, id)) if hits >= self.min_keyword_hits => id.to_string(),
            _ => curve
                .bias
                .genre_hint
                .map_or("ballad", |d| domain_entry(d).default_genre().id)
                .to_string(),
        };

        let bpm = (80.0 + curve.arousal * 80.0).clamp(self.min_bpm, self.max_bpm);

        let mood = if curve.valence > 0.2 {
            "uplifting"
        } else if curve.valence < -0.2 {
            "somber"
        } else {
            "balanced"
        };

        tracing::debug!(bpm, genre = %genre_id, mood, "Legacy estimate");

        LegacyEstimate {
            bpm,
            genre_id,
            mood: mood.to_string(),
        }
    }
}
