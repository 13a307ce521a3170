// Tier 2: Genre Feature Vector
//
// Concept: Condense the emotion curve and the text statistics into a fixed
// 20-dimensional vector that the genre scorer dots against domain weights
// Synchronization: Accepts &[Section] + &GlobalEmotionCurve, outputs GenreFeatures
//
// Every feature is in [0, 1].

use crate::tier1::text_metrics::TextStats;
use crate::types::{clamp01, EmotionCluster, GlobalEmotionCurve, Section};
use serde::Serialize;

pub const FEATURE_COUNT: usize = 20;

/// Genre feature vector
///
/// The same struct doubles as a weight vector in the genre registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GenreFeatures {
    pub aggression: f64,
    pub power: f64,
    pub rhythm_density: f64,
    pub narrative_pressure: f64,
    pub poetic_density: f64,
    pub jazz_pressure: f64,
    pub swing_pressure: f64,
    pub electronic_pressure: f64,
    pub gothic_weight: f64,
    pub dramatic_weight: f64,
    pub tenderness: f64,
    pub joy: f64,
    pub melancholy: f64,
    pub humor: f64,
    pub calm: f64,
    pub repetition: f64,
    pub structure_complexity: f64,
    pub lyric_weight: f64,
    pub energy: f64,
    pub valence_positivity: f64,
}

impl GenreFeatures {
    /// All-zero vector, the base for sparse weight literals
    pub const ZERO: GenreFeatures = GenreFeatures {
        aggression: 0.0,
        power: 0.0,
        rhythm_density: 0.0,
        narrative_pressure: 0.0,
        poetic_density: 0.0,
        jazz_pressure: 0.0,
        swing_pressure: 0.0,
        electronic_pressure: 0.0,
        gothic_weight: 0.0,
        dramatic_weight: 0.0,
        tenderness: 0.0,
        joy: 0.0,
        melancholy: 0.0,
        humor: 0.0,
        calm: 0.0,
        repetition: 0.0,
        structure_complexity: 0.0,
        lyric_weight: 0.0,
        energy: 0.0,
        valence_positivity: 0.0,
    };

    pub fn as_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.aggression,
            self.power,
            self.rhythm_density,
            self.narrative_pressure,
            self.poetic_density,
            self.jazz_pressure,
            self.swing_pressure,
            self.electronic_pressure,
            self.gothic_weight,
            self.dramatic_weight,
            self.tenderness,
            self.joy,
            self.melancholy,
            self.humor,
            self.calm,
            self.repetition,
            self.structure_complexity,
            self.lyric_weight,
            self.energy,
            self.valence_positivity,
        ]
    }

    pub fn dot(&self, weights: &GenreFeatures) -> f64 {
        self.as_array()
            .iter()
            .zip(weights.as_array().iter())
            .map(|(f, w)| f * w)
            .sum()
    }

    /// Build the feature vector for a request
    pub fn extract(sections: &[Section], curve: &GlobalEmotionCurve) -> Self {
        let stats = TextStats::from_sections(sections);
        let c = |cluster: EmotionCluster| curve.cluster_means.get(cluster);

        let rage = c(EmotionCluster::Rage);
        let despair = c(EmotionCluster::Despair);
        let fear = c(EmotionCluster::Fear);
        let tenderness = c(EmotionCluster::Tenderness);
        let longing = c(EmotionCluster::Longing);
        let joy = c(EmotionCluster::Joy);
        let hope = c(EmotionCluster::Hope);
        let epic = c(EmotionCluster::Epic);
        let reflection = c(EmotionCluster::Reflection);

        let punct = stats.density.punctuation_energy.min(2.0) / 2.0;
        let rhythm_density = clamp01((stats.density.avg_syllables - 4.0) / 10.0);
        let imagery = stats.rate(stats.imagery_hits);
        let swing = stats.rate(stats.swing_hits);

        Self {
            aggression: clamp01(rage + 0.2 * fear),
            power: clamp01(0.6 * epic + 0.4 * rage + 0.2 * punct),
            rhythm_density,
            narrative_pressure: clamp01(
                stats.density.avg_syllables / 12.0 * (1.0 - stats.repeated_line_ratio),
            ),
            poetic_density: clamp01(imagery * 8.0 + 0.5 * reflection),
            jazz_pressure: clamp01(swing * 8.0 + 0.4 * reflection + 0.2 * stats.question_ratio),
            swing_pressure: clamp01(swing * 10.0),
            electronic_pressure: clamp01(stats.rate(stats.tech_hits) * 10.0 + 0.3 * joy),
            gothic_weight: clamp01(stats.rate(stats.dark_hits) * 10.0 + 0.3 * fear),
            dramatic_weight: clamp01(0.5 * epic + 0.3 * fear + 0.2 * (1.0 - curve.resonance)),
            tenderness,
            joy,
            melancholy: clamp01(despair + 0.5 * longing),
            humor: clamp01(stats.rate(stats.humor_hits) * 10.0),
            calm: clamp01((1.0 - curve.mean_intensity) * (1.0 - punct)),
            repetition: clamp01(stats.repeated_line_ratio),
            structure_complexity: clamp01(
                stats.distinct_tags as f64 / 6.0 * 0.6 + stats.line_length_cv.min(1.0) * 0.4,
            ),
            lyric_weight: clamp01(0.4 * longing + 0.3 * despair + 0.3 * tenderness + 0.3 * hope),
            energy: clamp01(0.5 * curve.arousal + 0.3 * punct + 0.2 * rhythm_density),
            valence_positivity: clamp01((curve.valence + 1.0) / 2.0),
        }
    }
}
