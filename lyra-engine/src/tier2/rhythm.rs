// Tier 2: Rhythm Synthesizer
//
// Concept: Global BPM estimate plus a per-section tempo curve
// Synchronization: Accepts &[Section] + &GlobalEmotionCurve, outputs BpmProfile
//
// Algorithm:
//   base   = 140 - clamp((avg_syllables_per_line - 6) * 4, -20, 60)
//   energy = + 8 * min(2, emphatic marks per line)
//   accel  = + 20 * (rage + epic) - 15 * (despair + fear)
//   bias   = + DynamicBias.bpm_delta
//   clamp to [60, 168]
// Each section uses its own density and wave, clamped to ±delta of the estimate.

use crate::tier1::text_metrics::LineDensity;
use crate::types::{
    BpmLocks, BpmProfile, ClusterVector, EmotionCluster, GlobalEmotionCurve, Section,
    BPM_BOUNDARY_MAX, BPM_BOUNDARY_MIN,
};

const BASE_BPM: f64 = 140.0;
const FALLBACK_BPM: f64 = 120.0;

/// Rhythm synthesizer (Tier 2)
pub struct RhythmSynthesizer {
    min_bpm: f64,
    max_bpm: f64,
    section_delta: f64,
    fracture_threshold: f64,
}

impl Default for RhythmSynthesizer {
    fn default() -> Self {
        Self {
            min_bpm: 60.0,
            max_bpm: 168.0,
            section_delta: 5.0,
            fracture_threshold: 6.0,
        }
    }
}

impl RhythmSynthesizer {
    pub fn new(section_delta: f64, fracture_threshold: f64) -> Self {
        Self {
            section_delta,
            fracture_threshold,
            ..Self::default()
        }
    }

    fn raw_bpm(density: &LineDensity, clusters: &ClusterVector, bias_delta: f64) -> f64 {
        let c = |cluster: EmotionCluster| clusters.get(cluster);
        let syllable_drag = ((density.avg_syllables - 6.0) * 4.0).clamp(-20.0, 60.0);
        BASE_BPM - syllable_drag
            + 8.0 * density.punctuation_energy.min(2.0)
            + 20.0 * (c(EmotionCluster::Rage) + c(EmotionCluster::Epic))
            - 15.0 * (c(EmotionCluster::Despair) + c(EmotionCluster::Fear))
            + bias_delta
    }

    /// Estimate the BPM profile; the curve has exactly one value per section
    pub fn estimate(&self, sections: &[Section], curve: &GlobalEmotionCurve) -> BpmProfile {
        let all_lines: Vec<&String> = sections.iter().flat_map(|s| s.lines.iter()).collect();
        let density = LineDensity::of_lines(&all_lines);

        let raw = if density.line_count == 0 {
            FALLBACK_BPM
        } else {
            Self::raw_bpm(&density, &curve.cluster_means, curve.bias.bpm_delta)
        };
        let raw = if raw.is_finite() { raw } else { FALLBACK_BPM };
        let estimate = raw.clamp(self.min_bpm, self.max_bpm);
        let clamp_applied = estimate != raw;
        if clamp_applied {
            tracing::debug!("BPM {:.1} clamped to {:.1}", raw, estimate);
        }

        let curve_values: Vec<f64> = sections
            .iter()
            .map(|section| {
                if section.is_empty() {
                    return estimate;
                }
                let clusters = curve
                    .waves
                    .iter()
                    .find(|w| w.section_index == section.index)
                    .map_or(curve.cluster_means, |w| w.clusters);
                let local = Self::raw_bpm(
                    &LineDensity::of_lines(&section.lines),
                    &clusters,
                    curve.bias.bpm_delta,
                );
                let offset = if local.is_finite() { local - estimate } else { 0.0 };
                estimate + offset.clamp(-self.section_delta, self.section_delta)
            })
            .collect();

        let mut profile = BpmProfile {
            estimate,
            curve: curve_values,
            locks: BpmLocks {
                user_locked: false,
                clamp_applied,
            },
            fracture: false,
        };
        profile.fracture = profile.range() > self.fracture_threshold;
        profile
    }

    /// Move a profile to a new estimate, keeping each section's offset
    ///
    /// The estimate is clamped to the boundary range [40, 200]; offsets stay
    /// within ±delta of the new estimate.
    pub fn rebase(&self, profile: &BpmProfile, new_estimate: f64) -> BpmProfile {
        let estimate = new_estimate.clamp(BPM_BOUNDARY_MIN, BPM_BOUNDARY_MAX);
        let curve: Vec<f64> = profile
            .curve
            .iter()
            .map(|v| estimate + (v - profile.estimate).clamp(-self.section_delta, self.section_delta))
            .collect();

        let mut rebased = BpmProfile {
            estimate,
            curve,
            locks: BpmLocks {
                user_locked: true,
                clamp_applied: estimate != new_estimate,
            },
            fracture: false,
        };
        rebased.fracture = rebased.range() > self.fracture_threshold;
        rebased
    }
}
