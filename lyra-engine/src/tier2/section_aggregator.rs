// Tier 2: Section Aggregator
//
// Concept: Fuse phrase packets into one emotion wave per section and a
// song-level curve
// Synchronization: Accepts &[Section] + per-section phrase packets from Tier 1,
// outputs GlobalEmotionCurve
//
// Algorithm:
// 1. Trailing windowed mean over each section's phrase vectors
// 2. Per non-empty section: mean TLP, dominant cluster on the dominant axis,
//    intensity = mean per-phrase max cluster score, shape classification
// 3. Song level: mean TLP, dominant cluster by frequency then intensity,
//    peaks/valleys within a tolerance band, resonance, entropy
// 4. DynamicBias from the fixed (axis, cluster) table

use crate::error::{AnalysisError, AnalysisOutcome};
use crate::types::{
    clamp01, mean, ClusterVector, DynamicBias, EmotionCluster, GenreDomain, GlobalEmotionCurve,
    ModalKind, Mode, PhraseEmotionPacket, Section, SectionEmotionWave, TlpAxis, TlpVector, WaveShape,
    CLUSTER_COUNT,
};
use std::collections::HashMap;

/// Section aggregator (Tier 2 fusion concept)
pub struct SectionAggregator {
    /// Trailing smoothing window (phrases)
    window: usize,
    /// Any phrase weight above this makes the section a spike
    spike_weight: f64,
    /// Minimum monotonic pain+love change for rising/falling
    trend_threshold: f64,
    /// Tolerance band for peak/valley membership
    peak_band: f64,
}

impl Default for SectionAggregator {
    fn default() -> Self {
        Self {
            window: 4,
            spike_weight: 0.8,
            trend_threshold: 0.15,
            peak_band: 0.05,
        }
    }
}

impl SectionAggregator {
    /// Build the global emotion curve
    ///
    /// # Errors
    /// `AnalysisError::EmotionExtraction` when no section carries phrases or
    /// the packet lists are not aligned with the sections.
    pub fn aggregate(
        &self,
        sections: &[Section],
        packets: &[Vec<PhraseEmotionPacket>],
    ) -> AnalysisOutcome<GlobalEmotionCurve> {
        if sections.len() != packets.len() {
            return Err(AnalysisError::EmotionExtraction(format!(
                "{} packet lists for {} sections",
                packets.len(),
                sections.len()
            )));
        }

        let waves: Vec<SectionEmotionWave> = sections
            .iter()
            .zip(packets)
            .filter(|(_, p)| !p.is_empty())
            .map(|(section, p)| self.build_wave(section, p))
            .collect();

        if waves.is_empty() {
            return Err(AnalysisError::EmotionExtraction(
                "no section produced an emotion wave".to_string(),
            ));
        }

        let curve = self.build_curve(waves);
        tracing::debug!(
            "Aggregated {} waves, dominant {} (bias {:+.1} BPM)",
            curve.waves.len(),
            curve.dominant_cluster,
            curve.bias.bpm_delta
        );
        Ok(curve)
    }

    fn smooth(&self, packets: &[PhraseEmotionPacket]) -> Vec<(TlpVector, ClusterVector)> {
        (0..packets.len())
            .map(|i| {
                let start = (i + 1).saturating_sub(self.window);
                let window = &packets[start..=i];
                (
                    TlpVector::average(window.iter().map(|p| &p.tlp)),
                    ClusterVector::average(window.iter().map(|p| &p.clusters)),
                )
            })
            .collect()
    }

    fn build_wave(&self, section: &Section, packets: &[PhraseEmotionPacket]) -> SectionEmotionWave {
        let smoothed = self.smooth(packets);
        let tlp = TlpVector::average(smoothed.iter().map(|(t, _)| t));
        let clusters = ClusterVector::average(smoothed.iter().map(|(_, c)| c));

        let intensity = clamp01(mean(
            &packets.iter().map(|p| p.clusters.max()).collect::<Vec<_>>(),
        ));

        let trend: Vec<f64> = smoothed.iter().map(|(t, _)| t.pain + t.love).collect();
        let shape = if packets.iter().any(|p| p.weight > self.spike_weight) {
            WaveShape::Spike
        } else {
            classify_trend(&trend, self.trend_threshold)
        };

        SectionEmotionWave {
            section_index: section.index,
            tag: section.tag,
            label: section.label.clone(),
            dominant_cluster: dominant_on_axis(&tlp, &clusters),
            valence: (tlp.love - tlp.pain).clamp(-1.0, 1.0),
            arousal: clamp01(tlp.mean()),
            tlp,
            clusters,
            intensity,
            shape,
            phrase_count: packets.len(),
        }
    }

    fn build_curve(&self, waves: Vec<SectionEmotionWave>) -> GlobalEmotionCurve {
        let tlp = TlpVector::average(waves.iter().map(|w| &w.tlp));
        let cluster_means = ClusterVector::average(waves.iter().map(|w| &w.clusters));
        let intensities: Vec<f64> = waves.iter().map(|w| w.intensity).collect();
        let mean_intensity = mean(&intensities);

        let max = intensities.iter().copied().fold(f64::MIN, f64::max);
        let min = intensities.iter().copied().fold(f64::MAX, f64::min);
        let peak_sections = waves
            .iter()
            .filter(|w| w.intensity >= max - self.peak_band)
            .map(|w| w.section_index)
            .collect();
        let valley_sections = waves
            .iter()
            .filter(|w| w.intensity <= min + self.peak_band)
            .map(|w| w.section_index)
            .collect();

        let variance = intensities
            .iter()
            .map(|v| (v - mean_intensity).powi(2))
            .sum::<f64>()
            / intensities.len().max(1) as f64;

        let mut canonical: Vec<&SectionEmotionWave> = waves.iter().collect();
        canonical.sort_by_key(|w| w.tag.canonical_rank());
        let canonical_order = canonical.iter().map(|w| w.section_index).collect();

        let dominant_cluster = global_dominant(&waves);
        let bias = dynamic_bias(tlp.dominant_axis(), dominant_cluster);

        GlobalEmotionCurve {
            canonical_order,
            valence: (tlp.love - tlp.pain).clamp(-1.0, 1.0),
            arousal: clamp01(tlp.mean()),
            tlp,
            cluster_means,
            dominant_cluster,
            mean_intensity,
            peak_sections,
            valley_sections,
            resonance: clamp01(1.0 - variance.sqrt()),
            entropy: dominant_entropy(&waves),
            bias,
            waves,
        }
    }
}

fn classify_trend(series: &[f64], threshold: f64) -> WaveShape {
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return WaveShape::Flat;
    };
    let rising = series.windows(2).all(|w| w[1] >= w[0]);
    let falling = series.windows(2).all(|w| w[1] <= w[0]);
    if rising && last - first > threshold {
        WaveShape::Rising
    } else if falling && first - last > threshold {
        WaveShape::Falling
    } else {
        WaveShape::Flat
    }
}

/// Strongest cluster among those mapped to the dominant axis
fn dominant_on_axis(tlp: &TlpVector, clusters: &ClusterVector) -> EmotionCluster {
    let Some(axis) = tlp.dominant_axis() else {
        return EmotionCluster::Neutral;
    };
    let mut best = EmotionCluster::Neutral;
    let mut best_score = 0.0;
    for cluster in EmotionCluster::ALL.into_iter().filter(|c| c.axis() == Some(axis)) {
        if clusters.get(cluster) > best_score {
            best = cluster;
            best_score = clusters.get(cluster);
        }
    }
    best
}

/// Most frequent wave cluster; ties by mean intensity, then cluster order
///
/// Neutral only wins when every wave is neutral.
fn global_dominant(waves: &[SectionEmotionWave]) -> EmotionCluster {
    let mut stats: HashMap<EmotionCluster, (usize, f64)> = HashMap::new();
    for wave in waves {
        let entry = stats.entry(wave.dominant_cluster).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += wave.intensity;
    }

    let mut best: Option<(EmotionCluster, usize, f64)> = None;
    for cluster in EmotionCluster::ALL {
        if cluster == EmotionCluster::Neutral && stats.len() > 1 {
            continue;
        }
        let Some(&(count, total)) = stats.get(&cluster) else {
            continue;
        };
        let avg = total / count as f64;
        let better = match best {
            None => true,
            Some((_, best_count, best_avg)) => {
                count > best_count || (count == best_count && avg > best_avg)
            }
        };
        if better {
            best = Some((cluster, count, avg));
        }
    }
    best.map_or(EmotionCluster::Neutral, |(c, _, _)| c)
}

fn dominant_entropy(waves: &[SectionEmotionWave]) -> f64 {
    let n = waves.len();
    if n <= 1 {
        return 0.0;
    }
    let mut counts = [0usize; CLUSTER_COUNT];
    for wave in waves {
        counts[wave.dominant_cluster.index()] += 1;
    }
    let h: f64 = counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / n as f64;
            -p * p.ln()
        })
        .sum();
    let max_h = (n.min(CLUSTER_COUNT) as f64).ln();
    if max_h > 0.0 {
        clamp01(h / max_h)
    } else {
        0.0
    }
}

/// Fixed (dominant axis, dominant cluster) combination table
pub fn dynamic_bias(axis: Option<TlpAxis>, cluster: EmotionCluster) -> DynamicBias {
    use EmotionCluster as C;
    use GenreDomain as G;

    let (bpm_delta, key_hint, genre_hint) = match (axis, cluster) {
        (Some(TlpAxis::Pain), C::Rage) => (7.5, Mode::Minor, G::Hard),
        (Some(TlpAxis::Pain), C::Despair) => (7.5, Mode::Minor, G::Lyrical),
        (Some(TlpAxis::Pain), C::Fear) => (7.5, Mode::Minor, G::Cinematic),
        (Some(TlpAxis::Love), C::Tenderness) => (-5.0, Mode::Major, G::Soft),
        (Some(TlpAxis::Love), C::Joy) => (5.0, Mode::Major, G::Electronic),
        (Some(TlpAxis::Love), C::Longing) => (-2.5, Mode::Minor, G::Lyrical),
        (Some(TlpAxis::Truth), C::Epic) => (5.0, Mode::Minor, G::Cinematic),
        (Some(TlpAxis::Truth), C::Hope) => (2.5, Mode::Major, G::Lyrical),
        (Some(TlpAxis::Truth), C::Reflection) => (-2.5, Mode::Modal(ModalKind::Dorian), G::Jazz),
        _ => return DynamicBias::default(),
    };

    DynamicBias {
        bpm_delta,
        key_hint: Some(key_hint),
        genre_hint: Some(genre_hint),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tier1::phrase_emotion::{EmotionVectorSource, LexiconEmotionSource};
    use crate::types::SectionTag;

    fn section(index: usize, tag: SectionTag, lines: &[&str]) -> Section {
        Section {
            index,
            tag,
            label: tag.as_str().to_string(),
            lines: lines.iter().map(|l| l.to_string()).collect(),
            repeat_of: None,
        }
    }

    fn packets(phrases: &[&str]) -> Vec<PhraseEmotionPacket> {
        phrases
            .iter()
            .map(|p| LexiconEmotionSource.score_phrase(p))
            .collect()
    }

    #[test]
    fn test_one_wave_per_non_empty_section() {
        let sections = vec![
            section(0, SectionTag::Verse, &["tears"]),
            section(1, SectionTag::Intro, &[]),
            section(2, SectionTag::Chorus, &["hope"]),
        ];
        let p = vec![packets(&["tears fall"]), vec![], packets(&["I hope"])];
        let curve = SectionAggregator::default().aggregate(&sections, &p).unwrap();

        assert_eq!(curve.waves.len(), 2);
        assert_eq!(curve.waves[0].section_index, 0);
        assert_eq!(curve.waves[1].section_index, 2);
    }

    #[test]
    fn test_canonical_order_is_stable() {
        let sections = vec![
            section(0, SectionTag::Chorus, &["a"]),
            section(1, SectionTag::Verse, &["b"]),
            section(2, SectionTag::Body, &["c"]),
            section(3, SectionTag::Intro, &["d"]),
            section(4, SectionTag::Verse, &["e"]),
        ];
        let p = (0..5).map(|_| packets(&["love"])).collect::<Vec<_>>();
        let curve = SectionAggregator::default().aggregate(&sections, &p).unwrap();
        assert_eq!(curve.canonical_order, vec![3, 1, 4, 0, 2]);
    }

    #[test]
    fn test_rage_bias() {
        let sections = vec![section(0, SectionTag::Body, &["x"])];
        let p = vec![packets(&["I hate you!", "I will destroy you!", "Traitor!"])];
        let curve = SectionAggregator::default().aggregate(&sections, &p).unwrap();

        assert_eq!(curve.dominant_cluster, EmotionCluster::Rage);
        assert_eq!(curve.bias.bpm_delta, 7.5);
        assert_eq!(curve.bias.key_hint, Some(Mode::Minor));
        assert_eq!(curve.bias.genre_hint, Some(GenreDomain::Hard));
    }

    #[test]
    fn test_neutral_text_has_neutral_bias() {
        let sections = vec![section(0, SectionTag::Body, &["x"])];
        let p = vec![packets(&["the table is wooden"])];
        let curve = SectionAggregator::default().aggregate(&sections, &p).unwrap();
        assert_eq!(curve.dominant_cluster, EmotionCluster::Neutral);
        assert!(curve.bias.is_neutral());
        assert_eq!(curve.entropy, 0.0);
    }

    #[test]
    fn test_trend_classification() {
        assert_eq!(classify_trend(&[0.1, 0.2, 0.4], 0.15), WaveShape::Rising);
        assert_eq!(classify_trend(&[0.5, 0.3, 0.2], 0.15), WaveShape::Falling);
        assert_eq!(classify_trend(&[0.1, 0.5, 0.2], 0.15), WaveShape::Flat);
        assert_eq!(classify_trend(&[0.1, 0.2], 0.15), WaveShape::Flat);
        assert_eq!(classify_trend(&[], 0.15), WaveShape::Flat);
    }

    #[test]
    fn test_global_dominant_frequency_then_intensity() {
        let wave = |cluster, intensity| SectionEmotionWave {
            section_index: 0,
            tag: SectionTag::Verse,
            label: "Verse".into(),
            tlp: TlpVector::default(),
            clusters: ClusterVector::default(),
            dominant_cluster: cluster,
            intensity,
            valence: 0.0,
            arousal: 0.0,
            shape: WaveShape::Flat,
            phrase_count: 1,
        };
        let waves = vec![
            wave(EmotionCluster::Joy, 0.2),
            wave(EmotionCluster::Despair, 0.9),
            wave(EmotionCluster::Joy, 0.2),
        ];
        assert_eq!(global_dominant(&waves), EmotionCluster::Joy);

        let tied = vec![wave(EmotionCluster::Joy, 0.2), wave(EmotionCluster::Despair, 0.9)];
        assert_eq!(global_dominant(&tied), EmotionCluster::Despair);

        let with_neutral = vec![
            wave(EmotionCluster::Neutral, 0.0),
            wave(EmotionCluster::Neutral, 0.0),
            wave(EmotionCluster::Hope, 0.5),
        ];
        assert_eq!(global_dominant(&with_neutral), EmotionCluster::Hope);
    }

    #[test]
    fn test_misaligned_input_rejected() {
        let sections = vec![section(0, SectionTag::Body, &["x"])];
        let result = SectionAggregator::default().aggregate(&sections, &[]);
        assert!(result.is_err());
    }
}
