// Tier 2: Genre Scorer
//
// Concept: Two-stage genre inference over the global genre universe
// Synchronization: Accepts GenreFeatures (+ optional explicit genre), outputs
// GenreCandidate. Pure: identical input always yields identical output.
//
// Algorithm:
// 1. Explicit, non-"auto" genre short-circuits scoring
// 2. Score every domain: clamp01(features · weights), then the poetic/lyric
//    correction (+lyrical, -electronic) and the dynamic-bias nudge
//    (+0.05 on the hinted domain)
// 3. Highest qualifying domain wins; ties by margin over threshold, then by
//    registry priority. No qualifier: highest raw score.
// 4. Redirect rules may move the winner to another domain
// 5. Narrowing rules pick a genre inside the domain (default: first genre)

use crate::tier2::features::GenreFeatures;
use crate::tier2::genre_universe::{
    domain_entry, resolve_explicit, DomainEntry, GenreEntry, GLOBAL_GENRE_UNIVERSE,
};
use crate::types::{clamp01, DomainScore, GenreCandidate, GenreDomain, GenreSource};

const TIE_EPSILON: f64 = 1e-9;

/// Genre scorer (Tier 2 fusion concept)
pub struct GenreScorer {
    /// Strength of the poetic/lyric correction
    poetic_correction: f64,
    /// Electronic → Cinematic when gothic weight reaches this
    gothic_redirect: f64,
    /// Electronic → Lyrical when poetic density reaches this
    poetic_redirect: f64,
    /// Soft → Comedy when humor reaches this
    humor_redirect: f64,
    /// Added to the domain named by the dynamic bias
    bias_bonus: f64,
}

impl Default for GenreScorer {
    fn default() -> Self {
        Self {
            poetic_correction: 0.15,
            gothic_redirect: 0.55,
            poetic_redirect: 0.6,
            humor_redirect: 0.5,
            bias_bonus: 0.05,
        }
    }
}

/// Whether an explicit genre value asks for inference
pub fn is_auto(genre: &str) -> bool {
    let g = genre.trim();
    g.is_empty() || g.eq_ignore_ascii_case("auto")
}

impl GenreScorer {
    /// Score all domains in registry order
    pub fn score_domains(
        &self,
        features: &GenreFeatures,
        bias: Option<GenreDomain>,
    ) -> Vec<DomainScore> {
        let p = (features.poetic_density + features.lyric_weight) / 2.0;
        GLOBAL_GENRE_UNIVERSE
            .iter()
            .map(|entry| {
                let mut score = features.dot(&entry.weights);
                match entry.domain {
                    GenreDomain::Lyrical => score += self.poetic_correction * p,
                    GenreDomain::Electronic => score -= self.poetic_correction * p,
                    _ => {}
                }
                if bias == Some(entry.domain) {
                    score += self.bias_bonus;
                }
                let score = clamp01(score);
                DomainScore {
                    domain: entry.domain,
                    score,
                    threshold: entry.threshold,
                    qualified: score >= entry.threshold,
                }
            })
            .collect()
    }

    /// Infer the genre candidate
    ///
    /// `bias` is the dynamic-bias genre hint of the emotion curve.
    pub fn infer_genre(
        &self,
        features: &GenreFeatures,
        bias: Option<GenreDomain>,
        explicit: Option<&str>,
    ) -> GenreCandidate {
        if let Some(name) = explicit.filter(|g| !is_auto(g)) {
            return Self::explicit_candidate(name);
        }

        let scores = self.score_domains(features, bias);
        let (winner, source) = select_winner(&scores);

        let (domain, source, redirected_from) = match self.redirect(winner.domain, features) {
            Some(target) => (target, GenreSource::Redirected, Some(winner.domain)),
            None => (winner.domain, source, None),
        };

        let entry = domain_entry(domain);
        let genre = narrow(entry, features);
        let final_score = scores
            .iter()
            .find(|s| s.domain == domain)
            .map_or(winner.score, |s| s.score);

        tracing::debug!(
            "Genre inferred: {}/{} (score {:.3}, {:?})",
            domain,
            genre.id,
            final_score,
            source
        );

        GenreCandidate {
            domain,
            genre_id: genre.id.to_string(),
            raw_score: final_score,
            threshold: entry.threshold,
            source,
            redirected_from,
            domain_scores: scores,
        }
    }

    /// Candidate for a named genre, resolved against the registry
    ///
    /// Unknown names use the lyrical default entry.
    pub fn explicit_candidate(name: &str) -> GenreCandidate {
        let (entry, genre) = match resolve_explicit(name) {
            Some(found) => found,
            None => {
                tracing::warn!("Unknown explicit genre '{}', using lyrical registry entry", name);
                let entry = domain_entry(GenreDomain::Lyrical);
                (entry, entry.default_genre())
            }
        };
        GenreCandidate {
            domain: entry.domain,
            genre_id: genre.id.to_string(),
            raw_score: 1.0,
            threshold: 0.0,
            source: GenreSource::Explicit,
            redirected_from: None,
            domain_scores: Vec::new(),
        }
    }

    fn redirect(&self, domain: GenreDomain, f: &GenreFeatures) -> Option<GenreDomain> {
        match domain {
            GenreDomain::Electronic if f.gothic_weight >= self.gothic_redirect => {
                Some(GenreDomain::Cinematic)
            }
            GenreDomain::Electronic if f.poetic_density >= self.poetic_redirect => {
                Some(GenreDomain::Lyrical)
            }
            GenreDomain::Soft if f.humor >= self.humor_redirect => Some(GenreDomain::Comedy),
            _ => None,
        }
    }
}

/// Deterministic winner selection
///
/// Qualified domains first; equal scores resolve by the larger margin over
/// the domain's own threshold, then by registry (declaration) order. When
/// nothing qualifies the highest raw score wins, ties by registry order.
fn select_winner(scores: &[DomainScore]) -> (DomainScore, GenreSource) {
    let qualified: Vec<&DomainScore> = scores.iter().filter(|s| s.qualified).collect();
    let (pool, source) = if qualified.is_empty() {
        (scores.iter().collect::<Vec<_>>(), GenreSource::Fallback)
    } else {
        (qualified, GenreSource::Scored)
    };
    let use_margin = source == GenreSource::Scored;

    let mut best = pool[0];
    for &candidate in pool.iter().skip(1) {
        let diff = candidate.score - best.score;
        let margin_diff =
            (candidate.score - candidate.threshold) - (best.score - best.threshold);
        // Earlier entries keep the win on a full tie
        if diff > TIE_EPSILON
            || (use_margin && diff.abs() <= TIE_EPSILON && margin_diff > TIE_EPSILON)
        {
            best = candidate;
        }
    }
    (*best, source)
}

/// In-domain narrowing rules; the first matching rule wins
fn narrow(entry: &'static DomainEntry, f: &GenreFeatures) -> &'static GenreEntry {
    let id = match entry.domain {
        GenreDomain::Hard if f.gothic_weight >= 0.4 => Some("gothic_metal"),
        GenreDomain::Hard if f.rhythm_density >= 0.7 && f.narrative_pressure >= 0.5 => {
            Some("rap_rock")
        }
        GenreDomain::Hard if f.aggression >= 0.8 && f.power >= 0.5 => Some("metal"),
        GenreDomain::Hard if f.energy >= 0.7 && f.structure_complexity < 0.3 => Some("punk"),
        GenreDomain::Electronic if f.energy >= 0.7 => Some("techno"),
        GenreDomain::Electronic if f.joy >= 0.5 => Some("edm"),
        GenreDomain::Electronic if f.melancholy >= 0.4 => Some("synthwave"),
        GenreDomain::Jazz if f.swing_pressure >= 0.4 => Some("swing"),
        GenreDomain::Jazz if f.melancholy >= 0.5 => Some("blues"),
        GenreDomain::Jazz if f.calm >= 0.6 => Some("bossa_nova"),
        GenreDomain::Lyrical if f.narrative_pressure >= 0.6 => Some("singer_songwriter"),
        GenreDomain::Lyrical if f.tenderness >= 0.5 && f.rhythm_density >= 0.5 => Some("rnb"),
        GenreDomain::Lyrical if f.poetic_density >= 0.5 => Some("indie_folk"),
        GenreDomain::Cinematic if f.gothic_weight >= 0.4 => Some("dark_ambient"),
        GenreDomain::Cinematic if f.power >= 0.6 => Some("epic_trailer"),
        GenreDomain::Comedy if f.energy >= 0.6 => Some("comedy_pop"),
        GenreDomain::Soft if f.calm >= 0.7 && f.tenderness >= 0.4 => Some("lullaby"),
        GenreDomain::Soft if f.calm >= 0.6 => Some("lofi"),
        _ => None,
    };
    id.and_then(|id| entry.genre(id))
        .unwrap_or_else(|| entry.default_genre())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rage_features() -> GenreFeatures {
        GenreFeatures {
            aggression: 1.0,
            power: 0.6,
            energy: 0.6,
            rhythm_density: 0.6,
            ..GenreFeatures::ZERO
        }
    }

    #[test]
    fn test_rage_features_pick_hard() {
        let candidate = GenreScorer::default().infer_genre(&rage_features(), None, None);
        assert_eq!(candidate.domain, GenreDomain::Hard);
        assert_eq!(candidate.genre_id, "metal");
        assert_eq!(candidate.source, GenreSource::Scored);
        assert!(candidate.raw_score >= candidate.threshold);
    }

    #[test]
    fn test_infer_genre_is_pure() {
        let scorer = GenreScorer::default();
        let f = GenreFeatures {
            melancholy: 0.7,
            lyric_weight: 0.6,
            poetic_density: 0.3,
            ..GenreFeatures::ZERO
        };
        let a = scorer.infer_genre(&f, None, None);
        let b = scorer.infer_genre(&f, None, None);
        assert_eq!(a, b);
        assert_eq!(a.domain, GenreDomain::Lyrical);
    }

    #[test]
    fn test_explicit_genre_short_circuits() {
        let c = GenreScorer::default().infer_genre(&rage_features(), None, Some("Bossa Nova"));
        assert_eq!(c.domain, GenreDomain::Jazz);
        assert_eq!(c.genre_id, "bossa_nova");
        assert_eq!(c.source, GenreSource::Explicit);
        assert!(c.domain_scores.is_empty());
    }

    #[test]
    fn test_auto_genre_runs_inference() {
        let c = GenreScorer::default().infer_genre(&rage_features(), None, Some("AUTO"));
        assert_eq!(c.source, GenreSource::Scored);
        assert_eq!(c.domain, GenreDomain::Hard);
    }

    #[test]
    fn test_unknown_explicit_genre_uses_lyrical_entry() {
        let c = GenreScorer::default().infer_genre(&GenreFeatures::ZERO, None, Some("polka"));
        assert_eq!(c.domain, GenreDomain::Lyrical);
        assert_eq!(c.genre_id, "ballad");
    }

    #[test]
    fn test_fallback_when_nothing_qualifies() {
        let c = GenreScorer::default().infer_genre(&GenreFeatures::ZERO, None, None);
        assert_eq!(c.source, GenreSource::Fallback);
        // All scores are zero, so registry priority decides
        assert_eq!(c.domain, GenreDomain::Hard);
    }

    #[test]
    fn test_electronic_gothic_redirects_to_cinematic() {
        let f = GenreFeatures {
            electronic_pressure: 1.0,
            repetition: 1.0,
            energy: 0.5,
            gothic_weight: 0.6,
            ..GenreFeatures::ZERO
        };
        let c = GenreScorer::default().infer_genre(&f, None, None);
        assert_eq!(c.domain, GenreDomain::Cinematic);
        assert_eq!(c.source, GenreSource::Redirected);
        assert_eq!(c.redirected_from, Some(GenreDomain::Electronic));
        assert_eq!(c.genre_id, "dark_ambient");
    }

    #[test]
    fn test_tie_break_by_margin_then_priority() {
        let score = |domain, score, threshold| DomainScore {
            domain,
            score,
            threshold,
            qualified: score >= threshold,
        };
        // Equal scores: soft has the larger margin over its threshold
        let scores = vec![
            score(GenreDomain::Electronic, 0.5, 0.42),
            score(GenreDomain::Soft, 0.5, 0.35),
        ];
        assert_eq!(select_winner(&scores).0.domain, GenreDomain::Soft);

        // Full tie: declaration order
        let scores = vec![
            score(GenreDomain::Comedy, 0.5, 0.35),
            score(GenreDomain::Soft, 0.5, 0.35),
        ];
        assert_eq!(select_winner(&scores).0.domain, GenreDomain::Comedy);
    }

    #[test]
    fn test_bias_hint_nudges_domain() {
        let scorer = GenreScorer::default();
        let plain = scorer.infer_genre(&GenreFeatures::ZERO, None, None);
        assert_eq!(plain.domain, GenreDomain::Hard);

        let hinted = scorer.infer_genre(&GenreFeatures::ZERO, Some(GenreDomain::Soft), None);
        assert_eq!(hinted.domain, GenreDomain::Soft);
        assert!((hinted.raw_score - 0.05).abs() < 1e-9);

        // A clear winner is not overturned by the nudge
        let hard = scorer.infer_genre(&rage_features(), Some(GenreDomain::Soft), None);
        assert_eq!(hard.domain, GenreDomain::Hard);

        // Explicit genres ignore the hint
        let explicit =
            scorer.infer_genre(&rage_features(), Some(GenreDomain::Soft), Some("metal"));
        assert_eq!(explicit.domain, GenreDomain::Hard);
    }

    #[test]
    fn test_poetic_correction() {
        let scorer = GenreScorer::default();
        let f = GenreFeatures {
            poetic_density: 1.0,
            lyric_weight: 1.0,
            electronic_pressure: 1.0,
            ..GenreFeatures::ZERO
        };
        let scores = scorer.score_domains(&f, None);
        let get = |d| scores.iter().find(|s| s.domain == d).unwrap().score;
        // electronic: 0.45 - 0.15
        assert!((get(GenreDomain::Electronic) - 0.30).abs() < 1e-9);
        // lyrical: 0.3 + 0.15 + 0.15
        assert!((get(GenreDomain::Lyrical) - 0.60).abs() < 1e-9);
    }
}
