// Tier 2: Conflict Resolver
//
// Concept: Cross-check the style key against the dominant emotion color, and
// the chosen genre against the dominant emotion
// Synchronization: Accepts key/color and GenreCandidate/cluster, outputs
// optional suggestions. Keys are never overwritten here; a genre suggestion
// carries a "was resolved" flag telling the pipeline whether to apply it.

use crate::tier2::genre_universe::find_genre;
use crate::types::{
    EmotionCluster, EmotionColor, GenreCandidate, GenreDomain, GenreSource, ModalKind, Mode,
    MusicalKey,
};
use serde::Serialize;

/// Preferred keys per emotion color (tonic pitch class, mode)
static COLOR_KEYS: &[(EmotionColor, &[(u8, Mode)])] = &[
    (EmotionColor::Crimson, &[(4, Mode::Minor), (2, Mode::Minor), (0, Mode::Minor), (9, Mode::Minor)]),
    (EmotionColor::Midnight, &[(2, Mode::Minor), (5, Mode::Minor), (9, Mode::Minor), (10, Mode::Minor)]),
    (EmotionColor::Violet, &[(1, Mode::Minor), (5, Mode::Minor), (11, Mode::Minor), (3, Mode::Minor)]),
    (EmotionColor::Rose, &[(5, Mode::Major), (10, Mode::Major), (3, Mode::Major), (9, Mode::Major)]),
    (EmotionColor::Indigo, &[(9, Mode::Minor), (4, Mode::Minor), (11, Mode::Minor), (2, Mode::Major)]),
    (EmotionColor::Gold, &[(0, Mode::Major), (7, Mode::Major), (2, Mode::Major), (4, Mode::Major)]),
    (EmotionColor::Dawn, &[(7, Mode::Major), (2, Mode::Major), (9, Mode::Major), (5, Mode::Major)]),
    (EmotionColor::Ember, &[(2, Mode::Minor), (0, Mode::Minor), (7, Mode::Minor), (4, Mode::Minor)]),
    (EmotionColor::Silver, &[(2, Mode::Modal(ModalKind::Dorian)), (9, Mode::Minor), (4, Mode::Minor), (0, Mode::Major)]),
];

/// Genre ids that clash with a dominant emotion, and what to use instead
static GENRE_CLASHES: &[(EmotionCluster, &[&str], &str)] = &[
    (EmotionCluster::Tenderness, &["metal", "gothic_metal", "punk", "rap_rock", "techno"], "acoustic_pop"),
    (EmotionCluster::Joy, &["gothic_metal", "dark_ambient", "blues"], "synthpop"),
    (EmotionCluster::Despair, &["comedy_pop", "novelty", "edm"], "ballad"),
    (EmotionCluster::Rage, &["lullaby", "acoustic_pop", "bossa_nova", "lofi"], "hard_rock"),
    (EmotionCluster::Fear, &["novelty", "comedy_pop", "lullaby"], "dark_ambient"),
    (EmotionCluster::Hope, &["gothic_metal", "dark_ambient"], "cinematic"),
    (EmotionCluster::Longing, &["novelty", "techno"], "indie_folk"),
];

/// Suggested key change; informational only
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeySuggestion {
    pub current: MusicalKey,
    pub suggested: MusicalKey,
    pub color: EmotionColor,
    pub reason: String,
}

/// Suggested genre change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreSuggestion {
    pub current: String,
    pub suggested: String,
    pub suggested_domain: GenreDomain,
    pub cluster: EmotionCluster,
    pub reason: String,
    /// The pipeline replaced the genre with the suggestion
    pub was_resolved: bool,
}

/// Conflict resolver (Tier 2)
pub struct ConflictResolver {
    auto_resolve_genre: bool,
}

impl Default for ConflictResolver {
    fn default() -> Self {
        Self {
            auto_resolve_genre: true,
        }
    }
}

impl ConflictResolver {
    pub fn new(auto_resolve_genre: bool) -> Self {
        Self { auto_resolve_genre }
    }

    /// Preferred keys of a color; empty for colors without a palette
    pub fn preferred_keys(color: EmotionColor) -> Vec<MusicalKey> {
        COLOR_KEYS
            .iter()
            .find(|(c, _)| *c == color)
            .map(|(_, keys)| keys.iter().map(|&(t, m)| MusicalKey::new(t, m)).collect())
            .unwrap_or_default()
    }

    /// Check a key against the preferred keys of the dominant color
    ///
    /// A clash suggests the head of the color's palette.
    pub fn check_key(&self, color: EmotionColor, key: &MusicalKey) -> Option<KeySuggestion> {
        let preferred = Self::preferred_keys(color);
        if preferred.is_empty() || preferred.contains(key) {
            return None;
        }

        let suggested = preferred[0];
        let listed: Vec<String> = preferred.iter().map(ToString::to_string).collect();

        Some(KeySuggestion {
            current: *key,
            suggested,
            color,
            reason: format!(
                "{} is outside the {} palette ({})",
                key,
                color.as_str(),
                listed.join(", ")
            ),
        })
    }

    /// Check the genre against the dominant emotion
    ///
    /// Explicit genres are never resolved automatically.
    pub fn check_genre(
        &self,
        cluster: EmotionCluster,
        candidate: &GenreCandidate,
    ) -> Option<GenreSuggestion> {
        let (_, clashes, suggested) = GENRE_CLASHES
            .iter()
            .find(|(c, ids, _)| *c == cluster && ids.contains(&candidate.genre_id.as_str()))?;
        let (domain, _) = find_genre(suggested)?;

        Some(GenreSuggestion {
            current: candidate.genre_id.clone(),
            suggested: (*suggested).to_string(),
            suggested_domain: domain.domain,
            cluster,
            reason: format!(
                "{} clashes with a {}-dominant lyric ({} conflicting genres)",
                candidate.genre_id,
                cluster,
                clashes.len()
            ),
            was_resolved: self.auto_resolve_genre && candidate.source != GenreSource::Explicit,
        })
    }

    /// Candidate after applying a resolved suggestion
    pub fn apply(candidate: &GenreCandidate, suggestion: &GenreSuggestion) -> GenreCandidate {
        if !suggestion.was_resolved {
            return candidate.clone();
        }
        let Some((entry, genre)) = find_genre(&suggestion.suggested) else {
            return candidate.clone();
        };
        let raw_score = candidate
            .domain_scores
            .iter()
            .find(|s| s.domain == entry.domain)
            .map_or(0.0, |s| s.score);

        GenreCandidate {
            domain: entry.domain,
            genre_id: genre.id.to_string(),
            raw_score,
            threshold: entry.threshold,
            source: GenreSource::Redirected,
            redirected_from: Some(candidate.domain),
            domain_scores: candidate.domain_scores.clone(),
        }
    }
}
