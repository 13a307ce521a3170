// Tier 2: Global Genre Universe
//
// Concept: The single registry both genre-inference stages read from
// Synchronization: Read-only static table; domain and genre of a candidate
// always come from the same entry
//
// Each domain carries a weight vector over the 20 genre features, a
// qualification threshold and an ordered genre list (first = default).

use crate::tier2::features::GenreFeatures;
use crate::types::{EmotionCluster, GenreDomain, VocalGender};

/// One concrete genre inside a domain
#[derive(Debug)]
pub struct GenreEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub mood: &'static str,
    pub instruments: &'static [&'static str],
    pub palette: &'static str,
    pub vocal: VocalGender,
    pub vocal_type: &'static str,
    pub vocal_tone: &'static str,
}

/// One first-stage domain
#[derive(Debug)]
pub struct DomainEntry {
    pub domain: GenreDomain,
    pub weights: GenreFeatures,
    pub threshold: f64,
    pub genres: &'static [GenreEntry],
}

impl DomainEntry {
    pub fn default_genre(&self) -> &'static GenreEntry {
        &self.genres[0]
    }

    pub fn genre(&self, id: &str) -> Option<&'static GenreEntry> {
        self.genres.iter().find(|g| g.id == id)
    }
}

/// Domain registry in tie-break priority order
pub static GLOBAL_GENRE_UNIVERSE: &[DomainEntry] = &[
    DomainEntry {
        domain: GenreDomain::Hard,
        weights: GenreFeatures {
            aggression: 0.45,
            power: 0.25,
            energy: 0.2,
            gothic_weight: 0.1,
            tenderness: -0.2,
            joy: -0.1,
            humor: -0.2,
            calm: -0.2,
            ..GenreFeatures::ZERO
        },
        threshold: 0.45,
        genres: &[
            GenreEntry {
                id: "hard_rock",
                name: "Hard Rock",
                mood: "defiant",
                instruments: &["distorted electric guitar", "bass guitar", "live drums"],
                palette: "guitar-driven",
                vocal: VocalGender::Male,
                vocal_type: "belting",
                vocal_tone: "raspy",
            },
            GenreEntry {
                id: "metal",
                name: "Metal",
                mood: "furious",
                instruments: &["down-tuned guitars", "double-kick drums", "bass guitar"],
                palette: "heavy",
                vocal: VocalGender::Male,
                vocal_type: "aggressive",
                vocal_tone: "gritty",
            },
            GenreEntry {
                id: "gothic_metal",
                name: "Gothic Metal",
                mood: "dark",
                instruments: &["heavy guitars", "pipe organ", "choir pads", "drums"],
                palette: "heavy-gothic",
                vocal: VocalGender::Duet,
                vocal_type: "operatic",
                vocal_tone: "dark",
            },
            GenreEntry {
                id: "punk",
                name: "Punk Rock",
                mood: "rebellious",
                instruments: &["overdriven guitar", "fast drums", "bass guitar"],
                palette: "raw",
                vocal: VocalGender::Male,
                vocal_type: "shouted",
                vocal_tone: "raw",
            },
            GenreEntry {
                id: "rap_rock",
                name: "Rap Rock",
                mood: "aggressive",
                instruments: &["heavy guitar riffs", "808 bass", "breakbeat drums"],
                palette: "hybrid",
                vocal: VocalGender::Male,
                vocal_type: "rap",
                vocal_tone: "punchy",
            },
        ],
    },
    DomainEntry {
        domain: GenreDomain::Electronic,
        weights: GenreFeatures {
            electronic_pressure: 0.45,
            energy: 0.2,
            joy: 0.15,
            repetition: 0.2,
            rhythm_density: 0.1,
            ..GenreFeatures::ZERO
        },
        threshold: 0.42,
        genres: &[
            GenreEntry {
                id: "synthpop",
                name: "Synth-Pop",
                mood: "bright",
                instruments: &["analog synth", "drum machine", "synth bass"],
                palette: "synthetic",
                vocal: VocalGender::Female,
                vocal_type: "pop",
                vocal_tone: "airy",
            },
            GenreEntry {
                id: "edm",
                name: "EDM",
                mood: "euphoric",
                instruments: &["supersaw leads", "sidechained pads", "four-on-the-floor kick"],
                palette: "club",
                vocal: VocalGender::Female,
                vocal_type: "anthemic",
                vocal_tone: "bright",
            },
            GenreEntry {
                id: "techno",
                name: "Techno",
                mood: "driving",
                instruments: &["909 drums", "acid bassline", "modular synth"],
                palette: "minimal",
                vocal: VocalGender::Neutral,
                vocal_type: "spoken",
                vocal_tone: "processed",
            },
            GenreEntry {
                id: "synthwave",
                name: "Synthwave",
                mood: "nostalgic",
                instruments: &["retro synth leads", "gated reverb drums", "arpeggiator"],
                palette: "retro",
                vocal: VocalGender::Male,
                vocal_type: "crooned",
                vocal_tone: "reverb-soaked",
            },
        ],
    },
    DomainEntry {
        domain: GenreDomain::Jazz,
        weights: GenreFeatures {
            jazz_pressure: 0.4,
            swing_pressure: 0.35,
            calm: 0.1,
            poetic_density: 0.1,
            aggression: -0.2,
            ..GenreFeatures::ZERO
        },
        threshold: 0.40,
        genres: &[
            GenreEntry {
                id: "jazz",
                name: "Jazz",
                mood: "smoky",
                instruments: &["upright bass", "brushed drums", "piano", "saxophone"],
                palette: "acoustic-jazz",
                vocal: VocalGender::Female,
                vocal_type: "jazz",
                vocal_tone: "velvet",
            },
            GenreEntry {
                id: "swing",
                name: "Swing",
                mood: "playful",
                instruments: &["big band horns", "walking bass", "ride cymbal"],
                palette: "big-band",
                vocal: VocalGender::Male,
                vocal_type: "crooner",
                vocal_tone: "warm",
            },
            GenreEntry {
                id: "blues",
                name: "Blues",
                mood: "aching",
                instruments: &["slide guitar", "harmonica", "shuffle drums"],
                palette: "blues",
                vocal: VocalGender::Male,
                vocal_type: "soulful",
                vocal_tone: "husky",
            },
            GenreEntry {
                id: "bossa_nova",
                name: "Bossa Nova",
                mood: "breezy",
                instruments: &["nylon guitar", "soft percussion", "flute"],
                palette: "latin-jazz",
                vocal: VocalGender::Female,
                vocal_type: "whispered",
                vocal_tone: "soft",
            },
        ],
    },
    DomainEntry {
        domain: GenreDomain::Lyrical,
        weights: GenreFeatures {
            melancholy: 0.35,
            lyric_weight: 0.3,
            poetic_density: 0.15,
            narrative_pressure: 0.1,
            tenderness: 0.1,
            aggression: -0.2,
            ..GenreFeatures::ZERO
        },
        threshold: 0.38,
        genres: &[
            GenreEntry {
                id: "ballad",
                name: "Ballad",
                mood: "heartfelt",
                instruments: &["piano", "strings", "soft drums"],
                palette: "piano-strings",
                vocal: VocalGender::Female,
                vocal_type: "emotional",
                vocal_tone: "clear",
            },
            GenreEntry {
                id: "indie_folk",
                name: "Indie Folk",
                mood: "wistful",
                instruments: &["acoustic guitar", "banjo", "light percussion"],
                palette: "organic",
                vocal: VocalGender::Male,
                vocal_type: "intimate",
                vocal_tone: "breathy",
            },
            GenreEntry {
                id: "rnb",
                name: "R&B",
                mood: "sensual",
                instruments: &["rhodes piano", "808 bass", "finger snaps"],
                palette: "smooth",
                vocal: VocalGender::Female,
                vocal_type: "melismatic",
                vocal_tone: "silky",
            },
            GenreEntry {
                id: "singer_songwriter",
                name: "Singer-Songwriter",
                mood: "confessional",
                instruments: &["acoustic guitar", "piano"],
                palette: "sparse",
                vocal: VocalGender::Neutral,
                vocal_type: "storytelling",
                vocal_tone: "natural",
            },
        ],
    },
    DomainEntry {
        domain: GenreDomain::Cinematic,
        weights: GenreFeatures {
            dramatic_weight: 0.45,
            power: 0.2,
            gothic_weight: 0.2,
            structure_complexity: 0.15,
            humor: -0.3,
            ..GenreFeatures::ZERO
        },
        threshold: 0.42,
        genres: &[
            GenreEntry {
                id: "cinematic",
                name: "Cinematic",
                mood: "sweeping",
                instruments: &["string orchestra", "french horns", "taiko drums"],
                palette: "orchestral",
                vocal: VocalGender::Duet,
                vocal_type: "choral",
                vocal_tone: "grand",
            },
            GenreEntry {
                id: "epic_trailer",
                name: "Epic Trailer",
                mood: "triumphant",
                instruments: &["brass stabs", "hybrid percussion", "choir"],
                palette: "hybrid-orchestral",
                vocal: VocalGender::Duet,
                vocal_type: "choral",
                vocal_tone: "powerful",
            },
            GenreEntry {
                id: "dark_ambient",
                name: "Dark Ambient",
                mood: "ominous",
                instruments: &["drones", "bowed metal", "sub bass"],
                palette: "ambient-dark",
                vocal: VocalGender::Neutral,
                vocal_type: "whispered",
                vocal_tone: "haunting",
            },
        ],
    },
    DomainEntry {
        domain: GenreDomain::Comedy,
        weights: GenreFeatures {
            humor: 0.7,
            joy: 0.15,
            energy: 0.1,
            ..GenreFeatures::ZERO
        },
        threshold: 0.35,
        genres: &[
            GenreEntry {
                id: "novelty",
                name: "Novelty",
                mood: "goofy",
                instruments: &["ukulele", "kazoo", "hand claps"],
                palette: "quirky",
                vocal: VocalGender::Male,
                vocal_type: "comedic",
                vocal_tone: "cartoonish",
            },
            GenreEntry {
                id: "comedy_pop",
                name: "Comedy Pop",
                mood: "cheeky",
                instruments: &["pop synths", "bouncy bass", "drum machine"],
                palette: "pop",
                vocal: VocalGender::Duet,
                vocal_type: "playful",
                vocal_tone: "bright",
            },
        ],
    },
    DomainEntry {
        domain: GenreDomain::Soft,
        weights: GenreFeatures {
            tenderness: 0.4,
            calm: 0.3,
            valence_positivity: 0.15,
            joy: 0.1,
            aggression: -0.3,
            ..GenreFeatures::ZERO
        },
        threshold: 0.35,
        genres: &[
            GenreEntry {
                id: "acoustic_pop",
                name: "Acoustic Pop",
                mood: "warm",
                instruments: &["acoustic guitar", "piano", "light percussion"],
                palette: "acoustic",
                vocal: VocalGender::Female,
                vocal_type: "soft",
                vocal_tone: "warm",
            },
            GenreEntry {
                id: "lofi",
                name: "Lo-Fi",
                mood: "dreamy",
                instruments: &["dusty keys", "vinyl crackle", "lazy drums"],
                palette: "lofi",
                vocal: VocalGender::Neutral,
                vocal_type: "murmured",
                vocal_tone: "mellow",
            },
            GenreEntry {
                id: "lullaby",
                name: "Lullaby",
                mood: "gentle",
                instruments: &["music box", "celesta", "soft strings"],
                palette: "delicate",
                vocal: VocalGender::Female,
                vocal_type: "hushed",
                vocal_tone: "tender",
            },
        ],
    },
];

/// Registry entry of a domain
pub fn domain_entry(domain: GenreDomain) -> &'static DomainEntry {
    // The registry lists every domain exactly once, in declaration order
    &GLOBAL_GENRE_UNIVERSE[domain as usize]
}

/// Find a genre by id across all domains
pub fn find_genre(id: &str) -> Option<(&'static DomainEntry, &'static GenreEntry)> {
    GLOBAL_GENRE_UNIVERSE
        .iter()
        .find_map(|d| d.genre(id).map(|g| (d, g)))
}

fn normalize_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .replace(['-', ' ', '&'], "_")
        .replace("__", "_")
}

/// Resolve an explicit genre name against the registry
///
/// Order: exact id, exact display name, domain name, fuzzy match
/// (normalized Levenshtein > 0.85), then substring containment.
pub fn resolve_explicit(name: &str) -> Option<(&'static DomainEntry, &'static GenreEntry)> {
    let wanted = normalize_name(name);
    if wanted.is_empty() {
        return None;
    }

    if let Some(found) = find_genre(&wanted) {
        return Some(found);
    }

    let all = || {
        GLOBAL_GENRE_UNIVERSE
            .iter()
            .flat_map(|d| d.genres.iter().map(move |g| (d, g)))
    };

    if let Some(found) = all().find(|(_, g)| normalize_name(g.name) == wanted) {
        return Some(found);
    }

    if let Some(domain) = GLOBAL_GENRE_UNIVERSE
        .iter()
        .find(|d| d.domain.as_str() == wanted)
    {
        return Some((domain, domain.default_genre()));
    }

    if let Some(found) =
        all().find(|(_, g)| strsim::normalized_levenshtein(&wanted, g.id) > 0.85)
    {
        tracing::debug!("Fuzzy matched genre '{}' to '{}'", name, found.1.id);
        return Some(found);
    }

    all().find(|(_, g)| {
        wanted.contains(g.id) || (wanted.len() >= 4 && g.id.contains(wanted.as_str()))
    })
}

/// Domains a section dominated by `cluster` naturally belongs to
pub fn home_domains(cluster: EmotionCluster) -> &'static [GenreDomain] {
    use GenreDomain::*;
    match cluster {
        EmotionCluster::Rage => &[Hard, Electronic, Cinematic],
        EmotionCluster::Despair => &[Lyrical, Jazz, Soft, Cinematic],
        EmotionCluster::Fear => &[Cinematic, Hard, Electronic],
        EmotionCluster::Tenderness => &[Soft, Lyrical, Jazz],
        EmotionCluster::Longing => &[Lyrical, Soft, Jazz, Electronic],
        EmotionCluster::Joy => &[Electronic, Comedy, Soft, Jazz],
        EmotionCluster::Hope => &[Lyrical, Soft, Cinematic, Electronic],
        EmotionCluster::Epic => &[Cinematic, Hard, Electronic],
        EmotionCluster::Reflection => &[Jazz, Lyrical, Soft, Cinematic],
        EmotionCluster::Neutral => &GenreDomain::ALL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_covers_every_domain_in_order() {
        assert_eq!(GLOBAL_GENRE_UNIVERSE.len(), GenreDomain::ALL.len());
        for domain in GenreDomain::ALL {
            assert_eq!(domain_entry(domain).domain, domain);
            assert!(!domain_entry(domain).genres.is_empty());
        }
    }

    #[test]
    fn test_genre_ids_unique() {
        let mut ids: Vec<_> = GLOBAL_GENRE_UNIVERSE
            .iter()
            .flat_map(|d| d.genres.iter().map(|g| g.id))
            .collect();
        let n = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), n);
    }

    #[test]
    fn test_resolve_explicit() {
        let (d, g) = resolve_explicit("Metal").unwrap();
        assert_eq!(d.domain, GenreDomain::Hard);
        assert_eq!(g.id, "metal");

        let (_, g) = resolve_explicit("R&B").unwrap();
        assert_eq!(g.id, "rnb");

        let (d, g) = resolve_explicit("jazz").unwrap();
        assert_eq!(d.domain, GenreDomain::Jazz);
        assert_eq!(g.id, "jazz");

        let (d, _) = resolve_explicit("electronic").unwrap();
        assert_eq!(d.domain, GenreDomain::Electronic);

        // Fuzzy typo
        let (_, g) = resolve_explicit("synthwav").unwrap();
        assert_eq!(g.id, "synthwave");

        // Containment
        let (_, g) = resolve_explicit("dark synthwave revival").unwrap();
        assert_eq!(g.id, "synthwave");

        assert!(resolve_explicit("polka").is_none());
        assert!(resolve_explicit("   ").is_none());
    }

    #[test]
    fn test_home_domains() {
        assert!(home_domains(EmotionCluster::Rage).contains(&GenreDomain::Hard));
        assert!(!home_domains(EmotionCluster::Tenderness).contains(&GenreDomain::Hard));
        assert_eq!(home_domains(EmotionCluster::Neutral).len(), 7);
    }
}
