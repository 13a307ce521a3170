// Read-Only Lexicon Tables
//
// Word lists used by the phrase extractor, text metrics, tonality cues and
// the legacy engine. Built once on first use and shared across requests
// without locking.
//
// Matching rules:
// - ASCII entries match whole tokens, after light English suffix stripping
// - Non-ASCII entries (Korean, Spanish accents) match as token prefixes, so
//   particles and conjugations attached to a stem still hit ("사랑해", "사랑을")

use crate::types::EmotionCluster;
use once_cell::sync::Lazy;
use std::collections::HashMap;

type WeightedWords = &'static [(&'static str, f64)];

/// Cluster lexicons; an axis lexicon is the union of its clusters' lexicons
pub static CLUSTER_LEXICON: &[(EmotionCluster, WeightedWords)] = &[
    (
        EmotionCluster::Rage,
        &[
            ("hate", 1.2), ("destroy", 1.2), ("traitor", 1.2), ("rage", 1.2), ("fury", 1.2),
            ("kill", 1.1), ("burn", 1.0), ("revenge", 1.2), ("anger", 1.1), ("angry", 1.1),
            ("scream", 1.0), ("fight", 0.9), ("enemy", 1.0), ("betray", 1.1), ("liar", 1.0),
            ("blood", 0.9), ("smash", 1.0), ("war", 0.8), ("damn", 0.9), ("curse", 1.0),
            ("venom", 1.0), ("wrath", 1.2), ("break", 0.7), ("violence", 1.1),
            ("분노", 1.2), ("증오", 1.2), ("미워", 1.1), ("배신", 1.2), ("복수", 1.2),
            ("부숴", 1.1), ("죽여", 1.2), ("odio", 1.2), ("traidor", 1.2), ("furia", 1.2),
        ],
    ),
    (
        EmotionCluster::Despair,
        &[
            ("tears", 1.1), ("tear", 0.9), ("cry", 1.0), ("crying", 1.0), ("alone", 1.0),
            ("lonely", 1.1), ("broken", 1.1), ("lost", 0.9), ("empty", 1.0), ("sorrow", 1.2),
            ("grief", 1.2), ("goodbye", 0.9), ("gone", 0.8), ("pain", 1.1), ("hurt", 1.0),
            ("sad", 1.0), ("die", 1.0), ("dying", 1.0), ("cold", 0.7), ("rain", 0.6),
            ("fall", 0.6), ("bleed", 1.0), ("wound", 1.0), ("ashes", 0.9), ("despair", 1.2),
            ("눈물", 1.2), ("아파", 1.1), ("아픔", 1.1), ("슬픔", 1.2), ("슬퍼", 1.2),
            ("외로", 1.1), ("이별", 1.1), ("상처", 1.1), ("lágrimas", 1.1), ("dolor", 1.1),
        ],
    ),
    (
        EmotionCluster::Fear,
        &[
            ("fear", 1.2), ("afraid", 1.1), ("scared", 1.1), ("dark", 0.8), ("darkness", 0.9),
            ("shadow", 0.8), ("tremble", 1.0), ("shiver", 0.9), ("nightmare", 1.1),
            ("haunt", 1.0), ("ghost", 0.9), ("terror", 1.2), ("panic", 1.1), ("run", 0.5),
            ("hide", 0.8), ("danger", 1.0), ("trapped", 1.0), ("drown", 1.0),
            ("두려", 1.2), ("무서", 1.2), ("어둠", 1.0), ("악몽", 1.1), ("miedo", 1.2),
        ],
    ),
    (
        EmotionCluster::Tenderness,
        &[
            ("love", 1.2), ("heart", 0.9), ("hold", 0.8), ("kiss", 1.0), ("embrace", 1.0),
            ("warm", 0.8), ("gentle", 1.0), ("darling", 1.1), ("baby", 0.7), ("sweet", 0.8),
            ("tender", 1.1), ("care", 0.8), ("arms", 0.7), ("together", 0.8), ("forever", 0.7),
            ("soft", 0.7), ("honey", 0.8), ("lover", 1.0),
            ("사랑", 1.2), ("안아", 1.0), ("따뜻", 0.9), ("그대", 0.8), ("amor", 1.2),
            ("corazón", 0.9),
        ],
    ),
    (
        EmotionCluster::Longing,
        &[
            ("miss", 1.1), ("remember", 0.9), ("memory", 0.9), ("memories", 0.9), ("far", 0.7),
            ("wait", 0.8), ("waiting", 0.8), ("yesterday", 0.8), ("distance", 0.9),
            ("someday", 0.8), ("return", 0.7), ("wish", 0.8), ("yearn", 1.1), ("long", 0.5),
            ("away", 0.6), ("letter", 0.6), ("home", 0.6),
            ("그리워", 1.2), ("그리움", 1.2), ("보고싶", 1.2), ("기다려", 1.0), ("추억", 1.0),
            ("extraño", 1.1),
        ],
    ),
    (
        EmotionCluster::Joy,
        &[
            ("happy", 1.1), ("smile", 1.0), ("dance", 1.0), ("dancing", 1.0), ("laugh", 1.0),
            ("shine", 0.9), ("sunshine", 1.0), ("party", 1.0), ("fun", 0.9), ("celebrate", 1.1),
            ("joy", 1.2), ("bright", 0.8), ("sing", 0.7), ("alive", 0.8), ("free", 0.7),
            ("wonderful", 1.0), ("good", 0.5),
            ("행복", 1.2), ("웃어", 1.0), ("웃음", 1.0), ("신나", 1.1), ("춤", 1.0),
            ("feliz", 1.2), ("baila", 1.0),
        ],
    ),
    (
        EmotionCluster::Hope,
        &[
            ("hope", 1.2), ("dream", 0.9), ("dreams", 0.9), ("tomorrow", 0.9), ("light", 0.8),
            ("believe", 1.0), ("rise", 0.9), ("dawn", 0.9), ("faith", 1.0), ("new", 0.5),
            ("begin", 0.7), ("wings", 0.8), ("heal", 0.9), ("promise", 0.8), ("sky", 0.6),
            ("희망", 1.2), ("꿈", 1.0), ("내일", 0.9), ("빛", 0.9), ("믿어", 1.0),
            ("esperanza", 1.2),
        ],
    ),
    (
        EmotionCluster::Epic,
        &[
            ("glory", 1.2), ("victory", 1.2), ("rise", 0.6), ("stand", 0.8), ("thunder", 1.0),
            ("fire", 0.8), ("storm", 0.9), ("legend", 1.1), ("hero", 1.1), ("crown", 1.0),
            ("king", 0.8), ("kingdom", 1.0), ("empire", 1.0), ("battle", 1.0), ("march", 0.9),
            ("unstoppable", 1.2), ("forge", 0.9), ("titan", 1.0),
            ("영광", 1.2), ("승리", 1.2), ("전설", 1.1), ("폭풍", 1.0), ("영웅", 1.1),
        ],
    ),
    (
        EmotionCluster::Reflection,
        &[
            ("truth", 1.2), ("true", 0.8), ("know", 0.6), ("real", 0.8), ("honest", 1.0),
            ("why", 0.7), ("question", 0.9), ("wonder", 0.9), ("time", 0.6), ("life", 0.7),
            ("mirror", 0.9), ("silence", 0.9), ("think", 0.7), ("soul", 0.8), ("meaning", 1.0),
            ("world", 0.5), ("river", 0.6), ("ocean", 0.6), ("moon", 0.6),
            ("진실", 1.2), ("진짜", 0.9), ("시간", 0.8), ("인생", 0.9), ("거울", 0.9),
            ("verdad", 1.2),
        ],
    ),
];

/// Words that push a section toward a minor key
pub static SORROW_CUES: &[&str] = &[
    "tears", "cry", "alone", "lonely", "broken", "sorrow", "grief", "goodbye", "rain",
    "cold", "dark", "night", "lost", "empty", "die", "pain", "hurt", "sad", "shadow",
    "눈물", "슬픔", "슬퍼", "이별", "어둠", "아파", "외로",
];

/// Words that push a section toward a major key
pub static UPLIFT_CUES: &[&str] = &[
    "smile", "sun", "sunshine", "happy", "dance", "light", "hope", "dream", "shine",
    "bright", "together", "joy", "free", "celebrate", "morning", "fly", "warm",
    "행복", "웃어", "웃음", "빛", "희망", "햇살",
];

/// Electronic / club vocabulary
pub static TECH_WORDS: &[&str] = &[
    "neon", "club", "signal", "machine", "electric", "digital", "laser", "bass", "drop",
    "pulse", "circuit", "synth", "beat", "robot", "static", "frequency", "wire", "glitch",
    "night", "lights", "네온", "클럽",
];

/// Gothic / dark-dramatic vocabulary
pub static DARK_WORDS: &[&str] = &[
    "grave", "coffin", "raven", "crypt", "cathedral", "funeral", "black", "midnight",
    "blood", "ghost", "shadow", "darkness", "abyss", "candle", "requiem", "thorn",
    "묘지", "검은", "심연",
];

/// Comedy vocabulary
pub static HUMOR_WORDS: &[&str] = &[
    "lol", "haha", "hahaha", "funny", "joke", "silly", "banana", "pizza", "oops",
    "ridiculous", "clown", "goofy", "burp", "cat", "taco", "ㅋㅋ", "ㅎㅎ", "웃기",
];

/// Jazz / swing vocabulary
pub static SWING_WORDS: &[&str] = &[
    "swing", "blue", "blues", "cocktail", "smoke", "saxophone", "velvet", "martini",
    "midnight", "lounge", "groove", "baby", "cool", "jazz", "moonlight", "whiskey",
];

/// Imagery / poetic vocabulary
pub static IMAGERY_WORDS: &[&str] = &[
    "moon", "river", "ocean", "petal", "flower", "star", "stars", "wind", "snow", "autumn",
    "spring", "silence", "mirror", "sky", "sea", "dust", "whisper", "bloom", "candle",
    "달", "별", "바람", "꽃", "바다", "하늘", "눈송이",
];

struct ClusterIndex {
    exact: HashMap<&'static str, Vec<(EmotionCluster, f64)>>,
    prefix: Vec<(&'static str, EmotionCluster, f64)>,
}

static CLUSTER_INDEX: Lazy<ClusterIndex> = Lazy::new(|| {
    let mut exact: HashMap<&'static str, Vec<(EmotionCluster, f64)>> = HashMap::new();
    let mut prefix = Vec::new();

    for (cluster, words) in CLUSTER_LEXICON {
        for &(word, weight) in words.iter() {
            if word.is_ascii() {
                exact.entry(word).or_default().push((*cluster, weight));
            } else {
                prefix.push((word, *cluster, weight));
            }
        }
    }

    ClusterIndex { exact, prefix }
});

/// Strip common English inflections (plural, past, gerund, adverb)
fn stem_candidates(token: &str) -> impl Iterator<Item = &str> {
    const SUFFIXES: [&str; 5] = ["s", "es", "ed", "ing", "ly"];
    std::iter::once(token).chain(SUFFIXES.into_iter().filter_map(move |suffix| {
        token
            .strip_suffix(suffix)
            .filter(|stem| stem.chars().count() >= 3)
    }))
}

/// Cluster memberships of a lowercase token
///
/// Returns an empty vector when the token hits no cluster lexicon.
pub fn cluster_hits(token: &str) -> Vec<(EmotionCluster, f64)> {
    let index = &*CLUSTER_INDEX;

    if token.is_ascii() {
        for candidate in stem_candidates(token) {
            if let Some(hits) = index.exact.get(candidate) {
                return hits.clone();
            }
        }
        return Vec::new();
    }

    index
        .prefix
        .iter()
        .filter(|(word, _, _)| token.starts_with(word))
        .map(|(_, cluster, weight)| (*cluster, *weight))
        .collect()
}

/// Whether a lowercase token belongs to a plain word list
pub fn contains(list: &[&str], token: &str) -> bool {
    if token.is_ascii() {
        stem_candidates(token).any(|candidate| list.contains(&candidate))
    } else {
        list.iter().any(|word| !word.is_ascii() && token.starts_with(word))
    }
}

/// Count tokens belonging to a word list
pub fn count_hits<'a>(list: &[&str], tokens: impl IntoIterator<Item = &'a String>) -> usize {
    tokens.into_iter().filter(|t| contains(list, t)).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_and_stemmed_hits() {
        let hits = cluster_hits("hate");
        assert!(hits.iter().any(|(c, _)| *c == EmotionCluster::Rage));

        let stemmed = cluster_hits("dreams");
        assert!(stemmed.iter().any(|(c, _)| *c == EmotionCluster::Hope));

        let gerund = cluster_hits("screaming");
        assert!(gerund.iter().any(|(c, _)| *c == EmotionCluster::Rage));
    }

    #[test]
    fn test_korean_prefix_hits() {
        let hits = cluster_hits("사랑해");
        assert!(hits.iter().any(|(c, _)| *c == EmotionCluster::Tenderness));
        assert!(cluster_hits("눈물이").iter().any(|(c, _)| *c == EmotionCluster::Despair));
    }

    #[test]
    fn test_word_in_two_clusters() {
        // "rise" belongs to both hope and epic
        let hits = cluster_hits("rise");
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_no_hit() {
        assert!(cluster_hits("table").is_empty());
        assert!(cluster_hits("").is_empty());
    }

    #[test]
    fn test_contains_word_list() {
        assert!(contains(TECH_WORDS, "neon"));
        assert!(contains(SORROW_CUES, "tears"));
        assert!(contains(UPLIFT_CUES, "smiles"));
        assert!(!contains(TECH_WORDS, "flower"));
    }
}
