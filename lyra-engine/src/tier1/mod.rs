// Tier 1: Text Extractors
//
// Each module in this tier reads the request text (or the sections cut from
// it) and produces a typed contract for Tier 2. Nothing here looks at the
// aggregated emotion curve.
//
// Contract:
//   input: raw or normalised text, Section list
//   output: NormalizedText, Vec<Section>, per-section PhraseEmotionPacket lists

pub mod normalizer;     // CRLF/whitespace normalisation + flagged truncation
pub mod segmenter;      // Bracket tags, stanzas, positional blocks
pub mod text_metrics;   // Tokens, syllables, punctuation energy
pub mod phrase_emotion; // Lexicon TLP/cluster scoring per phrase
pub mod phrase_cache;   // Request-scoped bounded memo
