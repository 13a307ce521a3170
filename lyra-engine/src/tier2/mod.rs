// Tier 2: Fusers and Synthesizers
//
// Everything in this tier reads the Tier 1 contracts (sections and phrase
// packets) or the aggregated GlobalEmotionCurve built from them. Genre and
// rhythm/tonality are independent of each other; both read only the curve.
//
// Contract:
//   input: Vec<Section>, Vec<Vec<PhraseEmotionPacket>>, GlobalEmotionCurve
//   output: GenreCandidate, BpmProfile, TonalityProfile, profile sub-results

pub mod section_aggregator; // Smoothing, waves, global curve, DynamicBias
pub mod features;           // 20-dimensional genre feature vector
pub mod genre_universe;     // GLOBAL_GENRE_UNIVERSE registry
pub mod genre_scorer;       // Domain stage + genre stage
pub mod conflict_resolver;  // Key/color and genre/emotion suggestions
pub mod rhythm;             // BPM estimate + section curve
pub mod tonality;           // Section keys + mode
pub mod profiles;           // Vocal, instrumentation, color sub-engines
pub mod legacy_engine;      // Keyword estimates for LegacyBlend
