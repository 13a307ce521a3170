//! Analysis result contract
//!
//! The serialized form is what callers (and the CLI) receive. A failed
//! request carries `ok=false` and `error` only; a successful one carries the
//! analysis body flattened next to `ok`.

use crate::config::EngineStrategy;
use crate::error::{AnalysisError, ErrorCode, StageDiagnostic};
use crate::tier2::conflict_resolver::{GenreSuggestion, KeySuggestion};
use crate::tier3::consistency_validator::ConsistencyReport;
use crate::tier3::override_merger::FieldProvenance;
use crate::types::{
    BpmProfile, ColorAnnotation, EmotionCluster, GenreDomain, GenreSource, GlobalEmotionCurve,
    InstrumentationProfile, MusicalKey, Section, SegmentationMode, TonalityProfile, VocalProfile,
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorInfo {
    pub code: ErrorCode,
    pub message: String,
}

/// Song-level emotion summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmotionProfile {
    pub dominant_cluster: EmotionCluster,
    pub mood: String,
    pub intensity: f64,
    pub valence: f64,
    pub arousal: f64,
    pub resonance: f64,
    pub entropy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmotionOutput {
    pub profile: EmotionProfile,
    pub curve: GlobalEmotionCurve,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TlpOutput {
    pub truth: f64,
    pub love: f64,
    pub pain: f64,
    /// Hz
    pub conscious_frequency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreOutput {
    /// Display text (the user's own wording for explicit genres)
    pub label: String,
    pub id: String,
    pub domain: GenreDomain,
    pub source: GenreSource,
    pub raw_score: f64,
    pub threshold: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirected_from: Option<GenreDomain>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict: Option<GenreSuggestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleOutput {
    pub genre: GenreOutput,
    pub mood: String,
    pub key: MusicalKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_suggestion: Option<KeySuggestion>,
    pub visual: String,
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prompts {
    pub style_prompt: String,
    pub lyrics_prompt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    pub truncated: bool,
    pub original_chars: usize,
    pub analyzed_chars: usize,
    pub mode: SegmentationMode,
    pub strategy: EngineStrategy,
    pub errors: Vec<StageDiagnostic>,
    pub cache_hits: usize,
    pub cache_misses: usize,
}

/// Everything a successful analysis produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub sections: Vec<Section>,
    pub emotion: EmotionOutput,
    pub tlp: TlpOutput,
    pub bpm: BpmProfile,
    pub tonality: TonalityProfile,
    pub style: StyleOutput,
    pub vocal: VocalProfile,
    pub instrumentation: InstrumentationProfile,
    pub color: ColorAnnotation,
    pub consistency: ConsistencyReport,
    pub summary: Vec<String>,
    pub prompts: Prompts,
    pub diagnostics: Diagnostics,
    pub provenance: Vec<FieldProvenance>,
}

/// Result of one request; always well-formed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
    #[serde(flatten)]
    pub analysis: Option<Analysis>,
}

impl AnalysisResult {
    pub fn success(analysis: Analysis) -> Self {
        Self {
            ok: true,
            error: None,
            analysis: Some(analysis),
        }
    }

    pub fn failure(error: &AnalysisError) -> Self {
        Self {
            ok: false,
            error: Some(ErrorInfo {
                code: error.code(),
                message: error.to_string(),
            }),
            analysis: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_serializes_only_error() {
        let result = AnalysisResult::failure(&AnalysisError::EmptyInput);
        let json = serde_json::to_value(&result).unwrap();
        let obj = json.as_object().unwrap();

        assert_eq!(obj.len(), 2);
        assert_eq!(json["ok"], false);
        assert_eq!(json["error"]["code"], "EMPTY_INPUT");
    }
}
