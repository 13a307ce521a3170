// Analysis Pipeline
//
// Coordinates normalise → segment → extract → aggregate → synthesize →
// merge → validate → compile for one request.
//
// Workflow Phases (per request):
// 1. Normalise input (truncation is flagged, not fatal)
// 2. Tier 1: Segmentation (default or longform branch, chosen once)
// 3. Tier 1: Phrase emotion extraction with a request-scoped cache
// 4. Tier 2: Section aggregation into the global emotion curve
// 5. Tier 2: Genre scoring + conflict check, rhythm and tonality (independent)
// 6. Tier 2: Optional profile engines, each isolated with a fallback
// 7. Tier 3: Override merge, tone sync, consistency validation
// 8. Final compile
//
// Error isolation: phases 1-4 are hard failures (ok=false). Optional engines
// record a diagnostic and continue with their default.

use crate::compiler::{CompileInputs, FinalCompiler};
use crate::config::{EngineConfig, EngineStrategy};
use crate::error::{AnalysisError, AnalysisOutcome, StageDiagnostic};
use crate::result::{Analysis, AnalysisResult, Diagnostics};
use crate::tier1::normalizer::normalize;
use crate::tier1::phrase_cache::PhraseCache;
use crate::tier1::phrase_emotion::{EmotionVectorSource, LexiconEmotionSource, PhraseEmotionExtractor};
use crate::tier1::segmenter::TextSegmenter;
use crate::tier2::conflict_resolver::{ConflictResolver, KeySuggestion};
use crate::tier2::features::GenreFeatures;
use crate::tier2::genre_scorer::GenreScorer;
use crate::tier2::legacy_engine::LegacyEngine;
use crate::tier2::profiles::{
    default_color, default_instrumentation, default_vocal, ColorAnnotator, ColorEngine,
    InstrumentationEngine, InstrumentationProfiler, VocalEngine, VocalProfiler,
};
use crate::tier2::rhythm::RhythmSynthesizer;
use crate::tier2::section_aggregator::SectionAggregator;
use crate::tier2::tonality::TonalitySynthesizer;
use crate::tier3::consistency_validator::{ConsistencyValidator, RequestFacts};
use crate::tier3::override_merger::{MergedStyle, OverrideMerger};
use crate::translate::Translator;
use crate::types::{AnalysisRequest, ColorAnnotation, EmotionColor, TonalityProfile};
use rayon::prelude::*;

/// Builder for [`AnalysisPipeline`]
#[derive(Default)]
pub struct PipelineBuilder {
    config: EngineConfig,
    source: Option<Box<dyn EmotionVectorSource>>,
    translator: Option<Box<dyn Translator>>,
    vocal: Option<Box<dyn VocalProfiler>>,
    instrumentation: Option<Box<dyn InstrumentationProfiler>>,
    color: Option<Box<dyn ColorAnnotator>>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn strategy(mut self, strategy: EngineStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// Replace the lexicon scorer
    pub fn emotion_source(mut self, source: Box<dyn EmotionVectorSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn translator(mut self, translator: Box<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn vocal_engine(mut self, engine: Box<dyn VocalProfiler>) -> Self {
        self.vocal = Some(engine);
        self
    }

    pub fn instrumentation_engine(mut self, engine: Box<dyn InstrumentationProfiler>) -> Self {
        self.instrumentation = Some(engine);
        self
    }

    pub fn color_engine(mut self, engine: Box<dyn ColorAnnotator>) -> Self {
        self.color = Some(engine);
        self
    }

    pub fn build(self) -> AnalysisPipeline {
        let config = self.config;
        tracing::debug!(
            strategy = %config.strategy,
            max_input_chars = config.max_input_chars,
            "Building analysis pipeline"
        );

        AnalysisPipeline {
            source: self
                .source
                .unwrap_or_else(|| Box::new(LexiconEmotionSource)),
            translator: self.translator,
            segmenter: TextSegmenter::new(config.longform_line_threshold, config.block_size),
            aggregator: SectionAggregator::default(),
            scorer: GenreScorer::default(),
            resolver: ConflictResolver::new(config.auto_resolve_genre_conflicts),
            rhythm: RhythmSynthesizer::new(config.section_bpm_delta, config.fracture_threshold),
            tonality: TonalitySynthesizer,
            vocal: self.vocal.unwrap_or_else(|| Box::new(VocalEngine)),
            instrumentation: self
                .instrumentation
                .unwrap_or_else(|| Box::new(InstrumentationEngine)),
            color: self.color.unwrap_or_else(|| Box::new(ColorEngine)),
            legacy: (config.strategy == EngineStrategy::LegacyBlend).then(LegacyEngine::default),
            merger: OverrideMerger::new(config.section_bpm_delta, config.fracture_threshold),
            validator: ConsistencyValidator::default(),
            compiler: FinalCompiler,
            config,
        }
    }
}

/// Lyric analysis pipeline
///
/// Immutable after construction and shared freely across threads; every
/// request owns its own cache and intermediate state.
pub struct AnalysisPipeline {
    config: EngineConfig,
    source: Box<dyn EmotionVectorSource>,
    translator: Option<Box<dyn Translator>>,

    // Tier 1
    segmenter: TextSegmenter,

    // Tier 2
    aggregator: SectionAggregator,
    scorer: GenreScorer,
    resolver: ConflictResolver,
    rhythm: RhythmSynthesizer,
    tonality: TonalitySynthesizer,
    vocal: Box<dyn VocalProfiler>,
    instrumentation: Box<dyn InstrumentationProfiler>,
    color: Box<dyn ColorAnnotator>,
    legacy: Option<LegacyEngine>,

    // Tier 3
    merger: OverrideMerger,
    validator: ConsistencyValidator,
    compiler: FinalCompiler,
}

impl Default for AnalysisPipeline {
    fn default() -> Self {
        PipelineBuilder::new().build()
    }
}

/// Run an optional stage; on error record a diagnostic and use the fallback
fn isolated<T>(
    stage: &str,
    outcome: AnalysisOutcome<T>,
    fallback: impl FnOnce() -> T,
    fallback_desc: &str,
    errors: &mut Vec<StageDiagnostic>,
) -> (T, bool) {
    match outcome {
        Ok(value) => (value, false),
        Err(e) => {
            tracing::warn!(stage, "Optional stage failed, using default: {}", e);
            errors.push(StageDiagnostic::new(stage, &e, fallback_desc));
            (fallback(), true)
        }
    }
}

impl AnalysisPipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn strategy(&self) -> EngineStrategy {
        self.config.strategy
    }

    /// Analyze one request; always returns a well-formed result
    pub fn analyze(&self, request: &AnalysisRequest) -> AnalysisResult {
        match self.run(request) {
            Ok(analysis) => {
                tracing::info!(
                    sections = analysis.sections.len(),
                    genre = %analysis.style.genre.id,
                    bpm = analysis.bpm.estimate,
                    key = %analysis.style.key,
                    "Analysis complete"
                );
                AnalysisResult::success(analysis)
            }
            Err(e) => {
                tracing::warn!(code = ?e.code(), "Analysis failed: {}", e);
                AnalysisResult::failure(&e)
            }
        }
    }

    /// Analyze many requests in parallel; results keep input order
    pub fn analyze_batch(&self, requests: &[AnalysisRequest]) -> Vec<AnalysisResult> {
        tracing::info!("Analyzing batch of {} requests", requests.len());
        requests.par_iter().map(|r| self.analyze(r)).collect()
    }

    fn run(&self, request: &AnalysisRequest) -> AnalysisOutcome<Analysis> {
        let mut errors: Vec<StageDiagnostic> = Vec::new();

        // Phase 1: Normalise
        let normalized = normalize(&request.text, self.config.max_input_chars)?;

        // Phase 2: Segment
        let mode = self.segmenter.mode_for(&normalized.text);
        let sections = self.segmenter.segment(&normalized.text, mode)?;
        tracing::debug!("Segmented into {} sections ({:?})", sections.len(), mode);

        // Phase 3: Phrase emotion
        let mut cache = PhraseCache::new(self.config.phrase_cache_capacity);
        let translator = self
            .translator
            .as_deref()
            .filter(|_| self.config.translate_non_latin);
        let extraction = PhraseEmotionExtractor::new(self.source.as_ref())
            .with_translator(translator)
            .extract(&sections, &mut cache)?;
        errors.extend(extraction.diagnostics);

        // Phase 4: Aggregate
        let curve = self.aggregator.aggregate(&sections, &extraction.per_section)?;
        tracing::debug!(
            "Emotion curve: dominant={} intensity={:.3} bias_neutral={}",
            curve.dominant_cluster,
            curve.mean_intensity,
            curve.bias.is_neutral()
        );

        // Phase 5: Genre, rhythm, tonality
        let features = GenreFeatures::extract(&sections, &curve);
        let mut genre = self.scorer.infer_genre(
            &features,
            curve.bias.genre_hint,
            request.overrides.genre.as_deref(),
        );
        let genre_conflict = self.resolver.check_genre(curve.dominant_cluster, &genre);
        if let Some(suggestion) = genre_conflict.as_ref().filter(|s| s.was_resolved) {
            tracing::debug!(
                "Genre conflict resolved: {} -> {}",
                suggestion.current,
                suggestion.suggested
            );
            genre = ConflictResolver::apply(&genre, suggestion);
        }

        let bpm = self.rhythm.estimate(&sections, &curve);
        let tonality = self.tonality.synthesize(&sections, &curve);

        // Phase 6: Optional profile engines
        let (vocal, vocal_fallback) = isolated(
            "vocal",
            self.vocal
                .profile(&genre, &curve, request.overrides.preferred_gender),
            default_vocal,
            "neutral vocal",
            &mut errors,
        );
        let (instrumentation, instrumentation_fallback) = isolated(
            "instrumentation",
            self.instrumentation.profile(&genre, &curve),
            default_instrumentation,
            "piano palette",
            &mut errors,
        );
        let (color, _) = isolated(
            "color",
            self.color.annotate(&curve),
            || default_color(&sections),
            "grey color wave",
            &mut errors,
        );

        // Phase 7: Merge, tone sync, validate
        let mut style = MergedStyle::new(
            bpm,
            tonality,
            genre,
            curve.dominant_cluster.mood().to_string(),
            vocal,
            instrumentation,
        );
        if vocal_fallback {
            style.mark_fallback("vocal_gender");
            style.mark_fallback("vocal_profile");
        }
        if instrumentation_fallback {
            style.mark_fallback("instrumentation");
        }

        let legacy = self
            .legacy
            .as_ref()
            .map(|engine| engine.estimate(&sections, &curve));
        let report = self.merger.apply(
            &mut style,
            &request.overrides,
            request.hints.as_ref(),
            legacy.as_ref(),
        );
        for note in &report.ignored {
            let e = AnalysisError::InvalidInput(note.clone());
            errors.push(StageDiagnostic::new("override", &e, "lower precedence layer"));
        }

        let (key_suggestion, _) = isolated(
            "tone_sync",
            self.tone_sync(&color, &style.tonality),
            || None,
            "no key suggestion",
            &mut errors,
        );

        let consistency = self.validator.validate(
            &style,
            &curve,
            RequestFacts {
                section_count: sections.len(),
                truncated: normalized.truncated,
            },
        );

        // Phase 8: Compile
        let stats = cache.stats();
        let diagnostics = Diagnostics {
            truncated: normalized.truncated,
            original_chars: normalized.original_chars,
            analyzed_chars: normalized.analyzed_chars,
            mode,
            strategy: self.config.strategy,
            errors,
            cache_hits: stats.hits,
            cache_misses: stats.misses,
        };

        Ok(self.compiler.compile(CompileInputs {
            sections,
            curve,
            style,
            genre_conflict,
            key_suggestion,
            color,
            consistency,
            diagnostics,
        }))
    }

    /// Compare the style key with the dominant color's preferred keys
    fn tone_sync(
        &self,
        color: &ColorAnnotation,
        tonality: &TonalityProfile,
    ) -> AnalysisOutcome<Option<KeySuggestion>> {
        if tonality.section_keys.is_empty() {
            return Err(AnalysisError::stage("tone_sync", "no section keys"));
        }
        if color.profile.dominant == EmotionColor::Grey {
            return Ok(None);
        }
        Ok(self
            .resolver
            .check_key(color.profile.dominant, &tonality.primary_key))
    }
}
