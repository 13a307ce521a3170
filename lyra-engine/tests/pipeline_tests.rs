//! End-to-end tests for the analysis pipeline

use lyra_engine::error::ErrorCode;
use lyra_engine::tier2::features::GenreFeatures;
use lyra_engine::tier2::genre_scorer::GenreScorer;
use lyra_engine::tier2::profiles::{ColorAnnotator, VocalProfiler};
use lyra_engine::tier3::override_merger::PrecedenceLayer;
use lyra_engine::translate::TableTranslator;
use lyra_engine::types::{
    ColorAnnotation, EmotionCluster, EmotionColor, GenreCandidate, GenreDomain,
    GlobalEmotionCurve, SectionTag, VocalGender, VocalProfile,
};
use lyra_engine::{
    AnalysisError, AnalysisOutcome, AnalysisPipeline, AnalysisRequest, AnalysisResult,
    EngineConfig, SemanticHints, UserOverrides,
};

const HATE: &str = "I hate you! I will destroy you! Traitor!";

const SONG: &str = "\
[Intro]
Under the neon lights

[Verse]
Tears fall on the cold floor
I walk alone in the rain

[Chorus]
We rise again, we fly
Hold on, the morning comes";

struct FailingColor;

impl ColorAnnotator for FailingColor {
    fn annotate(&self, _curve: &GlobalEmotionCurve) -> AnalysisOutcome<ColorAnnotation> {
        Err(AnalysisError::stage("color", "palette unavailable"))
    }
}

struct FailingVocal;

impl VocalProfiler for FailingVocal {
    fn profile(
        &self,
        _genre: &GenreCandidate,
        _curve: &GlobalEmotionCurve,
        _preferred: Option<VocalGender>,
    ) -> AnalysisOutcome<VocalProfile> {
        Err(AnalysisError::stage("vocal", "voice model missing"))
    }
}

fn analyze(text: &str) -> AnalysisResult {
    AnalysisPipeline::default().analyze(&AnalysisRequest::new(text))
}

fn in_unit(v: f64) -> bool {
    v.is_finite() && (0.0..=1.0).contains(&v)
}

#[test]
fn test_values_stay_in_bounds_on_pathological_input() {
    let long_word = "a".repeat(5000);
    let inputs = [
        "!!!!!!!!!!!!!!!!!!!!",
        "HATE HATE HATE!!!!!!!!!! DIE DIE DIE…………",
        "nooooooooooo ... ... ... ???? ~~~~",
        "ㅋㅋㅋㅋ ㅠㅠㅠ 사랑해 사랑해 사랑해!!!",
        "😀😀😀 🔥🔥🔥",
        "\u{200B}\u{200B}love\u{FEFF}",
        long_word.as_str(),
        SONG,
        HATE,
    ];

    for input in inputs {
        let result = analyze(input);
        let Some(analysis) = result.analysis else {
            assert!(!result.ok);
            continue;
        };

        let curve = &analysis.emotion.curve;
        assert!(in_unit(curve.tlp.truth) && in_unit(curve.tlp.love) && in_unit(curve.tlp.pain));
        assert!(in_unit(curve.arousal), "arousal out of range for {input:?}");
        assert!((-1.0..=1.0).contains(&curve.valence));
        for wave in &curve.waves {
            assert!(in_unit(wave.tlp.truth) && in_unit(wave.tlp.love) && in_unit(wave.tlp.pain));
            assert!(in_unit(wave.arousal));
            assert!((-1.0..=1.0).contains(&wave.valence));
            assert!(in_unit(wave.intensity));
        }
        assert!((40.0..=200.0).contains(&analysis.bpm.estimate));
    }
}

#[test]
fn test_bpm_curve_has_one_value_per_section() {
    for input in [SONG, HATE, "[Verse]\n[Chorus]\nonly the chorus sings"] {
        let analysis = analyze(input).analysis.unwrap();
        assert_eq!(analysis.bpm.curve.len(), analysis.sections.len());
        assert_eq!(analysis.tonality.section_keys.len(), analysis.sections.len());
    }
}

#[test]
fn test_empty_input_reports_only_the_error() {
    for input in ["", "   \n\t\n  "] {
        let result = analyze(input);
        assert!(!result.ok);
        assert!(result.analysis.is_none());
        assert_eq!(result.error.as_ref().unwrap().code, ErrorCode::EmptyInput);

        let json = serde_json::to_value(&result).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 2);
    }
}

#[test]
fn test_only_tags_is_segmentation_failure() {
    let result = analyze("[Verse]\n[Chorus]");
    assert!(!result.ok);
    assert_eq!(result.error.unwrap().code, ErrorCode::SegmentationFailed);
}

#[test]
fn test_hateful_lyric_is_fast_rage() {
    let analysis = analyze(HATE).analysis.unwrap();

    assert_eq!(analysis.emotion.profile.dominant_cluster, EmotionCluster::Rage);
    assert!(analysis.bpm.estimate > 120.0);
    let domain = analysis.style.genre.domain;
    assert!(domain != GenreDomain::Soft && domain != GenreDomain::Lyrical);
}

#[test]
fn test_three_tags_give_three_sections() {
    let analysis = analyze(SONG).analysis.unwrap();
    let labels: Vec<&str> = analysis.sections.iter().map(|s| s.label.as_str()).collect();

    assert_eq!(labels, vec!["Intro", "Verse", "Chorus"]);
    assert_eq!(analysis.sections[2].tag, SectionTag::Chorus);
    assert!(analysis
        .prompts
        .lyrics_prompt
        .starts_with("[Intro]\nUnder the neon lights"));
}

#[test]
fn test_bpm_override_moves_whole_curve() {
    let request = AnalysisRequest::new(SONG).with_overrides(UserOverrides {
        bpm: Some(95.0),
        ..Default::default()
    });
    let analysis = AnalysisPipeline::default().analyze(&request).analysis.unwrap();

    assert_eq!(analysis.bpm.estimate, 95.0);
    assert!(analysis.bpm.locks.user_locked);
    for v in &analysis.bpm.curve {
        assert!((v - 95.0).abs() <= 5.0 + 1e-9);
    }
}

#[test]
fn test_user_override_beats_fusion_hint() {
    let request = AnalysisRequest::new(SONG)
        .with_overrides(UserOverrides {
            key: Some("D minor".into()),
            genre: Some("Dream Pop".into()),
            ..Default::default()
        })
        .with_hints(SemanticHints {
            key: Some("G major".into()),
            mood: Some("nostalgic".into()),
            ..Default::default()
        });
    let analysis = AnalysisPipeline::default().analyze(&request).analysis.unwrap();

    assert_eq!(analysis.style.key.to_string(), "D minor");
    assert_eq!(analysis.style.mood, "nostalgic");
    assert_eq!(analysis.style.genre.label, "Dream Pop");
    assert!(analysis.prompts.style_prompt.starts_with("Dream Pop"));
}

#[test]
fn test_analysis_is_deterministic() {
    let a = analyze(SONG);
    let b = analyze(SONG);
    assert_eq!(a, b);
}

#[test]
fn test_infer_genre_is_pure() {
    let analysis = analyze(SONG).analysis.unwrap();
    let features = GenreFeatures::extract(&analysis.sections, &analysis.emotion.curve);
    let scorer = GenreScorer::default();

    let hint = analysis.emotion.curve.bias.genre_hint;

    let first = scorer.infer_genre(&features, hint, None);
    for _ in 0..5 {
        assert_eq!(scorer.infer_genre(&features, hint, None), first);
    }
}

#[test]
fn test_batch_matches_sequential() {
    let pipeline = AnalysisPipeline::default();
    let requests: Vec<AnalysisRequest> = [SONG, HATE, "", "la la la\nla la la", "[Bridge]\nstill here"]
        .iter()
        .map(|t| AnalysisRequest::new(*t))
        .collect();

    let batch = pipeline.analyze_batch(&requests);
    let sequential: Vec<AnalysisResult> = requests.iter().map(|r| pipeline.analyze(r)).collect();

    assert_eq!(batch.len(), requests.len());
    assert_eq!(batch, sequential);
    assert!(!batch[2].ok);
}

#[test]
fn test_truncated_input_is_flagged() {
    let config = EngineConfig {
        max_input_chars: 80,
        ..Default::default()
    };
    let pipeline = AnalysisPipeline::builder().config(config).build();
    let text = "we dance in the sunshine tonight\n".repeat(10);
    let analysis = pipeline.analyze(&AnalysisRequest::new(text)).analysis.unwrap();

    assert!(analysis.diagnostics.truncated);
    assert!(analysis.diagnostics.analyzed_chars <= 80);
    assert!(!analysis.consistency.ok);
    assert!(analysis
        .consistency
        .warnings
        .iter()
        .any(|w| w.contains("truncated")));
}

#[test]
fn test_translation_failure_is_recovered() {
    let translator = TableTranslator::new().with_entry("사랑해", "I love you");
    let pipeline = AnalysisPipeline::builder()
        .translator(Box::new(translator))
        .build();

    let ok = pipeline.analyze(&AnalysisRequest::new("사랑해"));
    assert!(ok.ok);
    assert!(ok.analysis.unwrap().diagnostics.errors.is_empty());

    let degraded = pipeline.analyze(&AnalysisRequest::new("사랑해\n모르는 말"));
    assert!(degraded.ok);
    let errors = degraded.analysis.unwrap().diagnostics.errors;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].stage, "translation");
    assert_eq!(errors[0].code, ErrorCode::TranslationFailed);
}

#[test]
fn test_structure_hint_mismatch_warns() {
    let request = AnalysisRequest::new(SONG).with_overrides(UserOverrides {
        structure_hints: Some(vec!["Intro".into(), "Verse".into()]),
        ..Default::default()
    });
    let analysis = AnalysisPipeline::default().analyze(&request).analysis.unwrap();

    assert!(analysis
        .consistency
        .warnings
        .iter()
        .any(|w| w.contains("structure hints")));
    assert!(analysis.prompts.lyrics_prompt.starts_with("[Intro]"));
}

#[test]
fn test_result_json_shape() {
    let json = serde_json::to_value(analyze(SONG)).unwrap();
    for key in [
        "ok",
        "sections",
        "emotion",
        "tlp",
        "bpm",
        "tonality",
        "style",
        "vocal",
        "instrumentation",
        "color",
        "consistency",
        "summary",
        "prompts",
        "diagnostics",
        "provenance",
    ] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
    assert!(json["tlp"]["conscious_frequency"].is_number());
    assert!(json["vocal"]["type"].is_string());
    assert_eq!(json["summary"].as_array().unwrap().len(), 4);
}

#[test]
fn test_modal_key_override_is_kept() {
    let request = AnalysisRequest::new(SONG).with_overrides(UserOverrides {
        key: Some("D mixolydian".into()),
        ..Default::default()
    });
    let analysis = AnalysisPipeline::default().analyze(&request).analysis.unwrap();

    assert_eq!(analysis.style.key.to_string(), "D mixolydian");
    assert!(analysis.prompts.style_prompt.contains(", D mixolydian,"));
    assert!(analysis
        .tonality
        .section_keys
        .iter()
        .all(|k| k.to_string() == "D mixolydian"));

    let json = serde_json::to_value(&analysis.tonality).unwrap();
    assert_eq!(json["mode"], "modal");
    assert_eq!(json["section_keys"][0], "D mixolydian");
}

#[test]
fn test_failing_color_engine_falls_back_to_grey() {
    let pipeline = AnalysisPipeline::builder()
        .color_engine(Box::new(FailingColor))
        .build();
    let result = pipeline.analyze(&AnalysisRequest::new(SONG));
    assert!(result.ok);

    let analysis = result.analysis.unwrap();
    let errors = &analysis.diagnostics.errors;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].stage, "color");
    assert_eq!(errors[0].code, ErrorCode::StageFailed);

    assert_eq!(analysis.color.profile.dominant, EmotionColor::Grey);
    assert_eq!(analysis.color.wave.len(), analysis.sections.len());
    assert!(analysis
        .color
        .wave
        .iter()
        .all(|p| p.color == EmotionColor::Grey));
    assert!(analysis.style.key_suggestion.is_none());
}

#[test]
fn test_failing_vocal_engine_falls_back_to_neutral() {
    let pipeline = AnalysisPipeline::builder()
        .vocal_engine(Box::new(FailingVocal))
        .build();
    let result = pipeline.analyze(&AnalysisRequest::new(HATE));
    assert!(result.ok);

    let analysis = result.analysis.unwrap();
    let errors = &analysis.diagnostics.errors;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].stage, "vocal");
    assert_eq!(errors[0].code, ErrorCode::StageFailed);

    assert_eq!(analysis.vocal.gender, VocalGender::Neutral);
    assert_eq!(analysis.vocal.vocal_type, "natural");
    let layer = analysis
        .provenance
        .iter()
        .find(|p| p.field == "vocal_gender")
        .map(|p| p.layer);
    assert_eq!(layer, Some(PrecedenceLayer::Fallback));
}

#[test]
fn test_rejected_override_is_reported() {
    let request = AnalysisRequest::new(SONG).with_overrides(UserOverrides {
        key: Some("H major".into()),
        ..Default::default()
    });
    let analysis = AnalysisPipeline::default().analyze(&request).analysis.unwrap();

    let errors = &analysis.diagnostics.errors;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].stage, "override");
    assert_eq!(errors[0].code, ErrorCode::InvalidInput);
    let layer = analysis
        .provenance
        .iter()
        .find(|p| p.field == "key")
        .map(|p| p.layer);
    assert_eq!(layer, Some(PrecedenceLayer::Computed));
}
