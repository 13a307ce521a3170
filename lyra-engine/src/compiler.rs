//! Final compiler
//!
//! Assembles the merged style, curve and reports into an [`Analysis`] and
//! renders the summary block and the two prompt strings. Nothing is derived
//! again here; every value comes from an earlier stage.

use crate::result::{
    Analysis, Diagnostics, EmotionOutput, EmotionProfile, GenreOutput, Prompts, StyleOutput,
    TlpOutput,
};
use crate::tier2::conflict_resolver::{GenreSuggestion, KeySuggestion};
use crate::tier3::consistency_validator::ConsistencyReport;
use crate::tier3::override_merger::MergedStyle;
use crate::types::{ColorAnnotation, GlobalEmotionCurve, Section, TlpVector};

const TRUTH_HZ: f64 = 741.0;
const LOVE_HZ: f64 = 528.0;
const PAIN_HZ: f64 = 396.0;
const NEUTRAL_HZ: f64 = 432.0;

/// TLP-weighted mean of the three axis frequencies
pub fn conscious_frequency(tlp: &TlpVector) -> f64 {
    let sum = tlp.sum();
    if sum <= 0.0 {
        return NEUTRAL_HZ;
    }
    (tlp.truth * TRUTH_HZ + tlp.love * LOVE_HZ + tlp.pain * PAIN_HZ) / sum
}

/// Stage outputs handed to the compiler
pub struct CompileInputs {
    pub sections: Vec<Section>,
    pub curve: GlobalEmotionCurve,
    pub style: MergedStyle,
    pub genre_conflict: Option<GenreSuggestion>,
    pub key_suggestion: Option<KeySuggestion>,
    pub color: ColorAnnotation,
    pub consistency: ConsistencyReport,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Default)]
pub struct FinalCompiler;

impl FinalCompiler {
    pub fn compile(&self, inputs: CompileInputs) -> Analysis {
        let CompileInputs {
            sections,
            curve,
            style,
            genre_conflict,
            key_suggestion,
            color,
            consistency,
            diagnostics,
        } = inputs;

        let frequency = conscious_frequency(&curve.tlp);
        let visual = visual_line(&color);
        let style_prompt = style_prompt(&style, &visual);
        let lyrics_prompt = lyrics_prompt(&sections, style.structure_hints.as_deref());
        let summary = summary_lines(&curve, &style, &color, frequency);

        let MergedStyle {
            bpm,
            tonality,
            genre,
            genre_label,
            mood,
            vocal,
            instrumentation,
            provenance,
            ..
        } = style;

        let tlp = TlpOutput {
            truth: curve.tlp.truth,
            love: curve.tlp.love,
            pain: curve.tlp.pain,
            conscious_frequency: frequency,
        };
        let profile = EmotionProfile {
            dominant_cluster: curve.dominant_cluster,
            mood: curve.dominant_cluster.mood().to_string(),
            intensity: curve.mean_intensity,
            valence: curve.valence,
            arousal: curve.arousal,
            resonance: curve.resonance,
            entropy: curve.entropy,
        };

        Analysis {
            emotion: EmotionOutput { profile, curve },
            tlp,
            style: StyleOutput {
                genre: GenreOutput {
                    label: genre_label,
                    id: genre.genre_id,
                    domain: genre.domain,
                    source: genre.source,
                    raw_score: genre.raw_score,
                    threshold: genre.threshold,
                    redirected_from: genre.redirected_from,
                    conflict: genre_conflict,
                },
                mood,
                key: tonality.primary_key,
                key_suggestion,
                visual,
                prompt: style_prompt.clone(),
            },
            bpm,
            tonality,
            vocal,
            instrumentation,
            color,
            consistency,
            summary,
            prompts: Prompts {
                style_prompt,
                lyrics_prompt,
            },
            diagnostics,
            provenance,
            sections,
        }
    }
}

fn visual_line(color: &ColorAnnotation) -> String {
    let p = &color.profile;
    match p.secondary {
        Some(secondary) => format!(
            "{} ({}) fading into {} ({})",
            p.dominant.as_str(),
            p.hex,
            secondary.as_str(),
            secondary.hex()
        ),
        None => format!("{} ({})", p.dominant.as_str(), p.hex),
    }
}

fn style_prompt(style: &MergedStyle, visual: &str) -> String {
    let vocal = &style.vocal;
    format!(
        "{}, {} mood, {:.0} BPM, {}, {} {} vocals ({}, {}), instruments: {}, visual: {}",
        style.genre_label,
        style.mood,
        style.bpm.estimate,
        style.tonality.primary_key,
        vocal.gender.as_str(),
        vocal.vocal_type,
        vocal.tone,
        vocal.style,
        style.instrumentation.selection.join(", "),
        visual
    )
}

/// Lyrics with one header per section
///
/// Structure hints replace the section labels only when there is exactly one
/// hint per section.
pub fn lyrics_prompt(sections: &[Section], hints: Option<&[String]>) -> String {
    let hints = hints.filter(|h| h.len() == sections.len());
    sections
        .iter()
        .enumerate()
        .map(|(i, section)| {
            let header = hints.map_or(section.label.as_str(), |h| h[i].as_str());
            let mut block = format!("[{header}]");
            for line in &section.lines {
                block.push('\n');
                block.push_str(line);
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn summary_lines(
    curve: &GlobalEmotionCurve,
    style: &MergedStyle,
    color: &ColorAnnotation,
    frequency: f64,
) -> Vec<String> {
    let tlp = &curve.tlp;
    let genre = &style.genre;

    vec![
        format!(
            "TLP truth {:.2} / love {:.2} / pain {:.2} ({:.0} Hz)",
            tlp.truth, tlp.love, tlp.pain, frequency
        ),
        format!(
            "Resonance {:.2} | Fracture {} | Entropy {:.2}",
            curve.resonance,
            if style.bpm.fracture { "yes" } else { "no" },
            curve.entropy
        ),
        format!(
            "Genre {} ({}, {:?}, score {:.2} / threshold {:.2})",
            style.genre_label, genre.domain, genre.source, genre.raw_score, genre.threshold
        ),
        color_wave_line(&curve.canonical_order, color),
    ]
}

/// Section colors in structural (canonical) order
fn color_wave_line(order: &[usize], color: &ColorAnnotation) -> String {
    let wave: Vec<&str> = order
        .iter()
        .filter_map(|&index| color.wave.iter().find(|p| p.section_index == index))
        .map(|p| p.color.as_str())
        .collect();
    format!("Color wave {}", wave.join(" > "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColorPoint, ColorProfile, EmotionColor, SectionTag};

    fn section(index: usize, label: &str, lines: &[&str]) -> Section {
        Section {
            index,
            tag: SectionTag::Verse,
            label: label.to_string(),
            lines: lines.iter().map(|l| l.to_string()).collect(),
            repeat_of: None,
        }
    }

    #[test]
    fn test_conscious_frequency() {
        assert_eq!(conscious_frequency(&TlpVector::default()), 432.0);
        assert_eq!(conscious_frequency(&TlpVector::new(0.0, 0.5, 0.0)), 528.0);
        let mixed = conscious_frequency(&TlpVector::new(0.5, 0.0, 0.5));
        assert!((mixed - 568.5).abs() < 1e-9);
    }

    #[test]
    fn test_color_wave_follows_canonical_order() {
        let point = |section_index: usize, color: EmotionColor| ColorPoint {
            section_index,
            label: format!("s{section_index}"),
            color,
            hex: color.hex().to_string(),
        };
        let color = ColorAnnotation {
            wave: vec![
                point(0, EmotionColor::Crimson),
                point(1, EmotionColor::Dawn),
                point(2, EmotionColor::Midnight),
            ],
            profile: ColorProfile {
                dominant: EmotionColor::Crimson,
                secondary: None,
                hex: EmotionColor::Crimson.hex().to_string(),
            },
        };

        let line = color_wave_line(&[2, 0, 1], &color);
        let expected = format!(
            "Color wave {} > {} > {}",
            EmotionColor::Midnight.as_str(),
            EmotionColor::Crimson.as_str(),
            EmotionColor::Dawn.as_str()
        );
        assert_eq!(line, expected);
    }

    #[test]
    fn test_lyrics_prompt_headers() {
        let sections = vec![
            section(0, "Verse", &["line one", "line two"]),
            section(1, "Chorus 1", &[]),
        ];
        assert_eq!(
            lyrics_prompt(&sections, None),
            "[Verse]\nline one\nline two\n\n[Chorus 1]"
        );

        let hints = vec!["Intro".to_string(), "Hook".to_string()];
        assert!(lyrics_prompt(&sections, Some(hints.as_slice())).starts_with("[Intro]\nline one"));

        let short = vec!["Intro".to_string()];
        assert!(lyrics_prompt(&sections, Some(short.as_slice())).starts_with("[Verse]"));
    }
}
