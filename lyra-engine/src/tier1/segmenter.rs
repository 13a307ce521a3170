// Tier 1: Text Segmenter
//
// Concept: Split normalised lyric text into ordered, labelled sections
// Synchronization: Accepts normalised text, outputs Vec<Section> (never empty)
//
// Algorithm:
// 1. Bracket tags (`[Chorus]`) when present; lines before the first tag form a Body
// 2. Otherwise blank-line stanzas (default mode merges one-line stanzas),
//    falling back to fixed-size blocks labelled by position
// 3. Sections with identical normalised line sets are linked and renumbered

use crate::error::{AnalysisError, AnalysisOutcome};
use crate::types::{Section, SectionTag, SegmentationMode};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};

static TAG_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[\s*([^\[\]]+?)\s*\]$").expect("Invalid tag line regex"));

struct RawSection {
    tag: SectionTag,
    label: String,
    lines: Vec<String>,
}

/// Text segmenter (Tier 1 extractor)
pub struct TextSegmenter {
    longform_line_threshold: usize,
    block_size: usize,
}

impl Default for TextSegmenter {
    fn default() -> Self {
        Self {
            longform_line_threshold: 120,
            block_size: 4,
        }
    }
}

impl TextSegmenter {
    pub fn new(longform_line_threshold: usize, block_size: usize) -> Self {
        Self {
            longform_line_threshold,
            block_size: block_size.max(1),
        }
    }

    /// Choose the segmentation branch from the number of lyric lines
    pub fn mode_for(&self, text: &str) -> SegmentationMode {
        let lyric_lines = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !TAG_LINE.is_match(l))
            .count();
        if lyric_lines > self.longform_line_threshold {
            SegmentationMode::Longform
        } else {
            SegmentationMode::Default
        }
    }

    /// Segment text into sections
    ///
    /// # Errors
    /// `AnalysisError::Segmentation` when the text holds no lyric lines at all
    /// (for example only bracket tags).
    pub fn segment(&self, text: &str, mode: SegmentationMode) -> AnalysisOutcome<Vec<Section>> {
        let lines: Vec<&str> = text.lines().map(str::trim).collect();
        let has_tags = lines.iter().any(|l| TAG_LINE.is_match(l));

        let raw = if has_tags {
            Self::split_tagged(&lines)
        } else {
            self.split_untagged(&lines, mode)
        };

        if raw.iter().all(|s| s.lines.is_empty()) {
            return Err(AnalysisError::Segmentation(
                "no lyric lines found".to_string(),
            ));
        }

        let mut sections: Vec<Section> = raw
            .into_iter()
            .enumerate()
            .map(|(index, s)| Section {
                index,
                tag: s.tag,
                label: s.label,
                lines: s.lines,
                repeat_of: None,
            })
            .collect();

        link_duplicates(&mut sections);

        tracing::debug!(
            "Segmented {} sections ({:?} mode, tagged: {})",
            sections.len(),
            mode,
            has_tags
        );
        Ok(sections)
    }

    fn split_tagged(lines: &[&str]) -> Vec<RawSection> {
        let mut out = Vec::new();
        let mut current = RawSection {
            tag: SectionTag::Body,
            label: SectionTag::Body.as_str().to_string(),
            lines: Vec::new(),
        };
        let mut in_tag = false;

        for line in lines {
            if let Some(caps) = TAG_LINE.captures(line) {
                // The untagged preamble is only kept when it has content
                if in_tag || !current.lines.is_empty() {
                    out.push(current);
                }
                let label = caps.get(1).map_or("", |m| m.as_str()).to_string();
                current = RawSection {
                    tag: SectionTag::from_label(&label).unwrap_or(SectionTag::Body),
                    label,
                    lines: Vec::new(),
                };
                in_tag = true;
            } else if !line.is_empty() {
                current.lines.push((*line).to_string());
            }
        }
        out.push(current);
        out
    }

    fn split_untagged(&self, lines: &[&str], mode: SegmentationMode) -> Vec<RawSection> {
        let stanzas = split_stanzas(lines);

        let blocks: Vec<Vec<String>> = match mode {
            SegmentationMode::Longform => stanzas,
            SegmentationMode::Default if stanzas.len() > 1 => merge_short_stanzas(stanzas),
            SegmentationMode::Default => {
                let all: Vec<String> = stanzas.into_iter().flatten().collect();
                self.fixed_blocks(all)
            }
        };

        label_by_position(blocks)
    }

    fn fixed_blocks(&self, lines: Vec<String>) -> Vec<Vec<String>> {
        let mut blocks: Vec<Vec<String>> = lines
            .chunks(self.block_size)
            .map(<[String]>::to_vec)
            .collect();
        // A trailing single line joins the previous block
        if blocks.len() > 1 && blocks.last().is_some_and(|b| b.len() == 1) {
            if let Some(tail) = blocks.pop() {
                if let Some(prev) = blocks.last_mut() {
                    prev.extend(tail);
                }
            }
        }
        blocks
    }
}

fn split_stanzas(lines: &[&str]) -> Vec<Vec<String>> {
    let mut stanzas = Vec::new();
    let mut current: Vec<String> = Vec::new();
    for line in lines {
        if line.is_empty() {
            if !current.is_empty() {
                stanzas.push(std::mem::take(&mut current));
            }
        } else {
            current.push((*line).to_string());
        }
    }
    if !current.is_empty() {
        stanzas.push(current);
    }
    stanzas
}

/// One-line stanzas join their predecessor (the first joins its successor)
fn merge_short_stanzas(stanzas: Vec<Vec<String>>) -> Vec<Vec<String>> {
    let mut merged: Vec<Vec<String>> = Vec::new();
    let mut pending: Vec<String> = Vec::new();
    for stanza in stanzas {
        if stanza.len() == 1 {
            match merged.last_mut() {
                Some(prev) => prev.extend(stanza),
                None => pending.extend(stanza),
            }
        } else {
            let mut block = std::mem::take(&mut pending);
            block.extend(stanza);
            merged.push(block);
        }
    }
    if !pending.is_empty() {
        merged.push(pending);
    }
    merged
}

fn line_set(lines: &[String]) -> BTreeSet<String> {
    lines
        .iter()
        .map(|l| {
            l.chars()
                .filter(|c| c.is_alphanumeric() || c.is_whitespace())
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase()
        })
        .filter(|l| !l.is_empty())
        .collect()
}

fn label_by_position(blocks: Vec<Vec<String>>) -> Vec<RawSection> {
    let n = blocks.len();
    if n == 1 {
        return blocks
            .into_iter()
            .map(|lines| RawSection {
                tag: SectionTag::Body,
                label: SectionTag::Body.as_str().to_string(),
                lines,
            })
            .collect();
    }

    let mut seen: HashMap<BTreeSet<String>, SectionTag> = HashMap::new();
    blocks
        .into_iter()
        .enumerate()
        .map(|(i, lines)| {
            let positional = if n >= 5 && i == n - 2 {
                SectionTag::Bridge
            } else if i % 2 == 0 {
                SectionTag::Verse
            } else {
                SectionTag::Chorus
            };
            let tag = *seen.entry(line_set(&lines)).or_insert(positional);
            RawSection {
                tag,
                label: tag.as_str().to_string(),
                lines,
            }
        })
        .collect()
}

/// Link repeated sections and renumber their labels (`Chorus 1`, `Chorus 2`)
fn link_duplicates(sections: &mut [Section]) {
    let mut groups: HashMap<(SectionTag, BTreeSet<String>), Vec<usize>> = HashMap::new();
    for section in sections.iter() {
        if section.is_empty() {
            continue;
        }
        groups
            .entry((section.tag, line_set(&section.lines)))
            .or_default()
            .push(section.index);
    }

    for members in groups.values().filter(|m| m.len() > 1) {
        let first = members[0];
        for (n, &idx) in members.iter().enumerate() {
            let section = &mut sections[idx];
            if idx != first {
                section.repeat_of = Some(first);
            }
            let ends_with_digit = section
                .label
                .chars()
                .last()
                .is_some_and(|c| c.is_ascii_digit());
            if !ends_with_digit {
                section.label = format!("{} {}", section.label, n + 1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(text: &str) -> Vec<Section> {
        let seg = TextSegmenter::default();
        seg.segment(text, seg.mode_for(text)).unwrap()
    }

    #[test]
    fn test_bracket_tags_kept_verbatim() {
        let sections = segment("[Intro]\nla la\n[Verse]\nwalking home\n[Chorus]\nwe sing");
        assert_eq!(sections.len(), 3);
        let labels: Vec<_> = sections.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Intro", "Verse", "Chorus"]);
        assert_eq!(sections[2].tag, SectionTag::Chorus);
    }

    #[test]
    fn test_preamble_becomes_body() {
        let sections = segment("before any tag\n[Verse]\nline");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].tag, SectionTag::Body);
        assert_eq!(sections[1].tag, SectionTag::Verse);
    }

    #[test]
    fn test_unknown_tag_kept_as_body_label() {
        let sections = segment("[Spoken Word]\nhello there");
        assert_eq!(sections[0].tag, SectionTag::Body);
        assert_eq!(sections[0].label, "Spoken Word");
    }

    #[test]
    fn test_empty_tagged_section_kept() {
        let sections = segment("[Intro]\n[Verse]\nsomething");
        assert_eq!(sections.len(), 2);
        assert!(sections[0].is_empty());
    }

    #[test]
    fn test_only_tags_fails() {
        let seg = TextSegmenter::default();
        let result = seg.segment("[Intro]\n[Outro]", SegmentationMode::Default);
        assert!(matches!(result, Err(AnalysisError::Segmentation(_))));
    }

    #[test]
    fn test_duplicate_choruses_renumbered() {
        let text = "[Verse]\na\n[Chorus]\nhold on, hold on\n[Verse]\nb\n[Chorus]\nHold on hold on!";
        let sections = segment(text);
        assert_eq!(sections[1].label, "Chorus 1");
        assert_eq!(sections[3].label, "Chorus 2");
        assert_eq!(sections[3].repeat_of, Some(1));
        assert_eq!(sections[0].label, "Verse");
    }

    #[test]
    fn test_single_line_is_body() {
        let sections = segment("just one line");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].tag, SectionTag::Body);
    }

    #[test]
    fn test_fixed_blocks_without_stanzas() {
        let text = (1..=9).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let sections = segment(&text);
        // 4 + 5 (trailing single line merged)
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].tag, SectionTag::Verse);
        assert_eq!(sections[1].tag, SectionTag::Chorus);
        assert_eq!(sections[1].line_count(), 5);
    }

    #[test]
    fn test_stanzas_with_bridge_position() {
        let text = (0..5)
            .map(|i| format!("stanza {i} a\nstanza {i} b"))
            .collect::<Vec<_>>()
            .join("\n\n");
        let sections = segment(&text);
        let tags: Vec<_> = sections.iter().map(|s| s.tag).collect();
        assert_eq!(
            tags,
            vec![
                SectionTag::Verse,
                SectionTag::Chorus,
                SectionTag::Verse,
                SectionTag::Bridge,
                SectionTag::Verse
            ]
        );
    }

    #[test]
    fn test_one_line_stanza_merged_in_default_mode() {
        let sections = segment("a1\na2\n\nlonely\n\nb1\nb2");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].line_count(), 3);
    }

    #[test]
    fn test_longform_keeps_stanzas_strictly() {
        let seg = TextSegmenter::new(3, 4);
        let text = "a1\na2\n\nlonely\n\nb1\nb2";
        assert_eq!(seg.mode_for(text), SegmentationMode::Longform);
        let sections = seg.segment(text, SegmentationMode::Longform).unwrap();
        assert_eq!(sections.len(), 3);
    }

    #[test]
    fn test_longform_without_blank_lines_is_single_body() {
        let seg = TextSegmenter::new(3, 4);
        let sections = seg
            .segment("a\nb\nc\nd\ne", SegmentationMode::Longform)
            .unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].tag, SectionTag::Body);
    }

    #[test]
    fn test_deterministic() {
        let text = "x\ny\n\nz\nw\n\nx\ny";
        assert_eq!(segment(text), segment(text));
    }
}
