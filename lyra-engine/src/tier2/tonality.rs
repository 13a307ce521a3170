// Tier 2: Tonality Synthesizer
//
// Concept: One key per section plus a song-level mode
// Synchronization: Accepts &[Section] + &GlobalEmotionCurve, outputs TonalityProfile
//
// Key tonic: SHA-256 of the normalised section text, first 8 bytes as u64,
// modulo an 8-key palette. Mode: DynamicBias.key_hint when present, otherwise
// sorrow vs uplift cue counts (ties fall back to valence). Modal = dorian on
// the relative minor tonic.

use crate::lexicon;
use crate::tier1::text_metrics::tokenize;
use crate::types::{GlobalEmotionCurve, Mode, MusicalKey, Section, SectionTag, TonalityProfile};
use sha2::{Digest, Sha256};

/// C, G, D, A, E, F, Bb, Eb
const KEY_PALETTE: [u8; 8] = [0, 7, 2, 9, 4, 5, 10, 3];

/// Tonality synthesizer (Tier 2)
#[derive(Debug, Default)]
pub struct TonalitySynthesizer;

fn palette_index(text: &str) -> usize {
    let normalized: String = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    let digest = Sha256::digest(normalized.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(bytes) % KEY_PALETTE.len() as u64) as usize
}

/// Major-palette key moved into the requested mode
pub fn key_in_mode(major_tonic: u8, mode: Mode) -> MusicalKey {
    match mode {
        Mode::Major => MusicalKey::new(major_tonic, Mode::Major),
        Mode::Minor => MusicalKey::new(major_tonic, Mode::Major).relative_minor(),
        Mode::Modal(kind) => {
            let minor = MusicalKey::new(major_tonic, Mode::Major).relative_minor();
            MusicalKey::new(minor.tonic, Mode::Modal(kind))
        }
    }
}

/// Mode implied by sorrow/uplift cues, None on a tie
fn cue_mode<'a>(lines: impl IntoIterator<Item = &'a String>) -> Option<Mode> {
    let tokens: Vec<String> = lines.into_iter().flat_map(|l| tokenize(l)).collect();
    let sorrow = lexicon::count_hits(lexicon::SORROW_CUES, &tokens);
    let uplift = lexicon::count_hits(lexicon::UPLIFT_CUES, &tokens);
    match sorrow.cmp(&uplift) {
        std::cmp::Ordering::Greater => Some(Mode::Minor),
        std::cmp::Ordering::Less => Some(Mode::Major),
        std::cmp::Ordering::Equal => None,
    }
}

fn valence_mode(valence: f64) -> Mode {
    if valence < 0.0 {
        Mode::Minor
    } else {
        Mode::Major
    }
}

impl TonalitySynthesizer {
    pub fn synthesize(&self, sections: &[Section], curve: &GlobalEmotionCurve) -> TonalityProfile {
        let global_mode = curve.bias.key_hint.unwrap_or_else(|| {
            cue_mode(sections.iter().flat_map(|s| s.lines.iter()))
                .unwrap_or_else(|| valence_mode(curve.valence))
        });

        let section_keys: Vec<MusicalKey> = sections
            .iter()
            .map(|section| {
                let mode = match curve.bias.key_hint {
                    Some(hint) => hint,
                    None if section.is_empty() => global_mode,
                    None => cue_mode(&section.lines).unwrap_or_else(|| {
                        curve
                            .waves
                            .iter()
                            .find(|w| w.section_index == section.index)
                            .map_or(global_mode, |w| valence_mode(w.valence))
                    }),
                };
                let seed = if section.is_empty() {
                    section.label.clone()
                } else {
                    section.text()
                };
                key_in_mode(KEY_PALETTE[palette_index(&seed)], mode)
            })
            .collect();

        let modal_shifts = section_keys
            .windows(2)
            .enumerate()
            .filter(|(_, pair)| pair[0].mode != pair[1].mode)
            .map(|(i, _)| i + 1)
            .collect();

        let primary_key = sections
            .iter()
            .position(|s| s.tag == SectionTag::Chorus)
            .or(if section_keys.is_empty() { None } else { Some(0) })
            .and_then(|i| section_keys.get(i).copied())
            .unwrap_or_else(|| key_in_mode(KEY_PALETTE[0], global_mode));

        TonalityProfile {
            mode: global_mode,
            section_keys,
            modal_shifts,
            primary_key,
        }
    }
}
