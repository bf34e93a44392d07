//! Font scale per syllable: light tone syllables (most often a trailing 儿)
//! are drawn smaller than toned ones, both the character and its pinyin.

use serde::Serialize;

use crate::config::{FULL_TONE_SCALE, LIGHT_TONE_SCALE};
use crate::syllable_aligner::SyllableRecord;
use crate::tone_marks::{NEUTRAL_TONE, ToneNumber};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedSyllable {
    pub character: String,
    pub syllable: String,
    pub tone_number: ToneNumber,
    pub scale: f32,
    pub css_class: String,
}

pub fn tone_scale(tone_number: ToneNumber) -> f32 {
    if tone_number == NEUTRAL_TONE {
        LIGHT_TONE_SCALE
    } else {
        FULL_TONE_SCALE
    }
}

pub fn tone_css_class(tone_number: ToneNumber) -> String {
    format!("tone-{tone_number}")
}

/// Render instructions in position order. The input does not have to be
/// sorted.
pub fn render_syllables(syllables: &[SyllableRecord]) -> Vec<RenderedSyllable> {
    let mut ordered: Vec<&SyllableRecord> = syllables.iter().collect();
    ordered.sort_by_key(|s| s.position);
    ordered
        .into_iter()
        .map(|s| RenderedSyllable {
            character: s.character.clone(),
            syllable: s.syllable.clone(),
            tone_number: s.tone_number,
            scale: tone_scale(s.tone_number),
            css_class: tone_css_class(s.tone_number),
        })
        .collect()
}
