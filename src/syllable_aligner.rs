//! Splits a pinyin string into one syllable record per Chinese character.
//!
//! Alignment is purely positional: the n-th whitespace separated pinyin token
//! belongs to the n-th code point of the character string. There is no
//! phonetic matching, callers have to separate syllables with spaces.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::common::split_characters;
use crate::config::UNPARSED_SYLLABLE;
use crate::pinyin::detect_tone;
use crate::tone_marks::{NEUTRAL_TONE, ToneNumber};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyllableRecord {
    pub character: String,
    pub syllable: String,
    pub tone_number: ToneNumber,
    pub position: u32,
}

impl SyllableRecord {
    /// Record whose tone number is derived from the syllable text.
    pub fn derived(character: &str, syllable: &str, position: u32) -> Self {
        SyllableRecord {
            character: character.to_owned(),
            syllable: syllable.to_owned(),
            tone_number: detect_tone(syllable),
            position,
        }
    }

    pub fn is_unparsed(&self) -> bool {
        self.syllable == UNPARSED_SYLLABLE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    /// One pinyin token per character.
    Aligned,
    /// Token count did not match, every record is an unparsed placeholder.
    Fallback,
    /// Pinyin or characters were empty.
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedPinyin {
    pub alignment: Alignment,
    pub syllables: Vec<SyllableRecord>,
}

impl ParsedPinyin {
    pub fn needs_review(&self) -> bool {
        self.alignment == Alignment::Fallback
    }
}

/// Align `pinyin` with `characters`.
///
/// If the number of pinyin tokens differs from the number of characters the
/// result still holds exactly one record per character, each with the
/// `UNPARSED_SYLLABLE` placeholder and the neutral tone, so a word can always
/// be stored and repaired later. A warning is logged in that case. Only an
/// empty string counts as missing pinyin; whitespace alone is zero tokens.
pub fn parse_pinyin(pinyin: &str, characters: &str) -> ParsedPinyin {
    let parts: Vec<&str> = pinyin.split_whitespace().collect();
    let chars = split_characters(characters);
    if pinyin.is_empty() || chars.is_empty() {
        return ParsedPinyin {
            alignment: Alignment::Empty,
            syllables: vec![],
        };
    }

    if parts.len() == chars.len() {
        let syllables = (0u32..)
            .zip(chars.iter().zip(parts))
            .map(|(position, (character, syllable))| {
                SyllableRecord::derived(character, syllable, position)
            })
            .collect();
        return ParsedPinyin {
            alignment: Alignment::Aligned,
            syllables,
        };
    }

    warn!(
        pinyin,
        characters,
        syllable_count = parts.len(),
        character_count = chars.len(),
        "pinyin syllable count does not match character count, storing unparsed syllables"
    );
    let syllables = (0u32..)
        .zip(chars)
        .map(|(position, character)| SyllableRecord {
            character,
            syllable: UNPARSED_SYLLABLE.to_owned(),
            tone_number: NEUTRAL_TONE,
            position,
        })
        .collect();
    ParsedPinyin {
        alignment: Alignment::Fallback,
        syllables,
    }
}
