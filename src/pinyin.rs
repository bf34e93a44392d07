use std::sync::LazyLock;

use regex::Regex;

use crate::tone_marks::{self, NEUTRAL_TONE, ToneNumber};

// Which vowel of a cluster receives the tone mark, most prominent first
const MARK_PRIORITY: [char; 6] = ['a', 'o', 'e', 'i', 'u', 'ü'];

static PINYIN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-züāēīōūǖáéíóúǘǎěǐǒǔǚàèìòùǜ\s]+$").expect("pinyin pattern is a valid regex")
});

/// Tone number of a pinyin syllable.
///
/// Returns the tone of the first tone-marked vowel, or 0 (neutral tone) if
/// there is none, which covers empty input and bare finals such as the
/// erhua suffix "r". Valid pinyin carries at most one mark per syllable;
/// for input with several marks only the first one counts.
pub fn detect_tone(syllable: &str) -> ToneNumber {
    syllable
        .chars()
        .find_map(tone_marks::tone_of)
        .unwrap_or(NEUTRAL_TONE)
}

/// Replace every tone-marked vowel with its plain vowel.
pub fn remove_tone_marks(pinyin: &str) -> String {
    pinyin
        .chars()
        .map(|c| tone_marks::base_of(c).unwrap_or(c))
        .collect()
}

/// Put the mark for `tone` on the most prominent vowel (a > o > e > i > u > ü).
///
/// Uppercase vowels are marked like their lowercase forms. The syllable is
/// returned unchanged for tones outside 1-4 or when it has no markable vowel.
pub fn add_tone_mark(syllable: &str, tone: ToneNumber) -> String {
    if !(1..=4).contains(&tone) {
        return syllable.to_owned();
    }
    for vowel in MARK_PRIORITY {
        let upper = vowel.to_uppercase().next().unwrap_or(vowel);
        let Some((idx, found)) = syllable
            .char_indices()
            .find(|(_, c)| *c == vowel || *c == upper)
        else {
            continue;
        };
        let Some(marked) = tone_marks::mark_of(found, tone) else {
            continue;
        };
        let mut out = String::with_capacity(syllable.len() + 1);
        out.push_str(&syllable[..idx]);
        out.push(marked);
        out.push_str(&syllable[idx + found.len_utf8()..]);
        return out;
    }
    syllable.to_owned()
}

/// Whether `pinyin` consists only of latin letters, tone-marked vowels and
/// whitespace.
pub fn is_valid_pinyin(pinyin: &str) -> bool {
    let trimmed = pinyin.trim();
    !trimmed.is_empty() && PINYIN_PATTERN.is_match(trimmed)
}
