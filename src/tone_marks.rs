//! Static mapping between the plain pinyin vowels and their four tone-marked
//! glyphs. Every glyph is a single precomposed code point, so lookups work
//! per `char`.

/// 0 is the neutral (light) tone, 1 to 4 are the marked tones.
pub type ToneNumber = u8;

pub const NEUTRAL_TONE: ToneNumber = 0;

// (base vowel, [tone 1, tone 2, tone 3, tone 4])
const TONE_MARKS: [(char, [char; 4]); 12] = [
    ('a', ['ā', 'á', 'ǎ', 'à']),
    ('e', ['ē', 'é', 'ě', 'è']),
    ('i', ['ī', 'í', 'ǐ', 'ì']),
    ('o', ['ō', 'ó', 'ǒ', 'ò']),
    ('u', ['ū', 'ú', 'ǔ', 'ù']),
    ('ü', ['ǖ', 'ǘ', 'ǚ', 'ǜ']),
    ('A', ['Ā', 'Á', 'Ǎ', 'À']),
    ('E', ['Ē', 'É', 'Ě', 'È']),
    ('I', ['Ī', 'Í', 'Ǐ', 'Ì']),
    ('O', ['Ō', 'Ó', 'Ǒ', 'Ò']),
    ('U', ['Ū', 'Ú', 'Ǔ', 'Ù']),
    ('Ü', ['Ǖ', 'Ǘ', 'Ǚ', 'Ǜ']),
];

/// Marked glyph for `vowel` in `tone`, `None` for tones outside 1-4 or
/// characters that never carry a tone mark.
pub fn mark_of(vowel: char, tone: ToneNumber) -> Option<char> {
    if !(1..=4).contains(&tone) {
        return None;
    }
    TONE_MARKS
        .iter()
        .find(|(base, _)| *base == vowel)
        .map(|(_, marks)| marks[usize::from(tone - 1)])
}

/// Reverse lookup: tone of a marked glyph, `None` for anything unmarked.
pub fn tone_of(glyph: char) -> Option<ToneNumber> {
    lookup_marked(glyph).map(|(_, tone)| tone)
}

/// Reverse lookup: plain vowel of a marked glyph.
pub fn base_of(glyph: char) -> Option<char> {
    lookup_marked(glyph).map(|(base, _)| base)
}

fn lookup_marked(glyph: char) -> Option<(char, ToneNumber)> {
    TONE_MARKS.iter().find_map(|(base, marks)| {
        marks
            .iter()
            .position(|m| *m == glyph)
            .and_then(|idx| ToneNumber::try_from(idx + 1).ok())
            .map(|tone| (*base, tone))
    })
}

/// All (base, tone, glyph) triples in table order.
pub fn entries() -> impl Iterator<Item = (char, ToneNumber, char)> {
    TONE_MARKS.iter().flat_map(|(base, marks)| {
        (1..=4u8).zip(marks.iter()).map(move |(tone, m)| (*base, tone, *m))
    })
}
