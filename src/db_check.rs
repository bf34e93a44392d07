use std::fmt;

use rusqlite::Connection;
use serde::Serialize;

use crate::common::{SqliteId, split_characters};
use crate::error::Result;
use crate::lexicon::find_syllables;
use crate::pinyin::detect_tone;
use crate::syllable_aligner::SyllableRecord;
use crate::tone_marks::ToneNumber;

const ERHUA_SYLLABLE: &str = "r";
const ERHUA_CHARS: [&str; 2] = ["儿", "兒"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    SyllableCount { characters: usize, syllables: usize },
    PositionsNotDense { positions: Vec<u32> },
    CharactersDiffer { joined: String },
    ToneMismatch { position: u32, syllable: String, stored: ToneNumber, derived: ToneNumber },
    Unparsed,
    ErhuaOnWrongCharacter { position: u32, character: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckIssue {
    pub word_id: SqliteId,
    pub chinese_characters: String,
    #[serde(flatten)]
    pub kind: IssueKind,
}

impl fmt::Display for CheckIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation Error: word {} {}: ", self.word_id, self.chinese_characters)?;
        match &self.kind {
            IssueKind::SyllableCount { characters, syllables } => write!(
                f,
                "{syllables} syllables for {characters} characters"
            ),
            IssueKind::PositionsNotDense { positions } => {
                write!(f, "syllable positions are not 0..n-1: {positions:?}")
            }
            IssueKind::CharactersDiffer { joined } => {
                write!(f, "syllable characters form '{joined}'")
            }
            IssueKind::ToneMismatch { position, syllable, stored, derived } => write!(
                f,
                "syllable {position} '{syllable}' stored with tone {stored}, marks indicate tone {derived}"
            ),
            IssueKind::Unparsed => write!(f, "syllables were not parsed and need repair"),
            IssueKind::ErhuaOnWrongCharacter { position, character } => write!(
                f,
                "erhua syllable at position {position} belongs to '{character}'"
            ),
        }
    }
}

/// Check every stored word against the syllable invariants.
pub fn check_entries(conn: &Connection) -> Result<Vec<CheckIssue>> {
    let mut stmt = conn.prepare("SELECT id, chinese_characters FROM words ORDER BY id")?;
    let words = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<rusqlite::Result<Vec<(SqliteId, String)>>>()?;

    let mut issues = vec![];
    for (word_id, chinese_characters) in words {
        let syllables = find_syllables(conn, word_id)?;
        for kind in check_word(&chinese_characters, &syllables) {
            issues.push(CheckIssue {
                word_id,
                chinese_characters: chinese_characters.clone(),
                kind,
            });
        }
    }
    Ok(issues)
}

/// `syllables` must be sorted by position.
pub fn check_word(chinese_characters: &str, syllables: &[SyllableRecord]) -> Vec<IssueKind> {
    let mut issues = vec![];
    let num_chars = split_characters(chinese_characters).len();
    if num_chars != syllables.len() {
        issues.push(IssueKind::SyllableCount {
            characters: num_chars,
            syllables: syllables.len(),
        });
    }

    let positions: Vec<u32> = syllables.iter().map(|s| s.position).collect();
    let dense = positions.iter().zip(0u32..).all(|(&p, expected)| p == expected);
    if !dense {
        issues.push(IssueKind::PositionsNotDense { positions });
    } else {
        let joined: String = syllables.iter().map(|s| s.character.as_str()).collect();
        if joined != chinese_characters {
            issues.push(IssueKind::CharactersDiffer { joined });
        }
    }

    if syllables.iter().any(SyllableRecord::is_unparsed) {
        issues.push(IssueKind::Unparsed);
    }

    for s in syllables.iter().filter(|s| !s.is_unparsed()) {
        let derived = detect_tone(&s.syllable);
        if derived != s.tone_number {
            issues.push(IssueKind::ToneMismatch {
                position: s.position,
                syllable: s.syllable.clone(),
                stored: s.tone_number,
                derived,
            });
        }
        if s.syllable == ERHUA_SYLLABLE && !ERHUA_CHARS.contains(&s.character.as_str()) {
            issues.push(IssueKind::ErhuaOnWrongCharacter {
                position: s.position,
                character: s.character.clone(),
            });
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syllable_aligner::parse_pinyin;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_clean_word() {
        let syllables = parse_pinyin("nín gé nǎ r ne", "您搁哪儿呢").syllables;
        assert!(check_word("您搁哪儿呢", &syllables).is_empty());
    }

    #[test]
    fn test_unparsed_word() {
        let syllables = parse_pinyin("bèir", "倍儿").syllables;
        assert_eq!(check_word("倍儿", &syllables), vec![IssueKind::Unparsed]);
    }

    #[test]
    fn test_count_and_positions() {
        let mut syllables = parse_pinyin("hú tòng", "胡同").syllables;
        syllables[1].position = 3;
        assert_eq!(
            check_word("胡同儿", &syllables),
            vec![
                IssueKind::SyllableCount { characters: 3, syllables: 2 },
                IssueKind::PositionsNotDense { positions: vec![0, 3] },
            ]
        );
    }

    #[test]
    fn test_positions_shifted_by_one() {
        let mut syllables = parse_pinyin("hú tòng", "胡同").syllables;
        for s in &mut syllables {
            s.position += 1;
        }
        assert_eq!(
            check_word("胡同", &syllables),
            vec![IssueKind::PositionsNotDense { positions: vec![1, 2] }]
        );
    }

    #[test]
    fn test_tone_mismatch_and_misplaced_erhua() {
        let mut syllables = parse_pinyin("wá r mìng", "玩儿命").syllables;
        syllables[2].tone_number = 1;
        assert_eq!(
            check_word("玩儿命", &syllables),
            vec![
                IssueKind::ToneMismatch {
                    position: 2,
                    syllable: "mìng".to_owned(),
                    stored: 1,
                    derived: 4
                },
            ]
        );
        // erhua on 玩 instead of 儿
        let syllables = parse_pinyin("r wá mìng", "玩儿命").syllables;
        assert_eq!(
            check_word("玩儿命", &syllables),
            vec![IssueKind::ErhuaOnWrongCharacter {
                position: 0,
                character: "玩".to_owned()
            }]
        );
    }
}
