use std::collections::BTreeMap;

use rusqlite::Connection;

use bjld::db_check;
use bjld::error::LexiconError;
use bjld::lexicon::{self, GrammarCategory, NewWord};
use bjld::overrides::{OverrideSource, SyllableOverrides};
use bjld::repair::{RepairFailure, SkipReason, repair_syllables};
use bjld::syllable_aligner::SyllableRecord;

use pretty_assertions::assert_eq;

/// Words as imported from the spreadsheet, with the erhua glued to the
/// previous syllable.
fn seeded_db() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    lexicon::init_schema(&conn).unwrap();
    for (characters, pinyin) in [
        ("玩儿命", "wánr mìng"),
        ("豆汁儿", "dòu zhīr"),
        ("门儿清", "ménr qīng"),
    ] {
        let word = NewWord {
            chinese_characters: characters.to_owned(),
            pinyin: pinyin.to_owned(),
            english_definition: "definition".to_owned(),
            putonghua_definition: "释义".to_owned(),
            grammar_category: GrammarCategory::Sayings,
            audio: None,
            syllables: None,
            examples: vec![],
        };
        lexicon::create_word(&mut conn, &word).unwrap();
    }
    conn
}

fn all_syllables(conn: &Connection) -> Vec<(i64, String, String, u8, u32)> {
    let mut stmt = conn
        .prepare(
            "SELECT word_id, character, syllable, tone_number, position FROM pinyin_syllables ORDER BY word_id, position",
        )
        .unwrap();
    stmt.query_map([], |row| {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
    })
    .unwrap()
    .collect::<rusqlite::Result<Vec<_>>>()
    .unwrap()
}

const OVERRIDES: &str = "\
1 |玩儿命| wá r mìng
2 dòu zhī
3 |门儿清| mén r qīng
";

#[test]
fn test_repair_skips_mismatch_and_continues() {
    let mut conn = seeded_db();
    let before = lexicon::find_syllables(&conn, 2).unwrap();
    assert!(before.iter().all(SyllableRecord::is_unparsed));

    let overrides = SyllableOverrides::from_txt(OVERRIDES).unwrap();
    let report = repair_syllables(&mut conn, &overrides).unwrap();
    assert_eq!(report.repaired_count, 2);
    assert_eq!(report.failed_count, 1);
    assert_eq!(
        report.failures,
        vec![RepairFailure {
            word_id: 2,
            reason: SkipReason::CountMismatch {
                characters: 3,
                syllables: 2
            },
        }]
    );

    assert_eq!(lexicon::find_syllables(&conn, 2).unwrap(), before);
    assert_eq!(
        lexicon::find_syllables(&conn, 1).unwrap(),
        vec![
            SyllableRecord::derived("玩", "wá", 0),
            SyllableRecord::derived("儿", "r", 1),
            SyllableRecord::derived("命", "mìng", 2),
        ]
    );
    let tones: Vec<u8> = lexicon::find_syllables(&conn, 3)
        .unwrap()
        .iter()
        .map(|s| s.tone_number)
        .collect();
    assert_eq!(tones, vec![2, 0, 1]);

    // the word row keeps the pinyin as entered
    let word = lexicon::get_word(&conn, 1).unwrap().unwrap();
    assert_eq!(word.pinyin, "wánr mìng");
}

#[test]
fn test_repair_is_idempotent() {
    let mut conn = seeded_db();
    let overrides = SyllableOverrides::from_txt(OVERRIDES).unwrap();
    let first = repair_syllables(&mut conn, &overrides).unwrap();
    let after_first = all_syllables(&conn);
    let second = repair_syllables(&mut conn, &overrides).unwrap();
    assert_eq!(first, second);
    assert_eq!(all_syllables(&conn), after_first);
}

#[test]
fn test_repair_reports_missing_word_and_other_characters() {
    let mut conn = seeded_db();
    let overrides = SyllableOverrides::from_txt("3 |门清| mén qīng\n42 nǎ r\n").unwrap();
    let report = repair_syllables(&mut conn, &overrides).unwrap();
    assert_eq!(report.repaired_count, 0);
    assert_eq!(
        report.failures,
        vec![
            RepairFailure {
                word_id: 3,
                reason: SkipReason::CharactersDiffer {
                    expected: "门清".to_owned(),
                    stored: "门儿清".to_owned()
                },
            },
            RepairFailure {
                word_id: 42,
                reason: SkipReason::WordNotFound,
            },
        ]
    );
}

#[test]
fn test_database_error_rolls_back_everything() {
    let mut conn = seeded_db();
    conn.execute_batch(
        r"
        CREATE TRIGGER reject_word_3 BEFORE INSERT ON pinyin_syllables
        WHEN NEW.word_id = 3
        BEGIN
            SELECT RAISE(ABORT, 'word 3 is locked');
        END;
        ",
    )
    .unwrap();
    let before = all_syllables(&conn);

    let overrides = SyllableOverrides::from_txt(OVERRIDES).unwrap();
    let result = repair_syllables(&mut conn, &overrides);
    assert!(matches!(result, Err(LexiconError::Sqlite(_))));
    // word 1 was repaired before the failure, but nothing is committed
    assert_eq!(all_syllables(&conn), before);
}

#[test]
fn test_check_finds_unparsed_until_repaired() {
    let mut conn = seeded_db();
    let issues = db_check::check_entries(&conn).unwrap();
    let word_ids: Vec<i64> = issues.iter().map(|i| i.word_id).collect();
    assert_eq!(word_ids, vec![1, 2, 3]);

    let overrides = SyllableOverrides::from_txt(OVERRIDES).unwrap();
    repair_syllables(&mut conn, &overrides).unwrap();
    let issues = db_check::check_entries(&conn).unwrap();
    let word_ids: Vec<i64> = issues.iter().map(|i| i.word_id).collect();
    assert_eq!(word_ids, vec![2]);
}

#[test]
fn test_repair_from_in_memory_table() {
    let mut conn = seeded_db();
    let table = BTreeMap::from([
        (1, vec!["wá".to_owned(), "r".to_owned(), "mìng".to_owned()]),
        (2, vec!["dòu".to_owned(), "zhī".to_owned(), "r".to_owned()]),
    ]);
    let overrides = SyllableOverrides::try_from(table).unwrap().load().unwrap();
    let report = repair_syllables(&mut conn, &overrides).unwrap();
    assert_eq!(report.repaired_count, 2);
    assert_eq!(report.failed_count, 0);

    let syllables: Vec<String> = lexicon::find_syllables(&conn, 2)
        .unwrap()
        .into_iter()
        .map(|s| s.syllable)
        .collect();
    assert_eq!(syllables, vec!["dòu", "zhī", "r"]);
    // not in the table, still unparsed
    assert!(lexicon::find_syllables(&conn, 3)
        .unwrap()
        .iter()
        .all(SyllableRecord::is_unparsed));
}
