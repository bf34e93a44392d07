use rusqlite::Connection;

use bjld::error::LexiconError;
use bjld::lexicon::{self, GrammarCategory, NewExample, NewWord, WordQuery};
use bjld::render::render_syllables;
use bjld::syllable_aligner::SyllableRecord;

use pretty_assertions::assert_eq;

fn test_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    lexicon::init_schema(&conn).unwrap();
    conn
}

fn new_word(characters: &str, pinyin: &str, category: GrammarCategory) -> NewWord {
    NewWord {
        chinese_characters: characters.to_owned(),
        pinyin: pinyin.to_owned(),
        english_definition: "definition".to_owned(),
        putonghua_definition: "释义".to_owned(),
        grammar_category: category,
        audio: None,
        syllables: None,
        examples: vec![],
    }
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn test_erhua_word_renders_light_r() {
    let mut conn = test_db();
    let created =
        lexicon::create_word(&mut conn, &new_word("倍儿", "bèi r", GrammarCategory::Adjective))
            .unwrap();
    assert!(!created.needs_review);

    let word = lexicon::get_word(&conn, created.word.id).unwrap().unwrap();
    assert_eq!(word.pinyin, "bèi r");
    assert_eq!(
        word.syllables,
        vec![
            SyllableRecord {
                character: "倍".to_owned(),
                syllable: "bèi".to_owned(),
                tone_number: 4,
                position: 0
            },
            SyllableRecord {
                character: "儿".to_owned(),
                syllable: "r".to_owned(),
                tone_number: 0,
                position: 1
            },
        ]
    );
    let scales: Vec<f32> = render_syllables(&word.syllables)
        .iter()
        .map(|r| r.scale)
        .collect();
    assert_eq!(scales, vec![1.0, 0.65]);
}

#[test]
fn test_unsplit_pinyin_needs_review() {
    let mut conn = test_db();
    let created =
        lexicon::create_word(&mut conn, &new_word("倍儿", "bèir", GrammarCategory::Adjective))
            .unwrap();
    assert!(created.needs_review);
    assert_eq!(created.word.pinyin, "bèir");
    assert_eq!(created.word.syllables.len(), 2);
    assert!(created.word.syllables.iter().all(SyllableRecord::is_unparsed));
}

#[test]
fn test_explicit_syllables_are_stored_as_given() {
    let mut conn = test_db();
    let mut word = new_word("胡同儿", "hútòngr", GrammarCategory::Noun);
    word.syllables = Some(vec![
        SyllableRecord::derived("胡", "hú", 0),
        SyllableRecord::derived("同", "tòng", 1),
        SyllableRecord::derived("儿", "r", 2),
    ]);
    let created = lexicon::create_word(&mut conn, &word).unwrap();
    assert!(!created.needs_review);
    let tones: Vec<u8> = created
        .word
        .syllables
        .iter()
        .map(|s| s.tone_number)
        .collect();
    assert_eq!(tones, vec![2, 4, 0]);
}

#[test]
fn test_invalid_word_is_rejected() {
    let mut conn = test_db();
    let mut word = new_word("倍儿", "bèi r", GrammarCategory::Adjective);
    word.english_definition = "   ".to_owned();
    word.examples = vec![
        NewExample {
            chinese_sentence: "这饭倍儿香。".to_owned(),
            english_translation: None,
        };
        11
    ];
    let Err(LexiconError::Validation(err)) = lexicon::create_word(&mut conn, &word) else {
        panic!("expected a validation error");
    };
    let fields: Vec<&str> = err.errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, vec!["english_definition", "examples"]);
    assert_eq!(count(&conn, "words"), 0);
}

#[test]
fn test_failed_create_stores_nothing() {
    let mut conn = test_db();
    conn.execute_batch(
        r"
        CREATE TRIGGER reject_examples BEFORE INSERT ON example_sentences
        BEGIN
            SELECT RAISE(ABORT, 'examples are read only');
        END;
        ",
    )
    .unwrap();

    let mut word = new_word("倍儿", "bèi r", GrammarCategory::Adjective);
    word.examples = vec![NewExample {
        chinese_sentence: "这饭倍儿香。".to_owned(),
        english_translation: Some("This food is really tasty.".to_owned()),
    }];
    let result = lexicon::create_word(&mut conn, &word);
    assert!(matches!(result, Err(LexiconError::Sqlite(_))));
    assert_eq!(count(&conn, "words"), 0);
    assert_eq!(count(&conn, "pinyin_syllables"), 0);
}

#[test]
fn test_list_stats_and_delete() {
    let mut conn = test_db();
    let mut ids = vec![];
    for (characters, pinyin, category) in [
        ("胡同", "hú tòng", GrammarCategory::Noun),
        ("玩儿命", "wá r mìng", GrammarCategory::Verb),
        ("倍儿", "bèi r", GrammarCategory::Adjective),
        ("豆汁儿", "dòu zhī r", GrammarCategory::Noun),
    ] {
        let mut word = new_word(characters, pinyin, category);
        word.examples = vec![NewExample {
            chinese_sentence: format!("{characters}。"),
            english_translation: None,
        }];
        ids.push(lexicon::create_word(&mut conn, &word).unwrap().word.id);
    }

    let page = lexicon::list_words(
        &conn,
        &WordQuery {
            category: Some(GrammarCategory::Noun),
            limit: Some(1),
            offset: None,
        },
    )
    .unwrap();
    assert_eq!(page.total, 2);
    assert!(page.has_more);
    // newest first
    assert_eq!(page.words[0].chinese_characters, "豆汁儿");
    assert_eq!(page.words[0].syllables.len(), 3);
    assert_eq!(page.words[0].examples.len(), 1);

    let stats = lexicon::word_stats(&conn).unwrap();
    assert_eq!(stats.total, 4);
    assert_eq!(stats.by_category.get(&GrammarCategory::Noun), Some(&2));
    assert_eq!(stats.by_category.get(&GrammarCategory::Sayings), None);

    assert!(lexicon::delete_word(&conn, ids[1]).unwrap());
    assert!(!lexicon::delete_word(&conn, ids[1]).unwrap());
    assert_eq!(lexicon::get_word(&conn, ids[1]).unwrap(), None);
    assert_eq!(count(&conn, "pinyin_syllables"), 2 + 2 + 3);
    assert_eq!(count(&conn, "example_sentences"), 3);
}

#[test]
fn test_find_word_by_text() {
    let mut conn = test_db();
    let id = lexicon::create_word(&mut conn, &new_word("胡同", "hú tòng", GrammarCategory::Noun))
        .unwrap()
        .word
        .id;
    assert_eq!(
        lexicon::find_word_by_text(&conn, "胡同", "hú tòng").unwrap(),
        Some(id)
    );
    assert_eq!(
        lexicon::find_word_by_text(&conn, "胡同", "hútòng").unwrap(),
        None
    );
}

#[test]
fn test_add_example_checks_sentence_and_word() {
    let mut conn = test_db();
    let id = lexicon::create_word(&mut conn, &new_word("倍儿", "bèi r", GrammarCategory::Adjective))
        .unwrap()
        .word
        .id;

    let too_long = NewExample {
        chinese_sentence: "倍".repeat(600),
        english_translation: None,
    };
    let Err(LexiconError::Validation(err)) = lexicon::add_example(&conn, id, &too_long) else {
        panic!("expected a validation error");
    };
    assert_eq!(err.errors[0].field, "chinese_sentence");

    let example = NewExample {
        chinese_sentence: "这饭倍儿香。".to_owned(),
        english_translation: None,
    };
    assert!(matches!(
        lexicon::add_example(&conn, id + 100, &example),
        Err(LexiconError::WordNotFound(missing)) if missing == id + 100
    ));
    assert_eq!(count(&conn, "example_sentences"), 0);

    lexicon::add_example(&conn, id, &example).unwrap();
    let word = lexicon::get_word(&conn, id).unwrap().unwrap();
    assert_eq!(word.examples.len(), 1);
    assert_eq!(word.examples[0].chinese_sentence, "这饭倍儿香。");
}

#[test]
fn test_schema_tables() {
    let conn = test_db();
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
        .unwrap();
    let tables: Vec<String> = stmt
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<rusqlite::Result<_>>()
        .unwrap();
    assert_eq!(tables, vec!["example_sentences", "pinyin_syllables", "words"]);
}
