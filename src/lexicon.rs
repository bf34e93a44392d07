//! Storage of words, their pinyin syllables and example sentences.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::common::SqliteId;
use crate::config;
use crate::error::{LexiconError, Result};
use crate::syllable_aligner::{SyllableRecord, parse_pinyin};
use crate::validate::{validate_example, validate_new_word};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GrammarCategory {
    Noun,
    Verb,
    Adjective,
    Sayings,
}

impl GrammarCategory {
    pub const ALL: [GrammarCategory; 4] = [
        GrammarCategory::Noun,
        GrammarCategory::Verb,
        GrammarCategory::Adjective,
        GrammarCategory::Sayings,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            GrammarCategory::Noun => "Noun",
            GrammarCategory::Verb => "Verb",
            GrammarCategory::Adjective => "Adjective",
            GrammarCategory::Sayings => "Sayings",
        }
    }
}

impl fmt::Display for GrammarCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GrammarCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        GrammarCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                format!("grammar category must be one of: Noun, Verb, Adjective, Sayings (got '{s}')")
            })
    }
}

impl ToSql for GrammarCategory {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for GrammarCategory {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFile {
    pub path: String,
    pub size: u32,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleSentence {
    pub id: SqliteId,
    pub chinese_sentence: String,
    pub english_translation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExample {
    pub chinese_sentence: String,
    #[serde(default)]
    pub english_translation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Word {
    pub id: SqliteId,
    pub chinese_characters: String,
    pub pinyin: String,
    pub english_definition: String,
    pub putonghua_definition: String,
    pub grammar_category: GrammarCategory,
    pub audio: Option<AudioFile>,
    pub created_at: String,
    /// Sorted by position.
    pub syllables: Vec<SyllableRecord>,
    pub examples: Vec<ExampleSentence>,
}

/// Input for `create_word`. Without explicit `syllables` the pinyin string
/// is split and aligned automatically.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewWord {
    pub chinese_characters: String,
    pub pinyin: String,
    pub english_definition: String,
    pub putonghua_definition: String,
    pub grammar_category: GrammarCategory,
    #[serde(default)]
    pub audio: Option<AudioFile>,
    #[serde(default)]
    pub syllables: Option<Vec<SyllableRecord>>,
    #[serde(default)]
    pub examples: Vec<NewExample>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedWord {
    pub word: Word,
    /// Syllables came from the fallback alignment.
    pub needs_review: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WordQuery {
    pub category: Option<GrammarCategory>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordPage {
    pub words: Vec<Word>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
    pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordStats {
    pub total: u64,
    pub by_category: BTreeMap<GrammarCategory, u64>,
}

pub fn open_lexicon(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(config::DB_SCHEMA)?;
    Ok(())
}

/// Validate and store a word together with its syllables and examples in
/// one transaction. Nothing is stored if any part fails.
pub fn create_word(conn: &mut Connection, new_word: &NewWord) -> Result<CreatedWord> {
    validate_new_word(new_word)?;
    let tx = conn.transaction()?;
    let (word_id, needs_review) = insert_word(&tx, new_word)?;
    for example in &new_word.examples {
        add_example(&tx, word_id, example)?;
    }
    tx.commit()?;
    info!(word_id, characters = %new_word.chinese_characters, "word created");

    let word = get_word(conn, word_id)?.ok_or(LexiconError::WordNotFound(word_id))?;
    Ok(CreatedWord { word, needs_review })
}

/// Insert the word row and its syllables, returns the new id and whether the
/// syllables need review. Must run inside the caller's transaction.
pub(crate) fn insert_word(conn: &Connection, new_word: &NewWord) -> Result<(SqliteId, bool)> {
    let characters = new_word.chinese_characters.trim();
    let pinyin = new_word.pinyin.trim();
    let mut stmt = conn.prepare_cached(
        r"
        INSERT INTO words (chinese_characters, pinyin, english_definition, putonghua_definition,
                           grammar_category, audio_file_path, audio_file_size, audio_mime_type)
        VALUES (?1,?2,?3,?4,?5,?6,?7,?8)
        ",
    )?;
    let audio = new_word.audio.as_ref();
    stmt.execute((
        characters,
        pinyin,
        new_word.english_definition.trim(),
        new_word.putonghua_definition.trim(),
        new_word.grammar_category,
        audio.map(|a| a.path.as_str()),
        audio.map(|a| a.size),
        audio.map(|a| a.mime_type.as_str()),
    ))?;
    let word_id = conn.last_insert_rowid();

    let (syllables, needs_review) = match &new_word.syllables {
        Some(explicit) if !explicit.is_empty() => (explicit.clone(), false),
        _ => {
            let parsed = parse_pinyin(pinyin, characters);
            let needs_review = parsed.needs_review();
            (parsed.syllables, needs_review)
        }
    };
    insert_syllables(conn, word_id, &syllables)?;
    Ok((word_id, needs_review))
}

pub fn insert_syllables(
    conn: &Connection,
    word_id: SqliteId,
    syllables: &[SyllableRecord],
) -> Result<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO pinyin_syllables (word_id, syllable, character, tone_number, position) VALUES (?1,?2,?3,?4,?5)",
    )?;
    for s in syllables {
        stmt.execute((word_id, &s.syllable, &s.character, s.tone_number, s.position))?;
    }
    Ok(())
}

pub fn delete_syllables(conn: &Connection, word_id: SqliteId) -> Result<usize> {
    let mut stmt = conn.prepare_cached("DELETE FROM pinyin_syllables WHERE word_id=?1")?;
    Ok(stmt.execute((word_id,))?)
}

pub fn find_syllables(conn: &Connection, word_id: SqliteId) -> Result<Vec<SyllableRecord>> {
    let mut stmt = conn.prepare_cached(
        r"
        SELECT character, syllable, tone_number, position
        FROM pinyin_syllables
        WHERE word_id=?1
        ORDER BY position ASC;
        ",
    )?;
    let rows = stmt.query_map((word_id,), |row| {
        Ok(SyllableRecord {
            character: row.get("character")?,
            syllable: row.get("syllable")?,
            tone_number: row.get("tone_number")?,
            position: row.get("position")?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn find_examples(conn: &Connection, word_id: SqliteId) -> Result<Vec<ExampleSentence>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, chinese_sentence, english_translation FROM example_sentences WHERE word_id=?1 ORDER BY id",
    )?;
    let rows = stmt.query_map((word_id,), |row| {
        Ok(ExampleSentence {
            id: row.get("id")?,
            chinese_sentence: row.get("chinese_sentence")?,
            english_translation: row.get("english_translation")?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Add an example sentence to an existing word.
pub fn add_example(conn: &Connection, word_id: SqliteId, example: &NewExample) -> Result<SqliteId> {
    validate_example(example)?;
    let exists = conn
        .prepare_cached("SELECT 1 FROM words WHERE id=?1")?
        .exists((word_id,))?;
    if !exists {
        return Err(LexiconError::WordNotFound(word_id));
    }
    let mut stmt = conn.prepare_cached(
        "INSERT INTO example_sentences (word_id, chinese_sentence, english_translation) VALUES (?1,?2,?3)",
    )?;
    stmt.execute((
        word_id,
        example.chinese_sentence.trim(),
        example.english_translation.as_deref().map(str::trim),
    ))?;
    Ok(conn.last_insert_rowid())
}

const WORD_COLUMNS: &str = r"
    id, chinese_characters, pinyin, english_definition, putonghua_definition, grammar_category,
    audio_file_path, audio_file_size, audio_mime_type, created_at
";

fn word_from_row(row: &Row) -> rusqlite::Result<Word> {
    let audio_path: Option<String> = row.get("audio_file_path")?;
    let audio = match audio_path {
        Some(path) => Some(AudioFile {
            path,
            size: row.get::<_, Option<u32>>("audio_file_size")?.unwrap_or(0),
            mime_type: row
                .get::<_, Option<String>>("audio_mime_type")?
                .unwrap_or_default(),
        }),
        None => None,
    };
    Ok(Word {
        id: row.get("id")?,
        chinese_characters: row.get("chinese_characters")?,
        pinyin: row.get("pinyin")?,
        english_definition: row.get("english_definition")?,
        putonghua_definition: row.get("putonghua_definition")?,
        grammar_category: row.get("grammar_category")?,
        audio,
        created_at: row.get("created_at")?,
        syllables: vec![],
        examples: vec![],
    })
}

fn with_children(conn: &Connection, mut word: Word) -> Result<Word> {
    word.syllables = find_syllables(conn, word.id)?;
    word.examples = find_examples(conn, word.id)?;
    Ok(word)
}

/// Word with its syllables (sorted by position) and examples.
pub fn get_word(conn: &Connection, word_id: SqliteId) -> Result<Option<Word>> {
    let mut stmt =
        conn.prepare_cached(&format!("SELECT {WORD_COLUMNS} FROM words WHERE id=?1"))?;
    let word = stmt.query_row((word_id,), word_from_row).optional()?;
    word.map(|w| with_children(conn, w)).transpose()
}

pub fn find_word_by_text(
    conn: &Connection,
    chinese_characters: &str,
    pinyin: &str,
) -> Result<Option<SqliteId>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id FROM words WHERE chinese_characters=?1 AND pinyin=?2 ORDER BY id LIMIT 1",
    )?;
    Ok(stmt
        .query_row((chinese_characters, pinyin), |row| row.get(0))
        .optional()?)
}

/// Newest words first, optionally restricted to one grammar category.
pub fn list_words(conn: &Connection, query: &WordQuery) -> Result<WordPage> {
    let limit = query.limit.unwrap_or(config::DEFAULT_PAGE_LIMIT);
    let offset = query.offset.unwrap_or(0);
    let category = query.category.map(GrammarCategory::as_str);

    let mut stmt = conn.prepare_cached(&format!(
        r"
        SELECT {WORD_COLUMNS}
        FROM words
        WHERE ?1 IS NULL OR grammar_category = ?1
        ORDER BY created_at DESC, id DESC
        LIMIT ?2 OFFSET ?3;
        "
    ))?;
    let rows = stmt.query_map((category, limit, offset), word_from_row)?;
    let words = rows
        .collect::<rusqlite::Result<Vec<_>>>()?
        .into_iter()
        .map(|w| with_children(conn, w))
        .collect::<Result<Vec<_>>>()?;

    let total: i64 = conn.query_row(
        "SELECT COUNT(id) FROM words WHERE ?1 IS NULL OR grammar_category = ?1",
        (category,),
        |row| row.get(0),
    )?;
    let total = u64::try_from(total)
        .map_err(|_| LexiconError::InvalidDbData(format!("negative word count {total}")))?;
    let has_more = u64::from(offset) + (words.len() as u64) < total;
    Ok(WordPage {
        words,
        total,
        limit,
        offset,
        has_more,
    })
}

/// Delete a word, its syllables and examples. Returns false if the word did
/// not exist.
pub fn delete_word(conn: &Connection, word_id: SqliteId) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM words WHERE id=?1", (word_id,))?;
    debug!(word_id, deleted, "delete word");
    Ok(deleted > 0)
}

pub fn word_stats(conn: &Connection) -> Result<WordStats> {
    let mut stmt = conn.prepare(
        r"
        SELECT grammar_category, COUNT(id) AS count
        FROM words
        GROUP BY grammar_category;
        ",
    )?;
    let mut rows = stmt.query([])?;
    let mut by_category = BTreeMap::new();
    let mut total = 0;
    while let Some(row) = rows.next()? {
        let category: GrammarCategory = row.get("grammar_category")?;
        let count: u32 = row.get("count")?;
        total += u64::from(count);
        by_category.insert(category, u64::from(count));
    }
    Ok(WordStats { total, by_category })
}
