//! Bulk import of words from the spreadsheet exports.
//!
//! Columns: characters, pinyin, category (in Chinese), example sentence,
//! unused, putonghua definition, unused, english definition. The first row
//! is a header.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use itertools::Itertools;
use rusqlite::Connection;
use serde::Serialize;
use tracing::{info, warn};

use crate::common::SqliteId;
use crate::config::{self, MAX_SENTENCE_LEN};
use crate::error::Result;
use crate::lexicon::{NewExample, NewWord, add_example, find_word_by_text, insert_word};
use crate::validate::validate_new_word;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    pub chinese_characters: String,
    pub pinyin: String,
    pub category_name: String,
    pub example: String,
    pub putonghua_definition: String,
    pub english_definition: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportErrorDetail {
    pub word: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ImportStats {
    pub files_processed: usize,
    pub total_rows: usize,
    pub valid_rows: usize,
    pub words_created: usize,
    pub words_needing_review: usize,
    pub examples_created: usize,
    pub duplicates_skipped: usize,
    pub errors: usize,
    pub error_details: Vec<ImportErrorDetail>,
}

impl ImportStats {
    fn error(&mut self, word: &str, error: impl Into<String>) {
        self.errors += 1;
        self.error_details.push(ImportErrorDetail {
            word: word.to_owned(),
            error: error.into(),
        });
    }
}

fn field(record: &StringRecord, idx: usize) -> String {
    record.get(idx).unwrap_or_default().trim().to_owned()
}

/// Row with all required fields, `None` if characters, pinyin, category or
/// either definition is missing.
fn normalize_record(record: &StringRecord) -> Option<CsvRow> {
    let row = CsvRow {
        chinese_characters: field(record, 0),
        pinyin: field(record, 1),
        category_name: field(record, 2),
        example: field(record, 3),
        putonghua_definition: field(record, 5),
        english_definition: field(record, 7),
    };
    let required = [
        &row.chinese_characters,
        &row.pinyin,
        &row.category_name,
        &row.putonghua_definition,
        &row.english_definition,
    ];
    if required.iter().any(|f| f.is_empty()) {
        return None;
    }
    Some(row)
}

/// Read all records, returns the number of data rows and the usable ones.
pub fn read_csv_rows(reader: impl Read) -> Result<(usize, Vec<CsvRow>)> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);
    let mut total = 0;
    let mut rows = vec![];
    for record in csv_reader.records() {
        let record = record?;
        total += 1;
        if record.iter().all(str::is_empty) {
            continue;
        }
        if let Some(row) = normalize_record(&record) {
            rows.push(row);
        }
    }
    Ok((total, rows))
}

/// Import rows in one transaction. Rows for the same characters and pinyin
/// form one word; words that already exist only receive new examples.
/// Invalid words are reported in the stats, database errors abort the
/// whole import.
pub fn import_rows(conn: &mut Connection, rows: Vec<CsvRow>, stats: &mut ImportStats) -> Result<()> {
    stats.valid_rows += rows.len();
    // group by word, keep first-seen order
    let groups: HashMap<(String, String), Vec<(usize, CsvRow)>> = rows
        .into_iter()
        .enumerate()
        .into_group_map_by(|(_, row)| (row.chinese_characters.clone(), row.pinyin.clone()));
    let groups = groups
        .into_values()
        .sorted_by_key(|group| group.first().map(|(idx, _)| *idx))
        .map(|group| group.into_iter().map(|(_, row)| row).collect::<Vec<_>>());
    info!(words = groups.len(), "importing words");

    let tx = conn.transaction()?;
    for group in groups {
        import_word_group(&tx, &group, stats)?;
    }
    tx.commit()?;
    Ok(())
}

fn import_word_group(conn: &Connection, rows: &[CsvRow], stats: &mut ImportStats) -> Result<()> {
    let Some(first) = rows.first() else {
        return Ok(());
    };
    let word_label = &first.chinese_characters;

    let Some(grammar_category) = config::grammar_category_from_chinese(&first.category_name) else {
        warn!(category = %first.category_name, word = %word_label, "unknown grammar category");
        stats.error(
            word_label,
            format!("Invalid grammar category: {}", first.category_name),
        );
        return Ok(());
    };

    let word_id = if let Some(existing) = find_word_by_text(conn, &first.chinese_characters, &first.pinyin)? {
        warn!(word = %word_label, pinyin = %first.pinyin, "word already exists");
        stats.duplicates_skipped += 1;
        existing
    } else {
        let new_word = NewWord {
            chinese_characters: first.chinese_characters.clone(),
            pinyin: first.pinyin.clone(),
            english_definition: first.english_definition.clone(),
            putonghua_definition: first.putonghua_definition.clone(),
            grammar_category,
            audio: None,
            syllables: None,
            examples: vec![],
        };
        if let Err(err) = validate_new_word(&new_word) {
            stats.error(word_label, err.to_string());
            return Ok(());
        }
        let (word_id, needs_review) = insert_word(conn, &new_word)?;
        stats.words_created += 1;
        if needs_review {
            stats.words_needing_review += 1;
        }
        info!(word_id, word = %word_label, pinyin = %first.pinyin, "created word");
        word_id
    };

    add_examples(conn, word_id, rows, stats)
}

fn add_examples(
    conn: &Connection,
    word_id: SqliteId,
    rows: &[CsvRow],
    stats: &mut ImportStats,
) -> Result<()> {
    for row in rows.iter().filter(|r| !r.example.is_empty()) {
        if row.example.chars().count() > MAX_SENTENCE_LEN {
            warn!(word_id, "example sentence too long, skipped");
            stats.error(
                &row.chinese_characters,
                format!("Example sentence exceeds {MAX_SENTENCE_LEN} characters"),
            );
            continue;
        }
        add_example(
            conn,
            word_id,
            &NewExample {
                chinese_sentence: row.example.clone(),
                english_translation: Some(String::new()),
            },
        )?;
        stats.examples_created += 1;
    }
    Ok(())
}

/// Read every file first, then import all rows together.
pub fn import_csv_files(conn: &mut Connection, paths: &[impl AsRef<Path>]) -> Result<ImportStats> {
    let mut stats = ImportStats::default();
    let mut all_rows = vec![];
    for path in paths {
        let path = path.as_ref();
        let (total, rows) = read_csv_rows(File::open(path)?)?;
        info!(file = %path.display(), rows = total, valid = rows.len(), "read csv file");
        stats.files_processed += 1;
        stats.total_rows += total;
        all_rows.extend(rows);
    }
    import_rows(conn, all_rows, &mut stats)?;
    Ok(stats)
}
