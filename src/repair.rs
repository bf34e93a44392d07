//! Replace the stored syllables of known-bad words with curated ones.

use rusqlite::{Connection, OptionalExtension, Transaction};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::common::{SqliteId, split_characters};
use crate::error::Result;
use crate::lexicon::{delete_syllables, find_syllables, insert_syllables};
use crate::overrides::{OverrideEntry, SyllableOverrides};
use crate::syllable_aligner::SyllableRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    WordNotFound,
    CountMismatch { characters: usize, syllables: usize },
    CharactersDiffer { expected: String, stored: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RepairOutcome {
    Repaired,
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepairFailure {
    pub word_id: SqliteId,
    #[serde(flatten)]
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RepairReport {
    pub repaired_count: usize,
    pub failed_count: usize,
    pub failures: Vec<RepairFailure>,
}

/// Apply all overrides in one transaction.
///
/// Words whose stored characters do not fit the curated syllables are
/// skipped and counted as failed. Any database error rolls back the whole
/// run, so either every applicable word is repaired or none is.
pub fn repair_syllables(
    conn: &mut Connection,
    overrides: &SyllableOverrides,
) -> Result<RepairReport> {
    let tx = conn.transaction()?;
    let report = repair_all(&tx, overrides)?;
    tx.commit()?;
    info!(
        repaired = report.repaired_count,
        failed = report.failed_count,
        "syllable repair complete"
    );
    Ok(report)
}

fn repair_all(tx: &Transaction, overrides: &SyllableOverrides) -> Result<RepairReport> {
    let mut report = RepairReport::default();
    for entry in overrides.iter() {
        match repair_word(tx, entry)? {
            RepairOutcome::Repaired => report.repaired_count += 1,
            RepairOutcome::Skipped(reason) => {
                report.failed_count += 1;
                report.failures.push(RepairFailure {
                    word_id: entry.word_id,
                    reason,
                });
            }
        }
    }
    Ok(report)
}

/// Replace all syllables of one word. The tone numbers are always derived
/// from the curated syllable text.
pub fn repair_word(tx: &Transaction, entry: &OverrideEntry) -> Result<RepairOutcome> {
    let word_id = entry.word_id;
    let stored: Option<(String, String)> = tx
        .prepare_cached("SELECT chinese_characters, pinyin FROM words WHERE id=?1")?
        .query_row((word_id,), |row| Ok((row.get(0)?, row.get(1)?)))
        .optional()?;
    let Some((stored_characters, pinyin)) = stored else {
        warn!(word_id, "word not found, skipping");
        return Ok(RepairOutcome::Skipped(SkipReason::WordNotFound));
    };

    if let Some(expected) = &entry.characters {
        if *expected != stored_characters {
            warn!(
                word_id,
                expected = %expected,
                stored = %stored_characters,
                "curated characters differ from stored word, skipping"
            );
            return Ok(RepairOutcome::Skipped(SkipReason::CharactersDiffer {
                expected: expected.clone(),
                stored: stored_characters,
            }));
        }
    }

    let characters = split_characters(&stored_characters);
    if characters.len() != entry.syllables.len() {
        warn!(
            word_id,
            characters = %stored_characters,
            character_count = characters.len(),
            syllable_count = entry.syllables.len(),
            "syllable count does not match character count, skipping"
        );
        return Ok(RepairOutcome::Skipped(SkipReason::CountMismatch {
            characters: characters.len(),
            syllables: entry.syllables.len(),
        }));
    }

    let previous = find_syllables(tx, word_id)?;
    debug!(word_id, previous = previous.len(), "replacing syllables");
    delete_syllables(tx, word_id)?;
    let syllables: Vec<SyllableRecord> = (0u32..)
        .zip(characters.iter().zip(&entry.syllables))
        .map(|(position, (character, syllable))| {
            SyllableRecord::derived(character, syllable, position)
        })
        .collect();
    insert_syllables(tx, word_id, &syllables)?;
    info!(word_id, characters = %stored_characters, pinyin = %pinyin, "fixed syllables");
    Ok(RepairOutcome::Repaired)
}
