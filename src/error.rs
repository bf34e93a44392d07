use std::fmt;

use itertools::Itertools;
use rusqlite::Error as SqliteError;
use serde::Serialize;
use thiserror::Error;

use crate::common::SqliteId;

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("Database error: {0}")]
    Sqlite(#[from] SqliteError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Word not found: {0}")]
    WordNotFound(SqliteId),

    #[error("Invalid data in DB: {0}")]
    InvalidDbData(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LexiconError>;

#[derive(Debug, Error)]
pub enum OverrideError {
    #[error("Parser error in line {line_num}: {line}")]
    Parse { line_num: usize, line: String },

    #[error("Duplicate override for word {0}")]
    DuplicateWordId(SqliteId),

    #[error("Empty syllable list for word {0}")]
    EmptySyllables(SqliteId),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        FieldError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// All field errors found for one request, not only the first.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed: {}", self.errors.iter().join("; "))
    }
}
