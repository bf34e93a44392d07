/*
Curated syllable overrides

Words whose syllables cannot be split automatically (mostly erhua, where the
retroflex "r" is written together with the preceding syllable) get their
correct syllables from a hand maintained list. Two formats are accepted.

Text format, one word per line:

  # comment
  9 |您搁哪儿呢| nín gé nǎ r ne   # trailing comment
  28 tēi

override_line = word_id [ "|" characters "|" ] syllable { syllable } [ "#" comment ]
syllable      = any run of non-whitespace characters except "#" and "|"

The characters are optional; when given, repair also checks them against the
stored word.

JSON format, word id to syllable list:

  { "9": ["nín", "gé", "nǎ", "r", "ne"], "28": ["tēi"] }
*/

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use nom::{
    IResult, Parser,
    bytes::complete::take_while1,
    character::complete::{char, i64, multispace0, multispace1},
    combinator::{all_consuming, opt, rest},
    multi::many1,
    sequence::{delimited, preceded, terminated},
};

use crate::common::SqliteId;
use crate::config;
use crate::error::OverrideError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideEntry {
    pub word_id: SqliteId,
    pub characters: Option<String>,
    pub syllables: Vec<String>,
}

/// Word id to correct syllables, iterated in ascending word id order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyllableOverrides {
    entries: BTreeMap<SqliteId, OverrideEntry>,
}

/// Anything that can supply the curated overrides: a file, the bundled list
/// or an in-memory table.
pub trait OverrideSource {
    fn load(&self) -> Result<SyllableOverrides, OverrideError>;
}

impl SyllableOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: OverrideEntry) -> Result<(), OverrideError> {
        if entry.syllables.is_empty() {
            return Err(OverrideError::EmptySyllables(entry.word_id));
        }
        match self.entries.entry(entry.word_id) {
            Entry::Occupied(_) => Err(OverrideError::DuplicateWordId(entry.word_id)),
            Entry::Vacant(v) => {
                v.insert(entry);
                Ok(())
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &OverrideEntry> {
        self.entries.values()
    }

    pub fn get(&self, word_id: SqliteId) -> Option<&OverrideEntry> {
        self.entries.get(&word_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn from_txt(txt: &str) -> Result<Self, OverrideError> {
        let mut overrides = Self::new();
        for (idx, line) in txt.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let entry = parse_override_line(trimmed)
                .map(|(_, entry)| entry)
                .map_err(|_| OverrideError::Parse {
                    line_num: idx + 1,
                    line: line.to_owned(),
                })?;
            overrides.insert(entry)?;
        }
        Ok(overrides)
    }

    pub fn from_json(json: &str) -> Result<Self, OverrideError> {
        let map: BTreeMap<SqliteId, Vec<String>> = serde_json::from_str(json)?;
        Self::try_from(map)
    }
}

/// In-memory table of word id to syllables, checked like every other source.
impl TryFrom<BTreeMap<SqliteId, Vec<String>>> for SyllableOverrides {
    type Error = OverrideError;

    fn try_from(map: BTreeMap<SqliteId, Vec<String>>) -> Result<Self, Self::Error> {
        let mut overrides = Self::new();
        for (word_id, syllables) in map {
            overrides.insert(OverrideEntry {
                word_id,
                characters: None,
                syllables,
            })?;
        }
        Ok(overrides)
    }
}

impl OverrideSource for SyllableOverrides {
    fn load(&self) -> Result<SyllableOverrides, OverrideError> {
        Ok(self.clone())
    }
}

/// The list compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledOverrides;

impl OverrideSource for BundledOverrides {
    fn load(&self) -> Result<SyllableOverrides, OverrideError> {
        SyllableOverrides::from_txt(config::BUNDLED_OVERRIDES)
    }
}

/// Override file, `.json` files are read as JSON, anything else as text.
#[derive(Debug, Clone)]
pub struct OverrideFile {
    pub path: PathBuf,
}

impl OverrideFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        OverrideFile {
            path: path.as_ref().to_owned(),
        }
    }
}

impl OverrideSource for OverrideFile {
    fn load(&self) -> Result<SyllableOverrides, OverrideError> {
        let content = fs::read_to_string(&self.path)?;
        if self.path.extension().and_then(OsStr::to_str) == Some("json") {
            SyllableOverrides::from_json(&content)
        } else {
            SyllableOverrides::from_txt(&content)
        }
    }
}

fn parse_override_line(line: &str) -> IResult<&str, OverrideEntry> {
    let characters = delimited(
        char('|'),
        take_while1(|c: char| c != '|'),
        delimited(multispace0, char('|'), multispace0),
    );
    let syllable = delimited(
        multispace0,
        take_while1(|c: char| !c.is_whitespace() && !"#|".contains(c)),
        multispace0,
    );
    let comment = preceded(char('#'), rest);

    let (remainder, (word_id, characters, syllables, _)) = all_consuming((
        terminated(i64, multispace1),
        opt(characters),
        many1(syllable),
        opt(comment),
    ))
    .parse(line)?;
    Ok((
        remainder,
        OverrideEntry {
            word_id,
            characters: characters.map(|c: &str| c.trim().to_owned()),
            syllables: syllables.into_iter().map(str::to_owned).collect(),
        },
    ))
}
