use crate::lexicon::GrammarCategory;

pub const DEFAULT_DB_PATH: &str = "bjld.db";

/// Syllable text of records produced by the fallback alignment, marks the
/// word for manual repair.
pub const UNPARSED_SYLLABLE: &str = "?";

pub const LIGHT_TONE_SCALE: f32 = 0.65;
pub const FULL_TONE_SCALE: f32 = 1.0;

pub const MAX_CHARACTERS_LEN: usize = 50;
pub const MAX_PINYIN_LEN: usize = 200;
pub const MAX_DEFINITION_LEN: usize = 500;
pub const MAX_SENTENCE_LEN: usize = 500;
pub const MAX_EXAMPLES_PER_WORD: usize = 10;

pub const MAX_AUDIO_FILE_SIZE: u64 = 10 * 1024 * 1024;
pub const AUDIO_MIME_TYPES: &[&str] = &[
    "audio/mpeg",
    "audio/mp3",
    "audio/wav",
    "audio/x-wav",
    "audio/webm",
    "audio/ogg",
    "audio/mp4",
    "audio/x-m4a",
];

pub const DEFAULT_PAGE_LIMIT: u32 = 50;

/// Curated erhua mapping shipped with the tool, used by `repair` when no
/// other override file is given.
pub const BUNDLED_OVERRIDES: &str = include_str!("../data/syllable_overrides.txt");

pub const DB_SCHEMA: &str = r#"

PRAGMA foreign_keys = ON;
PRAGMA user_version = 1;

CREATE TABLE IF NOT EXISTS "words" (
	"id" INTEGER NOT NULL UNIQUE,
	"chinese_characters" TEXT NOT NULL CHECK (length("chinese_characters") BETWEEN 1 AND 50),
	"pinyin" TEXT NOT NULL CHECK (length("pinyin") >= 1),
	"english_definition" TEXT NOT NULL CHECK (length("english_definition") BETWEEN 1 AND 500),
	"putonghua_definition" TEXT NOT NULL CHECK (length("putonghua_definition") BETWEEN 1 AND 500),
	"grammar_category" TEXT NOT NULL CHECK ("grammar_category" IN ('Noun', 'Verb', 'Adjective', 'Sayings')),
	"audio_file_path" TEXT,
	"audio_file_size" INTEGER CHECK ("audio_file_size" BETWEEN 0 AND 10485760),
	"audio_mime_type" TEXT,
	"created_at" TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
	"updated_at" TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
	PRIMARY KEY("id")
);

CREATE INDEX IF NOT EXISTS "words_index_0"
ON "words" ("chinese_characters", "pinyin");
CREATE INDEX IF NOT EXISTS "words_index_1"
ON "words" ("grammar_category");

/* position is the zero-based, gap free order of the syllable within its word */
CREATE TABLE IF NOT EXISTS "pinyin_syllables" (
	"id" INTEGER NOT NULL UNIQUE,
	"word_id" INTEGER NOT NULL,
	"syllable" TEXT NOT NULL CHECK (length("syllable") >= 1),
	"character" TEXT NOT NULL CHECK (length("character") >= 1),
	"tone_number" INTEGER NOT NULL CHECK ("tone_number" BETWEEN 0 AND 4), -- 0 = neutral/light, 1-4 = standard tones
	"position" INTEGER NOT NULL CHECK ("position" >= 0),
	PRIMARY KEY("id"),
	FOREIGN KEY ("word_id") REFERENCES "words"("id")
	ON UPDATE NO ACTION ON DELETE CASCADE
);

CREATE UNIQUE INDEX IF NOT EXISTS "pinyin_syllables_index_0"
ON "pinyin_syllables" ("word_id", "position");

CREATE TABLE IF NOT EXISTS "example_sentences" (
	"id" INTEGER NOT NULL UNIQUE,
	"word_id" INTEGER NOT NULL,
	"chinese_sentence" TEXT NOT NULL CHECK (length("chinese_sentence") BETWEEN 1 AND 500),
	"english_translation" TEXT DEFAULT '',
	PRIMARY KEY("id"),
	FOREIGN KEY ("word_id") REFERENCES "words"("id")
	ON UPDATE NO ACTION ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS "example_sentences_index_0"
ON "example_sentences" ("word_id");

"#;

/// Grammar category for the Chinese category names used in the source
/// spreadsheets (including a common typo).
pub fn grammar_category_from_chinese(name: &str) -> Option<GrammarCategory> {
    Some(match name {
        "名词" | "名次" => GrammarCategory::Noun,
        "动词" => GrammarCategory::Verb,
        "形容词" => GrammarCategory::Adjective,
        "感叹词" | "说法" => GrammarCategory::Sayings,
        _ => {
            return None;
        }
    })
}
