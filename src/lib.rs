pub mod common;
pub mod config;
pub mod csv_import;
pub mod db_check;
pub mod error;
pub mod lexicon;
pub mod overrides;
pub mod pinyin;
pub mod render;
pub mod repair;
pub mod syllable_aligner;
pub mod tone_marks;
pub mod validate;
