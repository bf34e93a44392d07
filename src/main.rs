use bjld::common::SqliteId;
use bjld::config;
use bjld::csv_import;
use bjld::db_check;
use bjld::lexicon::{self, AudioFile, GrammarCategory, NewExample, NewWord, WordQuery};
use bjld::overrides::{BundledOverrides, OverrideFile, OverrideSource};
use bjld::render::render_syllables;
use bjld::repair;
use bjld::syllable_aligner::{SyllableRecord, parse_pinyin};

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use rusqlite::Connection;
use serde::Serialize;
use serde_json::json;

#[derive(Parser)]
#[command(name = "BJLD Tool")]
#[command(version = "0.1.0")]
#[command(about = "Beijingnese Library Dictionary Tool", long_about = None)]
struct Cli {
    /// Lexicon database (sqlite)
    #[arg(long, env = "BJLD_DB", default_value = config::DEFAULT_DB_PATH, global = true)]
    db: PathBuf,

    /// Log progress, not only warnings
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the database schema
    Init,
    /// Add a word with its syllables and example sentences
    Add(AddArgs),
    /// Show a word with the font scale of each syllable
    Show { id: SqliteId },
    /// List words, newest first
    List {
        #[arg(long)]
        category: Option<GrammarCategory>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u32>,
    },
    /// Delete a word with its syllables and examples
    Delete { id: SqliteId },
    /// Number of words per grammar category
    Stats,
    /// Split pinyin into syllables without touching the database
    Parse { pinyin: String, characters: String },
    /// Import words from spreadsheet csv exports
    ImportCsv {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Replace the syllables of known-bad words with curated ones
    Repair {
        /// Override list as .txt or .json, the bundled list is used if omitted
        #[arg(long)]
        overrides: Option<PathBuf>,
    },
    /// Check stored syllables for inconsistencies
    Check,
}

#[derive(Args)]
struct AddArgs {
    #[arg(long)]
    characters: String,
    #[arg(long)]
    pinyin: String,
    #[arg(long)]
    english: String,
    #[arg(long)]
    putonghua: String,
    #[arg(long)]
    category: GrammarCategory,
    /// Explicit syllables as JSON: [{"character", "syllable", "tone_number", "position"}, ...]
    #[arg(long)]
    syllables: Option<String>,
    /// Example sentence as "chinese" or "chinese|english", can be repeated
    #[arg(long = "example")]
    examples: Vec<String>,
    /// Recorded pronunciation, already stored in the upload directory
    #[arg(long, requires = "audio_mime")]
    audio: Option<PathBuf>,
    #[arg(long)]
    audio_mime: Option<String>,
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "info"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("BJLD_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn open_db(path: &Path) -> anyhow::Result<Connection> {
    lexicon::open_lexicon(path).context(format!("Could not open sqlite file {}", path.display()))
}

fn parse_example(example: &str) -> NewExample {
    match example.split_once('|') {
        Some((chinese, english)) => NewExample {
            chinese_sentence: chinese.trim().to_owned(),
            english_translation: Some(english.trim().to_owned()),
        },
        None => NewExample {
            chinese_sentence: example.trim().to_owned(),
            english_translation: None,
        },
    }
}

fn audio_file(path: &Path, mime_type: &str) -> anyhow::Result<AudioFile> {
    let metadata = fs::metadata(path)
        .context(format!("Could not read audio file {}", path.display()))?;
    let size = u32::try_from(metadata.len())
        .context(format!("Audio file too large: {}", path.display()))?;
    Ok(AudioFile {
        path: path.display().to_string(),
        size,
        mime_type: mime_type.to_owned(),
    })
}

fn add_word(conn: &mut Connection, args: AddArgs) -> anyhow::Result<()> {
    let syllables: Option<Vec<SyllableRecord>> = args
        .syllables
        .as_deref()
        .map(|json| serde_json::from_str(json))
        .transpose()
        .context("Invalid syllables JSON")?;
    let audio = match (&args.audio, &args.audio_mime) {
        (Some(path), Some(mime)) => Some(audio_file(path, mime)?),
        _ => None,
    };
    let new_word = NewWord {
        chinese_characters: args.characters,
        pinyin: args.pinyin,
        english_definition: args.english,
        putonghua_definition: args.putonghua,
        grammar_category: args.category,
        audio,
        syllables,
        examples: args.examples.iter().map(String::as_str).map(parse_example).collect(),
    };
    let created = lexicon::create_word(conn, &new_word)?;
    if created.needs_review {
        eprintln!(
            "Pinyin could not be split into one syllable per character, run repair or add the word with explicit syllables"
        );
    }
    print_json(&created)
}

fn repair(conn: &mut Connection, overrides_path: Option<&Path>) -> anyhow::Result<bool> {
    let overrides = match overrides_path {
        Some(path) => OverrideFile::new(path)
            .load()
            .context(format!("Could not load overrides {}", path.display()))?,
        None => BundledOverrides.load()?,
    };
    let report = repair::repair_syllables(conn, &overrides)?;
    print_json(&report)?;
    Ok(report.failed_count == 0)
}

fn check(conn: &Connection) -> anyhow::Result<bool> {
    let issues = db_check::check_entries(conn)?;
    for issue in &issues {
        eprintln!("{issue}");
    }
    if issues.is_empty() {
        eprintln!("Check ok!");
    }
    print_json(&issues)?;
    Ok(issues.is_empty())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;
    let mut status_ok = true;

    match cli.command {
        Command::Parse { pinyin, characters } => {
            let parsed = parse_pinyin(&pinyin, &characters);
            let rendered = render_syllables(&parsed.syllables);
            print_json(&json!({ "parsed": parsed, "rendered": rendered }))?;
        }
        Command::Init => {
            open_db(&cli.db)?;
            eprintln!("Initialized {}", cli.db.display());
        }
        Command::Add(args) => {
            let mut conn = open_db(&cli.db)?;
            add_word(&mut conn, args)?;
        }
        Command::Show { id } => {
            let conn = open_db(&cli.db)?;
            let Some(word) = lexicon::get_word(&conn, id)? else {
                bail!("Word not found: {id}");
            };
            let rendered = render_syllables(&word.syllables);
            print_json(&json!({ "word": word, "rendered": rendered }))?;
        }
        Command::List {
            category,
            limit,
            offset,
        } => {
            let conn = open_db(&cli.db)?;
            let page = lexicon::list_words(
                &conn,
                &WordQuery {
                    category,
                    limit,
                    offset,
                },
            )?;
            print_json(&page)?;
        }
        Command::Delete { id } => {
            let conn = open_db(&cli.db)?;
            if !lexicon::delete_word(&conn, id)? {
                bail!("Word not found: {id}");
            }
            eprintln!("Deleted word {id}");
        }
        Command::Stats => {
            let conn = open_db(&cli.db)?;
            print_json(&lexicon::word_stats(&conn)?)?;
        }
        Command::ImportCsv { files } => {
            let mut conn = open_db(&cli.db)?;
            let stats = csv_import::import_csv_files(&mut conn, files.as_slice())?;
            for detail in &stats.error_details {
                eprintln!("{}: {}", detail.word, detail.error);
            }
            status_ok = stats.errors == 0;
            print_json(&stats)?;
        }
        Command::Repair { overrides } => {
            let mut conn = open_db(&cli.db)?;
            status_ok = repair(&mut conn, overrides.as_deref())?;
        }
        Command::Check => {
            let conn = open_db(&cli.db)?;
            status_ok = check(&conn)?;
        }
    }

    if status_ok {
        Ok(())
    } else {
        Err(anyhow!("Failure!"))
    }
}
