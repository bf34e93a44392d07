use crate::config::{
    AUDIO_MIME_TYPES, MAX_AUDIO_FILE_SIZE, MAX_CHARACTERS_LEN, MAX_DEFINITION_LEN,
    MAX_EXAMPLES_PER_WORD, MAX_PINYIN_LEN, MAX_SENTENCE_LEN,
};
use crate::error::{FieldError, ValidationError};
use crate::lexicon::{AudioFile, NewExample, NewWord};
use crate::syllable_aligner::SyllableRecord;

fn check_len(errors: &mut Vec<FieldError>, field: &str, value: &str, max: usize) {
    let len = value.trim().chars().count();
    if len == 0 {
        errors.push(FieldError::new(field, "must not be empty"));
    } else if len > max {
        errors.push(FieldError::new(
            field,
            format!("must not exceed {max} characters"),
        ));
    }
}

/// Check a word before it is stored. Collects every problem instead of
/// stopping at the first one.
pub fn validate_new_word(word: &NewWord) -> Result<(), ValidationError> {
    let mut errors = vec![];
    check_len(
        &mut errors,
        "chinese_characters",
        &word.chinese_characters,
        MAX_CHARACTERS_LEN,
    );
    check_len(&mut errors, "pinyin", &word.pinyin, MAX_PINYIN_LEN);
    check_len(
        &mut errors,
        "english_definition",
        &word.english_definition,
        MAX_DEFINITION_LEN,
    );
    check_len(
        &mut errors,
        "putonghua_definition",
        &word.putonghua_definition,
        MAX_DEFINITION_LEN,
    );

    if word.examples.len() > MAX_EXAMPLES_PER_WORD {
        errors.push(FieldError::new(
            "examples",
            format!("maximum {MAX_EXAMPLES_PER_WORD} example sentences allowed"),
        ));
    }
    for (idx, example) in word.examples.iter().enumerate() {
        check_example(&mut errors, &format!("examples.{idx}."), example);
    }

    if let Some(syllables) = &word.syllables {
        if !syllables.is_empty() {
            check_explicit_syllables(&mut errors, word.chinese_characters.trim(), syllables);
        }
    }
    if let Some(audio) = &word.audio {
        check_audio(&mut errors, audio);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { errors })
    }
}

fn check_example(errors: &mut Vec<FieldError>, prefix: &str, example: &NewExample) {
    check_len(
        errors,
        &format!("{prefix}chinese_sentence"),
        &example.chinese_sentence,
        MAX_SENTENCE_LEN,
    );
    if let Some(translation) = &example.english_translation {
        if translation.chars().count() > MAX_SENTENCE_LEN {
            errors.push(FieldError::new(
                format!("{prefix}english_translation"),
                format!("must not exceed {MAX_SENTENCE_LEN} characters"),
            ));
        }
    }
}

/// Check a single example sentence added to an existing word.
pub fn validate_example(example: &NewExample) -> Result<(), ValidationError> {
    let mut errors = vec![];
    check_example(&mut errors, "", example);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { errors })
    }
}

fn check_explicit_syllables(
    errors: &mut Vec<FieldError>,
    characters: &str,
    syllables: &[SyllableRecord],
) {
    for (idx, syllable) in syllables.iter().enumerate() {
        if syllable.tone_number > 4 {
            errors.push(FieldError::new(
                format!("syllables.{idx}.tone_number"),
                "must be between 0 and 4",
            ));
        }
        if syllable.syllable.trim().is_empty() {
            errors.push(FieldError::new(
                format!("syllables.{idx}.syllable"),
                "must not be empty",
            ));
        }
        if syllable.character.chars().count() != 1 {
            errors.push(FieldError::new(
                format!("syllables.{idx}.character"),
                "must be exactly one character",
            ));
        }
    }

    let mut ordered: Vec<&SyllableRecord> = syllables.iter().collect();
    ordered.sort_by_key(|s| s.position);
    let dense = ordered
        .iter()
        .zip(0u32..)
        .all(|(s, expected)| s.position == expected);
    if !dense {
        errors.push(FieldError::new(
            "syllables",
            "positions must be 0..n-1 without gaps or duplicates",
        ));
        return;
    }
    let joined: String = ordered.iter().map(|s| s.character.as_str()).collect();
    if joined != characters {
        errors.push(FieldError::new(
            "syllables",
            format!("characters '{joined}' do not match '{characters}'"),
        ));
    }
}

fn check_audio(errors: &mut Vec<FieldError>, audio: &AudioFile) {
    if audio.path.trim().is_empty() {
        errors.push(FieldError::new("audio.path", "must not be empty"));
    }
    if u64::from(audio.size) > MAX_AUDIO_FILE_SIZE {
        errors.push(FieldError::new(
            "audio.size",
            format!("must not exceed {MAX_AUDIO_FILE_SIZE} bytes"),
        ));
    }
    if !AUDIO_MIME_TYPES.contains(&audio.mime_type.as_str()) {
        errors.push(FieldError::new(
            "audio.mime_type",
            format!("unsupported audio type {}", audio.mime_type),
        ));
    }
}
