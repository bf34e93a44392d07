pub type SqliteId = i64;

/// Split into Unicode code points, one string per character.
pub fn split_characters(characters: &str) -> Vec<String> {
    characters.chars().map(String::from).collect()
}
