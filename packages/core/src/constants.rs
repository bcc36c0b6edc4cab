use std::env;
use std::path::PathBuf;

/// Delimiter used when a tag list is given as a single string
pub const DEFAULT_TAG_DELIMITER: &str = ",";

/// Get the path to the Tagger directory (~/.tagger)
pub fn tagger_dir() -> PathBuf {
    // First try HOME environment variable (useful for tests)
    if let Ok(home) = env::var("HOME") {
        PathBuf::from(home).join(".tagger")
    } else {
        dirs::home_dir()
            .map(|home| home.join(".tagger"))
            .unwrap_or_else(|| PathBuf::from(".tagger"))
    }
}

/// Get the path to the default database file (~/.tagger/tagger.db)
pub fn database_file() -> PathBuf {
    tagger_dir().join("tagger.db")
}
