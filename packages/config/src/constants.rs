// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names used across Tagger

// Database Configuration
pub const TAGGER_DATABASE_PATH: &str = "TAGGER_DATABASE_PATH";
pub const TAGGER_DB_MAX_CONNECTIONS: &str = "TAGGER_DB_MAX_CONNECTIONS";
pub const TAGGER_DB_BUSY_TIMEOUT_SECS: &str = "TAGGER_DB_BUSY_TIMEOUT_SECS";
pub const TAGGER_DB_ENABLE_WAL: &str = "TAGGER_DB_ENABLE_WAL";

// Tagging Behavior
pub const TAGGER_TAG_DELIMITER: &str = "TAGGER_TAG_DELIMITER";
