// ABOUTME: Storage configuration
// ABOUTME: Database location and pool settings, loadable from the environment

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tagger_config::constants::{
    TAGGER_DATABASE_PATH, TAGGER_DB_BUSY_TIMEOUT_SECS, TAGGER_DB_ENABLE_WAL,
    TAGGER_DB_MAX_CONNECTIONS,
};
use tagger_config::{parse_env_or_default, parse_env_or_default_with_validation, parse_env_string};

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite file to open; `None` keeps the whole database in memory
    pub database_path: Option<PathBuf>,
    pub enable_wal: bool,
    pub max_connections: u32,
    pub busy_timeout_seconds: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: Some(tagger_core::database_file()),
            enable_wal: true,
            max_connections: 10,
            busy_timeout_seconds: 30,
        }
    }
}

impl StorageConfig {
    /// In-memory database, mainly for tests
    pub fn in_memory() -> Self {
        Self {
            database_path: None,
            enable_wal: false,
            max_connections: 1,
            busy_timeout_seconds: 30,
        }
    }

    /// Build a configuration from `TAGGER_*` variables, falling back to the defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let database_path = parse_env_string(TAGGER_DATABASE_PATH)
            .map(PathBuf::from)
            .or(defaults.database_path);

        Self {
            database_path,
            enable_wal: parse_env_or_default(TAGGER_DB_ENABLE_WAL, defaults.enable_wal),
            max_connections: parse_env_or_default_with_validation(
                TAGGER_DB_MAX_CONNECTIONS,
                defaults.max_connections,
                |v| v > 0,
            ),
            busy_timeout_seconds: parse_env_or_default_with_validation(
                TAGGER_DB_BUSY_TIMEOUT_SECS,
                defaults.busy_timeout_seconds,
                |v| v > 0,
            ),
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_config() {
        let config = StorageConfig::in_memory();
        assert!(config.is_in_memory());
        assert_eq!(config.max_connections, 1);
        assert!(!config.enable_wal);
    }

    #[test]
    fn test_from_env_overrides() {
        std::env::set_var(TAGGER_DATABASE_PATH, "/tmp/tagger-config-test.db");
        std::env::set_var(TAGGER_DB_MAX_CONNECTIONS, "3");
        std::env::set_var(TAGGER_DB_BUSY_TIMEOUT_SECS, "0");
        std::env::set_var(TAGGER_DB_ENABLE_WAL, "false");

        let config = StorageConfig::from_env();

        assert_eq!(
            config.database_path,
            Some(PathBuf::from("/tmp/tagger-config-test.db"))
        );
        assert_eq!(config.max_connections, 3);
        // Zero is rejected by validation
        assert_eq!(config.busy_timeout_seconds, 30);
        assert!(!config.enable_wal);

        std::env::remove_var(TAGGER_DATABASE_PATH);
        std::env::remove_var(TAGGER_DB_MAX_CONNECTIONS);
        std::env::remove_var(TAGGER_DB_BUSY_TIMEOUT_SECS);
        std::env::remove_var(TAGGER_DB_ENABLE_WAL);
    }
}
