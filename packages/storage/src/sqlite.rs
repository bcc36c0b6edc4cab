use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::time::Duration;
use tracing::{debug, info};

use crate::{StorageConfig, StorageError, StorageResult};

/// SQLite-backed document store
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    config: StorageConfig,
}

impl SqliteStore {
    /// Open (and create if needed) the database described by `config`
    pub async fn new(config: StorageConfig) -> StorageResult<Self> {
        let pool = match &config.database_path {
            Some(database_path) => {
                // Ensure parent directory exists
                if let Some(parent) = database_path.parent() {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .map_err(StorageError::Io)?;
                }

                let database_url = format!("sqlite:{}", database_path.display());

                if !sqlx::Sqlite::database_exists(&database_url)
                    .await
                    .map_err(StorageError::Sqlx)?
                {
                    debug!("Creating database at: {}", database_url);
                    sqlx::Sqlite::create_database(&database_url)
                        .await
                        .map_err(StorageError::Sqlx)?;
                }

                SqlitePoolOptions::new()
                    .max_connections(config.max_connections)
                    .acquire_timeout(Duration::from_secs(config.busy_timeout_seconds))
                    .connect(&database_url)
                    .await
                    .map_err(StorageError::Sqlx)?
            }
            None => {
                debug!("Opening in-memory database");

                // Every connection to `sqlite::memory:` is a separate database, so the pool
                // keeps exactly one connection alive for its whole lifetime.
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .min_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .acquire_timeout(Duration::from_secs(config.busy_timeout_seconds))
                    .connect("sqlite::memory:")
                    .await
                    .map_err(StorageError::Sqlx)?
            }
        };

        if config.enable_wal && !config.is_in_memory() {
            sqlx::query("PRAGMA journal_mode = WAL")
                .execute(&pool)
                .await
                .map_err(StorageError::Sqlx)?;
        }

        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&pool)
            .await
            .map_err(StorageError::Sqlx)?;

        sqlx::query("PRAGMA synchronous = NORMAL")
            .execute(&pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(Self { pool, config })
    }

    /// Open a fresh in-memory database with the schema applied
    pub async fn in_memory() -> StorageResult<Self> {
        let store = Self::new(StorageConfig::in_memory()).await?;
        store.initialize().await?;
        Ok(store)
    }

    /// Run schema migrations
    pub async fn initialize(&self) -> StorageResult<()> {
        info!("Initializing SQLite storage with migrations");

        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(StorageError::Migration)?;

        info!("SQLite storage initialized successfully");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Close every pooled connection
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
