// ABOUTME: Data layer and persistence for Tagger
// ABOUTME: SQLite-backed document store, storage configuration, and storage errors

use thiserror::Error;

pub mod config;
pub mod documents;
pub mod sqlite;

pub use config::StorageConfig;
pub use documents::{
    load_document, load_documents, save_document, DocumentCollection, StoredDocument,
};
pub use sqlite::SqliteStore;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Document not found")]
    NotFound,
    #[error("Document not valid: {0}")]
    DocumentNotValid(String),
}

impl StorageError {
    /// Classify a failed insert, reporting unique constraint hits as validation failures
    pub fn from_insert(err: sqlx::Error, describe: impl FnOnce() -> String) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StorageError::DocumentNotValid(describe())
            }
            _ => StorageError::Sqlx(err),
        }
    }

    /// Whether this error reports a uniqueness/validation failure rather than a fault
    pub fn is_not_valid(&self) -> bool {
        matches!(self, StorageError::DocumentNotValid(_))
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
