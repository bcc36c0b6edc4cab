// ABOUTME: Generic document collections stored as JSON bodies
// ABOUTME: Insert, lookup, id-set queries, and typed helpers for taggable documents

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tagger_core::{DocumentId, Taggable};
use tracing::debug;

use crate::{SqliteStore, StorageError, StorageResult};

/// Largest id set bound into a single `IN (...)` clause
const ID_CHUNK_SIZE: usize = 500;

/// A document as persisted, before decoding into its host type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDocument {
    pub collection: String,
    pub id: DocumentId,
    pub body: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredDocument {
    pub fn decode<T: DeserializeOwned>(&self) -> StorageResult<T> {
        Ok(serde_json::from_value(self.body.clone())?)
    }
}

/// Storage primitives for named collections of JSON documents
#[async_trait]
pub trait DocumentCollection: Send + Sync {
    /// Insert a new document; an existing id in the same collection is a validation failure
    async fn insert(
        &self,
        collection: &str,
        id: &DocumentId,
        body: serde_json::Value,
    ) -> StorageResult<StoredDocument>;

    /// Insert or replace a document body
    async fn upsert(
        &self,
        collection: &str,
        id: &DocumentId,
        body: serde_json::Value,
    ) -> StorageResult<StoredDocument>;

    async fn get(&self, collection: &str, id: &DocumentId) -> StorageResult<Option<StoredDocument>>;

    /// Documents whose id is in `ids`, ordered by id. Unknown ids are skipped.
    async fn find_by_ids(
        &self,
        collection: &str,
        ids: &[DocumentId],
    ) -> StorageResult<Vec<StoredDocument>>;

    /// Returns whether a document was removed
    async fn delete(&self, collection: &str, id: &DocumentId) -> StorageResult<bool>;

    async fn count(&self, collection: &str) -> StorageResult<u64>;
}

fn row_to_document(row: &SqliteRow) -> StorageResult<StoredDocument> {
    let id: String = row.try_get("id")?;
    let body: String = row.try_get("body")?;

    Ok(StoredDocument {
        collection: row.try_get("collection")?,
        id: DocumentId::new(id),
        body: serde_json::from_str(&body)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl DocumentCollection for SqliteStore {
    async fn insert(
        &self,
        collection: &str,
        id: &DocumentId,
        body: serde_json::Value,
    ) -> StorageResult<StoredDocument> {
        debug!("Inserting document {} into {}", id, collection);

        let now = Utc::now();
        let body_json = serde_json::to_string(&body)?;

        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, body, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(collection)
        .bind(id.as_str())
        .bind(&body_json)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await
        .map_err(|e| {
            StorageError::from_insert(e, || {
                format!("document '{}' already exists in '{}'", id, collection)
            })
        })?;

        Ok(StoredDocument {
            collection: collection.to_string(),
            id: id.clone(),
            body,
            created_at: now,
            updated_at: now,
        })
    }

    async fn upsert(
        &self,
        collection: &str,
        id: &DocumentId,
        body: serde_json::Value,
    ) -> StorageResult<StoredDocument> {
        debug!("Upserting document {} into {}", id, collection);

        let now = Utc::now();
        let body_json = serde_json::to_string(&body)?;

        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, body, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(collection, id) DO UPDATE SET
                body = excluded.body,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(collection)
        .bind(id.as_str())
        .bind(&body_json)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await
        .map_err(StorageError::Sqlx)?;

        self.get(collection, id).await?.ok_or(StorageError::NotFound)
    }

    async fn get(&self, collection: &str, id: &DocumentId) -> StorageResult<Option<StoredDocument>> {
        debug!("Fetching document {} from {}", id, collection);

        let row = sqlx::query("SELECT * FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id.as_str())
            .fetch_optional(self.pool())
            .await
            .map_err(StorageError::Sqlx)?;

        row.as_ref().map(row_to_document).transpose()
    }

    async fn find_by_ids(
        &self,
        collection: &str,
        ids: &[DocumentId],
    ) -> StorageResult<Vec<StoredDocument>> {
        debug!("Fetching {} documents from {}", ids.len(), collection);

        let mut documents = Vec::with_capacity(ids.len());

        for chunk in ids.chunks(ID_CHUNK_SIZE) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let query_str = format!(
                "SELECT * FROM documents WHERE collection = ? AND id IN ({}) ORDER BY id",
                placeholders
            );

            let mut query = sqlx::query(&query_str).bind(collection);
            for id in chunk {
                query = query.bind(id.as_str());
            }

            let rows = query
                .fetch_all(self.pool())
                .await
                .map_err(StorageError::Sqlx)?;

            for row in &rows {
                documents.push(row_to_document(row)?);
            }
        }

        // Chunks are each ordered; restore a global order and drop ids passed twice
        documents.sort_by(|a, b| a.id.cmp(&b.id));
        documents.dedup_by(|a, b| a.id == b.id);

        Ok(documents)
    }

    async fn delete(&self, collection: &str, id: &DocumentId) -> StorageResult<bool> {
        debug!("Deleting document {} from {}", id, collection);

        let result = sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id.as_str())
            .execute(self.pool())
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self, collection: &str) -> StorageResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE collection = ?")
            .bind(collection)
            .fetch_one(self.pool())
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(count.max(0) as u64)
    }
}

/// Persist a taggable document in its kind's collection, replacing any previous body
pub async fn save_document<T>(documents: &dyn DocumentCollection, document: &T) -> StorageResult<()>
where
    T: Taggable + Serialize + Sync,
{
    let body = serde_json::to_value(document)?;
    documents
        .upsert(T::KIND.collection(), document.id(), body)
        .await?;
    Ok(())
}

/// Load one taggable document by id
pub async fn load_document<T>(
    documents: &dyn DocumentCollection,
    id: &DocumentId,
) -> StorageResult<Option<T>>
where
    T: Taggable + DeserializeOwned,
{
    documents
        .get(T::KIND.collection(), id)
        .await?
        .map(|stored| stored.decode())
        .transpose()
}

/// Load every taggable document of type `T` whose id is in `ids`, ordered by id
pub async fn load_documents<T>(
    documents: &dyn DocumentCollection,
    ids: &[DocumentId],
) -> StorageResult<Vec<T>>
where
    T: Taggable + DeserializeOwned,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    documents
        .find_by_ids(T::KIND.collection(), ids)
        .await?
        .iter()
        .map(StoredDocument::decode)
        .collect()
}
