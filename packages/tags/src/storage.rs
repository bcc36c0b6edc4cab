// ABOUTME: Tag storage layer using SQLite
// ABOUTME: Implements the tag collection primitives over the tags table

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tagger_core::{DocumentId, TaggableKind, TaggableRef};
use tagger_storage::{SqliteStore, StorageError, StorageResult};
use tracing::debug;

use crate::collection::TagCollection;
use crate::types::{DeleteAck, NewTag, Tag, TagFilter};

#[derive(Clone)]
pub struct SqliteTagCollection {
    pool: SqlitePool,
}

impl SqliteTagCollection {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn from_store(store: &SqliteStore) -> Self {
        Self::new(store.pool().clone())
    }

    /// Get a single tag by ID
    pub async fn get_tag(&self, tag_id: &str) -> StorageResult<Tag> {
        debug!("Fetching tag: {}", tag_id);

        let row = sqlx::query("SELECT * FROM tags WHERE id = ?")
            .bind(tag_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        match row {
            Some(r) => self.row_to_tag(&r),
            None => Err(StorageError::NotFound),
        }
    }

    /// Build a WHERE clause and its bind values from a filter
    fn where_clause(filter: &TagFilter) -> (String, Vec<String>) {
        let mut conditions = Vec::new();
        let mut binds = Vec::new();

        if let Some(tag) = &filter.tag {
            conditions.push("tag = ?");
            binds.push(tag.clone());
        }
        if let Some(kind) = &filter.taggable_type {
            conditions.push("taggable_type = ?");
            binds.push(kind.as_str().to_string());
        }
        if let Some(id) = &filter.taggable_id {
            conditions.push("taggable_id = ?");
            binds.push(id.as_str().to_string());
        }

        if conditions.is_empty() {
            (String::new(), binds)
        } else {
            (format!(" WHERE {}", conditions.join(" AND ")), binds)
        }
    }

    /// Convert a database row to a Tag
    fn row_to_tag(&self, row: &sqlx::sqlite::SqliteRow) -> StorageResult<Tag> {
        let taggable_type: String = row.try_get("taggable_type").map_err(StorageError::Sqlx)?;
        let taggable_id: String = row.try_get("taggable_id").map_err(StorageError::Sqlx)?;

        let kind = taggable_type
            .parse::<TaggableKind>()
            .map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(Tag {
            id: row.try_get("id").map_err(StorageError::Sqlx)?,
            tag: row.try_get("tag").map_err(StorageError::Sqlx)?,
            taggable: TaggableRef::new(kind, DocumentId::new(taggable_id)),
            created_at: row.try_get("created_at").map_err(StorageError::Sqlx)?,
        })
    }
}

#[async_trait]
impl TagCollection for SqliteTagCollection {
    async fn insert(&self, new_tag: NewTag) -> StorageResult<Tag> {
        let owner = &new_tag.taggable;

        // Uniqueness validation over (tag, taggable_type, taggable_id); the unique index
        // reports the same failure if another insert wins the race
        let existing = TagFilter::for_triple(owner.kind, &owner.id, &new_tag.tag);
        if self.find_one(&existing).await?.is_some() {
            return Err(StorageError::DocumentNotValid(format!(
                "tag '{}' is already taken on {}",
                new_tag.tag, owner
            )));
        }

        let tag_id = format!("tag-{}", nanoid::nanoid!());
        let now = Utc::now();

        debug!("Creating tag: {} (tag: {}, owner: {})", tag_id, new_tag.tag, owner);

        sqlx::query(
            r#"
            INSERT INTO tags (id, tag, taggable_type, taggable_id, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&tag_id)
        .bind(&new_tag.tag)
        .bind(owner.kind.as_str())
        .bind(owner.id.as_str())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            StorageError::from_insert(e, || {
                format!("tag '{}' is already taken on {}", new_tag.tag, owner)
            })
        })?;

        self.get_tag(&tag_id).await
    }

    async fn find_one(&self, filter: &TagFilter) -> StorageResult<Option<Tag>> {
        debug!("Finding one tag matching {:?}", filter);

        let (clause, binds) = Self::where_clause(filter);
        let query_str = format!("SELECT * FROM tags{} ORDER BY rowid LIMIT 1", clause);

        let mut query = sqlx::query(&query_str);
        for value in binds {
            query = query.bind(value);
        }

        let row = query
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        match row {
            Some(r) => Ok(Some(self.row_to_tag(&r)?)),
            None => Ok(None),
        }
    }

    async fn find(&self, filter: &TagFilter) -> StorageResult<Vec<Tag>> {
        debug!("Fetching tags matching {:?}", filter);

        let (clause, binds) = Self::where_clause(filter);
        let query_str = format!("SELECT * FROM tags{} ORDER BY rowid", clause);

        let mut query = sqlx::query(&query_str);
        for value in binds {
            query = query.bind(value);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter()
            .map(|row| self.row_to_tag(row))
            .collect::<Result<Vec<_>, _>>()
    }

    async fn destroy(&self, tag_id: &str) -> StorageResult<DeleteAck> {
        debug!("Deleting tag: {}", tag_id);

        let result = sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(tag_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(DeleteAck::from_rows_affected(result.rows_affected()))
    }

    async fn distinct_taggable_ids(&self, filter: &TagFilter) -> StorageResult<Vec<DocumentId>> {
        debug!("Fetching distinct taggable ids matching {:?}", filter);

        let (clause, binds) = Self::where_clause(filter);
        let query_str = format!(
            "SELECT DISTINCT taggable_id FROM tags{} ORDER BY taggable_id",
            clause
        );

        let mut query = sqlx::query_scalar::<_, String>(&query_str);
        for value in binds {
            query = query.bind(value);
        }

        let ids = query
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(ids.into_iter().map(DocumentId::new).collect())
    }

    async fn count(&self, filter: &TagFilter) -> StorageResult<u64> {
        let (clause, binds) = Self::where_clause(filter);
        let query_str = format!("SELECT COUNT(*) FROM tags{}", clause);

        let mut query = sqlx::query_scalar::<_, i64>(&query_str);
        for value in binds {
            query = query.bind(value);
        }

        let count = query
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(count.max(0) as u64)
    }
}
