// ABOUTME: Storage seam for tag records
// ABOUTME: The primitives the tagging layer needs from a document store

use async_trait::async_trait;
use tagger_core::DocumentId;
use tagger_storage::StorageResult;

use crate::types::{DeleteAck, NewTag, Tag, TagFilter};

/// Collection of tag records.
///
/// Implementations must reject a second record for the same (tag, type, id) triple with
/// `StorageError::DocumentNotValid`, including when two inserts race.
#[async_trait]
pub trait TagCollection: Send + Sync {
    /// Create a record after validating that its triple is unused
    async fn insert(&self, new_tag: NewTag) -> StorageResult<Tag>;

    /// First record matching every set field of `filter`
    async fn find_one(&self, filter: &TagFilter) -> StorageResult<Option<Tag>>;

    /// All records matching `filter`, in storage order
    async fn find(&self, filter: &TagFilter) -> StorageResult<Vec<Tag>>;

    /// Delete one record by its id
    async fn destroy(&self, tag_id: &str) -> StorageResult<DeleteAck>;

    /// Distinct owner ids among records matching `filter`
    async fn distinct_taggable_ids(&self, filter: &TagFilter) -> StorageResult<Vec<DocumentId>>;

    async fn count(&self, filter: &TagFilter) -> StorageResult<u64>;
}
