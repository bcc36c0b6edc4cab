// ABOUTME: Add and remove operations on tag records
// ABOUTME: Soft variants report no-ops as false, strict variants turn them into errors

use std::sync::Arc;
use tagger_core::{
    normalize_tag_name, validate_tag_name, DocumentId, Taggable, TaggableKind, TaggableRef,
};
use tracing::debug;

use crate::collection::TagCollection;
use crate::error::{TagError, TagResult};
use crate::types::{NewTag, Tag, TagFilter};

/// Tag record operations over any [`TagCollection`].
///
/// Every operation comes in two forms. The soft form returns `Ok(false)` when there was
/// nothing to do (the tag already exists, or is not there to remove). The `_strict` form
/// reports the same situation as [`TagError::DuplicateTag`] or [`TagError::TagNotFound`].
/// Storage faults are returned unchanged by both.
#[derive(Clone)]
pub struct TagRecords {
    collection: Arc<dyn TagCollection>,
}

fn prepare_name(tag_name: &str) -> TagResult<String> {
    let name = normalize_tag_name(tag_name);
    validate_tag_name(&name)?;
    Ok(name)
}

impl TagRecords {
    pub fn new(collection: Arc<dyn TagCollection>) -> Self {
        Self { collection }
    }

    pub fn collection(&self) -> &Arc<dyn TagCollection> {
        &self.collection
    }

    /// Tag a document. Returns `false` if the document already has this tag.
    pub async fn add_by_type_and_id(
        &self,
        kind: TaggableKind,
        id: &DocumentId,
        tag_name: &str,
    ) -> TagResult<bool> {
        let tag_name = prepare_name(tag_name)?;
        let owner = TaggableRef::new(kind, id.clone());

        let filter = TagFilter::for_triple(kind, id, &tag_name);
        if self.collection.find_one(&filter).await?.is_some() {
            debug!("Tag '{}' already present on {}", tag_name, owner);
            return Ok(false);
        }

        match self.collection.insert(NewTag::new(owner, tag_name)).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_valid() => {
                debug!("Tag insert rejected: {}", e);
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Tag a document, failing with [`TagError::DuplicateTag`] if it is already tagged
    pub async fn add_by_type_and_id_strict(
        &self,
        kind: TaggableKind,
        id: &DocumentId,
        tag_name: &str,
    ) -> TagResult<Tag> {
        let tag_name = prepare_name(tag_name)?;
        let owner = TaggableRef::new(kind, id.clone());

        match self
            .collection
            .insert(NewTag::new(owner.clone(), tag_name.clone()))
            .await
        {
            Ok(tag) => Ok(tag),
            Err(e) if e.is_not_valid() => Err(TagError::DuplicateTag {
                tag: tag_name,
                owner,
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Untag a document. Returns `false` if the tag was not there or the store did not
    /// acknowledge the delete.
    pub async fn remove_by_type_and_id(
        &self,
        kind: TaggableKind,
        id: &DocumentId,
        tag_name: &str,
    ) -> TagResult<bool> {
        let filter = TagFilter::for_triple(kind, id, &normalize_tag_name(tag_name));

        let Some(tag) = self.collection.find_one(&filter).await? else {
            debug!("Tag '{}' not present on {}/{}", tag_name, kind, id);
            return Ok(false);
        };

        let ack = self.collection.destroy(&tag.id).await?;
        if !ack.ok {
            debug!("Delete of tag {} was not acknowledged", tag.id);
        }
        Ok(ack.ok)
    }

    /// Untag a document, failing with [`TagError::TagNotFound`] when the soft form
    /// would return `false`
    pub async fn remove_by_type_and_id_strict(
        &self,
        kind: TaggableKind,
        id: &DocumentId,
        tag_name: &str,
    ) -> TagResult<()> {
        if self.remove_by_type_and_id(kind, id, tag_name).await? {
            Ok(())
        } else {
            Err(TagError::TagNotFound {
                tag: tag_name.to_string(),
                owner: TaggableRef::new(kind, id.clone()),
            })
        }
    }

    pub async fn add_by_object<T: Taggable + Sync>(
        &self,
        object: &T,
        tag_name: &str,
    ) -> TagResult<bool> {
        self.add_by_type_and_id(T::KIND, object.id(), tag_name).await
    }

    pub async fn add_by_object_strict<T: Taggable + Sync>(
        &self,
        object: &T,
        tag_name: &str,
    ) -> TagResult<Tag> {
        self.add_by_type_and_id_strict(T::KIND, object.id(), tag_name).await
    }

    pub async fn remove_by_object<T: Taggable + Sync>(
        &self,
        object: &T,
        tag_name: &str,
    ) -> TagResult<bool> {
        self.remove_by_type_and_id(T::KIND, object.id(), tag_name).await
    }

    pub async fn remove_by_object_strict<T: Taggable + Sync>(
        &self,
        object: &T,
        tag_name: &str,
    ) -> TagResult<()> {
        self.remove_by_type_and_id_strict(T::KIND, object.id(), tag_name).await
    }

    /// All tag records owned by one document
    pub async fn tags_for(&self, owner: &TaggableRef) -> TagResult<Vec<Tag>> {
        Ok(self.collection.find(&TagFilter::for_owner(owner)).await?)
    }

    /// Ids of documents of `kind` carrying `tag_name`, each listed once
    pub async fn taggable_ids_with_tag(
        &self,
        kind: TaggableKind,
        tag_name: &str,
    ) -> TagResult<Vec<DocumentId>> {
        let filter = TagFilter::for_kind_and_tag(kind, &normalize_tag_name(tag_name));
        Ok(self.collection.distinct_taggable_ids(&filter).await?)
    }

    pub async fn count(&self, filter: &TagFilter) -> TagResult<u64> {
        Ok(self.collection.count(filter).await?)
    }
}
