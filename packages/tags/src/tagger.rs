// ABOUTME: Tagging service for host documents
// ABOUTME: Cached tag lists, delimited list updates, single-tag edits, and find-by-tag

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tagger_config::constants::TAGGER_TAG_DELIMITER;
use tagger_config::parse_env_string;
use tagger_core::{parse_tag_list, DocumentId, Taggable, TaggableRef, DEFAULT_TAG_DELIMITER};
use tagger_storage::{load_documents, DocumentCollection, SqliteStore};
use tracing::{debug, info};

use crate::error::TagResult;
use crate::records::TagRecords;
use crate::storage::SqliteTagCollection;
use crate::types::{Tag, TagListDiff};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggerConfig {
    /// Delimiter used by [`Tagger::set_tag_list`]
    pub delimiter: String,
}

impl Default for TaggerConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_TAG_DELIMITER.to_string(),
        }
    }
}

impl TaggerConfig {
    pub fn from_env() -> Self {
        match parse_env_string(TAGGER_TAG_DELIMITER) {
            Some(delimiter) => Self { delimiter },
            None => Self::default(),
        }
    }
}

/// A host document together with its cached tag association.
///
/// The cache is filled on the first read through [`Tagger`] and cleared by every write
/// the tagger performs on this document. Code that changes the document's tags any other
/// way (for example through [`TagRecords`] directly) must call [`Tagged::invalidate`].
#[derive(Debug, Clone)]
pub struct Tagged<T: Taggable> {
    document: T,
    tags: Option<Vec<Tag>>,
}

impl<T: Taggable> Tagged<T> {
    pub fn new(document: T) -> Self {
        Self {
            document,
            tags: None,
        }
    }

    pub fn document(&self) -> &T {
        &self.document
    }

    pub fn into_inner(self) -> T {
        self.document
    }

    pub fn owner(&self) -> TaggableRef {
        self.document.taggable_ref()
    }

    /// Tags as last loaded, if loaded
    pub fn cached_tags(&self) -> Option<&[Tag]> {
        self.tags.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.tags.is_some()
    }

    /// Drop the cached association so the next read goes to storage
    pub fn invalidate(&mut self) {
        self.tags = None;
    }
}

impl<T: Taggable> Deref for Tagged<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.document
    }
}

impl<T: Taggable> DerefMut for Tagged<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.document
    }
}

/// Tagging operations for any [`Taggable`] document type
#[derive(Clone)]
pub struct Tagger {
    records: TagRecords,
    documents: Arc<dyn DocumentCollection>,
    config: TaggerConfig,
}

impl Tagger {
    pub fn new(records: TagRecords, documents: Arc<dyn DocumentCollection>) -> Self {
        Self::with_config(records, documents, TaggerConfig::default())
    }

    pub fn with_config(
        records: TagRecords,
        documents: Arc<dyn DocumentCollection>,
        config: TaggerConfig,
    ) -> Self {
        Self {
            records,
            documents,
            config,
        }
    }

    /// Tagger backed entirely by one SQLite store
    pub fn from_store(store: SqliteStore, config: TaggerConfig) -> Self {
        info!("Creating tagger (delimiter: {:?})", config.delimiter);

        let records = TagRecords::new(Arc::new(SqliteTagCollection::from_store(&store)));
        Self::with_config(records, Arc::new(store), config)
    }

    pub fn records(&self) -> &TagRecords {
        &self.records
    }

    pub fn config(&self) -> &TaggerConfig {
        &self.config
    }

    /// Tag records on the document, loading them if not cached
    pub async fn tags<'a, T: Taggable + Send>(
        &self,
        tagged: &'a mut Tagged<T>,
    ) -> TagResult<&'a [Tag]> {
        let tags = match tagged.tags.take() {
            Some(tags) => tags,
            None => {
                debug!("Loading tags for {}", tagged.owner());
                self.records.tags_for(&tagged.owner()).await?
            }
        };

        Ok(tagged.tags.insert(tags).as_slice())
    }

    /// Tag names on the document, in storage order
    pub async fn tag_list<T: Taggable + Send>(
        &self,
        tagged: &mut Tagged<T>,
    ) -> TagResult<Vec<String>> {
        let tags = self.tags(tagged).await?;
        Ok(tags.iter().map(|t| t.tag.clone()).collect())
    }

    /// Replace the document's tags with `list`, split on the configured delimiter
    pub async fn set_tag_list<T: Taggable + Send>(
        &self,
        tagged: &mut Tagged<T>,
        list: &str,
    ) -> TagResult<TagListDiff> {
        self.set_tag_list_with_delimiter(tagged, list, &self.config.delimiter)
            .await
    }

    /// Replace the document's tags with `list`, split on `delimiter`.
    ///
    /// Removals run before additions. This is not atomic: if a step fails, the steps
    /// before it stay applied and the error is returned. The cached association is
    /// cleared either way.
    pub async fn set_tag_list_with_delimiter<T: Taggable + Send>(
        &self,
        tagged: &mut Tagged<T>,
        list: &str,
        delimiter: &str,
    ) -> TagResult<TagListDiff> {
        // Diff against storage, not a possibly stale cache
        tagged.invalidate();
        let current: BTreeSet<String> = self.tag_list(tagged).await?.into_iter().collect();
        let desired = parse_tag_list(list, delimiter);
        let diff = TagListDiff::between(&current, &desired);

        let owner = tagged.owner();
        let result = self.apply_diff(&owner, &diff).await;
        tagged.invalidate();
        result?;

        debug!(
            "Updated tags on {} (removed: {:?}, added: {:?})",
            owner, diff.removed, diff.added
        );
        Ok(diff)
    }

    async fn apply_diff(&self, owner: &TaggableRef, diff: &TagListDiff) -> TagResult<()> {
        for tag in &diff.removed {
            self.records
                .remove_by_type_and_id_strict(owner.kind, &owner.id, tag)
                .await?;
        }

        for tag in &diff.added {
            self.records
                .add_by_type_and_id_strict(owner.kind, &owner.id, tag)
                .await?;
        }

        Ok(())
    }

    /// Add one tag, failing with `DuplicateTag` if the document already has it
    pub async fn add_tag<T: Taggable + Send + Sync>(
        &self,
        tagged: &mut Tagged<T>,
        tag_name: &str,
    ) -> TagResult<Tag> {
        let result = self
            .records
            .add_by_object_strict(tagged.document(), tag_name)
            .await;
        tagged.invalidate();
        result
    }

    /// Remove one tag, failing with `TagNotFound` if the document does not have it
    pub async fn remove_tag<T: Taggable + Send + Sync>(
        &self,
        tagged: &mut Tagged<T>,
        tag_name: &str,
    ) -> TagResult<()> {
        let result = self
            .records
            .remove_by_object_strict(tagged.document(), tag_name)
            .await;
        tagged.invalidate();
        result
    }

    /// Ids of `T` documents carrying `tag_name`, each once, ordered by id
    pub async fn find_ids_by_tag<T: Taggable>(
        &self,
        tag_name: &str,
    ) -> TagResult<Vec<DocumentId>> {
        self.records.taggable_ids_with_tag(T::KIND, tag_name).await
    }

    /// `T` documents carrying `tag_name`, ordered by id
    pub async fn find_by_tag<T: Taggable + DeserializeOwned>(
        &self,
        tag_name: &str,
    ) -> TagResult<Vec<T>> {
        let ids = self.find_ids_by_tag::<T>(tag_name).await?;
        debug!(
            "Found {} {} documents tagged '{}'",
            ids.len(),
            T::KIND,
            tag_name
        );

        Ok(load_documents(self.documents.as_ref(), &ids).await?)
    }
}
