// ABOUTME: Integration tests for the tagging service
// ABOUTME: Tests tag lists, list updates, cache invalidation, and find-by-tag queries

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tagger_core::{DocumentId, Taggable, TaggableKind};
use tagger_storage::{save_document, SqliteStore, StorageError, StorageResult};
use tagger_tags::{
    DeleteAck, NewTag, SqliteTagCollection, Tag, TagCollection, TagError, TagFilter, TagListDiff,
    TagRecords, Tagged, Tagger, TaggerConfig,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Note {
    id: DocumentId,
    title: String,
}

impl Taggable for Note {
    const KIND: TaggableKind = TaggableKind::Note;

    fn id(&self) -> &DocumentId {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Task {
    id: DocumentId,
    title: String,
}

impl Taggable for Task {
    const KIND: TaggableKind = TaggableKind::Task;

    fn id(&self) -> &DocumentId {
        &self.id
    }
}

async fn setup() -> (SqliteStore, Tagger) {
    let store = SqliteStore::in_memory().await.unwrap();
    let tagger = Tagger::from_store(store.clone(), TaggerConfig::default());
    (store, tagger)
}

async fn create_note(store: &SqliteStore, id: &str) -> Tagged<Note> {
    let note = Note {
        id: DocumentId::new(id),
        title: format!("Note {}", id),
    };
    save_document(store, &note).await.unwrap();
    Tagged::new(note)
}

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

async fn tag_set(tagger: &Tagger, tagged: &mut Tagged<Note>) -> BTreeSet<String> {
    tagger.tag_list(tagged).await.unwrap().into_iter().collect()
}

#[tokio::test]
async fn test_add_tag() {
    let (store, tagger) = setup().await;
    let mut note = create_note(&store, "x").await;

    tagger.add_tag(&mut note, "pretty-cool").await.unwrap();

    assert_eq!(tagger.tags(&mut note).await.unwrap().len(), 1);
    assert_eq!(tagger.tag_list(&mut note).await.unwrap(), vec!["pretty-cool"]);
}

#[tokio::test]
async fn test_remove_tag() {
    let (store, tagger) = setup().await;
    let mut note = create_note(&store, "x").await;

    tagger.add_tag(&mut note, "pretty-cool").await.unwrap();
    assert_eq!(tagger.tags(&mut note).await.unwrap().len(), 1);

    tagger.remove_tag(&mut note, "pretty-cool").await.unwrap();
    assert_eq!(tagger.tags(&mut note).await.unwrap().len(), 0);
}

#[tokio::test]
async fn test_add_tag_twice() {
    let (store, tagger) = setup().await;
    let mut note = create_note(&store, "x").await;

    // Soft path: true then false
    let records = tagger.records();
    assert!(records.add_by_object(note.document(), "red").await.unwrap());
    assert!(!records.add_by_object(note.document(), "red").await.unwrap());
    note.invalidate();

    // Strict path raises on the duplicate
    let result = tagger.add_tag(&mut note, "red").await;
    assert!(matches!(result, Err(TagError::DuplicateTag { .. })));

    assert_eq!(tagger.tag_list(&mut note).await.unwrap(), vec!["red"]);
}

#[tokio::test]
async fn test_remove_tag_not_present() {
    let (store, tagger) = setup().await;
    let mut note = create_note(&store, "x").await;

    assert!(!tagger
        .records()
        .remove_by_object(note.document(), "absent")
        .await
        .unwrap());

    let result = tagger.remove_tag(&mut note, "absent").await;
    assert!(matches!(result, Err(TagError::TagNotFound { .. })));
}

#[tokio::test]
async fn test_set_tag_list_applies_minimal_diff() {
    let (store, tagger) = setup().await;
    let mut note = create_note(&store, "x").await;

    let first = tagger.set_tag_list(&mut note, "a,b,c").await.unwrap();
    assert_eq!(first.added.len(), 3);
    assert!(first.removed.is_empty());

    let second = tagger.set_tag_list(&mut note, "b,c,d").await.unwrap();
    assert_eq!(
        second,
        TagListDiff {
            removed: vec!["a".to_string()],
            added: vec!["d".to_string()],
        }
    );

    assert_eq!(tag_set(&tagger, &mut note).await, set(&["b", "c", "d"]));
}

#[tokio::test]
async fn test_set_tag_list_collapses_duplicates() {
    let (store, tagger) = setup().await;
    let mut note = create_note(&store, "x").await;

    tagger.set_tag_list(&mut note, "a,a,b,,a").await.unwrap();

    let list = tagger.tag_list(&mut note).await.unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(tag_set(&tagger, &mut note).await, set(&["a", "b"]));
}

#[tokio::test]
async fn test_set_tag_list_with_custom_delimiter() {
    let (store, tagger) = setup().await;
    let mut note = create_note(&store, "x").await;

    tagger
        .set_tag_list_with_delimiter(&mut note, "rust;sqlite;tags", ";")
        .await
        .unwrap();

    assert_eq!(
        tag_set(&tagger, &mut note).await,
        set(&["rust", "sqlite", "tags"])
    );
}

#[tokio::test]
async fn test_configured_delimiter_is_used() {
    let store = SqliteStore::in_memory().await.unwrap();
    let tagger = Tagger::from_store(
        store.clone(),
        TaggerConfig {
            delimiter: "|".to_string(),
        },
    );
    let mut note = create_note(&store, "x").await;

    tagger.set_tag_list(&mut note, "a,b|c").await.unwrap();

    assert_eq!(tag_set(&tagger, &mut note).await, set(&["a,b", "c"]));
}

#[tokio::test]
async fn test_set_tag_list_to_empty_clears_tags() {
    let (store, tagger) = setup().await;
    let mut note = create_note(&store, "x").await;

    tagger.set_tag_list(&mut note, "a,b").await.unwrap();
    let diff = tagger.set_tag_list(&mut note, "").await.unwrap();

    assert_eq!(diff.removed.len(), 2);
    assert!(tagger.tag_list(&mut note).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_delimiter_tags_each_character() {
    let (store, tagger) = setup().await;
    let mut note = create_note(&store, "x").await;

    tagger
        .set_tag_list_with_delimiter(&mut note, "abca", "")
        .await
        .unwrap();

    assert_eq!(tag_set(&tagger, &mut note).await, set(&["a", "b", "c"]));
}

#[tokio::test]
async fn test_tagged_into_inner_returns_document() {
    let (store, tagger) = setup().await;
    let mut note = create_note(&store, "x").await;

    tagger.add_tag(&mut note, "kept").await.unwrap();
    assert_eq!(tagger.tag_list(&mut note).await.unwrap(), vec!["kept"]);

    let document = note.into_inner();
    assert_eq!(
        document,
        Note {
            id: DocumentId::new("x"),
            title: "Note x".to_string(),
        }
    );

    // Tags live in storage, not on the unwrapped document
    let mut rewrapped = Tagged::new(document);
    assert!(!rewrapped.is_loaded());
    assert_eq!(tagger.tag_list(&mut rewrapped).await.unwrap(), vec!["kept"]);
}

#[tokio::test]
async fn test_writes_invalidate_cached_tags() {
    let (store, tagger) = setup().await;
    let mut note = create_note(&store, "x").await;

    assert!(tagger.tag_list(&mut note).await.unwrap().is_empty());
    assert!(note.is_loaded());

    tagger.add_tag(&mut note, "fresh").await.unwrap();
    assert!(!note.is_loaded());
    assert_eq!(tagger.tag_list(&mut note).await.unwrap(), vec!["fresh"]);

    tagger.set_tag_list(&mut note, "other").await.unwrap();
    assert!(note.cached_tags().is_none());
    assert_eq!(tagger.tag_list(&mut note).await.unwrap(), vec!["other"]);
}

#[tokio::test]
async fn test_cache_is_stale_until_invalidated() {
    let (store, tagger) = setup().await;
    let mut note = create_note(&store, "x").await;

    assert!(tagger.tag_list(&mut note).await.unwrap().is_empty());

    // Written behind the cache's back
    tagger
        .records()
        .add_by_object(note.document(), "outside")
        .await
        .unwrap();
    assert!(tagger.tag_list(&mut note).await.unwrap().is_empty());

    note.invalidate();
    assert_eq!(tagger.tag_list(&mut note).await.unwrap(), vec!["outside"]);
}

#[tokio::test]
async fn test_set_tag_list_diffs_against_storage() {
    let (store, tagger) = setup().await;
    let mut note = create_note(&store, "x").await;

    assert!(tagger.tag_list(&mut note).await.unwrap().is_empty());
    tagger
        .records()
        .add_by_object(note.document(), "outside")
        .await
        .unwrap();

    // The stale cache says no tags, storage says "outside"
    let diff = tagger.set_tag_list(&mut note, "outside,new").await.unwrap();
    assert_eq!(diff.added, vec!["new".to_string()]);
    assert!(diff.removed.is_empty());
}

/// Tag collection that refuses to insert one particular tag name
struct RejectingCollection {
    inner: SqliteTagCollection,
    rejected: String,
}

#[async_trait]
impl TagCollection for RejectingCollection {
    async fn insert(&self, new_tag: NewTag) -> StorageResult<Tag> {
        if new_tag.tag == self.rejected {
            return Err(StorageError::Database("write refused".to_string()));
        }
        self.inner.insert(new_tag).await
    }

    async fn find_one(&self, filter: &TagFilter) -> StorageResult<Option<Tag>> {
        self.inner.find_one(filter).await
    }

    async fn find(&self, filter: &TagFilter) -> StorageResult<Vec<Tag>> {
        self.inner.find(filter).await
    }

    async fn destroy(&self, tag_id: &str) -> StorageResult<DeleteAck> {
        self.inner.destroy(tag_id).await
    }

    async fn distinct_taggable_ids(&self, filter: &TagFilter) -> StorageResult<Vec<DocumentId>> {
        self.inner.distinct_taggable_ids(filter).await
    }

    async fn count(&self, filter: &TagFilter) -> StorageResult<u64> {
        self.inner.count(filter).await
    }
}

#[tokio::test]
async fn test_failed_step_leaves_earlier_steps_applied() {
    let store = SqliteStore::in_memory().await.unwrap();
    let collection = RejectingCollection {
        inner: SqliteTagCollection::from_store(&store),
        rejected: "boom".to_string(),
    };
    let tagger = Tagger::new(
        TagRecords::new(Arc::new(collection)),
        Arc::new(store.clone()),
    );
    let mut note = create_note(&store, "x").await;

    tagger.set_tag_list(&mut note, "a,b").await.unwrap();
    assert!(note.cached_tags().is_none());
    assert_eq!(tagger.tag_list(&mut note).await.unwrap().len(), 2);

    // Removals of a and b succeed, then adding "boom" fails before "c" is reached
    let result = tagger.set_tag_list(&mut note, "boom,c").await;

    match result {
        Err(TagError::Storage(StorageError::Database(msg))) => assert_eq!(msg, "write refused"),
        other => panic!("Expected storage error, got {:?}", other),
    }
    assert!(!note.is_loaded());
    assert!(tagger.tag_list(&mut note).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_scenario_add_find_remove() {
    let (store, tagger) = setup().await;
    let mut x = create_note(&store, "x").await;

    tagger.add_tag(&mut x, "red").await.unwrap();
    tagger.add_tag(&mut x, "blue").await.unwrap();

    assert_eq!(tag_set(&tagger, &mut x).await, set(&["red", "blue"]));
    let red: Vec<Note> = tagger.find_by_tag("red").await.unwrap();
    assert_eq!(red, vec![x.document().clone()]);

    tagger.remove_tag(&mut x, "red").await.unwrap();

    assert_eq!(tag_set(&tagger, &mut x).await, set(&["blue"]));
    let red: Vec<Note> = tagger.find_by_tag("red").await.unwrap();
    assert!(red.is_empty());
}

#[tokio::test]
async fn test_find_by_tag_returns_each_object_once() {
    let (store, tagger) = setup().await;
    let mut y = create_note(&store, "y").await;
    let mut x = create_note(&store, "x").await;
    let mut z = create_note(&store, "z").await;

    tagger.add_tag(&mut y, "shared").await.unwrap();
    tagger.add_tag(&mut x, "shared").await.unwrap();
    tagger.add_tag(&mut z, "other").await.unwrap();

    let ids = tagger.find_ids_by_tag::<Note>("shared").await.unwrap();
    assert_eq!(ids, vec![DocumentId::new("x"), DocumentId::new("y")]);

    let notes: Vec<Note> = tagger.find_by_tag("shared").await.unwrap();
    let titles: Vec<&str> = notes.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(titles, vec!["Note x", "Note y"]);
}

#[tokio::test]
async fn test_find_by_tag_is_scoped_to_kind() {
    let (store, tagger) = setup().await;
    let mut note = create_note(&store, "same-id").await;

    let task = Task {
        id: DocumentId::new("same-id"),
        title: "A task".to_string(),
    };
    save_document(&store, &task).await.unwrap();
    let mut task = Tagged::new(task);

    tagger.add_tag(&mut note, "urgent").await.unwrap();

    let tasks: Vec<Task> = tagger.find_by_tag("urgent").await.unwrap();
    assert!(tasks.is_empty());

    tagger.add_tag(&mut task, "urgent").await.unwrap();

    let tasks: Vec<Task> = tagger.find_by_tag("urgent").await.unwrap();
    let notes: Vec<Note> = tagger.find_by_tag("urgent").await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(notes.len(), 1);
    assert_eq!(
        tagger
            .records()
            .count(&TagFilter {
                tag: Some("urgent".to_string()),
                ..Default::default()
            })
            .await
            .unwrap(),
        2
    );
}

#[tokio::test]
async fn test_find_by_tag_skips_tags_without_documents() {
    let (_store, tagger) = setup().await;

    // Tag an id that was never saved as a document
    tagger
        .records()
        .add_by_type_and_id(TaggableKind::Note, &DocumentId::new("ghost"), "lost")
        .await
        .unwrap();

    let ids = tagger.find_ids_by_tag::<Note>("lost").await.unwrap();
    assert_eq!(ids, vec![DocumentId::new("ghost")]);

    let notes: Vec<Note> = tagger.find_by_tag("lost").await.unwrap();
    assert!(notes.is_empty());
}

#[tokio::test]
async fn test_tagger_config_from_env() {
    std::env::set_var("TAGGER_TAG_DELIMITER", ";");
    assert_eq!(TaggerConfig::from_env().delimiter, ";");

    std::env::remove_var("TAGGER_TAG_DELIMITER");
    assert_eq!(TaggerConfig::from_env(), TaggerConfig::default());
}

#[tokio::test]
async fn test_tagger_exposes_its_config() {
    let store = SqliteStore::in_memory().await.unwrap();
    let config = TaggerConfig {
        delimiter: ";".to_string(),
    };
    let tagger = Tagger::from_store(store, config.clone());

    assert_eq!(tagger.config(), &config);

    let (_store, default_tagger) = setup().await;
    assert_eq!(default_tagger.config().delimiter, ",");
}
