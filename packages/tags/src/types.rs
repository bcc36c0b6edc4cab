// ABOUTME: Tag type definitions
// ABOUTME: Tag records, lookup filters, delete acknowledgements, and tag list diffs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tagger_core::{DocumentId, TaggableKind, TaggableRef};

/// One tag name attached to one taggable document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub tag: String,
    pub taggable: TaggableRef,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTag {
    pub tag: String,
    pub taggable: TaggableRef,
}

impl NewTag {
    pub fn new(taggable: TaggableRef, tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            taggable,
        }
    }
}

/// Field match over tag records; unset fields match anything
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagFilter {
    pub tag: Option<String>,
    pub taggable_type: Option<TaggableKind>,
    pub taggable_id: Option<DocumentId>,
}

impl TagFilter {
    /// The single record for a (tag, type, id) triple
    pub fn for_triple(kind: TaggableKind, id: &DocumentId, tag: &str) -> Self {
        Self {
            tag: Some(tag.to_string()),
            taggable_type: Some(kind),
            taggable_id: Some(id.clone()),
        }
    }

    /// Every tag on one document
    pub fn for_owner(owner: &TaggableRef) -> Self {
        Self {
            tag: None,
            taggable_type: Some(owner.kind),
            taggable_id: Some(owner.id.clone()),
        }
    }

    /// A tag name across all documents of one kind
    pub fn for_kind_and_tag(kind: TaggableKind, tag: &str) -> Self {
        Self {
            tag: Some(tag.to_string()),
            taggable_type: Some(kind),
            taggable_id: None,
        }
    }
}

/// Outcome reported by the store for a delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAck {
    pub ok: bool,
    pub deleted: u64,
}

impl DeleteAck {
    pub fn from_rows_affected(rows: u64) -> Self {
        Self {
            ok: rows > 0,
            deleted: rows,
        }
    }
}

/// Changes needed to move a document from one tag set to another
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagListDiff {
    pub removed: Vec<String>,
    pub added: Vec<String>,
}

impl TagListDiff {
    pub fn between(current: &BTreeSet<String>, desired: &BTreeSet<String>) -> Self {
        Self {
            removed: current.difference(desired).cloned().collect(),
            added: desired.difference(current).cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}
