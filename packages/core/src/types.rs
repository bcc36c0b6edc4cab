// ABOUTME: Taggable entity types and polymorphic references
// ABOUTME: Known taggable kinds, document identifiers, and the Taggable trait

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::utils::generate_document_id;

/// Returned when a stored discriminator does not name a known kind
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown taggable kind: {0}")]
pub struct UnknownTaggableKind(pub String);

/// Every entity kind that can carry tags.
///
/// The discriminator returned by [`TaggableKind::as_str`] is what gets persisted in the
/// `taggable_type` column, so existing values must never be renamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaggableKind {
    Project,
    Task,
    Note,
}

impl TaggableKind {
    pub const ALL: [TaggableKind; 3] = [
        TaggableKind::Project,
        TaggableKind::Task,
        TaggableKind::Note,
    ];

    /// Storage discriminator
    pub fn as_str(&self) -> &'static str {
        match self {
            TaggableKind::Project => "project",
            TaggableKind::Task => "task",
            TaggableKind::Note => "note",
        }
    }

    /// Name of the document collection holding entities of this kind
    pub fn collection(&self) -> &'static str {
        match self {
            TaggableKind::Project => "projects",
            TaggableKind::Task => "tasks",
            TaggableKind::Note => "notes",
        }
    }
}

impl fmt::Display for TaggableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaggableKind {
    type Err = UnknownTaggableKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "project" => Ok(TaggableKind::Project),
            "task" => Ok(TaggableKind::Task),
            "note" => Ok(TaggableKind::Note),
            other => Err(UnknownTaggableKind(other.to_string())),
        }
    }
}

/// Identifier of a stored document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random identifier
    pub fn generate() -> Self {
        Self(generate_document_id())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Polymorphic reference from a tag to the entity that owns it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaggableRef {
    pub kind: TaggableKind,
    pub id: DocumentId,
}

impl TaggableRef {
    pub fn new(kind: TaggableKind, id: impl Into<DocumentId>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for TaggableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

/// Implemented by any document type that can be tagged.
///
/// The kind is fixed per type, the identifier per instance.
pub trait Taggable {
    const KIND: TaggableKind;

    fn id(&self) -> &DocumentId;

    fn taggable_ref(&self) -> TaggableRef {
        TaggableRef::new(Self::KIND, self.id().clone())
    }
}
