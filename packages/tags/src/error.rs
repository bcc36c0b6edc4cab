use tagger_core::{TaggableRef, ValidationError};
use tagger_storage::StorageError;
use thiserror::Error;

/// Tagging errors
#[derive(Error, Debug)]
pub enum TagError {
    #[error("Tag '{tag}' already exists on {owner}")]
    DuplicateTag { tag: String, owner: TaggableRef },
    #[error("Tag '{tag}' not found on {owner}")]
    TagNotFound { tag: String, owner: TaggableRef },
    #[error("Invalid tag name: {0}")]
    InvalidTagName(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type TagResult<T> = Result<T, TagError>;
