// ABOUTME: Core types, traits, and utilities for Tagger
// ABOUTME: Foundational package providing taggable kinds, references, and tag name rules

pub mod constants;
pub mod types;
pub mod utils;
pub mod validation;

// Re-export main types
pub use types::{DocumentId, Taggable, TaggableKind, TaggableRef, UnknownTaggableKind};

// Re-export constants
pub use constants::{database_file, tagger_dir, DEFAULT_TAG_DELIMITER};

// Re-export utilities
pub use utils::generate_document_id;

// Re-export validation
pub use validation::{normalize_tag_name, parse_tag_list, validate_tag_name, ValidationError};
