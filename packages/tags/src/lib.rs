// ABOUTME: Polymorphic tagging for stored documents
// ABOUTME: Tag records with soft and strict operations, plus the tagging service for hosts

pub mod collection;
pub mod error;
pub mod records;
pub mod storage;
pub mod tagger;
pub mod types;

// Re-export main types
pub use collection::TagCollection;
pub use error::{TagError, TagResult};
pub use records::TagRecords;
pub use storage::SqliteTagCollection;
pub use tagger::{Tagged, Tagger, TaggerConfig};
pub use types::{DeleteAck, NewTag, Tag, TagFilter, TagListDiff};
