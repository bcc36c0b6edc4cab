// ABOUTME: Tag name rules shared by every crate
// ABOUTME: Non-empty validation, the normalization hook, and delimited list parsing

use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Tag name cannot be empty")]
    EmptyTagName,
}

/// A tag name must contain at least one character
pub fn validate_tag_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyTagName);
    }
    Ok(())
}

/// Hook for tag cleanup. Names are currently stored exactly as given.
pub fn normalize_tag_name(name: &str) -> String {
    name.to_string()
}

/// Split a delimited tag list into a set of names.
///
/// Duplicates collapse. Empty segments are dropped here instead of being passed on
/// as empty names that storage would reject, so `"a,,b"` parses to `{a, b}`. An empty
/// delimiter splits the input into single characters.
pub fn parse_tag_list(list: &str, delimiter: &str) -> BTreeSet<String> {
    if delimiter.is_empty() {
        return list.chars().map(|c| normalize_tag_name(&c.to_string())).collect();
    }

    list.split(delimiter)
        .filter(|s| !s.is_empty())
        .map(normalize_tag_name)
        .collect()
}
