// ABOUTME: Configuration package for Tagger
// ABOUTME: Environment variable names and parsing helpers

pub mod constants;
pub mod env;

pub use env::{parse_env_or_default, parse_env_or_default_with_validation, parse_env_string};
