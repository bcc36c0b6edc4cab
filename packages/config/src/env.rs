// ABOUTME: Environment variable parsing utilities
// ABOUTME: Typed lookups with defaults that log when a set value is rejected

use std::str::FromStr;

/// Parse an environment variable with a fallback default value
/// Returns the parsed value or the default if the variable is not set or cannot be parsed
pub fn parse_env_or_default<T>(var_name: &str, default: T) -> T
where
    T: FromStr,
{
    match std::env::var(var_name) {
        Ok(raw_value) => match raw_value.parse::<T>() {
            Ok(parsed_value) => parsed_value,
            Err(_) => {
                tracing::warn!(
                    "Environment variable {} has unparseable value '{}', using default",
                    var_name,
                    raw_value
                );
                default
            }
        },
        Err(_) => default,
    }
}

/// Parse an environment variable with validation
/// Returns the parsed value if it passes validation, otherwise returns the default
pub fn parse_env_or_default_with_validation<T, F>(var_name: &str, default: T, validator: F) -> T
where
    T: FromStr + Copy + std::fmt::Display,
    F: Fn(T) -> bool,
{
    match std::env::var(var_name) {
        Ok(raw_value) => match raw_value.parse::<T>() {
            Ok(parsed_value) if validator(parsed_value) => parsed_value,
            Ok(_) => {
                tracing::warn!(
                    "Environment variable {} has invalid value '{}', using default: {}",
                    var_name,
                    raw_value,
                    default
                );
                default
            }
            Err(_) => {
                tracing::warn!(
                    "Environment variable {} has unparseable value '{}', using default: {}",
                    var_name,
                    raw_value,
                    default
                );
                default
            }
        },
        // Variable not set - no warning needed
        Err(_) => default,
    }
}

/// Read a string variable, treating an empty value the same as an unset one
pub fn parse_env_string(var_name: &str) -> Option<String> {
    std::env::var(var_name).ok().filter(|v| !v.is_empty())
}
