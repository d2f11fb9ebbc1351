//! Environment-driven configuration helpers
//!
//! Every setting in the workspace is read from the process environment. These
//! helpers keep the parsing and error reporting uniform.

use std::str::FromStr;
use thiserror::Error;

/// A configuration value was present but could not be parsed
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid value for {key}: '{value}' ({detail})")]
pub struct ConfigError {
    /// Environment variable name
    pub key: String,
    /// Raw value found in the environment
    pub value: String,
    /// Parser message
    pub detail: String,
}

/// Read a string variable, falling back to `default` when unset or blank
pub fn env_string(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => default.to_string(),
    }
}

/// Parse a variable into `T`, falling back to `default` when unset or blank
pub fn env_parse<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, std::env::var(key).ok(), default)
}

/// Read a boolean flag ("1", "true", "yes", "on" / "0", "false", "no", "off")
pub fn env_flag(key: &str, default: bool) -> Result<bool, ConfigError> {
    flag_value(key, std::env::var(key).ok(), default)
}

fn parse_value<T>(key: &str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(v) if !v.trim().is_empty() => v.trim().parse().map_err(|e: T::Err| ConfigError {
            key: key.to_string(),
            value: v.clone(),
            detail: e.to_string(),
        }),
        _ => Ok(default),
    }
}

fn flag_value(key: &str, raw: Option<String>, default: bool) -> Result<bool, ConfigError> {
    let Some(v) = raw.filter(|v| !v.trim().is_empty()) else {
        return Ok(default);
    };
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError {
            key: key.to_string(),
            value: v,
            detail: "expected a boolean".to_string(),
        }),
    }
}
