//! Environment variable parsing utilities.

use std::str::FromStr;
use std::time::Duration;

use super::ConfigError;

/// Get environment variable with default value.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get optional environment variable (None if empty or missing).
pub fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

/// Parse environment variable with type conversion.
pub fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(v) if !v.is_empty() => v.trim().parse().map_err(|e: T::Err| ConfigError::Parse {
            key: key.into(),
            value: v,
            error: e.to_string(),
        }),
        _ => Ok(default),
    }
}

/// Parse a boolean flag.
///
/// Accepts 1/true/yes/on/t/y and 0/false/no/off/f/n, case-insensitive.
pub fn parse_bool(s: &str) -> Result<bool, String> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "t" | "y" => Ok(true),
        "0" | "false" | "no" | "off" | "f" | "n" => Ok(false),
        other => Err(format!("expected a boolean, got '{}'", other)),
    }
}

/// Parse environment variable as boolean. Unrecognized values are an error.
pub fn env_flag(key: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => parse_bool(&v).map_err(|error| ConfigError::Parse {
            key: key.into(),
            value: v,
            error,
        }),
        _ => Ok(default),
    }
}

/// Parse a positive number of seconds, fractions allowed (e.g. "5", "0.25").
pub fn parse_seconds(s: &str) -> Result<Duration, String> {
    let secs: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("invalid number of seconds: {}", s.trim()))?;

    if !secs.is_finite() || secs <= 0.0 {
        return Err(format!("must be a positive number of seconds, got {}", secs));
    }

    Duration::try_from_secs_f64(secs).map_err(|e| e.to_string())
}

/// Parse environment variable as a duration in seconds.
pub fn env_seconds(key: &str, default: Duration) -> Result<Duration, ConfigError> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => parse_seconds(&v).map_err(|error| ConfigError::Parse {
            key: key.into(),
            value: v,
            error,
        }),
        _ => Ok(default),
    }
}
