//! Logging configuration.

use super::ConfigError;

/// Logging configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// Log filter directive (from LOG_LEVEL or RUST_LOG).
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "gateway=info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Load configuration from environment variables.
    ///
    /// Priority: LOG_LEVEL > RUST_LOG > default
    ///
    /// LOG_LEVEL accepts simple values: trace, debug, info, warn, error
    /// (plus the aliases warning and critical).
    /// RUST_LOG accepts full tracing filter syntax: gateway=debug,hyper=warn
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            filter: Self::resolve_log_filter()?,
        })
    }

    fn resolve_log_filter() -> Result<String, ConfigError> {
        if let Some(level) = std::env::var("LOG_LEVEL")
            .ok()
            .filter(|s| !s.trim().is_empty())
        {
            let directive = normalize_level(&level).ok_or_else(|| ConfigError::Invalid {
                key: "LOG_LEVEL".into(),
                message: format!(
                    "'{}', expected one of: trace, debug, info, warn, error",
                    level
                ),
            })?;
            return Ok(format!("gateway={}", directive));
        }

        if let Ok(filter) = std::env::var("RUST_LOG") {
            return Ok(filter);
        }

        Ok(Self::default().filter)
    }
}

fn normalize_level(level: &str) -> Option<&'static str> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" | "warning" => Some("warn"),
        "error" | "critical" => Some("error"),
        _ => None,
    }
}
