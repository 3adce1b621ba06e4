//! Server configuration.

use super::parse::{env_or, env_parse};
use super::ConfigError;

/// Server configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Bind host, name or address (default: 0.0.0.0).
    pub host: String,
    /// Bind port (default: 8000).
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let host = env_or("APP_HOST", &defaults.host).trim().to_string();
        if host.is_empty() {
            return Err(ConfigError::Invalid {
                key: "APP_HOST".into(),
                message: "must not be empty".into(),
            });
        }

        Ok(Self {
            host,
            port: env_parse("APP_PORT", defaults.port)?,
        })
    }

    /// Printable `host:port`, bracketing IPv6 literals.
    pub fn display_addr(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}
