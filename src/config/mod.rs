//! Configuration module for the gateway.
//!
//! All settings come from environment variables and are read exactly once,
//! at startup. The resulting [`Config`] is immutable and handed to the
//! server behind an `Arc`; nothing reads the environment at request time.
//!
//! # Example
//!
//! ```rust,ignore
//! use gateway::config::Config;
//!
//! let config = Config::from_env()?;
//! println!("Listen address: {}", config.server.display_addr());
//! println!("Gate on Redis: {}", config.readiness.require_redis);
//! ```

mod error;
mod logging;
mod parse;
mod readiness;
mod server;
mod telemetry;

pub use error::ConfigError;
pub use logging::LoggingConfig;
pub use readiness::{redact_url, ReadinessConfig, DEFAULT_PROBE_TIMEOUT};
pub use server::ServerConfig;
pub use telemetry::TelemetryConfig;

use parse::env_opt;

/// Serializes tests that mutate process environment.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Complete application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Service name exposed on health endpoints and in logs (APP_NAME).
    pub app_name: String,
    /// Server configuration.
    pub server: ServerConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
    /// Readiness probe configuration.
    pub readiness: ReadinessConfig,
    /// Trace export configuration.
    pub telemetry: TelemetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "gateway".to_string(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            readiness: ReadinessConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            app_name: env_opt("APP_NAME").unwrap_or_else(|| "gateway".to_string()),
            server: ServerConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
            readiness: ReadinessConfig::from_env()?,
            telemetry: TelemetryConfig::from_env()?,
        })
    }

    /// Print configuration summary to log.
    pub fn log_summary(&self) {
        use tracing::info;

        info!("Configuration loaded:");
        info!("  Service: {}", self.app_name);
        info!("  Listen: {}", self.server.display_addr());
        info!("  Log filter: {}", self.logging.filter);

        match self.readiness.redacted_redis_url() {
            Some(url) => info!("  Redis: {}", url),
            None => info!("  Redis: not configured"),
        }
        info!(
            "  Readiness gated on Redis: {}",
            if self.readiness.require_redis { "yes" } else { "no" }
        );
        info!(
            "  Probe timeout: {:.3}s",
            self.readiness.timeout.as_secs_f64()
        );

        match self.telemetry.endpoint_url() {
            Some(endpoint) => info!(
                "  Trace export: {} (service.name={}, insecure={})",
                endpoint, self.telemetry.service_name, self.telemetry.insecure
            ),
            None => info!("  Trace export: disabled"),
        }
    }
}
