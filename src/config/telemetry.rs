//! Trace export configuration.

use super::parse::{env_flag, env_opt};
use super::ConfigError;

/// OpenTelemetry export settings. Export is on when an endpoint is set.
#[derive(Clone, Debug)]
pub struct TelemetryConfig {
    /// `service.name` resource attribute.
    pub service_name: String,
    /// OTLP gRPC endpoint, e.g. `http://otel-collector:4317`.
    pub endpoint: Option<String>,
    /// Export over plaintext gRPC instead of TLS.
    pub insecure: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "gateway".to_string(),
            endpoint: None,
            insecure: true,
        }
    }
}

impl TelemetryConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            service_name: env_opt("OTEL_SERVICE_NAME").unwrap_or_else(|| "gateway".to_string()),
            endpoint: env_opt("OTLP_ENDPOINT"),
            insecure: env_flag("OTLP_INSECURE", true)?,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Endpoint with an explicit scheme. A bare `host:port` gets `http://`
    /// when insecure and `https://` otherwise.
    pub fn endpoint_url(&self) -> Option<String> {
        self.endpoint.as_deref().map(|endpoint| {
            if endpoint.contains("://") {
                endpoint.to_string()
            } else if self.insecure {
                format!("http://{}", endpoint)
            } else {
                format!("https://{}", endpoint)
            }
        })
    }
}
