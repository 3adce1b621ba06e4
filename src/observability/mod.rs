//! Observability: trace export lifecycle.
//!
//! [`Telemetry`] owns the OpenTelemetry tracer provider for the life of the
//! process: it is created before logging is installed (so the bridge layer
//! can be added to the subscriber), and shut down after the server stops so
//! buffered spans are flushed.
//!
//! # Usage
//!
//! ```rust,ignore
//! use gateway::observability::Telemetry;
//!
//! let telemetry = Telemetry::init(&config.telemetry)?;
//! gateway::logging::init(&config.logging, &config.app_name, &telemetry)?;
//!
//! // ... run server ...
//!
//! telemetry.shutdown().await;
//! ```

#[cfg(feature = "otel")]
pub mod otel;

use crate::config::TelemetryConfig;

/// Trace export handle. Inert when export is disabled.
#[derive(Default)]
pub struct Telemetry {
    #[cfg(feature = "otel")]
    provider: Option<opentelemetry_sdk::trace::TracerProvider>,
    /// Export was requested but this binary cannot do it.
    #[cfg(not(feature = "otel"))]
    unsupported: bool,
}

impl Telemetry {
    /// A handle that exports nothing.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Start trace export if configured.
    #[cfg(feature = "otel")]
    pub fn init(
        config: &TelemetryConfig,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        if !config.is_enabled() {
            return Ok(Self::disabled());
        }
        Ok(Self {
            provider: Some(otel::init_provider(config)?),
        })
    }

    /// Start trace export if configured.
    #[cfg(not(feature = "otel"))]
    pub fn init(
        config: &TelemetryConfig,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Self {
            unsupported: config.is_enabled(),
        })
    }

    /// Whether spans are being exported.
    pub fn is_exporting(&self) -> bool {
        #[cfg(feature = "otel")]
        {
            self.provider.is_some()
        }
        #[cfg(not(feature = "otel"))]
        {
            false
        }
    }

    /// Log the export state. Call once logging is installed.
    pub fn log_status(&self, config: &TelemetryConfig) {
        if self.is_exporting() {
            tracing::info!(
                endpoint = %config.endpoint_url().unwrap_or_default(),
                service = %config.service_name,
                insecure = config.insecure,
                "OpenTelemetry tracing initialized"
            );
            return;
        }

        #[cfg(not(feature = "otel"))]
        if self.unsupported {
            tracing::warn!("OTLP_ENDPOINT is set but this build lacks the `otel` feature; traces are not exported");
            return;
        }

        tracing::debug!("OpenTelemetry disabled (OTLP_ENDPOINT not set)");
    }

    /// Bridge layer for the `tracing` subscriber, `None` when disabled.
    #[cfg(feature = "otel")]
    pub fn layer<S>(
        &self,
    ) -> Option<tracing_opentelemetry::OpenTelemetryLayer<S, opentelemetry_sdk::trace::Tracer>>
    where
        S: tracing::Subscriber + for<'span> tracing_subscriber::registry::LookupSpan<'span>,
    {
        self.provider.as_ref().map(otel::layer::<S>)
    }

    /// Flush and stop export.
    pub async fn shutdown(self) {
        #[cfg(feature = "otel")]
        if let Some(provider) = self.provider {
            otel::shutdown_provider(provider).await;
        }
    }
}
