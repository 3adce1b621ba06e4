//! OpenTelemetry integration for distributed tracing.
//!
//! Spans created with `tracing` are bridged into OpenTelemetry through
//! `tracing-opentelemetry` and exported over OTLP/gRPC to a collector
//! (Jaeger, Tempo, the OpenTelemetry Collector, ...).
//!
//! # Configuration
//!
//! - `OTLP_ENDPOINT`: OTLP gRPC endpoint; export is enabled when set
//! - `OTEL_SERVICE_NAME`: Service name in traces (default: `gateway`)
//! - `OTLP_INSECURE`: Plaintext gRPC when true (default), TLS otherwise

use std::time::Duration;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::{WithExportConfig, WithTonicConfig};
use opentelemetry_sdk::{
    runtime,
    trace::{Config, Sampler, Tracer, TracerProvider},
    Resource,
};
use tracing::Subscriber;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::registry::LookupSpan;

use crate::config::TelemetryConfig;

// Semantic convention keys (avoiding dependency on semconv crate)
const SERVICE_NAME: &str = "service.name";
const SERVICE_VERSION: &str = "service.version";

const EXPORT_TIMEOUT: Duration = Duration::from_secs(10);

/// Instrumentation scope name for spans emitted by this crate.
pub const TRACER_NAME: &str = "gateway";

/// Build the OTLP exporter and tracer provider, and install the provider
/// globally. Must run inside a Tokio runtime (the batch processor spawns
/// onto it).
pub fn init_provider(
    config: &TelemetryConfig,
) -> Result<TracerProvider, Box<dyn std::error::Error + Send + Sync>> {
    let endpoint = config
        .endpoint_url()
        .ok_or("trace export requested without OTLP_ENDPOINT")?;

    let resource = Resource::new([
        KeyValue::new(SERVICE_NAME, config.service_name.clone()),
        KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")),
    ]);

    let mut builder = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .with_timeout(EXPORT_TIMEOUT);

    if !config.insecure {
        builder =
            builder.with_tls_config(tonic::transport::ClientTlsConfig::new().with_native_roots());
    }

    let exporter = builder.build()?;

    let provider = TracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_config(
            Config::default()
                .with_resource(resource)
                .with_sampler(Sampler::ParentBased(Box::new(Sampler::AlwaysOn))),
        )
        .build();

    global::set_tracer_provider(provider.clone());

    Ok(provider)
}

/// `tracing` layer that records spans into the given provider.
pub fn layer<S>(provider: &TracerProvider) -> OpenTelemetryLayer<S, Tracer>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    tracing_opentelemetry::layer().with_tracer(provider.tracer(TRACER_NAME))
}

/// Flush pending spans and stop the batch processor.
///
/// Shutdown blocks the calling thread, so it runs on the blocking pool.
pub async fn shutdown_provider(provider: TracerProvider) {
    let result = tokio::task::spawn_blocking(move || provider.shutdown()).await;
    match result {
        Ok(Ok(())) => tracing::info!("OpenTelemetry tracing shutdown complete"),
        Ok(Err(e)) => tracing::warn!(error = %e, "OpenTelemetry shutdown reported an error"),
        Err(e) => tracing::warn!(error = %e, "OpenTelemetry shutdown task failed"),
    }
}
