//! Health checker implementation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, field, info_span, warn, Instrument};

use super::{DependencyProbe, HealthStatus, ProbeError, ProbeType, RedisProbe};
use crate::config::{ConfigError, ReadinessConfig};

/// Health checker for Kubernetes probes.
///
/// Holds no mutable state. Every readiness check re-probes the dependency;
/// nothing is cached between requests and nothing is retried.
#[derive(Clone)]
pub struct HealthChecker {
    /// Whether a dependency failure fails readiness.
    gated: bool,
    /// Bound on a single dependency round trip (connect included).
    timeout: Duration,
    dependency: Option<Arc<dyn DependencyProbe>>,
}

impl HealthChecker {
    /// Create a checker with no dependency attached.
    pub fn new(gated: bool, timeout: Duration) -> Self {
        Self {
            gated,
            timeout,
            dependency: None,
        }
    }

    /// Attach the dependency to probe.
    pub fn with_dependency(mut self, dependency: Arc<dyn DependencyProbe>) -> Self {
        self.dependency = Some(dependency);
        self
    }

    /// Build from configuration, wiring a Redis probe when a URL is set.
    pub fn from_config(config: &ReadinessConfig) -> Result<Self, ConfigError> {
        let checker = Self::new(config.require_redis, config.timeout);

        match config.redis_url.as_deref() {
            Some(url) => {
                let probe = RedisProbe::new(url).map_err(|e| ConfigError::Invalid {
                    key: "REDIS_URL".into(),
                    message: e.to_string(),
                })?;
                Ok(checker.with_dependency(Arc::new(probe)))
            }
            None => Ok(checker),
        }
    }

    pub fn is_gated(&self) -> bool {
        self.gated
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Perform health check based on probe type.
    pub async fn check(&self, probe: ProbeType) -> HealthStatus {
        match probe {
            ProbeType::Liveness => self.check_liveness(),
            ProbeType::Readiness => self.check_readiness().await,
        }
    }

    /// Liveness probe: answering at all means the event loop is responsive.
    pub fn check_liveness(&self) -> HealthStatus {
        HealthStatus::healthy()
    }

    /// Readiness probe: can we serve traffic?
    ///
    /// Ungated readiness never touches the network.
    pub async fn check_readiness(&self) -> HealthStatus {
        if !self.gated {
            return HealthStatus::healthy();
        }

        let Some(dependency) = self.dependency.as_ref() else {
            return HealthStatus::not_ready("readiness is gated but no dependency is configured");
        };

        let start = Instant::now();
        match self.ping(dependency.as_ref()).await {
            Ok(()) => {
                debug!(
                    dependency = dependency.name(),
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Dependency check passed"
                );
                HealthStatus::healthy()
            }
            Err(e) => {
                warn!(
                    dependency = dependency.name(),
                    error = %e,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Dependency check failed"
                );
                HealthStatus::not_ready(format!("{} dependency not ready: {}", dependency.name(), e))
            }
        }
    }

    /// Ping the configured dependency regardless of gating.
    ///
    /// Returns `None` when no dependency is configured. Used for the
    /// one-shot connectivity check at startup.
    pub async fn ping_dependency(&self) -> Option<Result<(), ProbeError>> {
        let dependency = self.dependency.as_ref()?;
        Some(self.ping(dependency.as_ref()).await)
    }

    /// Name of the configured dependency, if any.
    pub fn dependency_name(&self) -> Option<&'static str> {
        self.dependency.as_ref().map(|d| d.name())
    }

    /// One bounded ping, traced as its own client span.
    async fn ping(&self, dependency: &dyn DependencyProbe) -> Result<(), ProbeError> {
        let span = info_span!(
            "dependency.ping",
            otel.kind = "client",
            otel.status_code = field::Empty,
            dependency = dependency.name(),
        );

        let result = match tokio::time::timeout(self.timeout, dependency.ping())
            .instrument(span.clone())
            .await
        {
            Ok(result) => result,
            Err(_) => Err(ProbeError::Timeout(self.timeout)),
        };

        if result.is_err() {
            span.record("otel.status_code", "ERROR");
        }
        result
    }
}
