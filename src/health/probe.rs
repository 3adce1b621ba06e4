//! Dependency probes.
//!
//! A [`DependencyProbe`] answers one question: does the dependency respond
//! right now? It does not bound its own wait; the caller wraps every ping in
//! the configured timeout.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

/// Why a dependency check failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// No reply within the configured bound.
    Timeout(Duration),
    /// Could not establish or keep a connection (refused, reset, DNS).
    Connection(String),
    /// Connected, but the reply was an error or not what was expected.
    Protocol(String),
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::Timeout(after) => {
                write!(f, "timed out after {:.3}s", after.as_secs_f64())
            }
            ProbeError::Connection(msg) => write!(f, "connection failed: {}", msg),
            ProbeError::Protocol(msg) => write!(f, "protocol error: {}", msg),
        }
    }
}

impl std::error::Error for ProbeError {}

impl From<redis::RedisError> for ProbeError {
    fn from(e: redis::RedisError) -> Self {
        if e.is_io_error() || e.is_connection_refusal() || e.is_connection_dropped() {
            ProbeError::Connection(e.to_string())
        } else if e.is_timeout() {
            ProbeError::Connection(format!("socket timeout: {}", e))
        } else {
            ProbeError::Protocol(e.to_string())
        }
    }
}

/// A dependency the readiness probe can ping.
#[async_trait]
pub trait DependencyProbe: Send + Sync {
    /// Short name used in logs and failure reasons (e.g. "redis").
    fn name(&self) -> &'static str;

    /// Issue one lightweight round trip.
    async fn ping(&self) -> Result<(), ProbeError>;
}

/// Pings Redis over a fresh connection on every call.
pub struct RedisProbe {
    client: redis::Client,
}

impl RedisProbe {
    /// Create a probe for the given connection string. Does not connect.
    ///
    /// `rediss://` URLs connect over rustls.
    pub fn new(url: &str) -> Result<Self, ProbeError> {
        // rustls refuses to build a TLS config until a process-wide provider
        // is chosen; a second install is a no-op error.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let client = redis::Client::open(url)
            .map_err(|e| ProbeError::Protocol(format!("invalid redis url: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DependencyProbe for RedisProbe {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn ping(&self) -> Result<(), ProbeError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let reply: String = redis::cmd("PING").query_async(&mut conn).await?;

        if reply.eq_ignore_ascii_case("PONG") {
            Ok(())
        } else {
            Err(ProbeError::Protocol(format!(
                "unexpected PING reply: {:?}",
                reply
            )))
        }
    }
}
