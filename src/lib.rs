//! gateway - Minimal HTTP gateway shell powered by Rust and Tokio.
//!
//! This crate provides the process skeleton for an HTTP service: environment
//! configuration, structured JSON logging, optional OpenTelemetry trace
//! export, and the two orchestrator probe endpoints.
//!
//! # Endpoints
//!
//! - `GET /healthz` - liveness, always `200 {"status":"ok"}`
//! - `GET /readyz` - readiness, `200` or `503 {"status":"not_ready","reason":...}`
//!   when gated on a Redis ping (`READY_REDIS_CHECK`)
//!
//! # Example
//!
//! ```rust,ignore
//! use gateway::{Config, Server};
//! use gateway::health::HealthChecker;
//!
//! let config = Config::from_env()?;
//! let checker = HealthChecker::from_config(&config.readiness)?;
//! let server = Server::bind(&config.server, checker).await?;
//! server.run(std::future::pending()).await?;
//! ```

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash (8 chars), empty when unknown at build time
pub const BUILD_VERSION: &str = env!("BUILD_VERSION");

/// Full version string: "0.1.0 (abc12345)", or "0.1.0" without a commit.
pub fn version() -> String {
    if BUILD_VERSION.is_empty() {
        PKG_VERSION.to_string()
    } else {
        format!("{} ({})", PKG_VERSION, BUILD_VERSION)
    }
}

pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod observability;
pub mod server;

// Re-exports for convenience
pub use config::Config;
pub use server::Server;
