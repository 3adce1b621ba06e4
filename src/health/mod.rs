//! Health check module for Kubernetes probes.
//!
//! Provides two types of health checks:
//! - **Liveness** (`/healthz`): Is the process alive? Unconditional.
//! - **Readiness** (`/readyz`): Can the service handle traffic? Optionally
//!   gated on a Redis `PING` that must answer within `REQUEST_TIMEOUT_S`.
//!
//! # Kubernetes Integration
//!
//! ```yaml
//! livenessProbe:
//!   httpGet:
//!     path: /healthz
//!     port: 8000
//!   periodSeconds: 10
//!
//! readinessProbe:
//!   httpGet:
//!     path: /readyz
//!     port: 8000
//!   periodSeconds: 5
//!   timeoutSeconds: 6
//! ```
//!
//! The readiness timeout configured in Kubernetes should exceed
//! `REQUEST_TIMEOUT_S`, otherwise the kubelet gives up before the gateway
//! reports the cause.

mod checker;
mod probe;
mod status;

pub use checker::HealthChecker;
pub use probe::{DependencyProbe, ProbeError, RedisProbe};
pub use status::{HealthStatus, ProbeType};
