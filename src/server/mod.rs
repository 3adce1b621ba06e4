//! HTTP server for the probe endpoints.
//!
//! This module provides the [`Server`] type: a plain HTTP/1.1 listener that
//! serves `/healthz` and `/readyz` from an immutable [`AppState`].
//!
//! # Example
//!
//! ```rust,ignore
//! use gateway::config::Config;
//! use gateway::health::HealthChecker;
//! use gateway::server::Server;
//!
//! let config = Config::from_env()?;
//! let checker = HealthChecker::from_config(&config.readiness)?;
//!
//! let server = Server::bind(&config.server, checker).await?;
//! server.run(async { tokio::signal::ctrl_c().await.ok(); }).await?;
//! ```
//!
//! # Graceful Shutdown
//!
//! When the shutdown future passed to [`Server::run`] completes, the accept
//! loop stops, open connections are asked to finish their in-flight request
//! and close, and `run` waits for them up to the drain timeout.
//!
//! # Concurrency
//!
//! Every connection runs in its own task. A `/readyz` waiting on Redis only
//! suspends its own request; `/healthz` on another connection is answered
//! immediately.

mod response;
mod routing;

pub use routing::{handle, AppState, REQUEST_ID_HEADER};

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::error::Result;
use crate::health::HealthChecker;

/// Default time to wait for open connections after shutdown is triggered.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Probe server bound to its listening socket.
pub struct Server {
    listener: TcpListener,
    state: Arc<AppState>,
    drain_timeout: Duration,
}

impl Server {
    /// Bind `APP_HOST:APP_PORT`. Host names are resolved by the OS.
    pub async fn bind(config: &ServerConfig, checker: HealthChecker) -> Result<Self> {
        let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;

        Ok(Self {
            listener,
            state: Arc::new(AppState::new(checker)),
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        })
    }

    /// Override the drain timeout.
    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// Address actually bound (useful with port 0).
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept and serve connections until `shutdown` completes, then drain.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let local_addr = self.listener.local_addr()?;
        info!(
            addr = %local_addr,
            gated = self.state.checker.is_gated(),
            "Server listening on http://{}",
            local_addr
        );

        let graceful = GracefulShutdown::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    let (stream, remote_addr) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            // Usually fd exhaustion; back off instead of spinning.
                            warn!(error = %e, "Failed to accept connection");
                            tokio::time::sleep(Duration::from_millis(50)).await;
                            continue;
                        }
                    };

                    if let Err(e) = stream.set_nodelay(true) {
                        debug!(error = %e, "Failed to set TCP_NODELAY");
                    }

                    let state = Arc::clone(&self.state);
                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { routing::handle(state, req, remote_addr).await }
                    });

                    let conn = http1::Builder::new()
                        .keep_alive(true)
                        .serve_connection(TokioIo::new(stream), service);
                    let conn = graceful.watch(conn);

                    tokio::spawn(async move {
                        if let Err(e) = conn.await {
                            debug!(remote = %remote_addr, error = %e, "Connection error");
                        }
                    });
                }
                _ = &mut shutdown => {
                    info!("Shutdown signal received, draining connections");
                    break;
                }
            }
        }

        // Stop accepting before waiting on the open connections.
        drop(self.listener);

        tokio::select! {
            _ = graceful.shutdown() => {
                info!("All connections closed");
            }
            _ = tokio::time::sleep(self.drain_timeout) => {
                warn!(
                    timeout_secs = self.drain_timeout.as_secs_f64(),
                    "Drain timeout elapsed, abandoning open connections"
                );
            }
        }

        Ok(())
    }
}
