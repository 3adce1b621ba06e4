//! Request routing and per-request instrumentation.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http::header::HeaderValue;
use http_body_util::Full;
use hyper::{Method, Request, Response};
use tracing::{error, field, info, info_span, Instrument};
use uuid::Uuid;

use super::response;
use crate::error::Result;
use crate::health::{HealthChecker, ProbeType};
use crate::logging::ACCESS_TARGET;

/// Header carrying the correlation id, honoured on input and echoed back.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest client-supplied request id we accept.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Shared, read-only state handed to every request.
pub struct AppState {
    pub checker: HealthChecker,
}

impl AppState {
    pub fn new(checker: HealthChecker) -> Self {
        Self { checker }
    }
}

/// Serve one request: route, record the span, write the access log.
///
/// Never fails: handler errors become a logged 500.
pub async fn handle<B>(
    state: Arc<AppState>,
    req: Request<B>,
    remote_addr: SocketAddr,
) -> std::result::Result<Response<Full<Bytes>>, Infallible> {
    let start = Instant::now();
    let request_id = request_id(&req);
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let span = info_span!(
        "http.request",
        otel.name = %format!("{} {}", method, path),
        otel.kind = "server",
        otel.status_code = field::Empty,
        http.request.method = %method,
        url.path = %path,
        http.response.status_code = field::Empty,
        client.address = %remote_addr.ip(),
        request_id = %request_id,
    );

    let mut response = match route(&state, &method, &path).instrument(span.clone()).await {
        Ok(response) => response,
        Err(e) => {
            span.in_scope(|| {
                error!(request_id = %request_id, error = %e, "Request handling failed");
            });
            response::internal_error()
        }
    };

    let status = response.status();
    span.record("http.response.status_code", status.as_u16());
    if status.is_server_error() {
        span.record("otel.status_code", "ERROR");
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    span.in_scope(|| {
        info!(
            target: ACCESS_TARGET,
            request_id = %request_id,
            method = %method,
            path = %path,
            status = status.as_u16() as u64,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            ip = %remote_addr.ip(),
        );
    });

    Ok(response)
}

/// Dispatch by path, then method.
async fn route(state: &AppState, method: &Method, path: &str) -> Result<Response<Full<Bytes>>> {
    let Some(probe) = ProbeType::from_path(path) else {
        return response::not_found();
    };

    if *method != Method::GET {
        return response::method_not_allowed();
    }

    let status = state.checker.check(probe).await;
    response::probe(&status)
}

/// Client-supplied `X-Request-Id` when usable, otherwise a fresh one.
fn request_id<B>(req: &Request<B>) -> String {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().simple().to_string())
}
