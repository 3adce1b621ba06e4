//! JSON response builders.

use bytes::Bytes;
use http::header::{HeaderValue, ALLOW, CACHE_CONTROL, CONTENT_TYPE};
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::error::Result;
use crate::health::HealthStatus;

/// Body of `/healthz` and `/readyz` responses.
#[derive(Debug, Serialize)]
pub struct ProbeBody<'a> {
    /// "ok" or "not_ready".
    pub status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'a str>,
}

/// Error body, `{"detail": "..."}`.
#[derive(Debug, Serialize)]
pub struct Detail<'a> {
    pub detail: &'a str,
}

/// Serialize `body` as a JSON response.
pub fn json<T: Serialize>(status: StatusCode, body: &T) -> Result<Response<Full<Bytes>>> {
    let bytes = serde_json::to_vec(body)?;
    let response = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .header(CACHE_CONTROL, "no-store")
        .body(Full::new(Bytes::from(bytes)))?;
    Ok(response)
}

/// Map a probe outcome to its HTTP response.
///
/// Healthy → 200 `{"status":"ok"}`; otherwise 503
/// `{"status":"not_ready","reason":...}`.
pub fn probe(status: &HealthStatus) -> Result<Response<Full<Bytes>>> {
    if status.is_healthy() {
        return json(
            StatusCode::OK,
            &ProbeBody {
                status: "ok",
                reason: None,
            },
        );
    }

    json(
        StatusCode::SERVICE_UNAVAILABLE,
        &ProbeBody {
            status: "not_ready",
            reason: Some(status.message.as_deref().unwrap_or("not ready")),
        },
    )
}

pub fn not_found() -> Result<Response<Full<Bytes>>> {
    json(StatusCode::NOT_FOUND, &Detail { detail: "Not Found" })
}

pub fn method_not_allowed() -> Result<Response<Full<Bytes>>> {
    let mut response = json(
        StatusCode::METHOD_NOT_ALLOWED,
        &Detail {
            detail: "Method Not Allowed",
        },
    )?;
    response
        .headers_mut()
        .insert(ALLOW, HeaderValue::from_static("GET"));
    Ok(response)
}

/// 500 response. Built without fallible steps so it can always be sent.
pub fn internal_error() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(
        br#"{"detail":"Internal Server Error"}"#,
    )));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
