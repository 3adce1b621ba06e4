//! Readiness endpoint tests (/readyz)

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::helpers::*;
use gateway::health::{HealthChecker, ProbeError, RedisProbe};
use reqwest::StatusCode;

#[tokio::test(flavor = "multi_thread")]
async fn test_readyz_ungated_ok() {
    let server = TestServer::start(ungated()).await;
    let resp = server.get("/readyz").await;

    assert_status(&resp, StatusCode::OK);
    assert_eq!(body_json(resp).await, serde_json::json!({"status": "ok"}));
    server.stop().await;
}

/// An unreachable Redis does not matter when readiness is not gated on it.
#[tokio::test(flavor = "multi_thread")]
async fn test_readyz_ungated_ignores_unreachable_redis() {
    let fake = FakeRedis::with(
        Duration::ZERO,
        Err(ProbeError::Connection("refused".into())),
    );
    let checker = HealthChecker::new(false, Duration::from_secs(1)).with_dependency(fake.clone());

    let server = TestServer::start(checker).await;
    assert_status(&server.get("/readyz").await, StatusCode::OK);
    assert_eq!(fake.calls(), 0);
    server.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_readyz_gated_redis_up() {
    let fake = FakeRedis::up();
    let checker = HealthChecker::new(true, Duration::from_secs(1)).with_dependency(fake.clone());

    let server = TestServer::start(checker).await;
    let resp = server.get("/readyz").await;
    assert_status(&resp, StatusCode::OK);
    assert_eq!(body_json(resp).await, serde_json::json!({"status": "ok"}));
    assert_eq!(fake.calls(), 1);
    server.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_readyz_gated_real_redis_client_pong() {
    let addr = resp_server("+PONG\r\n").await;
    let url = format!("redis://{}/", addr);
    let checker = HealthChecker::new(true, Duration::from_secs(2))
        .with_dependency(Arc::new(RedisProbe::new(&url).unwrap()));

    let server = TestServer::start(checker).await;
    for _ in 0..2 {
        let resp = server.get("/readyz").await;
        assert_status(&resp, StatusCode::OK);
        assert_eq!(body_json(resp).await, serde_json::json!({"status": "ok"}));
    }
    server.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_readyz_gated_unexpected_ping_reply() {
    let addr = resp_server("+NOPE\r\n").await;
    let url = format!("redis://{}/", addr);
    let checker = HealthChecker::new(true, Duration::from_secs(2))
        .with_dependency(Arc::new(RedisProbe::new(&url).unwrap()));

    let server = TestServer::start(checker).await;
    let resp = server.get("/readyz").await;
    assert_status(&resp, StatusCode::SERVICE_UNAVAILABLE);

    let body = body_json(resp).await;
    assert_eq!(body["status"], "not_ready");
    let reason = body["reason"].as_str().unwrap();
    assert!(reason.contains("protocol error"), "{}", reason);
    server.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_readyz_gated_connection_refused() {
    let url = format!("redis://127.0.0.1:{}/", closed_port());
    let checker = HealthChecker::new(true, Duration::from_secs(2))
        .with_dependency(Arc::new(RedisProbe::new(&url).unwrap()));

    let server = TestServer::start(checker).await;
    let resp = server.get("/readyz").await;
    assert_status(&resp, StatusCode::SERVICE_UNAVAILABLE);

    let body = body_json(resp).await;
    assert_eq!(body["status"], "not_ready");
    let reason = body["reason"].as_str().unwrap();
    assert!(!reason.is_empty());
    assert!(reason.starts_with("redis dependency not ready"), "{}", reason);
    server.stop().await;
}

/// A Redis that accepts but never answers is bounded by the probe timeout.
#[tokio::test(flavor = "multi_thread")]
async fn test_readyz_gated_timeout() {
    let (_hung, addr) = silent_listener().await;
    let url = format!("redis://{}/", addr);
    let checker = HealthChecker::new(true, Duration::from_millis(200))
        .with_dependency(Arc::new(RedisProbe::new(&url).unwrap()));

    let server = TestServer::start(checker).await;
    let start = Instant::now();
    let resp = server.get("/readyz").await;
    let elapsed = start.elapsed();

    assert_status(&resp, StatusCode::SERVICE_UNAVAILABLE);
    assert!(elapsed < Duration::from_secs(2), "took {:?}", elapsed);

    let body = body_json(resp).await;
    assert!(
        body["reason"].as_str().unwrap().contains("timed out"),
        "{}",
        body
    );
    server.stop().await;
}

/// Readiness is not cached: every request pings again.
#[tokio::test(flavor = "multi_thread")]
async fn test_readyz_reprobes_each_request() {
    let fake = FakeRedis::up();
    let checker = HealthChecker::new(true, Duration::from_secs(1)).with_dependency(fake.clone());

    let server = TestServer::start(checker).await;
    for _ in 0..3 {
        assert_status(&server.get("/readyz").await, StatusCode::OK);
    }
    assert_eq!(fake.calls(), 3);
    server.stop().await;
}

/// A slow readiness check does not hold up liveness.
#[tokio::test(flavor = "multi_thread")]
async fn test_slow_readyz_does_not_block_healthz() {
    let fake = FakeRedis::slow(Duration::from_millis(1500));
    let checker = HealthChecker::new(true, Duration::from_secs(5)).with_dependency(fake.clone());

    let server = Arc::new(TestServer::start(checker).await);

    let slow = {
        let server = Arc::clone(&server);
        tokio::spawn(async move { server.get("/readyz").await.status() })
    };

    // Let the readiness request reach the probe first.
    while fake.calls() == 0 {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let start = Instant::now();
    assert_status(&server.get("/healthz").await, StatusCode::OK);
    assert!(start.elapsed() < Duration::from_millis(1000));

    assert_eq!(slow.await.unwrap(), StatusCode::OK);
}
