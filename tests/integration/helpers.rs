//! Test helpers and utilities

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gateway::config::ServerConfig;
use gateway::health::{DependencyProbe, HealthChecker, ProbeError};
use gateway::Server;
use reqwest::{Client, Response, StatusCode};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// In-process server on an ephemeral port
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<gateway::error::Result<()>>>,
}

#[allow(dead_code)]
impl TestServer {
    /// Start a server with the given readiness checker
    pub async fn start(checker: HealthChecker) -> Self {
        let config = ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
        };

        let server = Server::bind(&config, checker)
            .await
            .expect("Failed to bind test server")
            .with_drain_timeout(Duration::from_secs(2));
        let addr = server.local_addr().expect("Failed to read local address");

        let (stop, stopped) = oneshot::channel::<()>();
        let task = tokio::spawn(server.run(async {
            let _ = stopped.await;
        }));

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: format!("http://{}", addr),
            client,
            stop: Some(stop),
            task: Some(task),
        }
    }

    /// Make a GET request to the server
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// Make a GET request with custom headers
    pub async fn get_with_headers(&self, path: &str, headers: &[(&str, &str)]) -> Response {
        let mut req = self.client.get(format!("{}{}", self.base_url, path));
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        req.send().await.expect("GET request failed")
    }

    /// Make a POST request with an empty body
    pub async fn post(&self, path: &str) -> Response {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("POST request failed")
    }

    /// Trigger graceful shutdown and wait for the server task
    pub async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(task) = self.task.take() {
            task.await
                .expect("Server task panicked")
                .expect("Server returned an error");
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}

/// Checker that never touches the network
pub fn ungated() -> HealthChecker {
    HealthChecker::new(false, Duration::from_secs(5))
}

/// Loopback port with nothing listening on it
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind probe port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

/// Listener that accepts TCP but never answers, like a hung Redis
pub async fn silent_listener() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind silent listener");
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

/// Loopback Redis stand-in speaking RESP: `+OK` to every command
/// (the client's connection setup included), `ping_reply` to PING
pub async fn resp_server(ping_reply: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind RESP server");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                loop {
                    let n = match stream.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => n,
                    };
                    buf.extend_from_slice(&chunk[..n]);

                    while let Some((command, used)) = parse_command(&buf) {
                        buf.drain(..used);
                        let reply = if command.eq_ignore_ascii_case("PING") {
                            ping_reply
                        } else {
                            "+OK\r\n"
                        };
                        if stream.write_all(reply.as_bytes()).await.is_err() {
                            return;
                        }
                    }
                }
            });
        }
    });

    addr
}

/// Name of one complete RESP command in `buf`, and the bytes it used
fn parse_command(buf: &[u8]) -> Option<(String, usize)> {
    let (count, mut pos) = resp_header(buf, 0, b'*')?;
    let mut name = String::new();
    for i in 0..count {
        let (len, start) = resp_header(buf, pos, b'$')?;
        let end = start + len;
        if buf.len() < end + 2 {
            return None;
        }
        if i == 0 {
            name = String::from_utf8_lossy(&buf[start..end]).into_owned();
        }
        pos = end + 2;
    }
    Some((name, pos))
}

fn resp_header(buf: &[u8], pos: usize, prefix: u8) -> Option<(usize, usize)> {
    if *buf.get(pos)? != prefix {
        return None;
    }
    let line_len = buf[pos..].windows(2).position(|w| w == b"\r\n")?;
    let n = std::str::from_utf8(&buf[pos + 1..pos + line_len])
        .ok()?
        .parse()
        .ok()?;
    Some((n, pos + line_len + 2))
}

/// Scripted dependency with a call counter
pub struct FakeRedis {
    pub delay: Duration,
    pub result: Result<(), ProbeError>,
    pub calls: AtomicUsize,
}

#[allow(dead_code)]
impl FakeRedis {
    pub fn up() -> Arc<Self> {
        Self::with(Duration::ZERO, Ok(()))
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Self::with(delay, Ok(()))
    }

    pub fn with(delay: Duration, result: Result<(), ProbeError>) -> Arc<Self> {
        Arc::new(Self {
            delay,
            result,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DependencyProbe for FakeRedis {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn ping(&self) -> Result<(), ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.result.clone()
    }
}

/// Assert that response has expected status
pub fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(
        response.status(),
        expected,
        "Expected status {}, got {}",
        expected,
        response.status()
    );
}

/// Assert that response contains header
pub fn assert_header(response: &Response, name: &str, expected: &str) {
    let value = response
        .headers()
        .get(name)
        .unwrap_or_else(|| panic!("Header '{}' not found", name))
        .to_str()
        .unwrap();
    assert_eq!(value, expected, "Header '{}' mismatch", name);
}

/// Read the body as JSON
pub async fn body_json(response: Response) -> serde_json::Value {
    response.json().await.expect("Body is not valid JSON")
}
