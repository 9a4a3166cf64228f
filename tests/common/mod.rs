//! Shared fixtures for integration tests: a minimal HTTP responder and an
//! instrumented in-memory prober.
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use verbscan::{ProbeOutcome, ProbeRequest, Prober};

/// One-request-per-connection HTTP server.
///
/// Answers each method with a fixed status (or `default_status`). TRACE
/// responses echo the raw request back as the body, like a real server
/// with TRACE enabled.
pub struct MockServer {
    pub addr: SocketAddr,
    pub requests: Arc<Mutex<Vec<String>>>,
}

impl MockServer {
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    pub fn recorded(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

pub async fn spawn_server(statuses: &[(&str, u16)], default_status: u16) -> MockServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let statuses: Arc<HashMap<String, u16>> =
        Arc::new(statuses.iter().map(|(m, s)| (m.to_string(), *s)).collect());
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&requests);

    tokio::spawn(async move {
        loop {
            let (mut socket, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => return,
            };
            let statuses = Arc::clone(&statuses);
            let recorded = Arc::clone(&recorded);

            tokio::spawn(async move {
                let mut raw = Vec::new();
                let mut buf = [0u8; 1024];
                loop {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            raw.extend_from_slice(&buf[..n]);
                            if raw.windows(4).any(|w| w == b"\r\n\r\n") {
                                break;
                            }
                        }
                    }
                }
                let request = String::from_utf8_lossy(&raw).to_string();
                let method = request.split_whitespace().next().unwrap_or("").to_string();
                recorded.lock().unwrap().push(request.clone());

                let status = statuses.get(&method).copied().unwrap_or(default_status);
                let body = match method.as_str() {
                    "TRACE" => request,
                    "HEAD" => String::new(),
                    _ => format!("handled {}", method),
                };
                let content_length = if method == "HEAD" { 0 } else { body.len() };
                let location = if (300..400).contains(&status) { "Location: /moved\r\n" } else { "" };
                let response = format!(
                    "HTTP/1.1 {} Mock\r\n{}Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status, location, content_length, body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    MockServer { addr, requests }
}

/// A prober that never touches the network and tracks how many probes run
/// at the same time.
pub struct FakeProber {
    pub statuses: HashMap<String, u16>,
    pub default_status: u16,
    pub delays: HashMap<String, Duration>,
    pub default_delay: Duration,
    pub failing: Vec<String>,
    pub in_flight: AtomicUsize,
    pub peak: AtomicUsize,
    pub calls: AtomicUsize,
    /// (url, method, start, end) for every probe
    pub spans: Mutex<Vec<(String, String, Instant, Instant)>>,
}

impl FakeProber {
    pub fn new(default_status: u16, default_delay: Duration) -> Self {
        Self {
            statuses: HashMap::new(),
            default_status,
            delays: HashMap::new(),
            default_delay,
            failing: Vec::new(),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
            spans: Mutex::new(Vec::new()),
        }
    }

    pub fn with_status(mut self, method: &str, status: u16) -> Self {
        self.statuses.insert(method.to_string(), status);
        self
    }

    pub fn with_delay(mut self, method: &str, delay: Duration) -> Self {
        self.delays.insert(method.to_string(), delay);
        self
    }

    pub fn failing_on(mut self, method: &str) -> Self {
        self.failing.push(method.to_string());
        self
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Prober for FakeProber {
    async fn probe(&self, request: &ProbeRequest) -> ProbeOutcome {
        let start = Instant::now();
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);

        let delay = self.delays.get(&request.method).copied().unwrap_or(self.default_delay);
        tokio::time::sleep(delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.spans.lock().unwrap().push((
            request.url.clone(),
            request.method.clone(),
            start,
            Instant::now(),
        ));

        if self.failing.contains(&request.method) {
            return ProbeOutcome::transport_failure(&request.method, "connection reset", delay.as_millis() as u64);
        }

        let status = self.statuses.get(&request.method).copied().unwrap_or(self.default_status);
        let body = if request.method == "TRACE" {
            format!("User-Agent: {}", request.profile.user_agent).into_bytes()
        } else {
            Vec::new()
        };
        ProbeOutcome {
            method: request.method.clone(),
            status_code: status,
            status_text: status.to_string(),
            elapsed_ms: delay.as_millis() as u64,
            body_bytes: body.len(),
            transport_error: None,
            body,
        }
    }
}

pub fn methods(names: &[&str]) -> Vec<String> {
    names.iter().map(|m| m.to_string()).collect()
}
