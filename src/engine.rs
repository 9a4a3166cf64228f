// Async HTTP engine for verbscan
// Uses reqwest and tokio; one shared client serves every probe of a campaign

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{redirect::Policy, Client, Method, Proxy, Url};
use std::time::Instant;
use tracing::debug;

use crate::auth::AuthStrategy;
use crate::models::{ProbeOutcome, ProbeRequest, RequestProfile};
use crate::params::build_header_map;

/// Executes a single (URL, method) request.
///
/// Implementations must resolve every request to a `ProbeOutcome`, folding
/// failures into the outcome instead of returning an error.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, request: &ProbeRequest) -> ProbeOutcome;
}

pub struct HttpProber {
    pub client: Client,
}

impl HttpProber {
    pub fn new(profile: &RequestProfile) -> Result<Self, reqwest::Error> {
        Ok(Self { client: build_client(profile)? })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

/// Builds the campaign-wide client: TLS verification, proxy, timeout and
/// redirect policy all come from the profile.
pub fn build_client(profile: &RequestProfile) -> Result<Client, reqwest::Error> {
    let redirect = if profile.follow_redirects {
        Policy::default()
    } else {
        Policy::none()
    };

    let mut builder = Client::builder()
        .danger_accept_invalid_certs(profile.insecure_tls)
        .redirect(redirect)
        .pool_max_idle_per_host(100)
        .pool_idle_timeout(std::time::Duration::from_secs(90));

    if let Some(timeout) = profile.timeout_limit() {
        builder = builder.timeout(timeout);
    }
    if let Some(proxy) = &profile.proxy {
        builder = builder.proxy(Proxy::all(proxy.as_str())?);
    }

    builder.build()
}

/// Status code plus its registered reason, e.g. "200 OK". The server's own
/// reason phrase is not used.
pub fn status_text(status: reqwest::StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, request: &ProbeRequest) -> ProbeOutcome {
        let method = request.method.as_str();

        let http_method = match Method::from_bytes(method.as_bytes()) {
            Ok(m) => m,
            Err(e) => return ProbeOutcome::transport_failure(method, e, 0),
        };
        let url = match Url::parse(&request.url) {
            Ok(u) => u,
            Err(e) => return ProbeOutcome::transport_failure(method, e, 0),
        };

        let profile = &request.profile;
        let mut headers = build_header_map(&profile.headers, &profile.cookies, &profile.user_agent);
        // configured credentials replace any custom Authorization header
        if profile.basic_auth.is_some() {
            headers.remove(AUTHORIZATION);
        }
        let mut req = self.client.request(http_method, url).headers(headers);
        if let Some(timeout) = profile.timeout_limit() {
            req = req.timeout(timeout);
        }
        if let Some(auth) = &profile.basic_auth {
            req = auth.apply_auth(req);
        }

        let start = Instant::now();
        let response = match req.send().await {
            Ok(resp) => resp,
            Err(e) => {
                let elapsed = elapsed_ms(start);
                debug!(method, url = %request.url, error = %e, "probe failed");
                return ProbeOutcome::transport_failure(method, e, elapsed);
            }
        };
        let elapsed = elapsed_ms(start);

        let status = response.status();
        // read errors leave an empty body
        let body = response.bytes().await.map(|b| b.to_vec()).unwrap_or_default();

        ProbeOutcome {
            method: method.to_string(),
            status_code: status.as_u16(),
            status_text: status_text(status),
            elapsed_ms: elapsed,
            body_bytes: body.len(),
            transport_error: None,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn status_text_uses_canonical_reason() {
        assert_eq!(status_text(reqwest::StatusCode::OK), "200 OK");
        assert_eq!(status_text(reqwest::StatusCode::METHOD_NOT_ALLOWED), "405 Method Not Allowed");
        let odd = reqwest::StatusCode::from_u16(599).unwrap();
        assert_eq!(status_text(odd), "599");
    }

    #[test]
    fn client_builds_with_proxy_and_insecure_tls() {
        let profile = RequestProfile {
            insecure_tls: true,
            follow_redirects: true,
            proxy: Some("http://127.0.0.1:8080".to_string()),
            ..RequestProfile::default()
        };
        assert!(build_client(&profile).is_ok());
    }

    #[tokio::test]
    async fn invalid_method_fails_without_network() {
        let prober = HttpProber::new(&RequestProfile::default()).unwrap();
        let request = ProbeRequest::new("https://example.invalid/", "BAD METHOD", Arc::new(RequestProfile::default()));
        let outcome = prober.probe(&request).await;
        assert_eq!(outcome.status_code, 0);
        assert_eq!(outcome.elapsed_ms, 0);
        assert!(outcome.status_text.starts_with("Error: "));
    }

    #[tokio::test]
    async fn unparseable_url_fails_without_network() {
        let prober = HttpProber::new(&RequestProfile::default()).unwrap();
        let request = ProbeRequest::new("https://", "GET", Arc::new(RequestProfile::default()));
        let outcome = prober.probe(&request).await;
        assert!(outcome.is_transport_failure());
        assert_eq!(outcome.elapsed_ms, 0);
        assert!(outcome.transport_error.is_some());
    }
}
