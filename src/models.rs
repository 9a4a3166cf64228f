// Core data models for verbscan
// Requests, outcomes and the per-URL / per-campaign result records

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::BasicAuth;
use crate::verdict::Verdict;

/// Everything about a probe that does not change between methods or URLs.
///
/// Built once per campaign and shared read-only (behind an `Arc`) by every
/// concurrent probe.
#[derive(Debug, Clone)]
pub struct RequestProfile {
    /// Ordered (name, value) pairs; duplicates are kept
    pub headers: Vec<(String, String)>,
    pub cookies: Vec<(String, String)>,
    pub basic_auth: Option<BasicAuth>,
    pub user_agent: String,
    pub timeout: Duration,
    pub insecure_tls: bool,
    pub follow_redirects: bool,
    pub proxy: Option<String>,
}

impl Default for RequestProfile {
    fn default() -> Self {
        Self {
            headers: Vec::new(),
            cookies: Vec::new(),
            basic_auth: None,
            user_agent: default_user_agent(),
            timeout: Duration::from_secs(10),
            insecure_tls: false,
            follow_redirects: false,
            proxy: None,
        }
    }
}

impl RequestProfile {
    /// Zero means no timeout at all
    pub fn timeout_limit(&self) -> Option<Duration> {
        (!self.timeout.is_zero()).then_some(self.timeout)
    }
}

pub fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

/// One (URL, method) pair to probe
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    pub url: String,
    pub method: String,
    pub profile: Arc<RequestProfile>,
}

impl ProbeRequest {
    pub fn new(url: impl Into<String>, method: impl Into<String>, profile: Arc<RequestProfile>) -> Self {
        Self {
            url: url.into(),
            method: method.into(),
            profile,
        }
    }
}

/// Raw result of a single probe, before classification.
///
/// `status_code` is 0 when the request never produced a response; in that
/// case `transport_error` carries the reason and `body` is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub method: String,
    pub status_code: u16,
    pub status_text: String,
    pub elapsed_ms: u64,
    pub body_bytes: usize,
    pub transport_error: Option<String>,
    /// Response body, kept only long enough to classify the probe
    pub body: Vec<u8>,
}

impl ProbeOutcome {
    pub fn transport_failure(method: &str, error: impl fmt::Display, elapsed_ms: u64) -> Self {
        let message = error.to_string();
        Self {
            method: method.to_string(),
            status_code: 0,
            status_text: format!("Error: {}", message),
            elapsed_ms,
            body_bytes: 0,
            transport_error: Some(message),
            body: Vec::new(),
        }
    }

    pub fn is_transport_failure(&self) -> bool {
        self.status_code == 0
    }
}

/// Final per-method record: outcome plus verdict, without the body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodResult {
    pub method: String,
    pub status_code: u16,
    #[serde(rename = "status")]
    pub status_text: String,
    #[serde(rename = "response_time_ms")]
    pub elapsed_ms: u64,
    #[serde(rename = "content_length")]
    pub body_bytes: usize,
    pub is_dangerous: bool,
    pub is_vulnerable: bool,
    #[serde(rename = "vulnerability_description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "error", skip_serializing_if = "Option::is_none")]
    pub transport_error: Option<String>,
}

impl MethodResult {
    pub fn new(outcome: ProbeOutcome, verdict: Verdict) -> Self {
        Self {
            method: outcome.method,
            status_code: outcome.status_code,
            status_text: outcome.status_text,
            elapsed_ms: outcome.elapsed_ms,
            body_bytes: outcome.body_bytes,
            is_dangerous: verdict.is_dangerous_method,
            is_vulnerable: verdict.is_vulnerable,
            description: verdict.description,
            transport_error: outcome.transport_error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlResult {
    pub url: String,
    pub results: Vec<MethodResult>,
}

/// Static identification of the tool that produced a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolMetadata {
    #[serde(rename = "tool_name")]
    pub name: String,
    #[serde(rename = "tool_version")]
    pub version: String,
    #[serde(rename = "tool_author")]
    pub author: String,
}

impl Default for ToolMetadata {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            author: env!("CARGO_PKG_AUTHORS").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CampaignReport {
    #[serde(flatten)]
    pub tool: ToolMetadata,
    /// RFC 3339, UTC, taken once when the campaign starts
    pub timestamp: String,
    pub results: Vec<UrlResult>,
}

/// Which classified results are kept in the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    All,
    /// Drop results that look like "method not allowed / not implemented"
    Enabled,
    Vulnerable,
}

impl ViewMode {
    pub fn retains(&self, result: &MethodResult) -> bool {
        match self {
            ViewMode::All => true,
            ViewMode::Enabled => !matches!(result.status_code, 405 | 501),
            ViewMode::Vulnerable => result.is_vulnerable,
        }
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(ViewMode::All),
            "enabled" => Ok(ViewMode::Enabled),
            "vulnerable" => Ok(ViewMode::Vulnerable),
            _ => Err("Invalid view mode. Must be one of: all, enabled, vulnerable".to_string()),
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::All => write!(f, "all"),
            ViewMode::Enabled => write!(f, "enabled"),
            ViewMode::Vulnerable => write!(f, "vulnerable"),
        }
    }
}

/// Ordering of the method results inside one `UrlResult`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultOrder {
    /// Whichever probe finished first is listed first
    #[default]
    Completion,
    /// Same order as the configured method list
    Configured,
}
