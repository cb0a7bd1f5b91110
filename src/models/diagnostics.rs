//! Per-request record of filename resolution attempts.

use std::fmt;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ShareToken;

/// Identifier of a filename resolution strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Upstream `files?format=xml` listing.
    XmlListing,
    /// Public WebDAV PROPFIND with the token as username.
    WebdavPropfind,
    /// `Content-Disposition` of the download endpoint.
    DownloadHeaders,
    /// Same-origin mirror of the XML listing.
    ListProxy,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::XmlListing => "xml_listing",
            StrategyKind::WebdavPropfind => "webdav_propfind",
            StrategyKind::DownloadHeaders => "download_headers",
            StrategyKind::ListProxy => "list_proxy",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    Succeeded,
    Failed,
}

/// Outcome of a single strategy attempt.
#[derive(Debug, Clone, Serialize)]
pub struct Attempt {
    pub strategy: StrategyKind,
    pub status: AttemptStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

impl Attempt {
    pub fn is_success(&self) -> bool {
        self.status == AttemptStatus::Succeeded
    }
}

/// Ordered log of every attempt made while resolving one token.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostics {
    pub token: ShareToken,
    pub started_at: DateTime<Utc>,
    pub attempts: Vec<Attempt>,
    pub resolved_by: Option<StrategyKind>,
    pub all_failed: bool,
}

impl Diagnostics {
    pub fn new(token: ShareToken) -> Self {
        Self {
            token,
            started_at: Utc::now(),
            attempts: Vec::new(),
            resolved_by: None,
            all_failed: false,
        }
    }

    /// Record a successful attempt.
    pub fn record_success(&mut self, strategy: StrategyKind, title: &str, elapsed: Duration) {
        self.attempts.push(Attempt {
            strategy,
            status: AttemptStatus::Succeeded,
            title: Some(title.to_string()),
            error: None,
            elapsed_ms: elapsed.as_millis() as u64,
        });
        self.resolved_by = Some(strategy);
    }

    /// Record a failed attempt.
    pub fn record_failure(&mut self, strategy: StrategyKind, error: &str, elapsed: Duration) {
        self.attempts.push(Attempt {
            strategy,
            status: AttemptStatus::Failed,
            title: None,
            error: Some(error.to_string()),
            elapsed_ms: elapsed.as_millis() as u64,
        });
    }

    /// Mark the resolution as exhausted.
    pub fn mark_all_failed(&mut self) {
        self.resolved_by = None;
        self.all_failed = true;
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Diagnostics JSON encoded for the `X-Link-Preview-Debug` header.
    pub fn to_header_value(&self) -> String {
        STANDARD.encode(self.to_json())
    }
}
