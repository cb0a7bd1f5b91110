//! HTTP response wrappers.

use std::collections::HashMap;

use reqwest::{header::HeaderMap, Response, StatusCode};

fn collect_headers(headers: &HeaderMap) -> HashMap<String, String> {
    let mut collected = HashMap::new();
    for (name, value) in headers {
        if let Ok(v) = value.to_str() {
            collected.insert(name.to_string(), v.to_string());
        }
    }
    collected
}

/// HTTP response wrapper.
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HashMap<String, String>,
    pub(crate) response: Response,
}

impl HttpResponse {
    pub(crate) fn from_response(response: Response) -> Self {
        Self {
            status: response.status(),
            headers: collect_headers(response.headers()),
            response,
        }
    }

    /// Check if the response is successful.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Get a header by lowercase name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|s| s.as_str())
    }

    /// Get response body as text.
    pub async fn text(self) -> Result<String, reqwest::Error> {
        self.response.text().await
    }

    /// Hand back the underlying response for streaming.
    pub fn into_inner(self) -> Response {
        self.response
    }
}

/// HEAD response wrapper (no body, just headers).
pub struct HeadResponse {
    pub status: StatusCode,
    pub headers: HashMap<String, String>,
}

impl HeadResponse {
    pub(crate) fn from_response(response: &Response) -> Self {
        Self {
            status: response.status(),
            headers: collect_headers(response.headers()),
        }
    }

    /// Check if the response is successful.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Get the filename from Content-Disposition header.
    pub fn content_disposition_filename(&self) -> Option<String> {
        self.headers
            .get("content-disposition")
            .and_then(|h| parse_content_disposition_filename(h))
    }
}

/// Parse filename from Content-Disposition header value.
/// Parses both `filename="name.pdf"` and `filename*=UTF-8''name.pdf` formats,
/// preferring the RFC 5987 form when both are present.
pub fn parse_content_disposition_filename(header: &str) -> Option<String> {
    // Parameter names are case-insensitive; ASCII lowercasing keeps byte offsets.
    let lower = header.to_ascii_lowercase();

    if let Some(start) = lower.find("filename*=") {
        let rest = header[start + 10..].trim_start().trim_start_matches('"');
        if let Some(quote_start) = rest.find("''") {
            let encoded = rest[quote_start + 2..]
                .split([';', ' ', '"'])
                .next()
                .unwrap_or("");
            if let Ok(decoded) = urlencoding::decode(encoded) {
                let filename = decoded.trim().to_string();
                if !filename.is_empty() {
                    return Some(filename);
                }
            }
        }
    }

    if let Some(start) = lower.find("filename=") {
        let rest = header[start + 9..].trim_start();
        let filename = if let Some(quoted) = rest.strip_prefix('"') {
            quoted.split('"').next()
        } else {
            rest.split([';', ' ']).next()
        };

        if let Some(name) = filename {
            let name = name.trim().to_string();
            if !name.is_empty() {
                return Some(name);
            }
        }
    }

    None
}
