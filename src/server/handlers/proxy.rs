//! Same-origin proxies for the upstream share server.

use std::time::Instant;

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use super::super::AppState;
use crate::http_client::HttpResponse;
use crate::models::{ShareFileName, ShareToken};

/// Upstream headers passed through by the download proxies.
pub(super) const FORWARDED_HEADERS: &[&str] = &[
    "content-type",
    "content-length",
    "accept-ranges",
    "content-range",
];

/// Mirror the upstream XML file listing.
pub async fn list_proxy(State(state): State<AppState>, Path(raw_token): Path<String>) -> Response {
    let token = match ShareToken::parse(&raw_token) {
        Ok(token) => token,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    let start = Instant::now();
    let upstream = match state.client.get(&state.endpoints.listing(&token)).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("List proxy request for {} failed: {}", token, e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Proxy error").into_response();
        }
    };
    let status = upstream.status;

    match upstream.text().await {
        Ok(body) => {
            tracing::debug!(
                "List proxy for {} answered {} in {}ms",
                token,
                status,
                start.elapsed().as_millis()
            );
            (status, [(header::CONTENT_TYPE, "application/xml")], body).into_response()
        }
        Err(e) => {
            tracing::error!("List proxy body for {} failed: {}", token, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Proxy error").into_response()
        }
    }
}

/// Query params for the download proxy.
#[derive(Debug, Deserialize)]
pub struct ShareProxyParams {
    pub file: Option<String>,
}

/// Stream a single file of a share, honouring `Range`.
pub async fn share_proxy(
    State(state): State<AppState>,
    Path(raw_token): Path<String>,
    Query(params): Query<ShareProxyParams>,
    headers: HeaderMap,
) -> Response {
    let Some(raw_file) = params.file.as_deref().filter(|f| !f.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "Missing token or file").into_response();
    };
    let token = match ShareToken::parse(&raw_token) {
        Ok(token) => token,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };
    let file = match ShareFileName::parse(raw_file) {
        Ok(file) => file,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    let url = state.endpoints.download_file(&token, &file);

    let upstream = match state.client.get_stream(&url, &range_header(&headers)).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Share proxy request for {} failed: {}", token, e);
            return (StatusCode::BAD_GATEWAY, "Proxy error").into_response();
        }
    };

    relay(upstream, FORWARDED_HEADERS, &[])
}

/// The client's `Range` header, ready to forward upstream.
pub(super) fn range_header(headers: &HeaderMap) -> Vec<(&'static str, &str)> {
    headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .map(|range| ("range", range))
        .into_iter()
        .collect()
}

/// Stream an upstream response to the client with its status and the
/// `forward` headers it carries. `extra` headers replace upstream ones.
pub(super) fn relay(
    upstream: HttpResponse,
    forward: &[&str],
    extra: &[(&str, &str)],
) -> Response {
    let mut builder = Response::builder().status(upstream.status);
    for name in forward {
        if let Some(value) = upstream.header(name) {
            builder = builder.header(*name, value);
        }
    }

    let body = Body::from_stream(upstream.into_inner().bytes_stream());
    let mut response = match builder.body(body) {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Failed to build proxied response: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    for (name, value) in extra {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                response.headers_mut().insert(name, value);
            }
            _ => tracing::warn!("Dropping unrepresentable header {}: {:?}", name, value),
        }
    }
    response
}
