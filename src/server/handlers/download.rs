//! Download and audio-stream routes for a whole share.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use super::proxy::{range_header, relay, FORWARDED_HEADERS};
use super::super::AppState;
use crate::models::ShareToken;

/// `Content-Disposition` for saving a file under `name`.
///
/// The plain `filename` is an ASCII approximation; `filename*` carries the
/// exact UTF-8 name.
pub fn attachment_disposition(name: &str) -> String {
    let fallback: String = name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(name)
    )
}

/// Save the shared file, named after the share's metadata when available.
pub async fn drop_download(
    State(state): State<AppState>,
    Path(raw_token): Path<String>,
) -> Response {
    let token = match ShareToken::parse(&raw_token) {
        Ok(token) => token,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    let name = match state.ocs {
        Some(ref ocs) => match ocs.share(&token).await {
            Ok(meta) => Some(meta.name),
            Err(e) => {
                tracing::debug!("No share metadata for {}: {}", token, e);
                None
            }
        },
        None => None,
    };

    let upstream = match state
        .client
        .get_stream(
            &state.endpoints.download(&token),
            &[("accept", "application/octet-stream")],
        )
        .await
    {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Download of {} failed: {}", token, e);
            return (StatusCode::BAD_GATEWAY, "Error downloading").into_response();
        }
    };
    if !upstream.is_success() {
        tracing::warn!("Download of {} answered {}", token, upstream.status);
        return (upstream.status, "Error downloading").into_response();
    }

    // Without metadata the upstream's own Content-Disposition is kept.
    let disposition = name.as_deref().map(attachment_disposition);
    let extra: Vec<(&str, &str)> = disposition
        .as_deref()
        .map(|value| ("content-disposition", value))
        .into_iter()
        .collect();

    relay(
        upstream,
        &["content-type", "content-length", "content-disposition"],
        &extra,
    )
}

/// Stream the shared file for in-page playback, honouring `Range`.
pub async fn drop_stream(
    State(state): State<AppState>,
    Path(raw_token): Path<String>,
    headers: HeaderMap,
) -> Response {
    let token = match ShareToken::parse(&raw_token) {
        Ok(token) => token,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    let upstream = match state
        .client
        .get_stream(&state.endpoints.download(&token), &range_header(&headers))
        .await
    {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Stream of {} failed: {}", token, e);
            return (StatusCode::BAD_GATEWAY, "Error streaming").into_response();
        }
    };
    if !upstream.is_success() {
        tracing::warn!("Stream of {} answered {}", token, upstream.status);
        return (upstream.status, "Error streaming").into_response();
    }

    relay(upstream, FORWARDED_HEADERS, &[("accept-ranges", "bytes")])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::parse_content_disposition_filename;

    #[test]
    fn test_attachment_disposition_ascii() {
        assert_eq!(
            attachment_disposition("set list.mp3"),
            "attachment; filename=\"set list.mp3\"; filename*=UTF-8''set%20list.mp3"
        );
    }

    #[test]
    fn test_attachment_disposition_unicode_and_quotes() {
        let value = attachment_disposition(r#"résumé "final".pdf"#);
        assert!(value.is_ascii());
        assert!(value.contains(r#"filename="r_sum_ _final_.pdf""#));
        assert_eq!(
            parse_content_disposition_filename(&value).as_deref(),
            Some(r#"résumé "final".pdf"#)
        );
    }
}
