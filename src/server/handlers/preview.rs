//! Link-preview page handler.

use askama::Template;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
};

use super::super::bots::is_preview_bot;
use super::super::template_structs::PreviewTemplate;
use super::super::templates::{inject_preview, PreviewMeta};
use super::super::AppState;
use crate::models::ShareToken;
use crate::ocs::{OcsClient, ShareMetadata};

/// Response header carrying base64-encoded diagnostics JSON.
pub const DEBUG_HEADER: &str = "x-link-preview-debug";

/// Where a human visitor should be sent instead of the preview page.
fn human_redirect(app_url: &str, uri: &Uri) -> String {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    format!("{}{}", app_url.trim_end_matches('/'), path)
}

/// Share metadata for enriching the page; lookup failures only cost detail.
async fn share_metadata(ocs: Option<&OcsClient>, token: &ShareToken) -> Option<ShareMetadata> {
    match ocs?.share(token).await {
        Ok(meta) => Some(meta),
        Err(e) => {
            tracing::debug!("No share metadata for {}: {}", token, e);
            None
        }
    }
}

/// Render the preview page for a share.
pub async fn drop_preview(
    State(state): State<AppState>,
    Path(raw_token): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let token = match ShareToken::parse(&raw_token) {
        Ok(token) => token,
        Err(e) => {
            tracing::debug!("Rejected preview request for {:?}: {}", raw_token, e);
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    if let Some(ref app_url) = state.settings.app_url {
        let user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if !is_preview_bot(user_agent) {
            return Redirect::permanent(&human_redirect(app_url, &uri)).into_response();
        }
    }

    let (resolution, metadata) = tokio::join!(
        state.resolver.resolve(&token),
        share_metadata(state.ocs.as_ref(), &token)
    );

    let description = metadata
        .as_ref()
        .and_then(|m| m.note.as_deref())
        .unwrap_or(state.settings.description.as_str());
    let og_type = metadata.as_ref().map_or("website", |m| m.og_type());
    let download_url = format!("/drop/{}/download", token);
    let audio_url = metadata
        .as_ref()
        .filter(|m| m.is_audio())
        .map(|_| format!("/drop/{}/stream", token));

    let page_url = state
        .settings
        .public_url
        .as_ref()
        .map(|base| format!("{}/drop/{}", base.trim_end_matches('/'), token));

    let html = match state.page_template {
        Some(ref page) => inject_preview(
            page,
            &PreviewMeta {
                title: &resolution.title,
                site_name: &state.settings.site_name,
                description,
                og_type,
                page_url: page_url.as_deref(),
            },
        ),
        None => {
            let share_url = state.endpoints.share_page(&token);
            let template = PreviewTemplate {
                title: &resolution.title,
                site_name: &state.settings.site_name,
                description,
                og_type,
                page_url: page_url.as_deref(),
                share_url: &share_url,
                download_url: &download_url,
                audio_url: audio_url.as_deref(),
            };
            match template.render() {
                Ok(html) => html,
                Err(e) => {
                    tracing::error!("Failed to render preview page: {}", e);
                    return (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response();
                }
            }
        }
    };

    let mut response = Html(html).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    if let Ok(value) = HeaderValue::from_str(&resolution.diagnostics.to_header_value()) {
        headers.insert(HeaderName::from_static(DEBUG_HEADER), value);
    }
    response
}
