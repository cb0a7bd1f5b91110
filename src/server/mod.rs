//! Web server for share link previews.
//!
//! Provides:
//! - Server-rendered preview pages with Open Graph / Twitter Card tags
//! - Download and in-page audio streaming of a share
//! - A same-origin mirror of the upstream XML listing
//! - A streaming download proxy with `Range` support

mod bots;
mod handlers;
mod routes;
mod template_structs;
mod templates;

pub use bots::is_preview_bot;
pub use handlers::DEBUG_HEADER;
pub use routes::create_router;
pub use templates::{inject_preview, PreviewMeta, TITLE_PLACEHOLDER};

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;

use crate::config::Settings;
use crate::endpoints::ShareEndpoints;
use crate::http_client::HttpClient;
use crate::ocs::OcsClient;
use crate::resolver::Resolver;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub client: HttpClient,
    pub endpoints: ShareEndpoints,
    pub resolver: Arc<Resolver>,
    /// Share metadata lookups, when OCS credentials are configured.
    pub ocs: Option<OcsClient>,
    /// Operator-supplied page the preview tags are injected into.
    pub page_template: Option<Arc<String>>,
}

impl AppState {
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        let client = settings
            .http_client()
            .context("Failed to create HTTP client")?;
        let resolver = settings.resolver(&client);
        let ocs = settings.ocs_client(&client);

        let page_template = match settings.page_template {
            Some(ref path) => {
                let page = tokio::fs::read_to_string(path).await.with_context(|| {
                    format!("Failed to read page template '{}'", path.display())
                })?;
                Some(Arc::new(page))
            }
            None => None,
        };

        Ok(Self {
            endpoints: settings.endpoints(),
            settings: Arc::new(settings),
            client,
            resolver: Arc::new(resolver),
            ocs,
            page_template,
        })
    }
}

/// Start the web server.
pub async fn serve(settings: Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings).await?;
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use tempfile::tempdir;
    use tower::ServiceExt;

    /// Settings whose every outbound request is refused immediately.
    fn unreachable_settings() -> Settings {
        Settings {
            upstream_url: "http://127.0.0.1:1".to_string(),
            self_url: Some("http://127.0.0.1:1".to_string()),
            strategy_timeout_ms: 2000,
            ..Settings::default()
        }
    }

    async fn setup_test_app(settings: Settings) -> axum::Router {
        let state = AppState::new(settings).await.unwrap();
        create_router(state)
    }

    async fn body_string(response: axum::response::Response) -> String {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_healthz() {
        let app = setup_test_app(unreachable_settings()).await;

        let response = app
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "ok");
    }

    #[tokio::test]
    async fn test_preview_rejects_invalid_token() {
        let app = setup_test_app(unreachable_settings()).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/drop/abc;ls")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get(DEBUG_HEADER).is_none());
        assert_eq!(body_string(response).await, "Invalid token");
    }

    #[tokio::test]
    async fn test_preview_falls_back_when_upstream_unreachable() {
        let app = setup_test_app(unreachable_settings()).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/drop/abc123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::CACHE_CONTROL], "no-store");
        assert_eq!(headers[header::PRAGMA], "no-cache");
        assert!(headers[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html"));

        let debug = STANDARD.decode(&headers[DEBUG_HEADER]).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&debug).unwrap();
        assert_eq!(json["all_failed"], true);
        assert_eq!(json["attempts"].as_array().unwrap().len(), 4);

        let html = body_string(response).await;
        assert!(html.contains("<title>File Share</title>"));
        assert!(html.contains(r#"<meta property="og:title" content="File Share">"#));
    }

    #[tokio::test]
    async fn test_preview_redirects_humans_to_app() {
        let settings = Settings {
            app_url: Some("https://app.example.com".to_string()),
            ..unreachable_settings()
        };
        let app = setup_test_app(settings).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/drop/abc123?x=1")
                    .header(
                        header::USER_AGENT,
                        "Mozilla/5.0 (X11; Linux x86_64; rv:133.0) Gecko/20100101 Firefox/133.0",
                    )
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
        assert_eq!(
            response.headers()[header::LOCATION],
            "https://app.example.com/drop/abc123?x=1"
        );
    }

    #[tokio::test]
    async fn test_preview_serves_bots_even_with_app_url() {
        let settings = Settings {
            app_url: Some("https://app.example.com".to_string()),
            ..unreachable_settings()
        };
        let app = setup_test_app(settings).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/drop/abc123")
                    .header(header::USER_AGENT, "Slackbot-LinkExpanding 1.0")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_preview_uses_page_template() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("drop.html");
        std::fs::write(
            &path,
            "<html><head><title>File Share</title></head><body id=\"spa\"></body></html>",
        )
        .unwrap();

        let settings = Settings {
            page_template: Some(path),
            public_url: Some("https://drop.example.com".to_string()),
            ..unreachable_settings()
        };
        let app = setup_test_app(settings).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/drop/abc123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let html = body_string(response).await;
        assert!(html.contains("<body id=\"spa\">"));
        assert!(html.contains(
            r#"<meta property="og:url" content="https://drop.example.com/drop/abc123">"#
        ));
        assert_eq!(html.matches("<title>").count(), 1);
    }

    #[tokio::test]
    async fn test_missing_page_template_fails_startup() {
        let settings = Settings {
            page_template: Some("/nonexistent/dropview/page.html".into()),
            ..unreachable_settings()
        };
        assert!(AppState::new(settings).await.is_err());
    }

    #[tokio::test]
    async fn test_share_proxy_validation() {
        let app = setup_test_app(unreachable_settings()).await;

        for (uri, expected) in [
            ("/api/share-proxy/abc123", "Missing token or file"),
            ("/api/share-proxy/abc123?file=", "Missing token or file"),
            ("/api/share-proxy/abc-123?file=a.pdf", "Invalid token"),
            ("/api/share-proxy/abc123?file=..%2Fsecret", "Invalid file"),
        ] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body_string(response).await, expected, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_download_and_stream_reject_invalid_token() {
        let app = setup_test_app(unreachable_settings()).await;

        for uri in ["/drop/abc;ls/download", "/drop/..%2Fetc/stream"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body_string(response).await, "Invalid token", "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_download_and_stream_upstream_down() {
        let app = setup_test_app(unreachable_settings()).await;

        for (uri, expected) in [
            ("/drop/abc123/download", "Error downloading"),
            ("/drop/abc123/stream", "Error streaming"),
        ] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_GATEWAY, "{}", uri);
            assert_eq!(body_string(response).await, expected, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_human_redirect_skips_download_routes() {
        let settings = Settings {
            app_url: Some("https://app.example.com".to_string()),
            ..unreachable_settings()
        };
        let app = setup_test_app(settings).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/drop/abc123/stream")
                    .header(header::USER_AGENT, "Mozilla/5.0 (X11; Linux x86_64)")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_list_proxy_upstream_down() {
        let app = setup_test_app(unreachable_settings()).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/list-proxy/abc123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_string(response).await, "Proxy error");
    }
}
