//! HTTP client for talking to the file-sharing upstream.

mod response;

pub use response::{parse_content_disposition_filename, HeadResponse, HttpResponse};

use std::sync::LazyLock;
use std::time::{Duration, Instant};

use reqwest::{redirect, Client, Method, RequestBuilder};

/// Default user agent for outbound requests.
pub const USER_AGENT: &str = concat!(
    "dropview/",
    env!("CARGO_PKG_VERSION"),
    " (link preview; +https://github.com/monokrome/dropview)"
);

/// Connection setup limit for streamed downloads.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

static PROPFIND: LazyLock<Method> = LazyLock::new(|| Method::from_bytes(b"PROPFIND").unwrap());

/// Request body asking only for display names.
const PROPFIND_DISPLAYNAME_BODY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<d:propfind xmlns:d="DAV:">
  <d:prop>
    <d:displayname/>
  </d:prop>
</d:propfind>"#;

/// Outbound HTTP client.
///
/// Wraps three reqwest clients:
/// - `client` follows redirects and bounds the whole exchange by `timeout`
/// - `no_redirect` is the same without redirects, for header sniffing
/// - `streaming` only bounds connecting and each read, so long downloads
///   are not cut off mid-body
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    no_redirect: Client,
    streaming: Client,
}

impl HttpClient {
    /// Create a new HTTP client, sending `user_agent` or [`USER_AGENT`].
    pub fn new(timeout: Duration, user_agent: Option<&str>) -> Result<Self, reqwest::Error> {
        let user_agent = user_agent.unwrap_or(USER_AGENT);

        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()?;

        let no_redirect = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .build()?;

        // Bodies are relayed byte for byte, so no transparent decompression.
        let streaming = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .read_timeout(timeout)
            .no_gzip()
            .no_brotli()
            .build()?;

        Ok(Self {
            client,
            no_redirect,
            streaming,
        })
    }

    async fn send(
        method: &str,
        url: &str,
        request: RequestBuilder,
    ) -> Result<HttpResponse, reqwest::Error> {
        let start = Instant::now();
        let response = request.send().await?;
        tracing::debug!(
            "{} {} -> {} in {}ms",
            method,
            url,
            response.status(),
            start.elapsed().as_millis()
        );
        Ok(HttpResponse::from_response(response))
    }

    /// Make a GET request.
    pub async fn get(&self, url: &str) -> Result<HttpResponse, reqwest::Error> {
        Self::send("GET", url, self.client.get(url)).await
    }

    /// Make a GET request with basic auth and extra headers.
    pub async fn get_authenticated(
        &self,
        url: &str,
        username: &str,
        password: &str,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse, reqwest::Error> {
        let mut request = self.client.get(url).basic_auth(username, Some(password));
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        Self::send("GET", url, request).await
    }

    /// Start a GET whose body is relayed to a client as it arrives.
    ///
    /// Only the connection and each individual read are time-limited.
    pub async fn get_stream(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse, reqwest::Error> {
        let mut request = self.streaming.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        Self::send("GET (stream)", url, request).await
    }

    /// Make a HEAD request without following redirects.
    pub async fn head(&self, url: &str) -> Result<HeadResponse, reqwest::Error> {
        let start = Instant::now();
        let response = self.no_redirect.head(url).send().await?;
        tracing::debug!(
            "HEAD {} -> {} in {}ms",
            url,
            response.status(),
            start.elapsed().as_millis()
        );

        Ok(HeadResponse::from_response(&response))
    }

    /// Make a `PROPFIND` request for display names with basic auth.
    pub async fn propfind(
        &self,
        url: &str,
        username: &str,
        password: &str,
        depth: u8,
    ) -> Result<HttpResponse, reqwest::Error> {
        let request = self
            .client
            .request(PROPFIND.clone(), url)
            .basic_auth(username, Some(password))
            .header("Depth", depth.to_string())
            .header(reqwest::header::CONTENT_TYPE, "application/xml; charset=utf-8")
            .body(PROPFIND_DISPLAYNAME_BODY);
        Self::send("PROPFIND", url, request).await
    }
}
