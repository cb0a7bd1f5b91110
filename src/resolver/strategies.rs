//! The four filename strategies, in the order the resolver tries them.

use async_trait::async_trait;

use super::webdav::{display_title, listing_names, propfind_names};
use super::{Strategy, StrategyError};
use crate::endpoints::ShareEndpoints;
use crate::http_client::HttpClient;
use crate::models::{ShareToken, StrategyKind};

/// Fetch a multistatus listing and turn it into a title.
async fn title_from_listing(client: &HttpClient, url: &str) -> Result<String, StrategyError> {
    let response = client.get(url).await?;
    if !response.is_success() {
        return Err(StrategyError::Status(response.status.as_u16()));
    }
    let body = response.text().await?;
    display_title(&listing_names(&body)?)
}

/// Upstream `files?format=xml` listing.
pub struct XmlListing {
    client: HttpClient,
    endpoints: ShareEndpoints,
}

impl XmlListing {
    pub fn new(client: HttpClient, endpoints: ShareEndpoints) -> Self {
        Self { client, endpoints }
    }
}

#[async_trait]
impl Strategy for XmlListing {
    fn kind(&self) -> StrategyKind {
        StrategyKind::XmlListing
    }

    async fn resolve(&self, token: &ShareToken) -> Result<String, StrategyError> {
        title_from_listing(&self.client, &self.endpoints.listing(token)).await
    }
}

/// `PROPFIND` on the public WebDAV root, authenticating as the share token.
pub struct WebdavPropfind {
    client: HttpClient,
    endpoints: ShareEndpoints,
}

impl WebdavPropfind {
    pub fn new(client: HttpClient, endpoints: ShareEndpoints) -> Self {
        Self { client, endpoints }
    }
}

#[async_trait]
impl Strategy for WebdavPropfind {
    fn kind(&self) -> StrategyKind {
        StrategyKind::WebdavPropfind
    }

    async fn resolve(&self, token: &ShareToken) -> Result<String, StrategyError> {
        let response = self
            .client
            .propfind(&self.endpoints.public_webdav(), token.as_str(), "", 1)
            .await?;
        if !response.is_success() {
            return Err(StrategyError::Status(response.status.as_u16()));
        }
        let body = response.text().await?;
        display_title(&propfind_names(&body)?)
    }
}

/// `Content-Disposition` of the download endpoint, without following redirects.
pub struct DownloadHeaders {
    client: HttpClient,
    endpoints: ShareEndpoints,
}

impl DownloadHeaders {
    pub fn new(client: HttpClient, endpoints: ShareEndpoints) -> Self {
        Self { client, endpoints }
    }
}

#[async_trait]
impl Strategy for DownloadHeaders {
    fn kind(&self) -> StrategyKind {
        StrategyKind::DownloadHeaders
    }

    async fn resolve(&self, token: &ShareToken) -> Result<String, StrategyError> {
        let response = self.client.head(&self.endpoints.download(token)).await?;
        if !response.is_success() {
            return Err(StrategyError::Status(response.status.as_u16()));
        }
        response
            .content_disposition_filename()
            .ok_or(StrategyError::MissingHeader)
    }
}

/// Same parsing as [`XmlListing`], via our own `/api/list-proxy` route.
pub struct ListProxy {
    client: HttpClient,
    endpoints: ShareEndpoints,
}

impl ListProxy {
    pub fn new(client: HttpClient, endpoints: ShareEndpoints) -> Self {
        Self { client, endpoints }
    }
}

#[async_trait]
impl Strategy for ListProxy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ListProxy
    }

    async fn resolve(&self, token: &ShareToken) -> Result<String, StrategyError> {
        title_from_listing(&self.client, &self.endpoints.list_proxy(token)).await
    }
}
