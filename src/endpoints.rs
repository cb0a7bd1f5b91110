//! URL construction for the upstream share server and our own proxy routes.

use crate::models::{ShareFileName, ShareToken};

/// Base URLs every outbound request is built from.
#[derive(Debug, Clone)]
pub struct ShareEndpoints {
    upstream: String,
    self_url: String,
}

impl ShareEndpoints {
    pub fn new(upstream: &str, self_url: &str) -> Self {
        Self {
            upstream: upstream.trim_end_matches('/').to_string(),
            self_url: self_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn upstream(&self) -> &str {
        &self.upstream
    }

    /// `GET /s/{token}/files?format=xml`
    pub fn listing(&self, token: &ShareToken) -> String {
        format!(
            "{}/s/{}/files?format=xml",
            self.upstream,
            urlencoding::encode(token.as_str())
        )
    }

    /// Share page on the upstream server.
    pub fn share_page(&self, token: &ShareToken) -> String {
        format!("{}/s/{}", self.upstream, urlencoding::encode(token.as_str()))
    }

    /// Public WebDAV root; the token travels as the basic-auth username.
    pub fn public_webdav(&self) -> String {
        format!("{}/public.php/webdav/", self.upstream)
    }

    /// `HEAD /s/{token}/download`
    pub fn download(&self, token: &ShareToken) -> String {
        format!(
            "{}/s/{}/download",
            self.upstream,
            urlencoding::encode(token.as_str())
        )
    }

    /// Download of a single file from inside a folder share.
    pub fn download_file(&self, token: &ShareToken, file: &ShareFileName) -> String {
        format!(
            "{}/s/{}/download?path=%2F&files={}",
            self.upstream,
            urlencoding::encode(token.as_str()),
            urlencoding::encode(file.as_str())
        )
    }

    /// Authenticated OCS sharing API entry for a share.
    pub fn ocs_share(&self, token: &ShareToken) -> String {
        format!(
            "{}/ocs/v2.php/apps/files_sharing/api/v1/shares/{}?format=json",
            self.upstream,
            urlencoding::encode(token.as_str())
        )
    }

    /// Same-origin mirror of [`Self::listing`].
    pub fn list_proxy(&self, token: &ShareToken) -> String {
        format!(
            "{}/api/list-proxy/{}",
            self.self_url,
            urlencoding::encode(token.as_str())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_urls() {
        let endpoints = ShareEndpoints::new("https://cloud.example.com/", "http://127.0.0.1:3030/");
        let token = ShareToken::parse("AbC123").unwrap();
        let file = ShareFileName::parse("song.mp3").unwrap();

        assert_eq!(
            endpoints.listing(&token),
            "https://cloud.example.com/s/AbC123/files?format=xml"
        );
        assert_eq!(endpoints.share_page(&token), "https://cloud.example.com/s/AbC123");
        assert_eq!(
            endpoints.public_webdav(),
            "https://cloud.example.com/public.php/webdav/"
        );
        assert_eq!(
            endpoints.download(&token),
            "https://cloud.example.com/s/AbC123/download"
        );
        assert_eq!(
            endpoints.download_file(&token, &file),
            "https://cloud.example.com/s/AbC123/download?path=%2F&files=song.mp3"
        );
        assert_eq!(
            endpoints.ocs_share(&token),
            "https://cloud.example.com/ocs/v2.php/apps/files_sharing/api/v1/shares/AbC123?format=json"
        );
        assert_eq!(
            endpoints.list_proxy(&token),
            "http://127.0.0.1:3030/api/list-proxy/AbC123"
        );
    }
}
