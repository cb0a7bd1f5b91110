//! Share metadata from the upstream's authenticated OCS sharing API.
//!
//! Public share endpoints only expose file names. With an account that can
//! read shares, the OCS API also gives the MIME type and the note the owner
//! attached to the share, which feed `og:type` and `og:description`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::endpoints::ShareEndpoints;
use crate::http_client::HttpClient;
use crate::models::ShareToken;

#[derive(Debug, Error)]
pub enum OcsError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("Share not found")]
    NotFound,
    #[error("Malformed response: {0}")]
    Parse(String),
}

/// What the share owner told the upstream about a share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareMetadata {
    pub token: String,
    pub name: String,
    pub mime: Option<String>,
    /// Owner's note; empty notes are dropped.
    pub note: Option<String>,
}

impl ShareMetadata {
    pub fn is_audio(&self) -> bool {
        self.mime.as_deref().is_some_and(|m| m.starts_with("audio/"))
    }

    /// Open Graph object type for the shared file.
    pub fn og_type(&self) -> &'static str {
        match self.mime.as_deref() {
            Some(m) if m.starts_with("audio/") => "music.song",
            Some(m) if m.starts_with("video/") => "video.other",
            _ => "website",
        }
    }
}

#[derive(Debug, Deserialize)]
struct OcsEnvelope {
    ocs: OcsBody,
}

#[derive(Debug, Deserialize)]
struct OcsBody {
    #[serde(default)]
    data: Option<OcsData>,
}

/// Single-share lookups answer with either one object or a list of one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OcsData {
    Many(Vec<OcsShare>),
    One(OcsShare),
}

#[derive(Debug, Deserialize)]
struct OcsShare {
    token: Option<String>,
    name: Option<String>,
    file_target: Option<String>,
    mimetype: Option<String>,
    note: Option<String>,
}

impl OcsShare {
    fn into_metadata(self, token: &ShareToken) -> Option<ShareMetadata> {
        let name = self
            .name
            .filter(|n| !n.is_empty())
            .or_else(|| {
                self.file_target
                    .as_deref()
                    .and_then(|t| t.rsplit('/').find(|s| !s.is_empty()))
                    .map(str::to_string)
            })?;

        Some(ShareMetadata {
            token: self.token.unwrap_or_else(|| token.to_string()),
            name,
            mime: self.mimetype.filter(|m| !m.is_empty()),
            note: self
                .note
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
        })
    }
}

/// Parse an OCS share response body.
fn parse_share(body: &str, token: &ShareToken) -> Result<ShareMetadata, OcsError> {
    let envelope: OcsEnvelope =
        serde_json::from_str(body).map_err(|e| OcsError::Parse(e.to_string()))?;

    let share = match envelope.ocs.data {
        Some(OcsData::One(share)) => Some(share),
        Some(OcsData::Many(shares)) => shares.into_iter().next(),
        None => None,
    };

    share
        .and_then(|s| s.into_metadata(token))
        .ok_or(OcsError::NotFound)
}

/// Client for the OCS sharing API, authenticated as a service account.
#[derive(Clone)]
pub struct OcsClient {
    client: HttpClient,
    endpoints: ShareEndpoints,
    username: String,
    password: String,
}

impl OcsClient {
    pub fn new(
        client: HttpClient,
        endpoints: ShareEndpoints,
        username: &str,
        password: &str,
    ) -> Self {
        Self {
            client,
            endpoints,
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    /// Look up a share's metadata.
    pub async fn share(&self, token: &ShareToken) -> Result<ShareMetadata, OcsError> {
        let response = self
            .client
            .get_authenticated(
                &self.endpoints.ocs_share(token),
                &self.username,
                &self.password,
                &[("OCS-APIRequest", "true"), ("Accept", "application/json")],
            )
            .await?;

        match response.status.as_u16() {
            404 => return Err(OcsError::NotFound),
            status if !response.is_success() => return Err(OcsError::Status(status)),
            _ => {}
        }

        parse_share(&response.text().await?, token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> ShareToken {
        ShareToken::parse("aBc123").unwrap()
    }

    #[test]
    fn test_parse_single_share() {
        let body = r#"{"ocs":{"meta":{"status":"ok","statuscode":200},"data":{
            "id":"42","token":"aBc123","file_target":"/Mixes/late night.mp3",
            "mimetype":"audio/mpeg","note":" recorded live "}}}"#;

        let meta = parse_share(body, &token()).unwrap();
        assert_eq!(meta.name, "late night.mp3");
        assert_eq!(meta.mime.as_deref(), Some("audio/mpeg"));
        assert_eq!(meta.note.as_deref(), Some("recorded live"));
        assert!(meta.is_audio());
        assert_eq!(meta.og_type(), "music.song");
    }

    #[test]
    fn test_parse_share_list_prefers_name() {
        let body = r#"{"ocs":{"data":[{"token":"aBc123","name":"clip.mp4",
            "file_target":"/other.mp4","mimetype":"video/mp4","note":""}]}}"#;

        let meta = parse_share(body, &token()).unwrap();
        assert_eq!(meta.name, "clip.mp4");
        assert_eq!(meta.note, None);
        assert_eq!(meta.og_type(), "video.other");
    }

    #[test]
    fn test_parse_missing_share() {
        assert!(matches!(
            parse_share(r#"{"ocs":{"data":[]}}"#, &token()),
            Err(OcsError::NotFound)
        ));
        assert!(matches!(
            parse_share(r#"{"ocs":{"data":null}}"#, &token()),
            Err(OcsError::NotFound)
        ));
        assert!(matches!(
            parse_share("<html>login</html>", &token()),
            Err(OcsError::Parse(_))
        ));
    }

    #[test]
    fn test_plain_files_are_websites() {
        let meta = ShareMetadata {
            token: "aBc123".to_string(),
            name: "notes.pdf".to_string(),
            mime: Some("application/pdf".to_string()),
            note: None,
        };
        assert!(!meta.is_audio());
        assert_eq!(meta.og_type(), "website");
    }
}
