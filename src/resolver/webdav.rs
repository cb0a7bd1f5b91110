//! WebDAV multistatus extraction and the shared naming rule.
//!
//! Upstream responses are matched with patterns rather than a full XML parser:
//! only `href` and `displayname` values are needed and namespace prefixes vary
//! between servers (`d:`, `D:`, none).

use std::sync::LazyLock;

use regex::Regex;

use super::StrategyError;
use crate::utils::decode_entities;

static HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(?:[A-Za-z][\w.-]*:)?href(?:\s[^>]*)?>([^<]+)</(?:[A-Za-z][\w.-]*:)?href\s*>")
        .unwrap()
});

static RESPONSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)<(?:[A-Za-z][\w.-]*:)?response(?:\s[^>]*)?>(.*?)</(?:[A-Za-z][\w.-]*:)?response\s*>",
    )
    .unwrap()
});

static DISPLAYNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"<(?:[A-Za-z][\w.-]*:)?displayname(?:\s[^>]*)?>([^<]*)</(?:[A-Za-z][\w.-]*:)?displayname\s*>",
    )
    .unwrap()
});

/// Collapse a list of names into a display title.
///
/// One name is returned as is; several become `"<first> + <n-1> more"`.
pub fn display_title(names: &[String]) -> Result<String, StrategyError> {
    match names {
        [] => Err(StrategyError::NoFiles),
        [only] => Ok(only.clone()),
        [first, rest @ ..] => Ok(format!("{} + {} more", first, rest.len())),
    }
}

fn is_multistatus(body: &str) -> bool {
    body.to_ascii_lowercase().contains("multistatus")
}

fn is_webdav_root(href: &str) -> bool {
    href.ends_with("/webdav/") || href.ends_with("/webdav")
}

/// Final non-empty path segment of an href, percent-decoded.
fn href_basename(href: &str) -> Option<String> {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    let segment = path.split('/').filter(|s| !s.is_empty()).next_back()?;
    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());
    Some(decoded)
}

/// File names from a multistatus listing, in document order.
///
/// The WebDAV root and any other collection (href ending in `/`) are dropped.
pub fn listing_names(body: &str) -> Result<Vec<String>, StrategyError> {
    if !is_multistatus(body) {
        return Err(StrategyError::Parse(
            "response is not a WebDAV multistatus".to_string(),
        ));
    }

    let names = HREF_RE
        .captures_iter(body)
        .map(|cap| decode_entities(cap[1].trim()))
        .filter(|href| !is_webdav_root(href) && !href.ends_with('/'))
        .filter_map(|href| href_basename(&href))
        .collect();

    Ok(names)
}

/// Display names from a PROPFIND multistatus, in document order.
///
/// Children of the WebDAV root win; a single-file share has no children
/// because the root is the file itself, so the root's own name is used then.
pub fn propfind_names(body: &str) -> Result<Vec<String>, StrategyError> {
    if !is_multistatus(body) {
        return Err(StrategyError::Parse(
            "response is not a WebDAV multistatus".to_string(),
        ));
    }

    let mut root_name = None;
    let mut names = Vec::new();

    for block in RESPONSE_RE.captures_iter(body) {
        let block = &block[1];
        let href = HREF_RE
            .captures(block)
            .map(|c| decode_entities(c[1].trim()))
            .unwrap_or_default();
        let Some(name) = DISPLAYNAME_RE
            .captures(block)
            .map(|c| decode_entities(c[1].trim()))
            .filter(|n| !n.is_empty())
        else {
            continue;
        };

        if is_webdav_root(&href) {
            root_name.get_or_insert(name);
        } else if !href.ends_with('/') {
            names.push(name);
        }
    }

    if names.is_empty() {
        names.extend(root_name);
    }

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOLDER_LISTING: &str = r#"<?xml version="1.0"?>
<d:multistatus xmlns:d="DAV:">
  <d:response><d:href>/public.php/webdav/</d:href></d:response>
  <d:response><d:href>/public.php/webdav/Holiday%20Photos.zip</d:href></d:response>
  <d:response><d:href>/public.php/webdav/notes.txt</d:href></d:response>
  <d:response><d:href>/public.php/webdav/drafts/</d:href></d:response>
  <d:response><d:href>/public.php/webdav/song.mp3</d:href></d:response>
</d:multistatus>"#;

    #[test]
    fn test_display_title_rule() {
        assert!(matches!(display_title(&[]), Err(StrategyError::NoFiles)));
        assert_eq!(display_title(&["a.pdf".to_string()]).unwrap(), "a.pdf");
        assert_eq!(
            display_title(&["a.pdf".to_string(), "b.pdf".to_string(), "c.pdf".to_string()])
                .unwrap(),
            "a.pdf + 2 more"
        );
    }

    #[test]
    fn test_listing_names_skips_root_and_collections() {
        let names = listing_names(FOLDER_LISTING).unwrap();
        assert_eq!(names, vec!["Holiday Photos.zip", "notes.txt", "song.mp3"]);
    }

    #[test]
    fn test_listing_names_any_prefix_and_full_urls() {
        let body = r#"<D:multistatus xmlns:D="DAV:">
<D:response><D:href>https://cloud.example.com/public.php/webdav/</D:href></D:response>
<D:response><D:href>https://cloud.example.com/public.php/webdav/r%C3%A9sum%C3%A9.pdf</D:href></D:response>
</D:multistatus>"#;
        assert_eq!(listing_names(body).unwrap(), vec!["résumé.pdf"]);

        let unprefixed = "<multistatus><response><href>/x/a&amp;b.txt</href></response></multistatus>";
        assert_eq!(listing_names(unprefixed).unwrap(), vec!["a&b.txt"]);
    }

    #[test]
    fn test_listing_names_root_only_is_empty() {
        let body = r#"<d:multistatus xmlns:d="DAV:"><d:response><d:href>/public.php/webdav/</d:href></d:response></d:multistatus>"#;
        assert!(listing_names(body).unwrap().is_empty());
    }

    #[test]
    fn test_listing_names_rejects_html() {
        let err = listing_names("<html><body>Share not found</body></html>").unwrap_err();
        assert!(matches!(err, StrategyError::Parse(_)));
    }

    #[test]
    fn test_propfind_names_prefers_children() {
        let body = r#"<?xml version="1.0"?>
<d:multistatus xmlns:d="DAV:" xmlns:oc="http://owncloud.org/ns">
  <d:response>
    <d:href>/public.php/webdav/</d:href>
    <d:propstat><d:prop><d:displayname>Shared folder</d:displayname></d:prop></d:propstat>
  </d:response>
  <d:response>
    <d:href>/public.php/webdav/Tom%20%26%20Jerry.mp4</d:href>
    <d:propstat><d:prop><d:displayname>Tom &amp; Jerry.mp4</d:displayname></d:prop></d:propstat>
  </d:response>
  <d:response>
    <d:href>/public.php/webdav/poster.png</d:href>
    <d:propstat><d:prop><d:displayname>poster.png</d:displayname></d:prop></d:propstat>
  </d:response>
</d:multistatus>"#;
        assert_eq!(
            propfind_names(body).unwrap(),
            vec!["Tom & Jerry.mp4", "poster.png"]
        );
    }

    #[test]
    fn test_propfind_names_single_file_share_uses_root() {
        let body = r#"<d:multistatus xmlns:d="DAV:">
  <d:response>
    <d:href>/public.php/webdav/</d:href>
    <d:propstat><d:prop><d:displayname>caf&#233;.pdf</d:displayname></d:prop></d:propstat>
  </d:response>
</d:multistatus>"#;
        assert_eq!(propfind_names(body).unwrap(), vec!["café.pdf"]);
    }

    #[test]
    fn test_propfind_names_ignores_empty_displayname() {
        let body = r#"<d:multistatus xmlns:d="DAV:">
  <d:response><d:href>/public.php/webdav/</d:href><d:propstat><d:prop><d:displayname/></d:prop></d:propstat></d:response>
</d:multistatus>"#;
        assert!(propfind_names(body).unwrap().is_empty());
    }
}
