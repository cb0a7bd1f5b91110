//! Preview tag injection into an operator-supplied HTML page.

use crate::utils::html_escape;

/// Marker replaced by the preview tags.
pub const TITLE_PLACEHOLDER: &str = "<title>File Share</title>";

/// Values rendered into the preview tags.
pub struct PreviewMeta<'a> {
    pub title: &'a str,
    pub site_name: &'a str,
    pub description: &'a str,
    pub og_type: &'a str,
    pub page_url: Option<&'a str>,
}

/// `<title>` plus Open Graph and Twitter Card tags, escaped.
pub fn meta_tags(meta: &PreviewMeta<'_>) -> String {
    let title = html_escape(meta.title);
    let description = html_escape(meta.description);

    let mut tags = format!(
        r#"<title>{title}</title>
<meta property="og:title" content="{title}">
<meta property="og:type" content="{og_type}">
<meta property="og:site_name" content="{site_name}">
<meta property="og:description" content="{description}">
"#,
        title = title,
        og_type = html_escape(meta.og_type),
        site_name = html_escape(meta.site_name),
        description = description,
    );
    if let Some(url) = meta.page_url {
        tags.push_str(&format!(
            "<meta property=\"og:url\" content=\"{}\">\n",
            html_escape(url)
        ));
    }
    tags.push_str(&format!(
        r#"<meta name="twitter:card" content="summary">
<meta name="twitter:title" content="{}">
<meta name="twitter:description" content="{}">"#,
        title, description
    ));
    tags
}

/// Put the preview tags into `page`.
///
/// The placeholder title is replaced when present; otherwise the tags go
/// right before `</head>`, or at the top of the document.
pub fn inject_preview(page: &str, meta: &PreviewMeta<'_>) -> String {
    let tags = meta_tags(meta);

    if page.contains(TITLE_PLACEHOLDER) {
        return page.replacen(TITLE_PLACEHOLDER, &tags, 1);
    }
    if let Some(pos) = page.find("</head>") {
        let mut out = String::with_capacity(page.len() + tags.len() + 1);
        out.push_str(&page[..pos]);
        out.push_str(&tags);
        out.push('\n');
        out.push_str(&page[pos..]);
        return out;
    }
    format!("{}\n{}", tags, page)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(title: &str) -> PreviewMeta<'_> {
        PreviewMeta {
            title,
            site_name: "Drop",
            description: "Shared file",
            og_type: "website",
            page_url: None,
        }
    }

    #[test]
    fn test_inject_replaces_placeholder() {
        let page = "<html><head><title>File Share</title></head><body><div id=app></div></body></html>";
        let html = inject_preview(page, &meta("song.mp3"));

        assert!(!html.contains(TITLE_PLACEHOLDER));
        assert!(html.contains("<title>song.mp3</title>"));
        assert!(html.contains(r#"<meta property="og:title" content="song.mp3">"#));
        assert!(html.contains("<div id=app></div>"));
    }

    #[test]
    fn test_inject_before_head_close_without_placeholder() {
        let page = "<html><head><meta charset=utf-8></head><body></body></html>";
        let html = inject_preview(page, &meta("a.pdf"));

        let tags_at = html.find("<title>a.pdf</title>").unwrap();
        assert!(tags_at < html.find("</head>").unwrap());
    }

    #[test]
    fn test_meta_tags_escape_values() {
        let mut m = meta(r#"x" onload="evil.pdf"#);
        m.page_url = Some("https://drop.example.com/drop/abc?a=1&b=2");
        let tags = meta_tags(&m);

        assert!(tags.contains(r#"content="x&quot; onload=&quot;evil.pdf""#));
        assert!(tags.contains("a=1&amp;b=2"));
    }

    #[test]
    fn test_meta_tags_og_type() {
        let mut m = meta("set.mp3");
        m.og_type = "music.song";
        assert!(meta_tags(&m).contains(r#"<meta property="og:type" content="music.song">"#));
    }
}
