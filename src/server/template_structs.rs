//! Askama template structs for the preview page.
//!
//! Each struct corresponds to an HTML template in the templates/ directory.

use askama::Template;

/// Built-in link-preview page.
#[derive(Template)]
#[template(path = "preview.html")]
pub struct PreviewTemplate<'a> {
    pub title: &'a str,
    pub site_name: &'a str,
    pub description: &'a str,
    pub og_type: &'a str,
    pub page_url: Option<&'a str>,
    pub share_url: &'a str,
    pub download_url: &'a str,
    /// Player source, for audio shares.
    pub audio_url: Option<&'a str>,
}
