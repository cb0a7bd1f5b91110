//! Shared utility functions.

mod html;

pub use html::{decode_entities, html_escape};
