//! HTTP request handlers for the web server.

mod download;
mod health;
mod preview;
mod proxy;

// Re-export handlers for use by the router
pub use download::{drop_download, drop_stream};
pub use health::healthz;
pub use preview::{drop_preview, DEBUG_HEADER};
pub use proxy::{list_proxy, share_proxy};
