//! Share filename resolution.
//!
//! A [`Resolver`] owns an ordered chain of [`Strategy`] implementations and
//! tries them one after another until one produces a title. Failures never
//! escape: each is written to the request's [`Diagnostics`] and the chain
//! moves on. When every strategy fails the configured default title is used.

mod error;
mod strategies;
mod webdav;

pub use error::StrategyError;
pub use strategies::{DownloadHeaders, ListProxy, WebdavPropfind, XmlListing};
pub use webdav::{display_title, listing_names, propfind_names};

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;

use crate::endpoints::ShareEndpoints;
use crate::http_client::HttpClient;
use crate::models::{Diagnostics, ShareToken, StrategyKind};

/// Title used when nothing could be resolved.
pub const DEFAULT_TITLE: &str = "File Share";

/// One way of discovering a share's file name(s).
#[async_trait]
pub trait Strategy: Send + Sync {
    /// Identifier recorded in diagnostics.
    fn kind(&self) -> StrategyKind;

    /// Produce a display title for the share.
    async fn resolve(&self, token: &ShareToken) -> Result<String, StrategyError>;
}

/// Result of a resolution: always a title, plus how it was obtained.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub title: String,
    pub diagnostics: Diagnostics,
}

impl Resolution {
    pub fn is_fallback(&self) -> bool {
        self.diagnostics.all_failed
    }
}

/// Sequential fallback chain of strategies.
pub struct Resolver {
    strategies: Vec<Box<dyn Strategy>>,
    attempt_timeout: Duration,
    default_title: String,
}

impl Resolver {
    pub fn new(
        strategies: Vec<Box<dyn Strategy>>,
        attempt_timeout: Duration,
        default_title: impl Into<String>,
    ) -> Self {
        Self {
            strategies,
            attempt_timeout,
            default_title: default_title.into(),
        }
    }

    /// The standard chain: XML listing, PROPFIND, download headers, list proxy.
    pub fn standard(
        client: &HttpClient,
        endpoints: &ShareEndpoints,
        attempt_timeout: Duration,
        default_title: impl Into<String>,
    ) -> Self {
        let strategies: Vec<Box<dyn Strategy>> = vec![
            Box::new(XmlListing::new(client.clone(), endpoints.clone())),
            Box::new(WebdavPropfind::new(client.clone(), endpoints.clone())),
            Box::new(DownloadHeaders::new(client.clone(), endpoints.clone())),
            Box::new(ListProxy::new(client.clone(), endpoints.clone())),
        ];
        Self::new(strategies, attempt_timeout, default_title)
    }

    pub fn strategy_kinds(&self) -> Vec<StrategyKind> {
        self.strategies.iter().map(|s| s.kind()).collect()
    }

    /// Resolve a title for `token`. Never fails.
    pub async fn resolve(&self, token: &ShareToken) -> Resolution {
        let mut diagnostics = Diagnostics::new(token.clone());

        for strategy in &self.strategies {
            let kind = strategy.kind();
            let start = Instant::now();

            let outcome = match tokio::time::timeout(self.attempt_timeout, strategy.resolve(token))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(StrategyError::Timeout(self.attempt_timeout)),
            };
            let elapsed = start.elapsed();

            match outcome {
                Ok(title) => {
                    tracing::info!("Resolved share {} via {}: {}", token, kind, title);
                    diagnostics.record_success(kind, &title, elapsed);
                    return Resolution { title, diagnostics };
                }
                Err(e) => {
                    tracing::debug!("Strategy {} failed for share {}: {}", kind, token, e);
                    diagnostics.record_failure(kind, &e.to_string(), elapsed);
                }
            }
        }

        tracing::warn!(
            "All {} strategies failed for share {}, using default title",
            self.strategies.len(),
            token
        );
        diagnostics.mark_all_failed();
        Resolution {
            title: self.default_title.clone(),
            diagnostics,
        }
    }
}
