//! Strategy failure types.

use std::time::Duration;

use thiserror::Error;

/// Why a single resolution strategy failed.
///
/// Every variant is recoverable: the resolver records it and moves on to the
/// next strategy.
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("Malformed response: {0}")]
    Parse(String),
    #[error("No files found")]
    NoFiles,
    #[error("No filename in Content-Disposition")]
    MissingHeader,
}
