//! Validated identifiers taken from inbound requests.
//!
//! Share tokens and file names arrive in URL paths and query strings, so they
//! are checked against fixed patterns before they are ever interpolated into
//! an outbound request.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{1,64}$").unwrap());

static FILE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._-]{1,256}$").unwrap());

/// Rejected request input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Invalid file")]
    InvalidFile,
}

/// Opaque identifier of a remote share.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ShareToken(String);

impl ShareToken {
    /// Validate and wrap a raw token.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        if TOKEN_PATTERN.is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(ValidationError::InvalidToken)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShareToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// File name inside a share, as accepted by the download proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareFileName(String);

impl ShareFileName {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        if FILE_PATTERN.is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(ValidationError::InvalidFile)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
