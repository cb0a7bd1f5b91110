//! Liveness check.

/// Always answers `ok`.
pub async fn healthz() -> &'static str {
    "ok"
}
