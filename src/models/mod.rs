//! Data models for dropview.

mod diagnostics;
mod share;

pub use diagnostics::{Attempt, AttemptStatus, Diagnostics, StrategyKind};
pub use share::{ShareFileName, ShareToken, ValidationError};
