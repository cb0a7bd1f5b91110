//! Command-line interface for dropview.

mod commands;
mod icons;

pub use commands::{is_verbose, run};
