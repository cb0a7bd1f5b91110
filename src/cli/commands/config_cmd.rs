//! Configuration inspection command.

use console::style;

use dropview::config::{Config, Settings};

/// Print the effective settings as JSON, noting where they came from.
pub fn cmd_config_show(settings: &Settings, config: &Config) -> anyhow::Result<()> {
    match config.source_path {
        Some(ref path) => eprintln!("{} Config file: {}", style("→").dim(), path.display()),
        None => eprintln!("{} No config file found, using defaults", style("→").dim()),
    }
    println!("{}", serde_json::to_string_pretty(settings)?);
    Ok(())
}
