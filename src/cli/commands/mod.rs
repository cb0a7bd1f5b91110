//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod config_cmd;
mod resolve;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use dropview::config::{load_settings, LoadOptions};

#[derive(Parser)]
#[command(name = "dropview")]
#[command(about = "Link-preview pages for Nextcloud file shares")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the file-sharing server
    #[arg(long, global = true, env = "DROPVIEW_UPSTREAM_URL")]
    upstream: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the preview web server
    Serve {
        /// Address to bind: PORT, HOST, or HOST:PORT (default from config, then 127.0.0.1:3030)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Resolve the file name behind a share token
    Resolve {
        /// Share token
        token: String,
        /// Output diagnostics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration
    Config,
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        upstream_url: cli.upstream,
    };
    let (mut settings, config) = load_settings(options).await?;

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                settings.bind = bind;
            }
            serve::cmd_serve(settings).await
        }
        Commands::Resolve { token, json } => resolve::cmd_resolve(&settings, &token, json).await,
        Commands::Config => config_cmd::cmd_config_show(&settings, &config),
    }
}
