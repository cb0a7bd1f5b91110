//! Web server command.

use dropview::config::{parse_bind_address, Settings};

use crate::cli::icons::arrow;

/// Start the web server.
pub async fn cmd_serve(mut settings: Settings) -> anyhow::Result<()> {
    let (host, port) = parse_bind_address(&settings.bind)?;
    settings.bind = format!("{}:{}", host, port);

    println!(
        "{} Starting dropview at http://{}:{} (upstream {})",
        arrow(),
        host,
        port,
        settings.upstream_url
    );
    if let (Some(user), Some(_)) = (&settings.ocs_user, &settings.ocs_password) {
        println!("  Share metadata via OCS as {}", user);
    }
    println!("  Press Ctrl+C to stop");

    dropview::server::serve(settings, &host, port).await
}
