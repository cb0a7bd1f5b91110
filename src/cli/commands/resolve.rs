//! One-shot resolution from the command line.

use console::style;

use dropview::config::Settings;
use dropview::models::{AttemptStatus, ShareToken};

use crate::cli::icons::{error, success};

/// Resolve a token and print the title and every attempt.
pub async fn cmd_resolve(settings: &Settings, raw_token: &str, json: bool) -> anyhow::Result<()> {
    let token = ShareToken::parse(raw_token)
        .map_err(|e| anyhow::anyhow!("{}: {:?}", e, raw_token))?;

    let client = settings.http_client()?;
    let resolver = settings.resolver(&client);
    let resolution = resolver.resolve(&token).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
        return Ok(());
    }

    for attempt in &resolution.diagnostics.attempts {
        match attempt.status {
            AttemptStatus::Succeeded => println!(
                "{} {:<17} {} {}",
                success(),
                attempt.strategy.as_str(),
                attempt.title.as_deref().unwrap_or(""),
                style(format!("({}ms)", attempt.elapsed_ms)).dim()
            ),
            AttemptStatus::Failed => println!(
                "{} {:<17} {} {}",
                error(),
                attempt.strategy.as_str(),
                style(attempt.error.as_deref().unwrap_or("")).red(),
                style(format!("({}ms)", attempt.elapsed_ms)).dim()
            ),
        }
    }

    if resolution.is_fallback() {
        println!(
            "\n{} {}",
            style("!").yellow(),
            style(format!("No strategy succeeded, title: {}", resolution.title)).yellow()
        );
    } else {
        println!("\n{}", style(&resolution.title).bold());
    }

    Ok(())
}
