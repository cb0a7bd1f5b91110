//! Link-preview crawler detection.

/// User-agent fragments of crawlers that unfurl links.
const BOT_USER_AGENTS: &[&str] = &[
    "facebookexternalhit",
    "facebot",
    "twitterbot",
    "whatsapp",
    "linkedinbot",
    "slackbot",
    "discordbot",
    "telegrambot",
    "pinterest",
    "bot",
    "crawler",
    "spider",
    "preview",
];

/// Whether a user agent belongs to a link-preview crawler.
pub fn is_preview_bot(user_agent: &str) -> bool {
    if user_agent.is_empty() {
        return false;
    }
    let ua = user_agent.to_lowercase();
    BOT_USER_AGENTS.iter().any(|bot| ua.contains(bot))
}
