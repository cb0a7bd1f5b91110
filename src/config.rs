//! Configuration management for dropview using the prefer crate.
//!
//! Precedence, lowest to highest: built-in defaults, config file,
//! `DROPVIEW_*` environment variables, command-line flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::endpoints::ShareEndpoints;
use crate::http_client::HttpClient;
use crate::ocs::OcsClient;
use crate::resolver::{Resolver, DEFAULT_TITLE};

/// Default address the server binds to.
pub const DEFAULT_BIND: &str = "127.0.0.1:3030";

/// Port used when a bind address names only a host.
pub const DEFAULT_PORT: u16 = 3030;

/// Default per-strategy timeout in milliseconds.
pub const DEFAULT_STRATEGY_TIMEOUT_MS: u64 = 5000;

/// Application settings.
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    /// Base URL of the file-sharing server.
    pub upstream_url: String,
    /// Base URL under which this service reaches itself (list proxy strategy).
    /// Derived from `bind` when unset.
    pub self_url: Option<String>,
    /// Public base URL of this service, used for `og:url`.
    pub public_url: Option<String>,
    /// Interactive app that human visitors are redirected to.
    pub app_url: Option<String>,
    /// Address to listen on.
    pub bind: String,
    /// User agent for outbound requests.
    pub user_agent: Option<String>,
    /// Timeout for a single resolution strategy in milliseconds.
    pub strategy_timeout_ms: u64,
    /// Outbound request timeout in seconds. Streamed downloads apply it per
    /// read instead of to the whole transfer.
    pub request_timeout: u64,
    /// Title used when no strategy succeeds.
    pub default_title: String,
    /// `og:site_name` value.
    pub site_name: String,
    /// `og:description` value.
    pub description: String,
    /// HTML file whose `<title>File Share</title>` is replaced with the preview tags.
    pub page_template: Option<PathBuf>,
    /// Account used for the OCS sharing API; share metadata lookups are
    /// skipped unless both user and password are set.
    pub ocs_user: Option<String>,
    #[serde(skip_serializing)]
    pub ocs_password: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            upstream_url: "http://127.0.0.1:8080".to_string(),
            self_url: None,
            public_url: None,
            app_url: None,
            bind: DEFAULT_BIND.to_string(),
            user_agent: None,
            strategy_timeout_ms: DEFAULT_STRATEGY_TIMEOUT_MS,
            request_timeout: 30,
            default_title: DEFAULT_TITLE.to_string(),
            site_name: DEFAULT_TITLE.to_string(),
            description: "Click to view or download the shared file.".to_string(),
            page_template: None,
            ocs_user: None,
            ocs_password: None,
        }
    }
}

impl Settings {
    pub fn strategy_timeout(&self) -> Duration {
        Duration::from_millis(self.strategy_timeout_ms)
    }

    /// Base URL for reaching our own routes.
    pub fn effective_self_url(&self) -> String {
        if let Some(ref url) = self.self_url {
            return url.clone();
        }
        let (host, port) = parse_bind_address(&self.bind).unwrap_or_else(|_| {
            tracing::warn!("Invalid bind address '{}', using {}", self.bind, DEFAULT_BIND);
            ("127.0.0.1".to_string(), DEFAULT_PORT)
        });
        let host = match host.as_str() {
            "0.0.0.0" | "[::]" | "::" => "127.0.0.1",
            other => other,
        };
        format!("http://{}:{}", host, port)
    }

    pub fn endpoints(&self) -> ShareEndpoints {
        ShareEndpoints::new(&self.upstream_url, &self.effective_self_url())
    }

    pub fn http_client(&self) -> Result<HttpClient, reqwest::Error> {
        HttpClient::new(
            Duration::from_secs(self.request_timeout),
            self.user_agent.as_deref(),
        )
    }

    /// Build the standard resolver chain for these settings.
    pub fn resolver(&self, client: &HttpClient) -> Resolver {
        Resolver::standard(
            client,
            &self.endpoints(),
            self.strategy_timeout(),
            self.default_title.clone(),
        )
    }

    /// Share metadata client, when OCS credentials are configured.
    pub fn ocs_client(&self, client: &HttpClient) -> Option<OcsClient> {
        match (&self.ocs_user, &self.ocs_password) {
            (Some(user), Some(password)) => Some(OcsClient::new(
                client.clone(),
                self.endpoints(),
                user,
                password,
            )),
            _ => None,
        }
    }

    /// Check that every configured URL parses.
    pub fn validate(&self) -> anyhow::Result<()> {
        url::Url::parse(&self.upstream_url)
            .map_err(|e| anyhow::anyhow!("Invalid upstream_url '{}': {}", self.upstream_url, e))?;
        for (name, value) in [
            ("self_url", &self.self_url),
            ("public_url", &self.public_url),
            ("app_url", &self.app_url),
        ] {
            if let Some(value) = value {
                url::Url::parse(value)
                    .map_err(|e| anyhow::anyhow!("Invalid {} '{}': {}", name, value, e))?;
            }
        }
        Ok(())
    }
}

/// Parse a bind address that can be:
/// - Just a port: "3030" -> 127.0.0.1:3030
/// - Just a host: "0.0.0.0" -> 0.0.0.0:3030
/// - Host and port: "0.0.0.0:3030" -> 0.0.0.0:3030
pub fn parse_bind_address(bind: &str) -> anyhow::Result<(String, u16)> {
    let bind = bind.trim();
    if bind.is_empty() {
        anyhow::bail!("Empty bind address");
    }

    // Try parsing as just a port number
    if let Ok(port) = bind.parse::<u16>() {
        return Ok(("127.0.0.1".to_string(), port));
    }

    // Try parsing as host:port
    if let Some((host, port_str)) = bind.rsplit_once(':') {
        if let Ok(port) = port_str.parse::<u16>() {
            return Ok((host.to_string(), port));
        }
    }

    // Must be just a host, use default port
    Ok((bind.to_string(), DEFAULT_PORT))
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "upstream")]
    pub upstream_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy_timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocs_user: Option<String>,
    #[serde(default, skip_serializing)]
    pub ocs_password: Option<String>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Automatically discovers dropview config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("dropview").await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::warn!("Ignoring config file: {}", e);
                            Self::default()
                        }
                    }
                } else {
                    Self::default()
                }
            }
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e))?,
            _ => serde_json::from_str(&contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e))?,
        };

        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Get the base directory for resolving relative paths.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref url) = self.upstream_url {
            settings.upstream_url = url.clone();
        }
        if let Some(ref url) = self.self_url {
            settings.self_url = Some(url.clone());
        }
        if let Some(ref url) = self.public_url {
            settings.public_url = Some(url.clone());
        }
        if let Some(ref url) = self.app_url {
            settings.app_url = Some(url.clone());
        }
        if let Some(ref bind) = self.bind {
            settings.bind = bind.clone();
        }
        if let Some(ref ua) = self.user_agent {
            settings.user_agent = Some(ua.clone());
        }
        if let Some(ms) = self.strategy_timeout_ms {
            settings.strategy_timeout_ms = ms;
        }
        if let Some(secs) = self.request_timeout {
            settings.request_timeout = secs;
        }
        if let Some(ref title) = self.default_title {
            settings.default_title = title.clone();
        }
        if let Some(ref name) = self.site_name {
            settings.site_name = name.clone();
        }
        if let Some(ref description) = self.description {
            settings.description = description.clone();
        }
        if let Some(ref template) = self.page_template {
            settings.page_template = Some(self.resolve_path(template, base_dir));
        }
        if let Some(ref user) = self.ocs_user {
            settings.ocs_user = Some(user.clone());
        }
        if let Some(ref password) = self.ocs_password {
            settings.ocs_password = Some(password.clone());
        }
    }
}

/// Options controlling how settings are loaded.
#[derive(Debug, Default)]
pub struct LoadOptions {
    /// Explicit config file (skips discovery).
    pub config_path: Option<PathBuf>,
    /// Upstream URL from the command line.
    pub upstream_url: Option<String>,
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

/// Apply `DROPVIEW_*` environment variables.
fn apply_env_overrides(settings: &mut Settings) {
    if let Some(url) = env_var("DROPVIEW_SELF_URL") {
        tracing::debug!("Using DROPVIEW_SELF_URL from environment: {}", url);
        settings.self_url = Some(url);
    }
    if let Some(url) = env_var("DROPVIEW_PUBLIC_URL") {
        settings.public_url = Some(url);
    }
    if let Some(url) = env_var("DROPVIEW_APP_URL") {
        settings.app_url = Some(url);
    }
    if let Some(bind) = env_var("DROPVIEW_BIND") {
        settings.bind = bind;
    }
    if let Some(user) = env_var("DROPVIEW_OCS_USER") {
        settings.ocs_user = Some(user);
    }
    if let Some(password) = env_var("DROPVIEW_OCS_PASSWORD") {
        settings.ocs_password = Some(password);
    }
    if let Some(ms) = env_var("DROPVIEW_STRATEGY_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
        settings.strategy_timeout_ms = ms;
    }
}

/// Load effective settings from file, environment and command-line options.
pub async fn load_settings(options: LoadOptions) -> anyhow::Result<(Settings, Config)> {
    let config = match options.config_path {
        Some(ref path) => Config::load_from_path(path)
            .await
            .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?,
        None => Config::load().await,
    };

    let base_dir = config
        .base_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings, &base_dir);
    apply_env_overrides(&mut settings);

    if let Some(url) = options.upstream_url {
        settings.upstream_url = url;
    }

    settings.validate()?;
    Ok((settings, config))
}
