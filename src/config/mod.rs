use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Date to watch, in the site's own representation (e.g. `2025-09-21`)
    #[serde(default)]
    pub target_date: Option<String>,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub notifier: NotifierConfig,

    #[serde(default)]
    pub state: StateConfig,
}

/// Reservation site configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    #[serde(default = "default_source_url")]
    pub url: String,

    /// Sent as the `adult` query parameter
    #[serde(default = "default_party_size")]
    pub party_size: u32,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_source_timeout_secs")]
    pub timeout_secs: u64,
}

/// Messaging API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotifierConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Bearer token; usually supplied through `LINE_TOKEN`
    #[serde(default, skip_serializing)]
    pub token: Option<String>,

    #[serde(default = "default_notifier_timeout_secs")]
    pub timeout_secs: u64,

    /// First line of the message, followed directly by the target date
    #[serde(default = "default_header")]
    pub header: String,
}

/// Where the run log and notification flags live
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StateConfig {
    #[serde(default = "default_dir")]
    pub log_dir: PathBuf,

    #[serde(default = "default_dir")]
    pub flag_dir: PathBuf,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_source_url() -> String {
    "https://sec.489.jp/rga/30/reserve/plan".to_string()
}
fn default_party_size() -> u32 {
    4
}
fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}
fn default_source_timeout_secs() -> u64 {
    30
}
fn default_endpoint() -> String {
    "https://api.line.me/v2/bot/message/broadcast".to_string()
}
fn default_notifier_timeout_secs() -> u64 {
    15
}
fn default_header() -> String {
    "【空き発見】".to_string()
}
fn default_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_source_url(),
            party_size: default_party_size(),
            user_agent: default_user_agent(),
            timeout_secs: default_source_timeout_secs(),
        }
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            token: None,
            timeout_secs: default_notifier_timeout_secs(),
            header: default_header(),
        }
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            log_dir: default_dir(),
            flag_dir: default_dir(),
        }
    }
}

impl SourceConfig {
    /// Plan URL with the party size set as `adult=<n>`.
    pub fn plan_url(&self) -> Result<String> {
        let mut url = Url::parse(&self.url)
            .with_context(|| format!("Invalid source url {:?}", self.url))?;

        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| k != "adult")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .append_pair("adult", &self.party_size.to_string());

        Ok(url.into())
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load `<dir>/default.toml` and `<dir>/local.toml` (both optional), then
    /// `VACANCY__*`, `TARGET_DATE` and `LINE_TOKEN` from the environment.
    pub fn load_from(dir: &Path) -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name(&dir.join("default").to_string_lossy())
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name(&dir.join("local").to_string_lossy())
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::Environment::with_prefix("VACANCY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("target_date", std::env::var("TARGET_DATE").ok())?
            .set_override_option("notifier.token", std::env::var("LINE_TOKEN").ok())?
            .build()
            .context("Failed to read configuration")?;

        cfg.try_deserialize().context("Invalid configuration")
    }

    /// The configured target date; a run cannot proceed without one.
    pub fn target_date(&self) -> Result<&str> {
        self.target_date
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .context("TARGET_DATE is not set")
    }
}
