pub mod http_client;
pub mod parsers;

use crate::config::SourceConfig;
use crate::models::Payload;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use self::http_client::HttpClient;
use self::parsers::extract_payload;

// ── Source trait ──────────────────────────────────────────────────────────────

/// Where the reservation page comes from.
#[async_trait]
pub trait VacancySource: Send + Sync {
    /// URL reported in the log record and the notification.
    fn page_url(&self) -> &str;

    async fn fetch_page(&self) -> Result<String>;

    async fn fetch_payload(&self) -> Result<Payload> {
        let html = self.fetch_page().await?;
        let payload = extract_payload(&html)?;
        debug!("Payload has {} room groups", payload.calendar_rooms.len());
        Ok(payload)
    }
}

// ── Live reservation site ─────────────────────────────────────────────────────

pub struct ReserveSiteScraper {
    client: HttpClient,
    url: String,
}

impl ReserveSiteScraper {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new(&config.user_agent, Duration::from_secs(config.timeout_secs))?,
            url: config.plan_url()?,
        })
    }
}

#[async_trait]
impl VacancySource for ReserveSiteScraper {
    fn page_url(&self) -> &str {
        &self.url
    }

    async fn fetch_page(&self) -> Result<String> {
        info!("Fetching {}", self.url);
        self.client
            .get_text(&self.url)
            .await
            .context("Failed to fetch reservation page")
    }
}

// ── Saved page ────────────────────────────────────────────────────────────────

/// A page saved to disk, for inspecting the payload offline.
pub struct SavedPage {
    path: PathBuf,
    url: String,
}

impl SavedPage {
    pub fn new(path: PathBuf, url: String) -> Self {
        Self { path, url }
    }
}

#[async_trait]
impl VacancySource for SavedPage {
    fn page_url(&self) -> &str {
        &self.url
    }

    async fn fetch_page(&self) -> Result<String> {
        info!("Reading {:?}", self.path);
        tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read {:?}", self.path))
    }
}
