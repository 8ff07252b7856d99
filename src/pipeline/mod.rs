//! One vacancy check: fetch → extract → filter → log → notify once.
//!
//! The run is a straight line with three outcomes:
//!   - no vacancy on the target date: log only
//!   - vacancy, flag file present: log only, reported as already notified
//!   - vacancy, no flag: broadcast, then write the flag
//!
//! A failed broadcast aborts the run before the flag is written, so the next
//! scheduled run sends again.

use crate::availability::list_available;
use crate::config::AppConfig;
use crate::models::LogRecord;
use crate::notifier::{compose_message, Broadcaster, LineBroadcaster};
use crate::scraper::{ReserveSiteScraper, VacancySource};
use crate::storage::StateStore;
use crate::utils::fmt_timestamp;
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use tracing::info;

pub struct Pipeline<S, B> {
    source: S,
    broadcaster: B,
    store: StateStore,
    target_date: String,
    header: String,
}

impl Pipeline<ReserveSiteScraper, LineBroadcaster> {
    /// Live site + LINE, as configured.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self::new(
            ReserveSiteScraper::new(&config.source).context("Failed to build scraper")?,
            LineBroadcaster::new(&config.notifier).context("Failed to build notifier")?,
            StateStore::open(&config.state)?,
            config.target_date()?,
            &config.notifier.header,
        ))
    }
}

impl<S: VacancySource, B: Broadcaster> Pipeline<S, B> {
    pub fn new(source: S, broadcaster: B, store: StateStore, target_date: &str, header: &str) -> Self {
        Self {
            source,
            broadcaster,
            store,
            target_date: target_date.to_string(),
            header: header.to_string(),
        }
    }

    /// Run with `now` as the run's timestamp and log day.
    pub async fn run_at(&self, now: NaiveDateTime) -> Result<RunReport> {
        let payload = self.source.fetch_payload().await?;
        let rooms = list_available(&payload, &self.target_date);
        let timestamp = fmt_timestamp(now);
        let url = self.source.page_url();

        info!("{}: {} vacant room(s)", self.target_date, rooms.len());

        let record = LogRecord {
            timestamp: timestamp.clone(),
            target_date: self.target_date.clone(),
            available_rooms: rooms.clone(),
            url: url.to_string(),
        };
        self.store.write_log(&record, now.date())?;

        let outcome = if rooms.is_empty() {
            RunOutcome::NoVacancy
        } else if self.store.is_notified(&self.target_date)? {
            info!("{} already notified, skipping broadcast", self.target_date);
            RunOutcome::AlreadyNotified { rooms }
        } else {
            let message = compose_message(&self.header, &self.target_date, &rooms, url);
            self.broadcaster.broadcast(&message).await?;
            self.store.mark_notified(&self.target_date, &timestamp)?;
            RunOutcome::Notified { rooms }
        };

        Ok(RunReport {
            timestamp,
            target_date: self.target_date.clone(),
            outcome,
        })
    }
}

/// One `check` run rendered as its stdout line. Never fails: any error,
/// including a bad config, becomes `[<ts>] error: <cause chain>`.
pub async fn check_line(config: &AppConfig, now: NaiveDateTime) -> String {
    let result = match Pipeline::from_config(config) {
        Ok(pipeline) => pipeline.run_at(now).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(report) => report.status_line(),
        Err(e) => error_line(now, &e),
    }
}

pub fn error_line(now: NaiveDateTime, err: &anyhow::Error) -> String {
    format!("[{}] error: {:#}", fmt_timestamp(now), err)
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    NoVacancy,
    AlreadyNotified { rooms: Vec<String> },
    Notified { rooms: Vec<String> },
}

#[derive(Debug)]
pub struct RunReport {
    pub timestamp: String,
    pub target_date: String,
    pub outcome: RunOutcome,
}

impl RunReport {
    /// The single line printed to stdout for this run.
    pub fn status_line(&self) -> String {
        let status = match &self.outcome {
            RunOutcome::NoVacancy => "no vacancy".to_string(),
            RunOutcome::AlreadyNotified { rooms } => {
                format!("already notified ({} room(s))", rooms.len())
            }
            RunOutcome::Notified { rooms } => format!("notified ({} room(s))", rooms.len()),
        };
        format!("[{}] {}: {}", self.timestamp, self.target_date, status)
    }
}
