//! Run log and notification flag files.
//!
//! Neither file is locked; overlapping runs against the same directory can
//! race on the flag.

use crate::config::StateConfig;
use crate::models::LogRecord;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

pub struct StateStore {
    log_dir: PathBuf,
    flag_dir: PathBuf,
}

impl StateStore {
    pub fn open(config: &StateConfig) -> Result<Self> {
        for dir in [&config.log_dir, &config.flag_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("Could not create dir {:?}", dir))?;
        }
        Ok(Self {
            log_dir: config.log_dir.clone(),
            flag_dir: config.flag_dir.clone(),
        })
    }

    // ── Run log ───────────────────────────────────────────────────────────────

    /// `vacancy-log-YYYYMMDD.json`, keyed by the day of the run.
    pub fn log_path(&self, run_day: NaiveDate) -> PathBuf {
        self.log_dir
            .join(format!("vacancy-log-{}.json", run_day.format("%Y%m%d")))
    }

    /// Overwrite the day's log with this run's snapshot.
    pub fn write_log(&self, record: &LogRecord, run_day: NaiveDate) -> Result<PathBuf> {
        let path = self.log_path(run_day);
        let json = serde_json::to_string_pretty(record)?;
        fs::write(&path, json).with_context(|| format!("Failed to write log {:?}", path))?;
        debug!("Wrote run log {:?}", path);
        Ok(path)
    }

    // ── Notification flag ─────────────────────────────────────────────────────

    /// `vacancy-notified-<target_date>.flag`
    pub fn flag_path(&self, target_date: &str) -> PathBuf {
        self.flag_dir
            .join(format!("vacancy-notified-{}.flag", file_safe(target_date)))
    }

    /// Whether the flag exists. Errors other than "not found" are returned
    /// rather than read as "not yet notified".
    pub fn is_notified(&self, target_date: &str) -> Result<bool> {
        let path = self.flag_path(target_date);
        path.try_exists()
            .with_context(|| format!("Failed to check flag {:?}", path))
    }

    /// Record that `target_date` has been announced. The file holds the
    /// notification timestamp; only its existence is checked.
    pub fn mark_notified(&self, target_date: &str, timestamp: &str) -> Result<()> {
        let path = self.flag_path(target_date);
        fs::write(&path, timestamp)
            .with_context(|| format!("Failed to write flag {:?}", path))?;
        info!("Marked {} as notified ({:?})", target_date, path);
        Ok(())
    }
}

/// Path separators in a date like `2025/09/21` would escape the flag dir.
fn file_safe(s: &str) -> String {
    s.replace(['/', '\\'], "-")
}
