use chrono::{Local, NaiveDateTime};
use std::time::Instant;
use tracing::info;

/// Timestamp format used in the log record, the flag file and stdout.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Local wall-clock time, the clock every run is stamped with.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn fmt_timestamp(t: NaiveDateTime) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}

/// A simple wall-clock timer for logging elapsed time.
pub struct Timer {
    label: String,
    start: Instant,
}

impl Timer {
    pub fn start(label: impl Into<String>) -> Self {
        let label = label.into();
        info!("Starting: {}", label);
        Self {
            label,
            start: Instant::now(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        info!(
            "Finished: {} (took {:.2?})",
            self.label,
            self.start.elapsed()
        );
    }
}
