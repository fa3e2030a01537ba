//! Records feed settings.
//!
//! Where the records snapshot lives, whose records the binary reports on and the
//! context label used in report file names. `CAMPUS_FEED_PATH` and
//! `CAMPUS_STUDENT_ID` override the file values.

use serde::Deserialize;
use std::path::PathBuf;

/// Environment variable overriding [`FeedConfig::snapshot_path`]
pub const FEED_PATH_VAR: &str = "CAMPUS_FEED_PATH";
/// Environment variable overriding [`FeedConfig::student_id`]
pub const STUDENT_ID_VAR: &str = "CAMPUS_STUDENT_ID";

/// `[feed]` section of config.toml
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// JSON snapshot of the records API
    pub snapshot_path: PathBuf,
    /// Student whose attendance and grades are reported; everyone when unset
    pub student_id: Option<String>,
    /// Report context, e.g. `"Monthly Attendance"` gives `Monthly_Attendance_Report.csv`
    pub context: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from("data/records.json"),
            student_id: None,
            context: "Monthly Attendance".to_string(),
        }
    }
}

impl FeedConfig {
    /// Applies environment overrides.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(path) = std::env::var(FEED_PATH_VAR) {
            self.snapshot_path = PathBuf::from(path);
        }
        if let Ok(student) = std::env::var(STUDENT_ID_VAR) {
            self.student_id = Some(student).filter(|s| !s.trim().is_empty());
        }
        self
    }
}
