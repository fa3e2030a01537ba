//! Report output settings.
//!
//! Page geometry for tabular documents, where reports are written and the default
//! bucket size for period reports.

use crate::core::{aggregate::Granularity, document::PageSetup};
use serde::Deserialize;
use std::path::PathBuf;

/// `[report]` section of config.toml
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Page geometry in millimetres (`[report.page]`)
    pub page: PageSetup,
    /// Directory reports are written to
    pub output_dir: PathBuf,
    /// Bucket size of period reports
    pub granularity: Granularity,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            page: PageSetup::default(),
            output_dir: PathBuf::from("reports"),
            granularity: Granularity::Month,
        }
    }
}
