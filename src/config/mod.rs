//! Application configuration loaded from config.toml.
//!
//! Every setting has a default, so an empty or missing file still yields a usable
//! configuration. The file location comes from `CAMPUS_RECORDS_CONFIG`.

/// Records feed location and report context
pub mod feed;

/// Report layout and output settings
pub mod report;

pub use feed::FeedConfig;
pub use report::ReportConfig;

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// Environment variable naming the configuration file
pub const CONFIG_PATH_VAR: &str = "CAMPUS_RECORDS_CONFIG";
/// Configuration file used when [`CONFIG_PATH_VAR`] is unset
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// `[report]` section
    pub report: ReportConfig,
    /// `[feed]` section
    pub feed: FeedConfig,
}

/// Loads configuration from a TOML file
///
/// # Arguments
/// * `path` - Path to the config.toml file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A value has the wrong type
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path_ref:?}: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {path_ref:?}: {e}"),
    })
}

/// Loads the application configuration for the binary.
///
/// Reads the file named by `CAMPUS_RECORDS_CONFIG` (default `config.toml`). A missing
/// file falls back to defaults with a warning; an unreadable or invalid one is an
/// error. Environment overrides are applied last.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    let config = if Path::new(&path).exists() {
        let config = load_config(&path)?;
        info!("Loaded configuration from {}", path);
        config
    } else {
        warn!("Configuration file {} not found, using defaults", path);
        AppConfig::default()
    };

    Ok(AppConfig {
        feed: config.feed.with_env_overrides(),
        ..config
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::aggregate::Granularity;
    use std::path::PathBuf;

    #[test]
    fn test_parse_app_config() {
        let toml_str = r#"
            [report]
            output_dir = "exports"

            [report.page]
            margin_x = 20.0

            [feed]
            snapshot_path = "feed.json"
            context = "CSE 2-A"
        "#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.report.output_dir, PathBuf::from("exports"));
        assert_eq!(config.report.page.margin_x, 20.0);
        assert_eq!(config.report.granularity, Granularity::Month);
        assert_eq!(config.feed.context, "CSE 2-A");
        assert_eq!(config.feed.student_id, None);
    }

    #[test]
    fn test_empty_file_is_all_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_config_from_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[feed]\nstudent_id = \"s2\"\n")?;
        let config = load_config(&path)?;
        assert_eq!(config.feed.student_id.as_deref(), Some("s2"));

        std::fs::write(&path, "[feed\n")?;
        assert!(matches!(load_config(&path), Err(Error::Config { .. })));
        assert!(matches!(
            load_config(dir.path().join("missing.toml")),
            Err(Error::Config { .. })
        ));
        Ok(())
    }
}
