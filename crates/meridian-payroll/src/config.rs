//! # Engine Configuration
//!
//! TOML-backed configuration with defaults that work out of the box.
//!
//! ## Example Configuration File
//! ```toml
//! database_path = "./data/backoffice.db"
//! period_policy = "previous_month"
//! concurrency = 4
//!
//! [notifications]
//! poll_interval_secs = 30
//! batch_size = 50
//! max_attempts = 5
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use meridian_core::PeriodPolicy;

use crate::error::{PayrollError, PayrollResult};

// =============================================================================
// Notification Configuration
// =============================================================================

/// Settings for the background notification processor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Seconds between outbox polls.
    pub poll_interval_secs: u64,

    /// Maximum entries fetched per poll.
    pub batch_size: u32,

    /// Entries with this many failed attempts are skipped and logged
    /// for operator attention instead of being retried forever.
    pub max_attempts: i64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        NotificationConfig {
            poll_interval_secs: 30,
            batch_size: 50,
            max_attempts: 5,
        }
    }
}

// =============================================================================
// Payroll Configuration
// =============================================================================

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PayrollConfig {
    /// SQLite database file path.
    pub database_path: PathBuf,

    /// Which period a run triggered "now" pays.
    pub period_policy: PeriodPolicy,

    /// How many employees are processed concurrently.
    pub concurrency: usize,

    /// Notification processor settings.
    pub notifications: NotificationConfig,
}

impl Default for PayrollConfig {
    fn default() -> Self {
        PayrollConfig {
            database_path: PathBuf::from("./backoffice.db"),
            period_policy: PeriodPolicy::default(),
            concurrency: 4,
            notifications: NotificationConfig::default(),
        }
    }
}

impl PayrollConfig {
    /// Loads configuration from a TOML file.
    ///
    /// A missing file is not an error: it yields the defaults, so the
    /// binaries run without any setup. A file that exists but does not
    /// parse IS an error: silently ignoring a typo'd config would pay
    /// the wrong period.
    pub fn load(path: &Path) -> PayrollResult<Self> {
        if !path.exists() {
            return Ok(PayrollConfig::default());
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|e| PayrollError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml(&raw)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(raw: &str) -> PayrollResult<Self> {
        toml::from_str(raw).map_err(|e| PayrollError::Config(e.to_string()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PayrollConfig::default();
        assert_eq!(config.database_path, PathBuf::from("./backoffice.db"));
        assert_eq!(config.period_policy, PeriodPolicy::PreviousMonth);
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.notifications.max_attempts, 5);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = PayrollConfig::from_toml(
            r#"
            period_policy = "current_month"

            [notifications]
            max_attempts = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.period_policy, PeriodPolicy::CurrentMonth);
        assert_eq!(config.notifications.max_attempts, 3);
        // untouched keys keep their defaults
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.notifications.poll_interval_secs, 30);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let err = PayrollConfig::from_toml("period_policy = \"next_year\"").unwrap_err();
        assert!(matches!(err, PayrollError::Config(_)));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = PayrollConfig::load(Path::new("/nonexistent/meridian.toml")).unwrap();
        assert_eq!(config.concurrency, 4);
    }
}
