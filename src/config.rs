//! Application configuration.
//!
//! Settings are read from a JSON file. Every field has a default, so a
//! partial file (or none at all) works.
//!
//! # Example
//!
//! ```
//! use cookflow::config::AppConfig;
//!
//! let config: AppConfig = serde_json::from_str(r#"{"notification": {"throttle_window_ms": 500}}"#).unwrap();
//! assert_eq!(config.notification.throttle_window_ms, 500);
//! assert_eq!(config.notification.urgent_window_seconds, 60);
//! assert!(!config.runner.auto_advance);
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::notification::UrgencyTier;
use crate::session::RunnerConfig;

fn default_enabled() -> bool {
    true
}

fn default_throttle_window_ms() -> u64 {
    1000
}

fn default_urgent_window_seconds() -> u32 {
    60
}

fn default_max_urgency_seconds() -> u32 {
    30
}

fn default_progress_bar_width() -> usize {
    10
}

fn default_call_timeout_ms() -> u64 {
    5000
}

/// Maximum progress bar width accepted in configuration.
const MAX_PROGRESS_BAR_WIDTH: usize = 80;

/// Maximum throttle window accepted in configuration.
const MAX_THROTTLE_WINDOW_MS: u64 = 60_000;

/// Maximum time a single notification call may take.
const MAX_CALL_TIMEOUT_MS: u64 = 60_000;

// ============================================================================
// NotificationConfig
// ============================================================================

/// Persistent notification settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Whether notifications are shown at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Minimum spacing between non-urgent countdown updates.
    #[serde(default = "default_throttle_window_ms")]
    pub throttle_window_ms: u64,

    /// At or below this many seconds every tick is mirrored (High tier).
    #[serde(default = "default_urgent_window_seconds")]
    pub urgent_window_seconds: u32,

    /// At or below this many seconds the tier is Max.
    #[serde(default = "default_max_urgency_seconds")]
    pub max_urgency_seconds: u32,

    /// Width of the rendered progress bar in characters.
    #[serde(default = "default_progress_bar_width")]
    pub progress_bar_width: usize,

    /// Upper bound for one call into the notification service.
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            throttle_window_ms: default_throttle_window_ms(),
            urgent_window_seconds: default_urgent_window_seconds(),
            max_urgency_seconds: default_max_urgency_seconds(),
            progress_bar_width: default_progress_bar_width(),
            call_timeout_ms: default_call_timeout_ms(),
        }
    }
}

impl NotificationConfig {
    /// Classifies remaining seconds with the configured thresholds.
    pub fn urgency(&self, remaining_seconds: u32) -> UrgencyTier {
        UrgencyTier::classify(
            remaining_seconds,
            self.urgent_window_seconds,
            self.max_urgency_seconds,
        )
    }

    /// Returns true if every tick must be mirrored at this remaining time.
    pub fn is_urgent(&self, remaining_seconds: u32) -> bool {
        remaining_seconds <= self.urgent_window_seconds
    }

    /// Returns the call timeout as a `Duration`.
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    /// Validates the configuration.
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_urgency_seconds > self.urgent_window_seconds {
            return Err(
                "notification.max_urgency_seconds must not exceed notification.urgent_window_seconds"
                    .to_string(),
            );
        }
        if self.progress_bar_width > MAX_PROGRESS_BAR_WIDTH {
            return Err(format!(
                "notification.progress_bar_width must be at most {}",
                MAX_PROGRESS_BAR_WIDTH
            ));
        }
        if self.throttle_window_ms > MAX_THROTTLE_WINDOW_MS {
            return Err(format!(
                "notification.throttle_window_ms must be at most {}",
                MAX_THROTTLE_WINDOW_MS
            ));
        }
        if self.call_timeout_ms == 0 || self.call_timeout_ms > MAX_CALL_TIMEOUT_MS {
            return Err(format!(
                "notification.call_timeout_ms must be between 1 and {}",
                MAX_CALL_TIMEOUT_MS
            ));
        }
        Ok(())
    }
}

// ============================================================================
// AppConfig
// ============================================================================

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Notification settings
    #[serde(default)]
    pub notification: NotificationConfig,
    /// Host policies for the session runner
    #[serde(default)]
    pub runner: RunnerConfig,
}

impl AppConfig {
    /// Default location: `<config dir>/cookflow/config.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("cookflow").join("config.json"))
    }

    /// Loads the configuration.
    ///
    /// An explicit path must exist. Without one, the default path is used
    /// when present and the built-in defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => {
                    tracing::debug!("no configuration file; using defaults");
                    Self::default()
                }
            },
        };

        config.validate().map_err(anyhow::Error::msg)?;
        Ok(config)
    }

    /// Reads a configuration file without validating it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        tracing::debug!(?path, "configuration loaded");
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.notification.validate()
    }
}
