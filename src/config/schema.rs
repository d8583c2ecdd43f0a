//! Configuration schema definitions.
//!
//! Every section has serde defaults, so an empty or partial file is valid.

use super::error::{ConfigError, ConfigResult};
use crate::settings::{self, DevicePath, RunTiming};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Device defaults
    pub serial: SerialConfig,
    /// Loop pacing and reporting
    pub run: RunConfig,
    /// Log output
    pub logging: LoggingConfig,
}

impl Config {
    /// Check values that serde alone cannot rule out.
    pub fn validate(&self) -> ConfigResult<()> {
        DevicePath::new(self.serial.device.as_str())
            .map_err(|e| ConfigError::invalid("serial.device", e.to_string()))?;

        if self.run.report_interval == 0 {
            return Err(ConfigError::invalid(
                "run.report_interval",
                "must be greater than zero",
            ));
        }
        if self.run.poll_timeout_ms > i32::MAX as u64 {
            return Err(ConfigError::invalid(
                "run.poll_timeout_ms",
                format!("must be at most {}", i32::MAX),
            ));
        }
        Ok(())
    }
}

/// Serial device section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Device used when `-d` is not given
    pub device: String,
    /// Baud rate used when `-b` is not given
    pub baud: i64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device: settings::DEFAULT_DEVICE.to_string(),
            baud: settings::DEFAULT_BAUD,
        }
    }
}

/// Run loop section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Upper bound on each readiness wait, in milliseconds
    pub poll_timeout_ms: u64,
    /// Bytes between progress reports
    pub report_interval: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        let timing = RunTiming::default();
        Self {
            poll_timeout_ms: u64::try_from(timing.poll_timeout.as_millis()).unwrap_or(u64::MAX),
            report_interval: timing.report_interval,
        }
    }
}

impl RunConfig {
    pub fn timing(&self) -> RunTiming {
        RunTiming {
            poll_timeout: Duration::from_millis(self.poll_timeout_ms),
            report_interval: self.report_interval,
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Log format: "json", "pretty", "compact"
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format
    Json,
    /// Pretty format with colors
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}
