//! Run settings.
//!
//! Built once at startup from configuration and command-line flags, then
//! passed by reference to the port manager and the pattern engine. Nothing
//! mutates a `Settings` value after construction.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Longest device path accepted, matching Linux `PATH_MAX`.
pub const MAX_DEVICE_PATH_LEN: usize = 4096;

/// Default serial device.
pub const DEFAULT_DEVICE: &str = "/dev/ttyUSB0";

/// Default requested baud rate.
pub const DEFAULT_BAUD: i64 = 9600;

/// Default bound on each readiness wait.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(200);

/// Default number of bytes between progress reports.
pub const DEFAULT_REPORT_INTERVAL: u64 = 1000;

/// Why a device path was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DevicePathError {
    #[error("device path is empty")]
    Empty,

    #[error("device path is {len} bytes, longer than the {max} byte limit")]
    TooLong { len: usize, max: usize },

    #[error("device path contains a NUL byte")]
    InteriorNul,
}

/// A validated serial device path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevicePath(PathBuf);

impl DevicePath {
    /// Validate and wrap a device path.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, DevicePathError> {
        let path = path.into();
        let len = path.as_os_str().len();
        if len == 0 {
            return Err(DevicePathError::Empty);
        }
        if len > MAX_DEVICE_PATH_LEN {
            return Err(DevicePathError::TooLong {
                len,
                max: MAX_DEVICE_PATH_LEN,
            });
        }
        if path.as_os_str().as_encoded_bytes().contains(&0) {
            return Err(DevicePathError::InteriorNul);
        }
        Ok(Self(path))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl Default for DevicePath {
    fn default() -> Self {
        Self(PathBuf::from(DEFAULT_DEVICE))
    }
}

impl fmt::Display for DevicePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.display().fmt(f)
    }
}

/// Direction of the test run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    Receive,
    Transmit,
    #[default]
    Unset,
}

impl Mode {
    /// Numeric code used in the verbose argument dump (`RX = 1`, `TX = 2`).
    pub fn code(self) -> u8 {
        match self {
            Self::Unset => 0,
            Self::Receive => 1,
            Self::Transmit => 2,
        }
    }
}

/// Loop pacing and reporting knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTiming {
    /// Upper bound on each readiness wait.
    pub poll_timeout: Duration,
    /// Bytes between progress reports. Never zero.
    pub report_interval: u64,
}

impl Default for RunTiming {
    fn default() -> Self {
        Self {
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            report_interval: DEFAULT_REPORT_INTERVAL,
        }
    }
}

/// Immutable settings for one process run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub verbose: bool,
    pub device: DevicePath,
    /// Requested rate; unsupported values fall back to 9600 on the wire.
    pub baud_rate: i64,
    pub mode: Mode,
    pub single_char: bool,
    pub timing: RunTiming,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            verbose: false,
            device: DevicePath::default(),
            baud_rate: DEFAULT_BAUD,
            mode: Mode::Unset,
            single_char: false,
            timing: RunTiming::default(),
        }
    }
}

impl Settings {
    /// Render the verbose `Arguments:` block.
    pub fn describe(&self) -> String {
        format!(
            "Arguments:\n  -v: {}\n  -d: {}\n  -b: {}\n  -r/t: {}\n  -s: {}",
            u8::from(self.verbose),
            self.device,
            self.baud_rate,
            self.mode.code(),
            u8::from(self.single_char),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.device.as_path(), Path::new("/dev/ttyUSB0"));
        assert_eq!(settings.baud_rate, 9600);
        assert_eq!(settings.mode, Mode::Unset);
        assert!(!settings.single_char);
        assert_eq!(settings.timing.poll_timeout, Duration::from_millis(200));
        assert_eq!(settings.timing.report_interval, 1000);
    }

    #[test]
    fn test_device_path_validation() {
        assert_eq!(DevicePath::new(""), Err(DevicePathError::Empty));
        assert_eq!(
            DevicePath::new("/dev/tty\0S0"),
            Err(DevicePathError::InteriorNul)
        );

        let long = format!("/dev/{}", "x".repeat(MAX_DEVICE_PATH_LEN));
        assert!(matches!(
            DevicePath::new(long),
            Err(DevicePathError::TooLong { .. })
        ));

        // Longer than the old 128 byte buffer, but still fine.
        let deep = format!("/dev/serial/by-id/{}", "usb-FTDI_".repeat(20));
        let path = DevicePath::new(deep.clone()).unwrap();
        assert_eq!(path.to_string(), deep);
    }

    #[test]
    fn test_describe_matches_argument_dump() {
        let settings = Settings {
            verbose: true,
            mode: Mode::Transmit,
            single_char: true,
            baud_rate: 115200,
            ..Settings::default()
        };
        assert_eq!(
            settings.describe(),
            "Arguments:\n  -v: 1\n  -d: /dev/ttyUSB0\n  -b: 115200\n  -r/t: 2\n  -s: 1"
        );
    }
}
