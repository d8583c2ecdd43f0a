//! Port-specific error types.
//!
//! Covers opening and configuring the serial device. Byte-level I/O failures
//! live in [`crate::transport::TransportError`].

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while bringing a serial device up.
#[derive(Debug, Error)]
pub enum PortError {
    /// The device path could not be opened for read-write access.
    #[error("Open device failed: Unable to open device file {}. Error: {source}", .path.display())]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The line discipline could not be read or applied.
    ///
    /// The device has already been closed when this is returned.
    #[error("Create failed: Unable to set options on device {}. Error: {source}", .path.display())]
    ConfigureFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Switching between blocking and non-blocking I/O failed.
    #[error("Unable to change blocking mode: {source}")]
    BlockingMode {
        #[source]
        source: std::io::Error,
    },
}

impl PortError {
    /// Create an OpenFailed error for a path.
    pub fn open_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::OpenFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a ConfigureFailed error for a path.
    pub fn configure_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ConfigureFailed {
            path: path.into(),
            source,
        }
    }
}
