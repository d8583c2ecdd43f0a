//! Unified application error type.
//!
//! Each layer keeps its own error enum; `AppError` gathers them at the entry
//! point so `main` can print one diagnostic and pick the exit status.

use crate::config::ConfigError;
use crate::engine::EngineError;
use crate::port::PortError;
use crate::settings::DevicePathError;
use std::process::ExitCode;
use thiserror::Error;

/// A specialized `Result` type for the entry point.
pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Bad or missing command-line arguments; usage text has been printed.
    #[error("{0}")]
    Usage(String),

    /// Neither `-r` nor `-t` was given.
    #[error("ERROR- you must select a mode with -r or -t")]
    NoMode,

    #[error("Invalid device path: {0}")]
    DevicePath(#[from] DevicePathError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Port(#[from] PortError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl AppError {
    /// Exit status reported to the shell. Every failure maps to `FAILURE`.
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::FAILURE
    }
}
