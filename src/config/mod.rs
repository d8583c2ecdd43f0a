//! Configuration module for sertest.
//!
//! Supplies defaults for the command-line flags plus loop and logging knobs
//! that have no flag of their own.
//!
//! # Configuration Resolution
//!
//! 1. `SERTEST_CONFIG` environment variable (explicit path)
//! 2. `./sertest.toml` (current directory)
//! 3. `<platform config dir>/sertest/config.toml`
//! 4. Built-in defaults (no file required)
//!
//! # Environment Overrides
//!
//! `SERTEST_<SECTION>_<KEY>`, for example:
//! - `SERTEST_SERIAL_DEVICE=/dev/ttyS0`
//! - `SERTEST_SERIAL_BAUD=115200`
//! - `SERTEST_RUN_POLL_TIMEOUT_MS=200`
//! - `SERTEST_RUN_REPORT_INTERVAL=1000`
//! - `SERTEST_LOGGING_LEVEL=debug`
//!
//! Command-line flags win over both.
//!
//! # Example
//!
//! ```rust,no_run
//! use sertest::config::ConfigLoader;
//!
//! let config = ConfigLoader::load()?.into_config();
//! println!("Default device: {}", config.serial.device);
//! # Ok::<(), sertest::config::ConfigError>(())
//! ```

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    get_default_config_dir, get_default_config_path, resolve_config_path, ConfigLoader,
};
pub use schema::{Config, LogFormat, LoggingConfig, RunConfig, SerialConfig};
