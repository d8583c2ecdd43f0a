//! sertest library
//!
//! Serial link throughput and data-integrity testing. One process transmits a
//! one-byte-per-iteration pattern, another receives and checks it, each
//! counting bytes and reporting progress as it goes.
//!
//! # Modules
//!
//! - `port`: device open/configure, the `ByteChannel` trait, baud mapping
//! - `transport`: exact-length reads and writes that absorb `WouldBlock`
//! - `pattern`: the rotating `A..Z` and single `U` test patterns
//! - `engine`: transmit and receive loops with counters and reporting
//! - `settings`: immutable run settings
//! - `config`: TOML configuration with environment overrides
//! - `cli`: the getopt-style command line
//! - `logging`: tracing subscriber setup
//! - `error`: unified error handling

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod pattern;
pub mod port;
pub mod settings;
pub mod transport;

use engine::{LogObserver, PatternEngine, RunSummary, StopFlag};
use pattern::PatternMode;
use port::SerialDevice;
use settings::{Mode, Settings};
use tracing::debug;

// Re-export commonly used types for convenience
pub use engine::{Direction, EngineError, EngineState, RunObserver};
pub use error::{AppError, AppResult};
pub use port::{ByteChannel, PortError, ScriptedChannel};
pub use transport::{read_exact, write_exact, TransportError};

// Re-export config types
pub use config::{Config, ConfigError, ConfigLoader, ConfigResult};

/// Open the device named in `settings`, configure it for the selected mode,
/// and run the pattern loop until `stop` is raised or a device error ends it.
///
/// The device is owned by the engine and closed when this returns, whatever
/// the outcome.
pub fn run(settings: &Settings, stop: StopFlag) -> AppResult<RunSummary> {
    let direction = match settings.mode {
        Mode::Receive => Direction::Receive,
        Mode::Transmit => Direction::Transmit,
        Mode::Unset => return Err(AppError::NoMode),
    };

    let device = SerialDevice::open(&settings.device)?;
    device.set_blocking(direction == Direction::Receive)?;
    let device = device.configure(settings.baud_rate)?;

    if !port::baud::is_supported(settings.baud_rate) {
        debug!(
            requested = settings.baud_rate,
            using = port::baud::FALLBACK_BAUD,
            "Unsupported baud rate, falling back"
        );
    }

    let mut engine = PatternEngine::new(
        device,
        PatternMode::from_single_flag(settings.single_char),
        settings.timing,
        LogObserver,
    )
    .with_stop_flag(stop);

    let summary = match direction {
        Direction::Receive => engine.receive()?,
        Direction::Transmit => engine.transmit()?,
    };
    Ok(summary)
}
