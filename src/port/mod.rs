//! Port abstraction layer for serial communication.
//!
//! Provides the `ByteChannel` trait, the termios-backed `SerialDevice`, and a
//! scripted in-memory channel for testing.

pub mod baud;
pub mod device;
pub mod error;
pub mod mock;
pub mod termios;
pub mod traits;

pub use device::SerialDevice;
pub use error::PortError;
pub use mock::ScriptedChannel;
pub use traits::*;
