//! Core traits for serial byte I/O.
//!
//! Defines the `ByteChannel` trait so the real device, scripted test doubles,
//! and mocks can all drive the transport and pattern engine interchangeably.

use std::io;
use std::time::Duration;

/// Which kind of readiness to wait for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interest {
    /// Data is available to read.
    Readable,
    /// The device can accept more output.
    Writable,
}

/// Trait for raw, unbuffered byte I/O on a serial line.
///
/// Implementations return `io::ErrorKind::WouldBlock` when the descriptor is
/// non-blocking and no progress is possible right now; the transport layer
/// treats that as transient and everything else as fatal.
#[cfg_attr(test, mockall::automock)]
pub trait ByteChannel: Send {
    /// Read up to `buffer.len()` bytes. Returns the number of bytes read.
    fn read_bytes(&mut self, buffer: &mut [u8]) -> io::Result<usize>;

    /// Write up to `data.len()` bytes. Returns the number of bytes written.
    fn write_bytes(&mut self, data: &[u8]) -> io::Result<usize>;

    /// Block for at most `timeout` until the channel is ready for `interest`.
    ///
    /// Returns `Ok(true)` if ready, `Ok(false)` on timeout.
    fn wait_ready(&mut self, interest: Interest, timeout: Duration) -> io::Result<bool>;

    /// Human readable name of the channel, usually the device path.
    fn name(&self) -> &str;
}

impl<T: ByteChannel + ?Sized> ByteChannel for &mut T {
    fn read_bytes(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        (**self).read_bytes(buffer)
    }

    fn write_bytes(&mut self, data: &[u8]) -> io::Result<usize> {
        (**self).write_bytes(data)
    }

    fn wait_ready(&mut self, interest: Interest, timeout: Duration) -> io::Result<bool> {
        (**self).wait_ready(interest, timeout)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<T: ByteChannel + ?Sized> ByteChannel for Box<T> {
    fn read_bytes(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        (**self).read_bytes(buffer)
    }

    fn write_bytes(&mut self, data: &[u8]) -> io::Result<usize> {
        (**self).write_bytes(data)
    }

    fn wait_ready(&mut self, interest: Interest, timeout: Duration) -> io::Result<bool> {
        (**self).wait_ready(interest, timeout)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
