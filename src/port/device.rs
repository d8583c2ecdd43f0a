//! The serial device handle.
//!
//! `SerialDevice` owns the only descriptor for the device. It is not `Clone`,
//! and dropping it closes the descriptor, so every exit path releases the
//! line.

use super::error::PortError;
use super::termios;
use super::traits::{ByteChannel, Interest};
use crate::settings::DevicePath;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::fd::{AsRawFd, RawFd};
use std::os::unix::fs::OpenOptionsExt;
use std::time::Duration;
use tracing::{debug, trace};

/// An open, exclusively owned serial device.
pub struct SerialDevice {
    file: File,
    name: String,
}

impl SerialDevice {
    /// Open the device read-write, non-blocking and without becoming its
    /// controlling terminal.
    ///
    /// Descriptor 0 is a valid result here; only a failed `open(2)` counts as
    /// an error. Once open, the descriptor is put back into blocking mode;
    /// callers pick the final mode with [`SerialDevice::set_blocking`].
    ///
    /// # Example
    /// ```no_run
    /// use sertest::port::SerialDevice;
    /// use sertest::settings::DevicePath;
    ///
    /// let path = DevicePath::new("/dev/ttyUSB0")?;
    /// let device = SerialDevice::open(&path)?.configure(115200)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(path: &DevicePath) -> Result<Self, PortError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY | libc::O_NONBLOCK)
            .open(path.as_path())
            .map_err(|e| PortError::open_failed(path.as_path(), e))?;

        debug!(fd = file.as_raw_fd(), device = %path, "Got file descriptor");

        let device = Self {
            file,
            name: path.to_string(),
        };
        device.set_blocking(true)?;
        Ok(device)
    }

    /// Switch the descriptor between blocking and non-blocking I/O.
    pub fn set_blocking(&self, blocking: bool) -> Result<(), PortError> {
        let fd = self.file.as_raw_fd();
        // SAFETY: fd is owned by self.file and stays open for this call.
        let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
        if flags < 0 {
            return Err(PortError::BlockingMode {
                source: io::Error::last_os_error(),
            });
        }

        let flags = if blocking {
            flags & !libc::O_NONBLOCK
        } else {
            flags | libc::O_NONBLOCK
        };

        // SAFETY: as above.
        if unsafe { libc::fcntl(fd, libc::F_SETFL, flags) } < 0 {
            return Err(PortError::BlockingMode {
                source: io::Error::last_os_error(),
            });
        }

        trace!(device = %self.name, blocking, "Set blocking mode");
        Ok(())
    }

    /// Apply the raw 8N1 line discipline at `baud_rate`.
    ///
    /// Pending input is flushed before the new attributes take effect. On
    /// failure the device is dropped, closing the descriptor, before the
    /// error is returned.
    pub fn configure(self, baud_rate: i64) -> Result<Self, PortError> {
        let fd = self.file.as_raw_fd();

        // SAFETY: termios is plain old data; all-zero is a valid value.
        let mut attrs: libc::termios = unsafe { std::mem::zeroed() };
        // SAFETY: fd is open and attrs is a valid out-pointer.
        if unsafe { libc::tcgetattr(fd, &mut attrs) } != 0 {
            return Err(self.close_with(io::Error::last_os_error()));
        }

        termios::apply_raw_line_discipline(&mut attrs, baud_rate);

        // SAFETY: fd is open.
        unsafe { libc::tcflush(fd, libc::TCIFLUSH) };

        // SAFETY: fd is open and attrs is fully initialised.
        if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &attrs) } != 0 {
            return Err(self.close_with(io::Error::last_os_error()));
        }

        debug!(
            device = %self.name,
            baud = crate::port::baud::effective_baud(baud_rate),
            "Configured serial device for 8n1 and no flow control"
        );
        Ok(self)
    }

    fn close_with(self, source: io::Error) -> PortError {
        let path = self.name.clone();
        debug!(device = %path, "Closing device after failed configuration");
        drop(self);
        PortError::configure_failed(path, source)
    }
}

impl ByteChannel for SerialDevice {
    fn read_bytes(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        self.file.read(buffer)
    }

    fn write_bytes(&mut self, data: &[u8]) -> io::Result<usize> {
        self.file.write(data)
    }

    fn wait_ready(&mut self, interest: Interest, timeout: Duration) -> io::Result<bool> {
        poll_fd(self.file.as_raw_fd(), interest, timeout)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl AsRawFd for SerialDevice {
    fn as_raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }
}

impl std::fmt::Debug for SerialDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialDevice")
            .field("name", &self.name)
            .field("fd", &self.file.as_raw_fd())
            .finish()
    }
}

/// Wait up to `timeout` for `fd` to become ready. `Ok(false)` means timeout.
pub(crate) fn poll_fd(fd: RawFd, interest: Interest, timeout: Duration) -> io::Result<bool> {
    let events = match interest {
        Interest::Readable => libc::POLLIN,
        Interest::Writable => libc::POLLOUT,
    };
    let mut pfd = libc::pollfd {
        fd,
        events,
        revents: 0,
    };
    let timeout_ms = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX);

    // SAFETY: pfd is a single valid pollfd and nfds is 1.
    let ret = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
    if ret < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(ret > 0)
}
