//! Shared test utilities for sertest integration tests.
//!
//! This module provides:
//! - A pseudo-terminal pair whose slave side is opened through `SerialDevice`
//! - A `ByteChannel` adapter for the pty master
//! - Small builders for run settings

#![allow(dead_code)]

use sertest::port::{ByteChannel, Interest, SerialDevice};
use sertest::settings::{DevicePath, RunTiming};
use serialport::{SerialPort, TTYPort};
use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

/// Fast pacing so tests never sit in a readiness wait for long.
pub fn fast_timing(report_interval: u64) -> RunTiming {
    RunTiming {
        poll_timeout: Duration::from_millis(20),
        report_interval,
    }
}

/// The controlling side of a pseudo-terminal, usable as a `ByteChannel`.
///
/// Read timeouts are reported as `WouldBlock` so the transport retries them,
/// until `give_up_after` passes with no progress; then the read fails for
/// real so a broken test cannot hang.
pub struct PtyMaster {
    port: TTYPort,
    name: String,
    give_up_after: Duration,
    idle_since: Option<Instant>,
}

impl PtyMaster {
    /// Write raw bytes straight into the slave's input queue.
    pub fn inject(&mut self, data: &[u8]) {
        self.port.write_all(data).expect("write to pty master");
        self.port.flush().expect("flush pty master");
    }

    /// Read exactly `n` bytes that the slave side wrote.
    pub fn collect(&mut self, n: usize) -> Vec<u8> {
        let mut out = vec![0u8; n];
        sertest::read_exact(self, &mut out).expect("read from pty master");
        out
    }

    fn on_timeout(&mut self) -> io::Error {
        let since = *self.idle_since.get_or_insert_with(Instant::now);
        if since.elapsed() > self.give_up_after {
            io::Error::new(io::ErrorKind::TimedOut, "pty master starved")
        } else {
            io::Error::from(io::ErrorKind::WouldBlock)
        }
    }
}

impl ByteChannel for PtyMaster {
    fn read_bytes(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        match self.port.read(buffer) {
            Ok(n) => {
                self.idle_since = None;
                Ok(n)
            }
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Err(self.on_timeout()),
            Err(e) => Err(e),
        }
    }

    fn write_bytes(&mut self, data: &[u8]) -> io::Result<usize> {
        match self.port.write(data) {
            Ok(n) => {
                self.idle_since = None;
                Ok(n)
            }
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Err(self.on_timeout()),
            Err(e) => Err(e),
        }
    }

    fn wait_ready(&mut self, _interest: Interest, _timeout: Duration) -> io::Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A pty master plus the path of its slave, with no slave descriptor open.
pub struct PtyLoopback {
    pub master: PtyMaster,
    pub slave_path: DevicePath,
}

impl PtyLoopback {
    pub fn new() -> Self {
        let (mut master, slave) = TTYPort::pair().expect("create pty pair");
        let slave_name = slave.name().expect("pty slave has a name");
        drop(slave);

        master
            .set_timeout(Duration::from_millis(50))
            .expect("set master timeout");

        Self {
            master: PtyMaster {
                port: master,
                name: "pty-master".to_string(),
                give_up_after: Duration::from_secs(5),
                idle_since: None,
            },
            slave_path: DevicePath::new(slave_name).expect("valid slave path"),
        }
    }

    /// Open and configure the slave the same way the tool does.
    pub fn open_slave(&self, blocking: bool, baud: i64) -> SerialDevice {
        let device = SerialDevice::open(&self.slave_path).expect("open pty slave");
        device.set_blocking(blocking).expect("set blocking mode");
        device.configure(baud).expect("configure pty slave")
    }
}

/// The rotating pattern as it should appear on the wire.
pub fn rotation(len: usize) -> Vec<u8> {
    (0..len).map(|i| b'A' + (i % 26) as u8).collect()
}
