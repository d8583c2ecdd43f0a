//! Scripted in-memory channel for testing.
//!
//! Provides a `ScriptedChannel` that simulates a serial line without
//! hardware. Reads come from an inbox queue, writes go to an outbox queue,
//! and one-shot faults (including transient `WouldBlock`) can be injected
//! ahead of either. Two channels can be cross-wired with
//! [`ScriptedChannel::pair`] to act as both ends of a cable.

use super::traits::{ByteChannel, Interest};
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

type Queue = Arc<Mutex<VecDeque<u8>>>;

/// Fault and call bookkeeping, shared between clones.
#[derive(Debug, Default)]
struct Script {
    read_faults: VecDeque<io::ErrorKind>,
    write_faults: VecDeque<io::ErrorKind>,
    read_calls: usize,
    write_calls: usize,
    wait_calls: usize,
    /// Return end-of-file instead of `WouldBlock` once the inbox is empty.
    eof_when_drained: bool,
}

/// In-memory serial line for tests.
///
/// Clones share state, so a test can keep one clone for inspection while the
/// other is moved into the code under test.
///
/// # Example
/// ```
/// use sertest::port::{ByteChannel, ScriptedChannel};
///
/// let (mut tx, mut rx) = ScriptedChannel::pair("tx", "rx");
/// tx.write_bytes(b"AB").unwrap();
///
/// let mut buffer = [0u8; 2];
/// assert_eq!(rx.read_bytes(&mut buffer).unwrap(), 2);
/// assert_eq!(&buffer, b"AB");
/// ```
#[derive(Clone)]
pub struct ScriptedChannel {
    name: String,
    inbox: Queue,
    outbox: Queue,
    script: Arc<Mutex<Script>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScriptedChannel {
    /// Create a standalone channel with empty queues.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inbox: Queue::default(),
            outbox: Queue::default(),
            script: Arc::default(),
        }
    }

    /// Create two channels where each one's writes arrive in the other's inbox.
    pub fn pair(a: impl Into<String>, b: impl Into<String>) -> (Self, Self) {
        let a_to_b = Queue::default();
        let b_to_a = Queue::default();
        let left = Self {
            name: a.into(),
            inbox: Arc::clone(&b_to_a),
            outbox: Arc::clone(&a_to_b),
            script: Arc::default(),
        };
        let right = Self {
            name: b.into(),
            inbox: a_to_b,
            outbox: b_to_a,
            script: Arc::default(),
        };
        (left, right)
    }

    /// Append bytes to be returned by subsequent reads.
    pub fn enqueue_read(&self, data: &[u8]) {
        lock(&self.inbox).extend(data);
    }

    /// Make the next read fail with `kind` before touching the inbox.
    pub fn inject_read_error(&self, kind: io::ErrorKind) {
        lock(&self.script).read_faults.push_back(kind);
    }

    /// Make the next write fail with `kind` before touching the outbox.
    pub fn inject_write_error(&self, kind: io::ErrorKind) {
        lock(&self.script).write_faults.push_back(kind);
    }

    /// Report end-of-file instead of `WouldBlock` once the inbox runs dry.
    pub fn set_eof_when_drained(&self, eof: bool) {
        lock(&self.script).eof_when_drained = eof;
    }

    /// Overwrite the byte at `index` of the pending inbox, if present.
    ///
    /// Returns `true` when a byte was replaced.
    pub fn corrupt_pending(&self, index: usize, byte: u8) -> bool {
        match lock(&self.inbox).get_mut(index) {
            Some(slot) => {
                *slot = byte;
                true
            }
            None => false,
        }
    }

    /// Snapshot of everything written and not yet consumed by a peer.
    pub fn written(&self) -> Vec<u8> {
        lock(&self.outbox).iter().copied().collect()
    }

    /// Number of bytes waiting to be read.
    pub fn available_bytes(&self) -> usize {
        lock(&self.inbox).len()
    }

    /// Number of `read_bytes` calls so far, including failed ones.
    pub fn read_calls(&self) -> usize {
        lock(&self.script).read_calls
    }

    /// Number of `write_bytes` calls so far, including failed ones.
    pub fn write_calls(&self) -> usize {
        lock(&self.script).write_calls
    }

    /// Number of `wait_ready` calls so far.
    pub fn wait_calls(&self) -> usize {
        lock(&self.script).wait_calls
    }
}

impl ByteChannel for ScriptedChannel {
    fn read_bytes(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        let eof = {
            let mut script = lock(&self.script);
            script.read_calls += 1;
            if let Some(kind) = script.read_faults.pop_front() {
                return Err(io::Error::new(kind, "injected read fault"));
            }
            script.eof_when_drained
        };

        let mut inbox = lock(&self.inbox);
        let mut n = 0;
        for slot in buffer.iter_mut() {
            match inbox.pop_front() {
                Some(byte) => {
                    *slot = byte;
                    n += 1;
                }
                None => break,
            }
        }

        if n == 0 && !buffer.is_empty() && !eof {
            Err(io::Error::new(io::ErrorKind::WouldBlock, "No data available"))
        } else {
            Ok(n)
        }
    }

    fn write_bytes(&mut self, data: &[u8]) -> io::Result<usize> {
        {
            let mut script = lock(&self.script);
            script.write_calls += 1;
            if let Some(kind) = script.write_faults.pop_front() {
                return Err(io::Error::new(kind, "injected write fault"));
            }
        }
        lock(&self.outbox).extend(data);
        Ok(data.len())
    }

    fn wait_ready(&mut self, interest: Interest, _timeout: Duration) -> io::Result<bool> {
        lock(&self.script).wait_calls += 1;
        Ok(match interest {
            Interest::Readable => !lock(&self.inbox).is_empty(),
            Interest::Writable => true,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for ScriptedChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedChannel")
            .field("name", &self.name)
            .field("available_bytes", &self.available_bytes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enqueue_and_read() {
        let mut port = ScriptedChannel::new("MOCK0");
        port.enqueue_read(b"Hello");

        let mut buffer = [0u8; 10];
        let n = port.read_bytes(&mut buffer).unwrap();
        assert_eq!(n, 5);
        assert_eq!(&buffer[..n], b"Hello");
        assert_eq!(port.read_calls(), 1);
    }

    #[test]
    fn test_empty_read_would_block() {
        let mut port = ScriptedChannel::new("MOCK0");
        let mut buffer = [0u8; 1];
        let err = port.read_bytes(&mut buffer).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WouldBlock);
    }

    #[test]
    fn test_empty_read_eof() {
        let mut port = ScriptedChannel::new("MOCK0");
        port.set_eof_when_drained(true);
        let mut buffer = [0u8; 1];
        assert_eq!(port.read_bytes(&mut buffer).unwrap(), 0);
    }

    #[test]
    fn test_faults_are_one_shot() {
        let mut port = ScriptedChannel::new("MOCK0");
        port.inject_write_error(io::ErrorKind::BrokenPipe);

        let err = port.write_bytes(b"A").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(port.write_bytes(b"A").unwrap(), 1);
        assert_eq!(port.written(), b"A");
        assert_eq!(port.write_calls(), 2);
    }

    #[test]
    fn test_pair_is_cross_wired() {
        let (mut left, mut right) = ScriptedChannel::pair("left", "right");
        left.write_bytes(b"ping").unwrap();
        right.write_bytes(b"pong").unwrap();

        assert_eq!(right.available_bytes(), 4);
        let mut buffer = [0u8; 4];
        right.read_bytes(&mut buffer).unwrap();
        assert_eq!(&buffer, b"ping");
        left.read_bytes(&mut buffer).unwrap();
        assert_eq!(&buffer, b"pong");
    }

    #[test]
    fn test_corrupt_pending() {
        let mut port = ScriptedChannel::new("MOCK0");
        port.enqueue_read(b"ABC");
        assert!(port.corrupt_pending(1, b'x'));
        assert!(!port.corrupt_pending(3, b'x'));

        let mut buffer = [0u8; 3];
        port.read_bytes(&mut buffer).unwrap();
        assert_eq!(&buffer, b"AxC");
    }

    #[test]
    fn test_wait_ready_reflects_inbox() {
        let mut port = ScriptedChannel::new("MOCK0");
        let timeout = Duration::from_millis(200);
        assert!(!port.wait_ready(Interest::Readable, timeout).unwrap());
        port.enqueue_read(b"U");
        assert!(port.wait_ready(Interest::Readable, timeout).unwrap());
        assert!(port.wait_ready(Interest::Writable, timeout).unwrap());
        assert_eq!(port.wait_calls(), 3);
    }
}
