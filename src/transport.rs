//! Exact-length reads and writes over a possibly non-blocking channel.
//!
//! `WouldBlock` is absorbed here by retrying, so callers only ever see
//! complete transfers or genuine device errors.

use crate::port::ByteChannel;
use std::io;
use thiserror::Error;
use tracing::trace;

/// Errors surfaced by [`read_exact`] and [`write_exact`].
#[derive(Debug, Error)]
pub enum TransportError {
    /// The device reported a non-transient error.
    #[error("{0}")]
    Io(#[from] io::Error),

    /// The device returned zero bytes, which means the other side is gone.
    #[error("device closed after {transferred} of {requested} bytes")]
    Closed { transferred: usize, requested: usize },
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

fn is_transient(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
}

/// Fill `buffer` completely from `channel`.
///
/// Returns `buffer.len()` on success. A partially filled buffer is never
/// reported as success.
pub fn read_exact<C>(channel: &mut C, buffer: &mut [u8]) -> TransportResult<usize>
where
    C: ByteChannel + ?Sized,
{
    let mut filled = 0;
    let mut retries = 0u64;

    while filled < buffer.len() {
        match channel.read_bytes(&mut buffer[filled..]) {
            Ok(0) => {
                return Err(TransportError::Closed {
                    transferred: filled,
                    requested: buffer.len(),
                })
            }
            Ok(n) => filled += n,
            Err(e) if is_transient(&e) => retries += 1,
            Err(e) => return Err(TransportError::Io(e)),
        }
    }

    if retries > 0 {
        trace!(retries, "read completed after retries");
    }
    Ok(filled)
}

/// Write all of `data` to `channel`.
///
/// Returns `data.len()` on success.
pub fn write_exact<C>(channel: &mut C, data: &[u8]) -> TransportResult<usize>
where
    C: ByteChannel + ?Sized,
{
    let mut written = 0;
    let mut retries = 0u64;

    while written < data.len() {
        match channel.write_bytes(&data[written..]) {
            Ok(0) => {
                return Err(TransportError::Closed {
                    transferred: written,
                    requested: data.len(),
                })
            }
            Ok(n) => written += n,
            Err(e) if is_transient(&e) => retries += 1,
            Err(e) => return Err(TransportError::Io(e)),
        }
    }

    if retries > 0 {
        trace!(retries, "write completed after retries");
    }
    Ok(written)
}
