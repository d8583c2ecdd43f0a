//! Transmit and receive loops.
//!
//! The engine owns the channel for the length of a run and drives it one
//! byte per iteration: a bounded readiness wait, an exact one-byte transfer,
//! a counter bump, a pattern check (receive only), a pattern advance, and a
//! progress report on every `report_interval`-th byte.

use crate::pattern::{describe_byte, Pattern, PatternMode};
use crate::port::{ByteChannel, Interest};
use crate::settings::RunTiming;
use crate::transport::{self, TransportError};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, trace, warn};

/// Which way bytes flow in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Receive,
    Transmit,
}

impl Direction {
    /// Short label used in progress lines.
    pub fn label(self) -> &'static str {
        match self {
            Self::Receive => "rx",
            Self::Transmit => "tx",
        }
    }

    fn interest(self) -> Interest {
        match self {
            Self::Receive => Interest::Readable,
            Self::Transmit => Interest::Writable,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle of a [`PatternEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Running,
    Stopped,
}

/// Cooperative stop request shared with a signal handler.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Monotonic byte counter that flags every `interval`-th byte.
#[derive(Debug, Clone)]
pub struct ByteCounter {
    count: u64,
    interval: u64,
}

impl ByteCounter {
    /// `interval` of zero is treated as one.
    pub fn new(interval: u64) -> Self {
        Self {
            count: 0,
            interval: interval.max(1),
        }
    }

    /// Count one byte. Returns the new total when a report is due.
    pub fn record(&mut self) -> Option<u64> {
        self.count += 1;
        (self.count % self.interval == 0).then_some(self.count)
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

/// A received byte that differs from the expected pattern byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    /// 1-based position of the byte in the run.
    pub offset: u64,
    pub observed: u8,
    pub expected: u8,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Error - unexpected value: {}, should be: {}",
            describe_byte(self.observed),
            describe_byte(self.expected)
        )
    }
}

/// Cumulative progress at a report point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub direction: Direction,
    pub bytes: u64,
    pub elapsed: Duration,
}

impl Progress {
    /// Average throughput since the run started.
    pub fn bytes_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.bytes as f64 / secs
        } else {
            0.0
        }
    }
}

/// Receives reports from a running engine.
pub trait RunObserver {
    fn on_progress(&mut self, progress: &Progress);
    fn on_mismatch(&mut self, mismatch: &Mismatch);
}

impl<T: RunObserver + ?Sized> RunObserver for &mut T {
    fn on_progress(&mut self, progress: &Progress) {
        (**self).on_progress(progress)
    }

    fn on_mismatch(&mut self, mismatch: &Mismatch) {
        (**self).on_mismatch(mismatch)
    }
}

/// Observer that writes reports to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl RunObserver for LogObserver {
    fn on_progress(&mut self, progress: &Progress) {
        info!(
            bytes_per_sec = progress.bytes_per_sec().round(),
            "{}: {}",
            progress.direction,
            progress.bytes
        );
    }

    fn on_mismatch(&mut self, mismatch: &Mismatch) {
        warn!(offset = mismatch.offset, "{mismatch}");
    }
}

/// Observer that keeps every report, for tests and embedding.
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    pub progress: Vec<u64>,
    pub mismatches: Vec<Mismatch>,
}

impl RunObserver for RecordingObserver {
    fn on_progress(&mut self, progress: &Progress) {
        self.progress.push(progress.bytes);
    }

    fn on_mismatch(&mut self, mismatch: &Mismatch) {
        self.mismatches.push(*mismatch);
    }
}

/// Why a run ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A [`StopFlag`] was raised.
    Requested,
    /// The configured byte limit was reached.
    LimitReached,
}

/// Totals for a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub direction: Direction,
    pub bytes: u64,
    pub mismatches: u64,
    pub elapsed: Duration,
    pub stop_reason: StopReason,
}

/// A run that ended on a device error.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Error {} data ({source}) after {bytes} bytes. Exiting...", verb(.direction))]
    Io {
        direction: Direction,
        bytes: u64,
        #[source]
        source: TransportError,
    },
}

fn verb(direction: &Direction) -> &'static str {
    match *direction {
        Direction::Receive => "reading",
        Direction::Transmit => "writing",
    }
}

/// Drives the pattern protocol over a channel.
pub struct PatternEngine<C, O> {
    channel: C,
    pattern: Pattern,
    timing: RunTiming,
    observer: O,
    stop: StopFlag,
    limit: Option<u64>,
    state: EngineState,
}

impl<C: ByteChannel, O: RunObserver> PatternEngine<C, O> {
    pub fn new(channel: C, mode: PatternMode, timing: RunTiming, observer: O) -> Self {
        Self {
            channel,
            pattern: Pattern::new(mode),
            timing,
            observer,
            stop: StopFlag::new(),
            limit: None,
            state: EngineState::Idle,
        }
    }

    /// Stop at the top of the next iteration once `stop` is raised.
    pub fn with_stop_flag(mut self, stop: StopFlag) -> Self {
        self.stop = stop;
        self
    }

    /// Stop cleanly after `bytes` bytes.
    pub fn with_limit(mut self, bytes: u64) -> Self {
        self.limit = Some(bytes);
        self
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Release the channel, closing it if it owns a device.
    pub fn into_channel(self) -> C {
        self.channel
    }

    /// Read and check the pattern until stopped or a device error occurs.
    pub fn receive(&mut self) -> Result<RunSummary, EngineError> {
        self.run(Direction::Receive)
    }

    /// Send the pattern until stopped or a device error occurs.
    pub fn transmit(&mut self) -> Result<RunSummary, EngineError> {
        self.run(Direction::Transmit)
    }

    fn stop_reason(&self, bytes: u64) -> Option<StopReason> {
        if self.stop.is_stop_requested() {
            Some(StopReason::Requested)
        } else if self.limit.is_some_and(|limit| bytes >= limit) {
            Some(StopReason::LimitReached)
        } else {
            None
        }
    }

    fn run(&mut self, direction: Direction) -> Result<RunSummary, EngineError> {
        self.state = EngineState::Running;
        if direction == Direction::Receive {
            info!(device = self.channel.name(), "Waiting for data...");
        }

        let started = Instant::now();
        let mut counter = ByteCounter::new(self.timing.report_interval);
        let mut mismatches = 0u64;

        let outcome = loop {
            if let Some(reason) = self.stop_reason(counter.count()) {
                break Ok(reason);
            }

            match self
                .channel
                .wait_ready(direction.interest(), self.timing.poll_timeout)
            {
                Ok(true) => {}
                Ok(false) => trace!(%direction, "readiness wait timed out"),
                Err(e) => trace!(%direction, error = %e, "readiness wait failed"),
            }

            let mut byte = [self.pattern.current()];
            let transferred = match direction {
                Direction::Receive => transport::read_exact(&mut self.channel, &mut byte),
                Direction::Transmit => transport::write_exact(&mut self.channel, &byte),
            };
            if let Err(source) = transferred {
                break Err(EngineError::Io {
                    direction,
                    bytes: counter.count(),
                    source,
                });
            }

            let report = counter.record();

            if direction == Direction::Receive && byte[0] != self.pattern.current() {
                mismatches += 1;
                self.observer.on_mismatch(&Mismatch {
                    offset: counter.count(),
                    observed: byte[0],
                    expected: self.pattern.current(),
                });
            }

            self.pattern.advance();

            if let Some(bytes) = report {
                self.observer.on_progress(&Progress {
                    direction,
                    bytes,
                    elapsed: started.elapsed(),
                });
            }
        };

        self.state = EngineState::Stopped;
        let elapsed = started.elapsed();

        match outcome {
            Ok(stop_reason) => {
                info!(
                    %direction,
                    bytes = counter.count(),
                    mismatches,
                    elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                    ?stop_reason,
                    "Run finished"
                );
                Ok(RunSummary {
                    direction,
                    bytes: counter.count(),
                    mismatches,
                    elapsed,
                    stop_reason,
                })
            }
            Err(e) => Err(e),
        }
    }
}
