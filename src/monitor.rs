//! Single owned state object for one radar stream.
//!
//! Ties intake, synchronization, validation, the target table, trails and
//! counters together. No I/O of its own: callers push bytes (or hand over a
//! [`ByteSource`]) and supply the current time.

use std::fmt;
use std::time::{Duration, Instant};

use log::{Level, debug, log_enabled, trace, warn};

use crate::config::MonitorConfig;
use crate::error::{ConfigError, SourceError, WireError, hex};
use crate::frame::{FRAME_LEN, Frame, FrameSync, SyncStep, TARGET_COUNT};
use crate::snapshot::{Snapshot, TargetView};
use crate::source::ByteSource;
use crate::target::{Target, TargetRecord, TargetTable};
use crate::telemetry::Counters;
use crate::trail::{TrailPoint, TrailRecorder};

/// Outcome of validating one candidate frame, passed to the frame hook.
#[derive(Debug)]
pub enum FrameEvent<'a> {
    Accepted(&'a [TargetRecord; TARGET_COUNT]),
    Rejected(&'a WireError),
}

/// What one synchronize/decode pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PassSummary {
    pub frames_accepted: usize,
    pub decode_errors: usize,
    /// Garbage bytes dropped while resynchronizing.
    pub bytes_skipped: usize,
}

impl PassSummary {
    pub fn frames_seen(&self) -> usize {
        self.frames_accepted + self.decode_errors
    }
}

/// What one [`Monitor::service`] cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cycle {
    pub bytes_read: usize,
    pub pass: PassSummary,
    /// Whether the trails were sampled.
    pub sampled: bool,
}

pub struct Monitor {
    sync: FrameSync,
    table: TargetTable,
    trails: TrailRecorder,
    counters: Counters,
    stale_after: Duration,
    read_buf: Vec<u8>,
    /// Called after each candidate frame is validated.
    on_frame: Option<Box<dyn FnMut(&FrameEvent<'_>) + Send>>,
}

impl fmt::Debug for Monitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Monitor")
            .field("buffered", &self.sync.buffered().len())
            .field("counters", &self.counters)
            .field("present", &self.table.present_count())
            .finish()
    }
}

impl Monitor {
    /// Build a monitor from a validated configuration.
    pub fn new(config: &MonitorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            sync: FrameSync::with_capacity(config.buffer_capacity, config.overflow)?,
            table: TargetTable::new(),
            trails: TrailRecorder::new(config.trail_capacity, config.sample_interval),
            counters: Counters::default(),
            stale_after: config.stale_after,
            read_buf: vec![0u8; config.buffer_capacity],
            on_frame: None,
        })
    }

    /// Register a callback invoked after every validated or rejected frame.
    pub fn set_on_frame(&mut self, f: impl FnMut(&FrameEvent<'_>) + Send + 'static) {
        self.on_frame = Some(Box::new(f));
    }

    /// Append raw bytes to the intake buffer. Returns how many bytes were
    /// discarded by overflow.
    pub fn ingest(&mut self, data: &[u8]) -> usize {
        self.counters.record_received(data.len());
        let dropped = self.sync.push(data);
        if dropped > 0 {
            self.counters.record_discarded(dropped);
            warn!("intake overflow: discarded {dropped} bytes");
        }
        dropped
    }

    /// Synchronize and decode until no further frame can be extracted.
    pub fn process(&mut self, now: Instant) -> PassSummary {
        let mut pass = PassSummary::default();
        loop {
            let step = self.sync.step();
            let skipped = step.skipped();
            if skipped > 0 {
                pass.bytes_skipped += skipped;
                self.counters.record_discarded(skipped);
                debug!("resync: skipped {skipped} bytes");
            }
            match step {
                SyncStep::Frame { bytes, .. } => {
                    if self.validate(&bytes, now) {
                        pass.frames_accepted += 1;
                    } else {
                        pass.decode_errors += 1;
                    }
                }
                SyncStep::Partial { .. } | SyncStep::Resync { .. } | SyncStep::Starved => break,
            }
        }
        pass
    }

    /// Sample the trails if their cadence has elapsed.
    pub fn sample(&mut self, now: Instant) -> bool {
        self.trails.poll(&self.table, now)
    }

    /// One cooperative cycle: take in what `source` has available right now,
    /// decode to exhaustion, then sample the trails if due.
    ///
    /// Never blocks: a source reporting nothing available is not read. Only
    /// the bytes available at the start of the cycle are consumed, in chunks
    /// that fit the intake buffer.
    pub fn service<S: ByteSource + ?Sized>(
        &mut self,
        source: &mut S,
        now: Instant,
    ) -> Result<Cycle, SourceError> {
        let mut budget = source.available()?;
        // Flush anything pushed through `ingest` since the last pass.
        let mut cycle = Cycle {
            pass: self.process(now),
            ..Cycle::default()
        };

        while budget > 0 {
            let room = self.sync.buffer().remaining().min(budget);
            let n = source.read(&mut self.read_buf[..room])?;
            if n == 0 {
                break;
            }
            budget -= n;
            cycle.bytes_read += n;
            self.counters.record_received(n);
            // `room` never exceeds free space, so nothing overflows here.
            self.sync.push(&self.read_buf[..n]);

            let pass = self.process(now);
            cycle.pass.frames_accepted += pass.frames_accepted;
            cycle.pass.decode_errors += pass.decode_errors;
            cycle.pass.bytes_skipped += pass.bytes_skipped;
        }

        cycle.sampled = self.sample(now);
        Ok(cycle)
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    /// Copy of the three target slots.
    pub fn targets(&self) -> [Target; TARGET_COUNT] {
        self.table.snapshot()
    }

    pub fn table(&self) -> &TargetTable {
        &self.table
    }

    /// Ordered trail of one slot, oldest first.
    pub fn trail(&self, slot: usize) -> Vec<TrailPoint> {
        self.trails.trail(slot)
    }

    pub fn trails(&self) -> &TrailRecorder {
        &self.trails
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    /// Bytes currently waiting in the intake buffer.
    pub fn buffered(&self) -> usize {
        self.sync.buffered().len()
    }

    pub fn buffer_capacity(&self) -> usize {
        self.sync.buffer().capacity()
    }

    /// Everything a renderer needs, copied at `now`.
    pub fn snapshot(&self, now: Instant) -> Snapshot {
        let targets = self.table.snapshot();
        Snapshot {
            targets: std::array::from_fn(|slot| {
                TargetView::new(slot, &targets[slot], now, self.stale_after)
            }),
            trails: self.trails.trails(),
            counters: self.counters,
            health: self.counters.health_ratio(),
        }
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn validate(&mut self, bytes: &[u8; FRAME_LEN], now: Instant) -> bool {
        match Frame::parse(bytes) {
            Ok(frame) => {
                let records = frame.records();
                self.table.apply(&records, now);
                self.counters.record_accepted();
                if log_enabled!(Level::Trace) {
                    trace!(
                        "frame accepted ({} present): {}",
                        self.table.present_count(),
                        hex(bytes)
                    );
                }
                if let Some(cb) = self.on_frame.as_mut() {
                    cb(&FrameEvent::Accepted(&records));
                }
                true
            }
            Err(e) => {
                self.counters.record_decode_error();
                warn!("dropping frame: {e}");
                if let Some(cb) = self.on_frame.as_mut() {
                    cb(&FrameEvent::Rejected(&e));
                }
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
