//! Running frame counters.

/// Monotonic counters, reset only by building a new
/// [`Monitor`](crate::monitor::Monitor).
///
/// `frames_seen == frames_accepted + decode_errors` holds after every pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Counters {
    /// Candidate frames handed to the validator.
    pub frames_seen: u64,
    /// Frames that passed validation and updated the target table.
    pub frames_accepted: u64,
    /// Frames dropped for a bad tail marker.
    pub decode_errors: u64,
    /// Raw bytes taken in from the source.
    pub bytes_received: u64,
    /// Bytes thrown away by intake overflow or resynchronization.
    pub bytes_discarded: u64,
}

impl Counters {
    pub(crate) fn record_received(&mut self, n: usize) {
        self.bytes_received += n as u64;
    }

    pub(crate) fn record_discarded(&mut self, n: usize) {
        self.bytes_discarded += n as u64;
    }

    pub(crate) fn record_accepted(&mut self) {
        self.frames_seen += 1;
        self.frames_accepted += 1;
    }

    pub(crate) fn record_decode_error(&mut self) {
        self.frames_seen += 1;
        self.decode_errors += 1;
    }

    /// Accepted / seen. `None` until the first frame.
    pub fn health_ratio(&self) -> Option<f64> {
        if self.frames_seen == 0 {
            return None;
        }
        Some(self.frames_accepted as f64 / self.frames_seen as f64)
    }
}
