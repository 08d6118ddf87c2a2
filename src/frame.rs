//! Frame validation, encoding, and stream synchronization.
//!
//! Wire format (30 bytes):
//! ```text
//! AA FF 03 00 | T0[8] | T1[8] | T2[8] | 55 CC
//! ```
//! Each target sub-record is `X_LO X_HI Y_LO Y_HI V_LO V_HI RES RES`.

use crate::buffer::{IntakeBuffer, OverflowPolicy};
use crate::codec;
use crate::error::{ConfigError, Result, WireError};
use crate::target::TargetRecord;

pub const HEADER: [u8; 4] = [0xAA, 0xFF, 0x03, 0x00];
pub const TAIL: [u8; 2] = [0x55, 0xCC];

/// Total frame length on the wire.
pub const FRAME_LEN: usize = 30;

/// Number of target slots per frame.
pub const TARGET_COUNT: usize = 3;

/// Length of one target sub-record.
pub const RECORD_LEN: usize = 8;

/// Byte offsets of the target sub-records.
pub const RECORD_OFFSETS: [usize; TARGET_COUNT] = [4, 12, 20];

const TAIL_OFFSET: usize = FRAME_LEN - TAIL.len();

/// One validated 30-byte frame. Header and tail are known good.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame([u8; FRAME_LEN]);

impl Frame {
    /// Validate a wire frame. Only the first [`FRAME_LEN`] bytes are examined.
    pub fn parse(wire: &[u8]) -> Result<Self> {
        if wire.len() < FRAME_LEN {
            return Err(WireError::FrameTooShort { len: wire.len() });
        }
        if wire[..HEADER.len()] != HEADER {
            return Err(WireError::MissingHeader {
                got: [wire[0], wire[1], wire[2], wire[3]],
            });
        }
        let tail = [wire[TAIL_OFFSET], wire[TAIL_OFFSET + 1]];
        if tail != TAIL {
            return Err(WireError::TailMismatch {
                got: tail,
                raw: wire[..FRAME_LEN].to_vec(),
            });
        }

        let mut bytes = [0u8; FRAME_LEN];
        bytes.copy_from_slice(&wire[..FRAME_LEN]);
        Ok(Frame(bytes))
    }

    /// Build a wire frame carrying the given raw target records.
    ///
    /// The two reserved bytes of each sub-record are zero.
    pub fn encode(records: &[TargetRecord; TARGET_COUNT]) -> Self {
        let mut bytes = [0u8; FRAME_LEN];
        bytes[..HEADER.len()].copy_from_slice(&HEADER);
        for (record, &base) in records.iter().zip(RECORD_OFFSETS.iter()) {
            codec::write_u16_le(&mut bytes, base, record.x_raw);
            codec::write_u16_le(&mut bytes, base + 2, record.y_raw);
            codec::write_u16_le(&mut bytes, base + 4, record.v_raw);
        }
        bytes[TAIL_OFFSET..].copy_from_slice(&TAIL);
        Frame(bytes)
    }

    /// The three raw target sub-records, slot order.
    pub fn records(&self) -> [TargetRecord; TARGET_COUNT] {
        std::array::from_fn(|slot| {
            let base = RECORD_OFFSETS[slot];
            TargetRecord::from_record(&std::array::from_fn(|i| self.0[base + i]))
        })
    }

    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Synchronizer
// ---------------------------------------------------------------------------

/// Result of one synchronization step over the intake buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStep {
    /// A complete candidate frame (header matched, tail unchecked).
    /// `skipped` garbage bytes preceding it were discarded.
    Frame { bytes: [u8; FRAME_LEN], skipped: usize },
    /// Header located but the frame is not complete yet. Bytes before the
    /// header were discarded.
    Partial { skipped: usize },
    /// No header anywhere. Only the last `FRAME_LEN - 1` bytes were kept.
    Resync { skipped: usize },
    /// Fewer than [`FRAME_LEN`] bytes buffered; nothing done.
    Starved,
}

impl SyncStep {
    /// Garbage bytes discarded by this step.
    pub fn skipped(&self) -> usize {
        match *self {
            SyncStep::Frame { skipped, .. }
            | SyncStep::Partial { skipped }
            | SyncStep::Resync { skipped } => skipped,
            SyncStep::Starved => 0,
        }
    }
}

/// Locates frames in a byte stream. Buffers partial data across calls, so it
/// can be fed arbitrary UART read boundaries.
#[derive(Debug, Clone, Default)]
pub struct FrameSync {
    buf: IntakeBuffer,
}

impl FrameSync {
    pub fn new() -> Self {
        Self {
            buf: IntakeBuffer::new(),
        }
    }

    pub fn with_capacity(
        capacity: usize,
        policy: OverflowPolicy,
    ) -> std::result::Result<Self, ConfigError> {
        Ok(Self {
            buf: IntakeBuffer::with_capacity(capacity, policy)?,
        })
    }

    /// Append raw bytes. Returns how many bytes overflow discarded.
    pub fn push(&mut self, data: &[u8]) -> usize {
        self.buf.append(data)
    }

    /// Run one scan over the buffered bytes.
    pub fn step(&mut self) -> SyncStep {
        let len = self.buf.len();
        if len < FRAME_LEN {
            return SyncStep::Starved;
        }

        let window = self.buf.as_slice();
        let Some(h) = window.windows(HEADER.len()).position(|w| w == HEADER) else {
            // Keep a tail long enough for a header split across reads.
            let skipped = len - (FRAME_LEN - 1);
            self.buf.consume_prefix(skipped);
            return SyncStep::Resync { skipped };
        };

        if h + FRAME_LEN > len {
            self.buf.consume_prefix(h);
            return SyncStep::Partial { skipped: h };
        }

        let mut bytes = [0u8; FRAME_LEN];
        bytes.copy_from_slice(&window[h..h + FRAME_LEN]);
        self.buf.consume_prefix(h + FRAME_LEN);
        SyncStep::Frame { bytes, skipped: h }
    }

    /// Next complete candidate frame, or `None` once the buffer cannot yield
    /// another one without more input.
    pub fn next_frame(&mut self) -> Option<[u8; FRAME_LEN]> {
        match self.step() {
            SyncStep::Frame { bytes, .. } => Some(bytes),
            _ => None,
        }
    }

    /// Feed new data and extract every complete candidate frame, in stream
    /// order.
    pub fn feed(&mut self, data: &[u8]) -> Vec<[u8; FRAME_LEN]> {
        self.push(data);
        std::iter::from_fn(|| self.next_frame()).collect()
    }

    pub fn buffered(&self) -> &[u8] {
        self.buf.as_slice()
    }

    pub fn buffer(&self) -> &IntakeBuffer {
        &self.buf
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn record(x_raw: u16, y_raw: u16, v_raw: u16) -> TargetRecord {
        TargetRecord { x_raw, y_raw, v_raw }
    }

    fn sample_frame() -> Frame {
        Frame::encode(&[
            record(0x0123, 0x85DC, 0x0010),
            record(0, 0, 0),
            record(0x8200, 0x8100, 0x8005),
        ])
    }

    #[test]
    fn encode_layout() {
        let frame = sample_frame();
        let bytes = frame.as_bytes();
        assert_eq!(&bytes[..4], &HEADER);
        assert_eq!(&bytes[4..12], &[0x23, 0x01, 0xDC, 0x85, 0x10, 0x00, 0x00, 0x00]);
        assert_eq!(&bytes[12..20], &[0; 8]);
        assert_eq!(&bytes[20..26], &[0x00, 0x82, 0x00, 0x81, 0x05, 0x80]);
        assert_eq!(&bytes[28..], &TAIL);
    }

    #[test]
    fn parse_reads_records_in_slot_order() {
        let frame = Frame::parse(sample_frame().as_bytes()).unwrap();
        let records = frame.records();
        assert_eq!(records[0], record(0x0123, 0x85DC, 0x0010));
        assert_eq!(records[1], record(0, 0, 0));
        assert_eq!(records[2], record(0x8200, 0x8100, 0x8005));
    }

    #[test]
    fn reserved_bytes_ignored() {
        let mut wire = *sample_frame().as_bytes();
        wire[10] = 0x7E;
        wire[11] = 0x7F;
        let frame = Frame::parse(&wire).unwrap();
        assert_eq!(frame.records()[0], record(0x0123, 0x85DC, 0x0010));
    }

    #[test]
    fn bad_tail() {
        let mut wire = *sample_frame().as_bytes();
        wire[29] = 0x00;
        assert!(matches!(
            Frame::parse(&wire),
            Err(WireError::TailMismatch { got: [0x55, 0x00], .. })
        ));
    }

    #[test]
    fn bad_header() {
        let mut wire = *sample_frame().as_bytes();
        wire[2] = 0x04;
        assert!(matches!(
            Frame::parse(&wire),
            Err(WireError::MissingHeader { .. })
        ));
    }

    #[test]
    fn too_short() {
        assert!(matches!(
            Frame::parse(&HEADER),
            Err(WireError::FrameTooShort { len: 4 })
        ));
    }

    #[test]
    fn sync_basic() {
        let mut sync = FrameSync::new();
        let wire = *sample_frame().as_bytes();
        let frames = sync.feed(&wire);
        assert_eq!(frames, vec![wire]);
        assert!(sync.buffered().is_empty());
    }

    #[test]
    fn sync_starved_below_frame_len() {
        let mut sync = FrameSync::new();
        sync.push(&[0x11; 29]);
        assert_eq!(sync.step(), SyncStep::Starved);
        assert_eq!(sync.buffered().len(), 29);
    }

    #[test]
    fn sync_split_across_pushes() {
        let mut sync = FrameSync::new();
        let wire = *sample_frame().as_bytes();
        assert!(sync.feed(&wire[..15]).is_empty());
        assert_eq!(sync.feed(&wire[15..]), vec![wire]);
    }

    #[test]
    fn sync_header_split_across_pushes() {
        let mut sync = FrameSync::new();
        let wire = *sample_frame().as_bytes();
        let mut first = vec![0x42; 28];
        first.extend_from_slice(&wire[..2]);
        assert!(sync.feed(&first).is_empty());
        assert_eq!(sync.feed(&wire[2..]), vec![wire]);
    }

    #[test]
    fn sync_multiple_back_to_back() {
        let mut sync = FrameSync::new();
        let a = *sample_frame().as_bytes();
        let b = *Frame::encode(&[record(1, 2, 3); 3]).as_bytes();
        let mut data = a.to_vec();
        data.extend_from_slice(&b);
        data.extend_from_slice(&a);
        assert_eq!(sync.feed(&data), vec![a, b, a]);
    }

    #[test]
    fn sync_garbage_prefix() {
        let mut sync = FrameSync::new();
        let wire = *sample_frame().as_bytes();
        let mut data = vec![0x00, 0xFF, 0x42, 0xAA, 0xFF];
        data.extend_from_slice(&wire);
        sync.push(&data);
        assert_eq!(
            sync.step(),
            SyncStep::Frame { bytes: wire, skipped: 5 }
        );
    }

    #[test]
    fn sync_partial_keeps_header() {
        let mut sync = FrameSync::new();
        let wire = *sample_frame().as_bytes();
        let mut data = vec![0x01; 10];
        data.extend_from_slice(&wire[..25]);
        sync.push(&data);
        assert_eq!(sync.step(), SyncStep::Partial { skipped: 10 });
        assert_eq!(sync.buffered(), &wire[..25]);

        sync.push(&wire[25..]);
        assert_eq!(sync.next_frame(), Some(wire));
    }

    #[test]
    fn sync_resync_keeps_29_bytes() {
        let mut sync = FrameSync::new();
        let data: Vec<u8> = (0..50).collect();
        sync.push(&data);
        assert_eq!(sync.step(), SyncStep::Resync { skipped: 21 });
        assert_eq!(sync.buffered(), &data[21..]);
        assert_eq!(sync.step(), SyncStep::Starved);
    }

    #[test]
    fn sync_passes_bad_tail_through() {
        // The synchronizer only frames; tail validation happens downstream.
        let mut sync = FrameSync::new();
        let mut wire = *sample_frame().as_bytes();
        wire[28] = 0x00;
        assert_eq!(sync.feed(&wire), vec![wire]);
    }
}
