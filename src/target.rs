//! Decoded target records and the three-slot target table.
//!
//! An absent slot (all three raw fields zero) is stored as `x = y = v = 0`
//! with `present == false`, not as the field decode of zero (which would put
//! `y` at -32768). Renderers can draw absent slots at the origin.

use std::time::{Duration, Instant};

use crate::codec;
use crate::frame::{RECORD_LEN, TARGET_COUNT};

/// Raw fields of one 8-byte target sub-record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TargetRecord {
    pub x_raw: u16,
    pub y_raw: u16,
    pub v_raw: u16,
}

impl TargetRecord {
    /// Read a record from a sub-record array. Bytes 6-7 are reserved.
    pub fn from_record(record: &[u8; RECORD_LEN]) -> Self {
        Self {
            x_raw: codec::read_u16_le(record, 0),
            y_raw: codec::read_u16_le(record, 2),
            v_raw: codec::read_u16_le(record, 4),
        }
    }

    /// Raw record for a target at the given position and velocity.
    pub fn from_values(x: i32, y: i32, v: i32) -> Self {
        Self {
            x_raw: codec::encode_x(x),
            y_raw: codec::encode_y(y),
            v_raw: codec::encode_v(v),
        }
    }

    /// An all-zero record, which the sensor sends for an empty slot.
    pub fn absent() -> Self {
        Self::default()
    }

    /// False only when all three raw fields are zero.
    pub fn present(&self) -> bool {
        !(self.x_raw == 0 && self.y_raw == 0 && self.v_raw == 0)
    }

    /// Lateral distance (mm).
    pub fn x(&self) -> i32 {
        codec::decode_x(self.x_raw)
    }

    /// Forward distance (mm).
    pub fn y(&self) -> i32 {
        codec::decode_y(self.y_raw)
    }

    /// Radial velocity (cm/s).
    pub fn v(&self) -> i32 {
        codec::decode_v(self.v_raw)
    }
}

/// Latest decoded state of one target slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Target {
    pub present: bool,
    /// Lateral distance (mm)
    pub x: i32,
    /// Forward distance (mm)
    pub y: i32,
    /// Radial velocity (cm/s)
    pub v: i32,
    /// When the last accepted frame overwrote this slot.
    pub last_seen: Option<Instant>,
}

impl Target {
    /// Decode a record. An absent slot is stored as the origin at rest
    /// rather than the meaningless decode of an all-zero record.
    pub fn from_record(record: &TargetRecord, now: Instant) -> Self {
        if !record.present() {
            return Self {
                last_seen: Some(now),
                ..Self::default()
            };
        }
        Self {
            present: true,
            x: record.x(),
            y: record.y(),
            v: record.v(),
            last_seen: Some(now),
        }
    }

    /// Time since the slot was last written. `None` before the first frame.
    pub fn age(&self, now: Instant) -> Option<Duration> {
        self.last_seen.map(|seen| now.saturating_duration_since(seen))
    }

    /// True if the slot has never been written or is older than `after`.
    pub fn is_stale(&self, now: Instant, after: Duration) -> bool {
        self.age(now).is_none_or(|age| age > after)
    }

    /// Straight-line range from the sensor (mm).
    pub fn distance_mm(&self) -> f64 {
        f64::from(self.x).hypot(f64::from(self.y))
    }

    /// Azimuth in degrees, positive to the right of boresight.
    pub fn angle_deg(&self) -> f64 {
        if self.x == 0 && self.y == 0 {
            return 0.0;
        }
        f64::from(self.x).atan2(f64::from(self.y)).to_degrees()
    }
}

/// Fixed three-slot table. Slots are never reassigned; each accepted frame
/// overwrites all of them.
#[derive(Debug, Clone, Default)]
pub struct TargetTable {
    slots: [Target; TARGET_COUNT],
}

impl TargetTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every slot from a frame's records, present or not.
    pub fn apply(&mut self, records: &[TargetRecord; TARGET_COUNT], now: Instant) {
        for (slot, record) in self.slots.iter_mut().zip(records) {
            *slot = Target::from_record(record, now);
        }
    }

    pub fn get(&self, slot: usize) -> Option<&Target> {
        self.slots.get(slot)
    }

    /// Copy of all three slots.
    pub fn snapshot(&self) -> [Target; TARGET_COUNT] {
        self.slots
    }

    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.slots.iter()
    }

    /// Number of slots currently reporting a target.
    pub fn present_count(&self) -> usize {
        self.slots.iter().filter(|t| t.present).count()
    }
}
