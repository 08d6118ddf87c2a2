//! Per-slot position history sampled on a fixed cadence.
//!
//! The recorder samples the target table, not the frame stream: frames that
//! arrive between two samples only show up through the latest table state.
//! Absent slots are sampled too, so a dropout appears in the history as a
//! run of points at the origin.

use std::time::{Duration, Instant};

use log::debug;

use crate::frame::TARGET_COUNT;
use crate::ring::Ring;
use crate::target::TargetTable;

/// Default sampling cadence.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(120);

/// Default number of points kept per slot.
pub const DEFAULT_TRAIL_CAPACITY: usize = 32;

/// One sampled position (mm).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TrailPoint {
    pub x: i32,
    pub y: i32,
}

/// Bounded history for one target slot.
#[derive(Debug, Clone)]
pub struct Trail {
    points: Ring<TrailPoint>,
    last_sample: Option<Instant>,
}

impl Trail {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: Ring::new(capacity),
            last_sample: None,
        }
    }

    pub fn push(&mut self, point: TrailPoint, now: Instant) {
        self.points.push(point);
        self.last_sample = Some(now);
    }

    /// Snapshot copy, oldest first.
    pub fn points(&self) -> Vec<TrailPoint> {
        self.points.to_vec()
    }

    pub fn latest(&self) -> Option<TrailPoint> {
        self.points.latest().copied()
    }

    pub fn last_sample(&self) -> Option<Instant> {
        self.last_sample
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.points.capacity()
    }
}

/// Samples every slot of a [`TargetTable`] into its own [`Trail`].
#[derive(Debug, Clone)]
pub struct TrailRecorder {
    trails: [Trail; TARGET_COUNT],
    interval: Duration,
    last_sample: Option<Instant>,
}

impl TrailRecorder {
    pub fn new(capacity: usize, interval: Duration) -> Self {
        Self {
            trails: std::array::from_fn(|_| Trail::new(capacity)),
            interval,
            last_sample: None,
        }
    }

    /// True if a sample is due at `now`. The first poll is always due.
    pub fn is_due(&self, now: Instant) -> bool {
        self.last_sample
            .is_none_or(|last| now.saturating_duration_since(last) >= self.interval)
    }

    /// Sample the table if the cadence has elapsed. Returns whether a sample
    /// was taken.
    pub fn poll(&mut self, table: &TargetTable, now: Instant) -> bool {
        if !self.is_due(now) {
            return false;
        }
        self.sample(table, now);
        true
    }

    /// Sample the table unconditionally.
    pub fn sample(&mut self, table: &TargetTable, now: Instant) {
        for (trail, target) in self.trails.iter_mut().zip(table.iter()) {
            trail.push(TrailPoint { x: target.x, y: target.y }, now);
        }
        self.last_sample = Some(now);
        debug!("trail sample: {} of {} slots present", table.present_count(), TARGET_COUNT);
    }

    /// Ordered history of one slot, oldest first. Empty for an unknown slot.
    pub fn trail(&self, slot: usize) -> Vec<TrailPoint> {
        self.trails.get(slot).map(Trail::points).unwrap_or_default()
    }

    /// Ordered history of every slot.
    pub fn trails(&self) -> [Vec<TrailPoint>; TARGET_COUNT] {
        std::array::from_fn(|slot| self.trails[slot].points())
    }

    pub fn get(&self, slot: usize) -> Option<&Trail> {
        self.trails.get(slot)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for TrailRecorder {
    fn default() -> Self {
        Self::new(DEFAULT_TRAIL_CAPACITY, DEFAULT_SAMPLE_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::TargetRecord;

    fn table_at(x: i32, y: i32) -> TargetTable {
        let mut table = TargetTable::new();
        table.apply(
            &[
                TargetRecord::from_values(x, y, 0),
                TargetRecord::absent(),
                TargetRecord::from_values(-x, y, 0),
            ],
            Instant::now(),
        );
        table
    }

    #[test]
    fn first_poll_samples() {
        let mut rec = TrailRecorder::default();
        let t0 = Instant::now();
        assert!(rec.poll(&table_at(100, 2000), t0));
        assert_eq!(rec.trail(0), vec![TrailPoint { x: 100, y: 2000 }]);
        assert_eq!(rec.trail(2), vec![TrailPoint { x: -100, y: 2000 }]);
    }

    #[test]
    fn cadence_gates_samples() {
        let mut rec = TrailRecorder::default();
        let t0 = Instant::now();
        let table = table_at(1, 1000);
        assert!(rec.poll(&table, t0));
        assert!(!rec.poll(&table, t0 + Duration::from_millis(119)));
        assert!(rec.poll(&table, t0 + Duration::from_millis(120)));
        assert!(!rec.poll(&table, t0 + Duration::from_millis(200)));
        assert_eq!(rec.get(0).unwrap().len(), 2);
    }

    #[test]
    fn absent_slot_is_still_sampled() {
        let mut rec = TrailRecorder::default();
        rec.poll(&table_at(5, 500), Instant::now());
        assert_eq!(rec.trail(1), vec![TrailPoint { x: 0, y: 0 }]);
    }

    #[test]
    fn never_written_table_samples_zeros() {
        let mut rec = TrailRecorder::default();
        rec.poll(&TargetTable::new(), Instant::now());
        assert_eq!(rec.trail(0), vec![TrailPoint::default()]);
    }

    #[test]
    fn capacity_rotation() {
        let cap = 4;
        let mut rec = TrailRecorder::new(cap, Duration::from_millis(10));
        let t0 = Instant::now();
        for i in 0..=cap as i32 {
            let now = t0 + Duration::from_millis(10 * i as u64);
            assert!(rec.poll(&table_at(i, 1000), now));
        }
        let xs: Vec<i32> = rec.trail(0).iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![1, 2, 3, 4]);
        assert_eq!(rec.get(0).unwrap().latest(), Some(TrailPoint { x: 4, y: 1000 }));
    }

    #[test]
    fn snapshot_is_a_copy() {
        let mut rec = TrailRecorder::new(8, Duration::from_millis(1));
        let t0 = Instant::now();
        rec.poll(&table_at(1, 1), t0);
        let before = rec.trails();
        rec.poll(&table_at(2, 2), t0 + Duration::from_millis(5));
        assert_eq!(before[0].len(), 1);
        assert_eq!(rec.trail(0).len(), 2);
    }

    #[test]
    fn unknown_slot_is_empty() {
        assert!(TrailRecorder::default().trail(7).is_empty());
    }
}
