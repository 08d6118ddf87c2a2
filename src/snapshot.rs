//! Read-only views handed to renderers (HTML, JSON, CSV).
//!
//! A [`Snapshot`] is a copy: holding one never blocks or observes further
//! monitor updates, and consecutive snapshots may repeat values when no new
//! frame arrived in between.

use std::fmt::Write as _;
use std::time::{Duration, Instant};

use crate::frame::TARGET_COUNT;
use crate::target::Target;
use crate::telemetry::Counters;
use crate::trail::TrailPoint;

/// One target slot as seen by a renderer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TargetView {
    pub slot: usize,
    pub present: bool,
    /// Lateral distance (mm)
    pub x: i32,
    /// Forward distance (mm)
    pub y: i32,
    /// Radial velocity (cm/s)
    pub v: i32,
    /// Milliseconds since the slot was last written; `None` if never.
    pub age_ms: Option<u64>,
    pub stale: bool,
    pub distance_mm: f64,
    pub angle_deg: f64,
}

impl TargetView {
    pub fn new(slot: usize, target: &Target, now: Instant, stale_after: Duration) -> Self {
        Self {
            slot,
            present: target.present,
            x: target.x,
            y: target.y,
            v: target.v,
            age_ms: target.age(now).map(|age| age.as_millis() as u64),
            stale: target.is_stale(now, stale_after),
            distance_mm: target.distance_mm(),
            angle_deg: target.angle_deg(),
        }
    }
}

/// Everything a renderer needs, captured at one instant.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Snapshot {
    pub targets: [TargetView; TARGET_COUNT],
    pub trails: [Vec<TrailPoint>; TARGET_COUNT],
    pub counters: Counters,
    /// `frames_accepted / frames_seen`, if any frame was seen.
    pub health: Option<f64>,
}

impl Snapshot {
    #[cfg(feature = "json")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Column names matching [`csv_line`](Self::csv_line).
    pub fn csv_header() -> String {
        let mut line = String::from("elapsed_ms");
        for slot in 0..TARGET_COUNT {
            let _ = write!(line, ",t{slot}_present,t{slot}_x,t{slot}_y,t{slot}_v");
        }
        line.push_str(",frames_seen,frames_accepted,decode_errors");
        line
    }

    /// One CSV row: elapsed time, per-slot fields, then counters.
    pub fn csv_line(&self, elapsed: Duration) -> String {
        let mut line = elapsed.as_millis().to_string();
        for t in &self.targets {
            let _ = write!(line, ",{},{},{},{}", u8::from(t.present), t.x, t.y, t.v);
        }
        let c = &self.counters;
        let _ = write!(
            line,
            ",{},{},{}",
            c.frames_seen, c.frames_accepted, c.decode_errors
        );
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Snapshot {
        let seen_at = Instant::now();
        let now = seen_at + Duration::from_millis(40);
        let seen = Target {
            present: true,
            x: -120,
            y: 1800,
            v: 15,
            last_seen: Some(seen_at),
        };
        let empty = Target::default();
        Snapshot {
            targets: [
                TargetView::new(0, &seen, now, Duration::from_secs(1)),
                TargetView::new(1, &empty, now, Duration::from_secs(1)),
                TargetView::new(2, &empty, now, Duration::from_secs(1)),
            ],
            trails: [vec![TrailPoint { x: -120, y: 1800 }], Vec::new(), Vec::new()],
            counters: Counters {
                frames_seen: 4,
                frames_accepted: 3,
                decode_errors: 1,
                ..Default::default()
            },
            health: Some(0.75),
        }
    }

    #[test]
    fn view_reports_age_and_staleness() {
        let snap = snapshot();
        assert_eq!(snap.targets[0].age_ms, Some(40));
        assert!(!snap.targets[0].stale);
        assert_eq!(snap.targets[1].age_ms, None);
        assert!(snap.targets[1].stale);
    }

    #[test]
    fn csv_header_and_line_align() {
        let header = Snapshot::csv_header();
        let line = snapshot().csv_line(Duration::from_millis(1250));
        assert_eq!(header.split(',').count(), line.split(',').count());
        assert_eq!(line, "1250,1,-120,1800,15,0,0,0,0,0,0,0,0,4,3,1");
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_shape() {
        let json = snapshot().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["targets"][0]["x"], -120);
        assert_eq!(value["trails"][0][0]["y"], 1800);
        assert_eq!(value["counters"]["decode_errors"], 1);
        assert!(value["targets"][1]["age_ms"].is_null());
    }
}
