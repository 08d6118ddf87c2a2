//! Monitor configuration.
//!
//! Durations are expressed in milliseconds in serialized form, e.g.
//!
//! ```json
//! { "buffer_capacity": 128, "overflow": "drop_oldest",
//!   "trail_capacity": 32, "sample_interval_ms": 120, "stale_after_ms": 1000 }
//! ```

use std::time::Duration;

pub use crate::buffer::OverflowPolicy;
use crate::buffer::DEFAULT_CAPACITY;
use crate::error::ConfigError;
use crate::frame::FRAME_LEN;
use crate::trail::{DEFAULT_SAMPLE_INTERVAL, DEFAULT_TRAIL_CAPACITY};

/// Default age after which a slot is reported stale.
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MonitorConfig {
    /// Intake buffer size in bytes.
    pub buffer_capacity: usize,
    pub overflow: OverflowPolicy,
    /// Points kept per trail.
    pub trail_capacity: usize,
    #[cfg_attr(feature = "serde", serde(rename = "sample_interval_ms", with = "millis"))]
    pub sample_interval: Duration,
    #[cfg_attr(feature = "serde", serde(rename = "stale_after_ms", with = "millis"))]
    pub stale_after: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_CAPACITY,
            overflow: OverflowPolicy::DropOldest,
            trail_capacity: DEFAULT_TRAIL_CAPACITY,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            stale_after: DEFAULT_STALE_AFTER,
        }
    }
}

impl MonitorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_capacity < FRAME_LEN {
            return Err(ConfigError::BufferTooSmall {
                capacity: self.buffer_capacity,
                frame_len: FRAME_LEN,
            });
        }
        if self.trail_capacity == 0 {
            return Err(ConfigError::EmptyTrail);
        }
        if self.sample_interval.is_zero() {
            return Err(ConfigError::ZeroInterval { field: "sample_interval" });
        }
        if self.stale_after.is_zero() {
            return Err(ConfigError::ZeroInterval { field: "stale_after" });
        }
        Ok(())
    }

    /// Load and validate a JSON config. Missing fields take their defaults.
    #[cfg(feature = "json")]
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    #[cfg(feature = "json")]
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(feature = "serde")]
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = MonitorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.buffer_capacity, 128);
        assert_eq!(config.sample_interval, Duration::from_millis(120));
    }

    #[test]
    fn rejects_small_buffer() {
        let config = MonitorConfig { buffer_capacity: 16, ..Default::default() };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BufferTooSmall { capacity: 16, frame_len: 30 })
        ));
    }

    #[test]
    fn rejects_empty_trail_and_zero_intervals() {
        let config = MonitorConfig { trail_capacity: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyTrail)));

        let config = MonitorConfig { sample_interval: Duration::ZERO, ..Default::default() };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroInterval { field: "sample_interval" })
        ));
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_partial_overrides() {
        let config =
            MonitorConfig::from_json_str(r#"{"trail_capacity": 8, "overflow": "drop_newest"}"#)
                .unwrap();
        assert_eq!(config.trail_capacity, 8);
        assert_eq!(config.overflow, OverflowPolicy::DropNewest);
        assert_eq!(config.sample_interval, DEFAULT_SAMPLE_INTERVAL);
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_millis() {
        let config = MonitorConfig::from_json_str(r#"{"sample_interval_ms": 250}"#).unwrap();
        assert_eq!(config.sample_interval, Duration::from_millis(250));
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_invalid_values_rejected() {
        assert!(matches!(
            MonitorConfig::from_json_str(r#"{"buffer_capacity": 10}"#),
            Err(ConfigError::BufferTooSmall { .. })
        ));
        assert!(matches!(
            MonitorConfig::from_json_str("{"),
            Err(ConfigError::Json(_))
        ));
    }
}
