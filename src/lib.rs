//! mmtrail: frame synchronizer, decoder and target-trail recorder for
//! 3-target mmWave radar modules streaming 30-byte frames over UART.
//!
//! No async, no device I/O in the core. Callers feed bytes (directly or via a
//! [`ByteSource`]) into a [`Monitor`] and read back target, trail and counter
//! snapshots.

pub mod buffer;
pub mod codec;
pub mod config;
pub mod error;
pub mod frame;
pub mod monitor;
pub mod ring;
pub mod snapshot;
pub mod source;
pub mod target;
pub mod telemetry;
pub mod trail;

pub use config::MonitorConfig;
pub use error::{ConfigError, SourceError, WireError};
pub use frame::{Frame, FrameSync};
pub use monitor::{FrameEvent, Monitor};
pub use snapshot::Snapshot;
pub use source::ByteSource;
pub use target::{Target, TargetRecord};
pub use telemetry::Counters;
pub use trail::TrailPoint;
