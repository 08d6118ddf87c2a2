use thiserror::Error;

/// Errors arising from radar frame validation.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("frame too short ({len} bytes, need 30)")]
    FrameTooShort { len: usize },

    #[error("missing header (expected AA FF 03 00, got {})", hex(got))]
    MissingHeader { got: [u8; 4] },

    #[error("tail mismatch (expected 55 CC, got {:02X} {:02X}){}", got[0], got[1], format_raw_suffix(raw))]
    TailMismatch {
        got: [u8; 2],
        /// Full frame bytes for debug context.
        raw: Vec<u8>,
    },
}

/// Errors from building or loading a [`MonitorConfig`](crate::config::MonitorConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("buffer capacity {capacity} cannot hold one {frame_len}-byte frame")]
    BufferTooSmall { capacity: usize, frame_len: usize },

    #[error("trail capacity must be at least 1")]
    EmptyTrail,

    #[error("{field} must be greater than zero")]
    ZeroInterval { field: &'static str },

    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "json")]
    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from a [`ByteSource`](crate::source::ByteSource).
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Producer hung up and every buffered byte has been handed out.
    #[error("byte source disconnected")]
    Disconnected,
}

/// Space-separated uppercase hex, e.g. "AA FF 03 00".
pub(crate) fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format raw bytes as a suffix like " | AAFF0300..." (empty if no bytes).
fn format_raw_suffix(raw: &[u8]) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let limit = 16;
    let hex: String = raw.iter().take(limit).map(|b| format!("{b:02X}")).collect();
    let ellipsis = if raw.len() > limit { "..." } else { "" };
    format!(" | {hex}{ellipsis}")
}

pub type Result<T> = std::result::Result<T, WireError>;
