//! Field codecs for the radar wire protocol.
//!
//! All multi-byte integers are little-endian. The signed quantities are not
//! two's complement: each field uses its own sign-bit convention, and `x` in
//! particular is asymmetric. Raw `0x8000` and raw `0x0000` both decode to 0.
//!
//! | field | high bit set            | high bit clear |
//! |-------|-------------------------|----------------|
//! | `x`   | `raw - 32768`           | `-raw`         |
//! | `y`   | `raw - 32768`           | `raw - 32768`  |
//! | `v`   | `-(raw - 32768)`        | `raw`          |

/// Bit 15: the sign/offset flag on every target field.
pub const SIGN_BIT: u16 = 0x8000;

const OFFSET: i32 = 0x8000;

// ---------------------------------------------------------------------------
// Read helpers
// ---------------------------------------------------------------------------

/// Read a little-endian unsigned 16-bit integer at `offset`.
///
/// `data` must hold at least `offset + 2` bytes.
pub fn read_u16_le(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

// ---------------------------------------------------------------------------
// Field decoders
// ---------------------------------------------------------------------------

/// Lateral distance in millimetres.
pub fn decode_x(raw: u16) -> i32 {
    if raw & SIGN_BIT != 0 {
        i32::from(raw) - OFFSET
    } else {
        -i32::from(raw)
    }
}

/// Forward distance in millimetres (offset binary).
pub fn decode_y(raw: u16) -> i32 {
    i32::from(raw) - OFFSET
}

/// Radial velocity in centimetres per second.
pub fn decode_v(raw: u16) -> i32 {
    if raw & SIGN_BIT != 0 {
        -(i32::from(raw) - OFFSET)
    } else {
        i32::from(raw)
    }
}

// ---------------------------------------------------------------------------
// Field encoders
// ---------------------------------------------------------------------------
//
// Inverses of the decoders, used to synthesise frames for replays and tests.
// Values outside the representable range saturate.

/// Encode a lateral distance. `0` encodes as `0x0000`.
pub fn encode_x(x: i32) -> u16 {
    if x > 0 {
        (x.min(0x7FFF) + OFFSET) as u16
    } else {
        (-x).min(0x7FFF) as u16
    }
}

/// Encode a forward distance.
pub fn encode_y(y: i32) -> u16 {
    (y.clamp(-OFFSET, 0x7FFF) + OFFSET) as u16
}

/// Encode a radial velocity. `0` encodes as `0x0000`.
pub fn encode_v(v: i32) -> u16 {
    if v < 0 {
        ((-v).min(0x7FFF) + OFFSET) as u16
    } else {
        v.min(0x7FFF) as u16
    }
}

// ---------------------------------------------------------------------------
// Write helpers
// ---------------------------------------------------------------------------

/// Write a little-endian unsigned 16-bit integer at `offset`.
///
/// `buf` must hold at least `offset + 2` bytes.
pub fn write_u16_le(buf: &mut [u8], offset: usize, val: u16) {
    buf[offset..offset + 2].copy_from_slice(&val.to_le_bytes());
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
