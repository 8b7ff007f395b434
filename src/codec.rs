//! Binary pack/unpack helpers and the telemetry reading wire format.
//!
//! All multi-byte integers on the wire are **big-endian**.
//!
//! ```text
//!  0               1               2               3
//!  0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |          Temperature          |            Humidity           |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```

use core::fmt::Write;
use serde::{Deserialize, Serialize};
use static_assertions::const_assert_eq;

/// Byte length of an encoded [`TelemetryReading`].
pub const READING_WIRE_LEN: usize = 4;

const_assert_eq!(READING_WIRE_LEN, 2 * core::mem::size_of::<u16>());

/// Pack a sequence of unsigned 32-bit integers, big-endian, back to back.
pub fn pack_u32(values: &[u32]) -> alloc::vec::Vec<u8> {
    values.iter().flat_map(|v| v.to_be_bytes()).collect()
}

/// Unpack consecutive big-endian u16 values. A trailing odd byte is ignored.
pub fn unpack_u16(bytes: &[u8]) -> alloc::vec::Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect()
}

/// Lowercase hex dump without separators.
pub fn to_hex(bytes: &[u8]) -> alloc::string::String {
    let mut out = alloc::string::String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        // Writing into a String cannot fail
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Parse a hex string (optionally `0x`-prefixed, whitespace ignored).
pub fn from_hex(text: &str) -> Option<alloc::vec::Vec<u8>> {
    let digits: alloc::string::String = text
        .trim()
        .trim_start_matches("0x")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if digits.len() % 2 != 0 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&digits[i..i + 2], 16).ok())
        .collect()
}

/// One temperature/humidity sample as carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TelemetryReading {
    pub temperature: u16,
    pub humidity: u16,
}

impl TelemetryReading {
    pub fn new(temperature: u16, humidity: u16) -> Self {
        Self { temperature, humidity }
    }

    pub fn encode(&self) -> [u8; READING_WIRE_LEN] {
        let t = self.temperature.to_be_bytes();
        let h = self.humidity.to_be_bytes();
        [t[0], t[1], h[0], h[1]]
    }

    /// Decode a payload. Returns `None` unless it is exactly
    /// [`READING_WIRE_LEN`] bytes; shorter or longer input is never
    /// partially decoded.
    pub fn decode(payload: &[u8]) -> Option<Self> {
        if payload.len() != READING_WIRE_LEN {
            return None;
        }
        let fields = unpack_u16(payload);
        Some(Self::new(fields[0], fields[1]))
    }
}

impl core::fmt::Display for TelemetryReading {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.temperature, self.humidity)
    }
}
