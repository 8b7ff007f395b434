//! Data frames sent by thermostat nodes to the gateway.
//!
//! Addressing fields are **little-endian**; the payload is the big-endian
//! reading from [`crate::codec`].
//!
//! ```text
//!   0     1  |   2   |  3-4   |  5-6   |  7-8    |      9+       |  byte offset
//! +-----+-----+-------+--------+--------+---------+---------------+
//! | FCF | FCA | SEQNO | DSTPAN | SRCPAN | SRCADDR |    payload    |
//! +-----+-----+-------+--------+--------+---------+---------------+
//! ```
//!
//! No destination address is carried; frames go to every listener on the
//! destination PAN.

use crate::codec::TelemetryReading;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const FCF_DATA: u8 = 0x41;
pub const FCA_SRC_SADDR: u8 = 0x80;
pub const DEFAULT_DST_PAN: u16 = 0x22;
pub const DEFAULT_SRC_PAN: u16 = 0x1234;

/// Byte length of the addressing header; the payload starts here.
pub const HEADER_LEN: usize = 9;

const OFF_FCF: usize = 0;
const OFF_FCA: usize = 1;
const OFF_SEQ: usize = 2;
const OFF_DST_PAN: usize = 3;
const OFF_SRC_PAN: usize = 5;
const OFF_SRC_ADDR: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame too short: {len} bytes, header needs {header}", header = HEADER_LEN)]
    FrameTooShort { len: usize },
}

/// Header template for one node. The sequence number advances with every
/// encoded frame and wraps at 256.
#[derive(Debug, Clone)]
pub struct RadioFrame {
    short_addr: u16,
    dst_pan: u16,
    src_pan: u16,
    sequence: u8,
}

impl RadioFrame {
    pub fn new(short_addr: u16) -> Self {
        Self {
            short_addr,
            dst_pan: DEFAULT_DST_PAN,
            src_pan: DEFAULT_SRC_PAN,
            sequence: 0,
        }
    }

    pub fn with_sequence(mut self, sequence: u8) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn short_addr(&self) -> u16 {
        self.short_addr
    }

    pub fn sequence(&self) -> u8 {
        self.sequence
    }

    /// Build the next frame carrying `payload`.
    pub fn encode(&mut self, payload: &[u8]) -> alloc::vec::Vec<u8> {
        let mut frame = alloc::vec![0u8; HEADER_LEN + payload.len()];
        frame[OFF_FCF] = FCF_DATA;
        frame[OFF_FCA] = FCA_SRC_SADDR;
        frame[OFF_SEQ] = self.sequence;
        frame[OFF_DST_PAN..OFF_DST_PAN + 2].copy_from_slice(&self.dst_pan.to_le_bytes());
        frame[OFF_SRC_PAN..OFF_SRC_PAN + 2].copy_from_slice(&self.src_pan.to_le_bytes());
        frame[OFF_SRC_ADDR..OFF_SRC_ADDR + 2].copy_from_slice(&self.short_addr.to_le_bytes());
        frame[HEADER_LEN..].copy_from_slice(payload);

        self.sequence = self.sequence.wrapping_add(1);
        frame
    }

    pub fn encode_reading(&mut self, reading: TelemetryReading) -> alloc::vec::Vec<u8> {
        self.encode(&reading.encode())
    }

    pub fn decode(bytes: &[u8]) -> Result<DecodedFrame, FrameError> {
        if bytes.len() < HEADER_LEN {
            return Err(FrameError::FrameTooShort { len: bytes.len() });
        }
        let le16 = |off: usize| u16::from_le_bytes([bytes[off], bytes[off + 1]]);

        Ok(DecodedFrame {
            fcf: bytes[OFF_FCF],
            fca: bytes[OFF_FCA],
            sequence: bytes[OFF_SEQ],
            dst_pan: le16(OFF_DST_PAN),
            src_pan: le16(OFF_SRC_PAN),
            src_addr: le16(OFF_SRC_ADDR),
            payload: bytes[HEADER_LEN..].to_vec(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedFrame {
    pub fcf: u8,
    pub fca: u8,
    pub sequence: u8,
    pub dst_pan: u16,
    pub src_pan: u16,
    pub src_addr: u16,
    #[serde(with = "serde_bytes")]
    pub payload: alloc::vec::Vec<u8>,
}

impl DecodedFrame {
    pub fn reading(&self) -> Option<TelemetryReading> {
        TelemetryReading::decode(&self.payload)
    }
}
