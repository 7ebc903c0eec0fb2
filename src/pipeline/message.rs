//! Fixed-shape message exchanged between adjacent stages, and its wire codec.
//!
//! On the wire a message is five fixed-width integers in the order
//! `[value, sum_acc, sub_acc, mul_acc, is_end]`, with `is_end` restricted to
//! `0` or `1`. The byte form, which is what data edges carry, is the same
//! five fields as little-endian `i64`.

use crate::pipeline::error::{PipelineError, PipelineResult};

/// An element of the input sequence.
pub type Element = i64;

/// Number of integer fields in a wire frame.
pub const WIRE_FIELDS: usize = 5;

/// Size of an encoded frame in bytes.
pub const WIRE_BYTES: usize = WIRE_FIELDS * std::mem::size_of::<i64>();

/// Longest supported sequence: 20! is the largest factorial that fits in `i64`.
pub const MAX_SEQUENCE_LEN: usize = 20;

/// Token sent by the sink to close the source's timing window.
pub const ACK_TOKEN: i64 = 1;

/// The raw five-integer frame carried on a data edge.
pub type WireFrame = [i64; WIRE_FIELDS];

/// The unit of inter-stage communication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineMessage {
    /// Element in transit. Meaningless once `is_end` is set.
    pub value: Element,
    pub sum_acc: i64,
    pub sub_acc: i64,
    pub mul_acc: i64,
    pub is_end: bool,
}

impl PipelineMessage {
    /// Message carrying one sequence element with identity accumulators.
    pub fn element(value: Element) -> Self {
        Self {
            value,
            sum_acc: 0,
            sub_acc: 0,
            mul_acc: 1,
            is_end: false,
        }
    }

    /// The end-of-stream message.
    pub fn sentinel() -> Self {
        Self {
            is_end: true,
            ..Self::element(0)
        }
    }

    pub fn to_wire(&self) -> WireFrame {
        [
            self.value,
            self.sum_acc,
            self.sub_acc,
            self.mul_acc,
            i64::from(self.is_end),
        ]
    }

    pub fn from_wire(frame: WireFrame) -> PipelineResult<Self> {
        let [value, sum_acc, sub_acc, mul_acc, flag] = frame;
        let is_end = match flag {
            0 => false,
            1 => true,
            other => {
                return Err(PipelineError::Decode(format!(
                    "end flag must be 0 or 1, got {other}"
                )))
            }
        };
        Ok(Self {
            value,
            sum_acc,
            sub_acc,
            mul_acc,
            is_end,
        })
    }

    /// Encode to the 40-byte little-endian layout.
    pub fn to_bytes(&self) -> [u8; WIRE_BYTES] {
        let mut out = [0u8; WIRE_BYTES];
        for (chunk, field) in out.chunks_exact_mut(8).zip(self.to_wire()) {
            chunk.copy_from_slice(&field.to_le_bytes());
        }
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> PipelineResult<Self> {
        if bytes.len() != WIRE_BYTES {
            return Err(PipelineError::Decode(format!(
                "expected {WIRE_BYTES} bytes, got {}",
                bytes.len()
            )));
        }
        let mut frame: WireFrame = [0; WIRE_FIELDS];
        for (field, chunk) in frame.iter_mut().zip(bytes.chunks_exact(8)) {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(chunk);
            *field = i64::from_le_bytes(raw);
        }
        Self::from_wire(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_has_identity_accumulators() {
        let msg = PipelineMessage::element(7);
        assert_eq!(msg.to_wire(), [7, 0, 0, 1, 0]);
    }

    #[test]
    fn test_sentinel_layout() {
        assert_eq!(PipelineMessage::sentinel().to_wire(), [0, 0, 0, 1, 1]);
    }

    #[test]
    fn test_from_wire_rejects_bad_end_flag() {
        let err = PipelineMessage::from_wire([1, 0, 0, 1, 2]).unwrap_err();
        assert!(err.to_string().contains("end flag"));
    }

    #[test]
    fn test_byte_layout_is_little_endian() {
        let msg = PipelineMessage {
            value: 3,
            sum_acc: 6,
            sub_acc: -6,
            mul_acc: 6,
            is_end: false,
        };
        let bytes = msg.to_bytes();
        assert_eq!(bytes.len(), 40);
        assert_eq!(bytes[0], 3);
        assert_eq!(&bytes[16..24], &(-6i64).to_le_bytes());
        assert_eq!(PipelineMessage::from_bytes(&bytes).unwrap(), msg);
    }

    #[test]
    fn test_from_bytes_rejects_short_buffer() {
        assert!(PipelineMessage::from_bytes(&[0u8; 39]).is_err());
    }
}
