//! Wire encodings used by the IronOS GATT schema

use crate::error::{PinecilError, Result};

/// Fixed-width little-endian unsigned integer encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    U16Le,
    U32Le,
    U64Le,
}

impl Encoding {
    /// Number of bytes on the wire
    pub const fn width(self) -> usize {
        match self {
            Self::U16Le => 2,
            Self::U32Le => 4,
            Self::U64Le => 8,
        }
    }

    /// Largest value representable in this encoding
    pub const fn max_value(self) -> u64 {
        match self {
            Self::U16Le => u16::MAX as u64,
            Self::U32Le => u32::MAX as u64,
            Self::U64Le => u64::MAX,
        }
    }

    /// Encode `value`, rejecting values wider than the encoding
    pub fn encode(self, field: &str, value: u64) -> Result<Vec<u8>> {
        if value > self.max_value() {
            return Err(PinecilError::malformed(
                field,
                format!("{} does not fit in {} bytes", value, self.width()),
            ));
        }
        Ok(value.to_le_bytes()[..self.width()].to_vec())
    }

    /// Decode exactly [`width`](Self::width) bytes
    pub fn decode(self, field: &str, bytes: &[u8]) -> Result<u64> {
        if bytes.len() != self.width() {
            return Err(PinecilError::malformed(
                field,
                format!("expected {} bytes, got {}", self.width(), bytes.len()),
            ));
        }
        let mut buf = [0u8; 8];
        buf[..bytes.len()].copy_from_slice(bytes);
        Ok(u64::from_le_bytes(buf))
    }

    /// Decode a packed record of back-to-back values
    pub fn decode_record(self, field: &str, bytes: &[u8]) -> Result<Vec<u64>> {
        if bytes.len() % self.width() != 0 {
            return Err(PinecilError::malformed(
                field,
                format!(
                    "record length {} is not a multiple of {}",
                    bytes.len(),
                    self.width()
                ),
            ));
        }
        bytes
            .chunks_exact(self.width())
            .map(|chunk| self.decode(field, chunk))
            .collect()
    }
}
