//! Variable-length count integer.
//!
//! The header wire format ends with a transaction count encoded as the
//! protocol's variable-length unsigned integer: values below 0xFD are a
//! single byte; larger values are a marker byte followed by a little-endian
//! u16, u32, or u64. The encoder always emits the minimal form.

use std::fmt;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::error::WireResult;
use crate::wire::{
    read_u16_le, read_u32_le, read_u64_le, read_u8, write_u16_le, write_u32_le, write_u64_le,
    write_u8,
};

/// A variable-length unsigned integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarInt(u64);

impl VarInt {
    /// Wrap a value.
    pub const fn new(value: u64) -> Self {
        VarInt(value)
    }

    /// The wrapped value.
    #[inline]
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Decode from a stream. Non-minimal encodings are accepted.
    pub fn read_from(r: &mut impl Read) -> WireResult<Self> {
        let marker = read_u8(r)?;
        let value = match marker {
            0xFD => u64::from(read_u16_le(r)?),
            0xFE => u64::from(read_u32_le(r)?),
            0xFF => read_u64_le(r)?,
            b => u64::from(b),
        };
        Ok(VarInt(value))
    }

    /// Encode in minimal form.
    pub fn write_to(&self, w: &mut impl Write) -> WireResult<()> {
        match self.0 {
            v if v < 0xFD => write_u8(w, v as u8),
            v if v <= 0xFFFF => {
                write_u8(w, 0xFD)?;
                write_u16_le(w, v as u16)
            }
            v if v <= 0xFFFF_FFFF => {
                write_u8(w, 0xFE)?;
                write_u32_le(w, v as u32)
            }
            v => {
                write_u8(w, 0xFF)?;
                write_u64_le(w, v)
            }
        }
    }

    /// Encoded length in bytes.
    pub fn encoded_len(&self) -> usize {
        match self.0 {
            v if v < 0xFD => 1,
            v if v <= 0xFFFF => 3,
            v if v <= 0xFFFF_FFFF => 5,
            _ => 9,
        }
    }
}

impl From<u64> for VarInt {
    fn from(value: u64) -> Self {
        VarInt(value)
    }
}

impl fmt::Display for VarInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
