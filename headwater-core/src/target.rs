//! Compact proof-of-work target encoding.
//!
//! A 256-bit (or wider) signed target is packed into 32 bits the way a float
//! packs a mantissa and exponent: the top byte is the size in bytes of the
//! big-endian magnitude, one flag bit carries the sign, and the remaining 23
//! bits hold the top three magnitude bytes.
//!
//! Non-minimal encodings decode fine; the encoder always produces the
//! minimal-size form.

use std::fmt;
use std::io::{Read, Write};

use num_bigint::{BigInt, Sign};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::WireResult;
use crate::wire::{read_u32_le, write_u32_le};

/// Flag bit marking a negative target.
const SIGN_BIT: u32 = 0x0080_0000;

/// Decode a compact 32-bit word into its target value.
///
/// `size` is the top byte; if `size <= 3` only the top `size` mantissa bytes
/// are significant, otherwise the 3-byte mantissa is shifted left by
/// `size - 3` bytes. The sign flag negates the magnitude.
pub fn bits_to_target(bits: u32) -> BigInt {
    let size = (bits >> 24) & 0xFF;
    let neg = bits & SIGN_BIT != 0;
    let word = bits & !SIGN_BIT;

    let mut mant = [0u8; 3];
    if size >= 1 {
        mant[0] = (word >> 16) as u8;
    }
    if size >= 2 {
        mant[1] = (word >> 8) as u8;
    }
    if size >= 3 {
        mant[2] = word as u8;
    }

    let mut m = BigInt::from_bytes_be(Sign::Plus, &mant);
    if size >= 3 {
        m <<= ((size - 3) * 8) as usize;
    } else {
        m >>= ((3 - size) * 8) as usize;
    }

    if neg {
        -m
    } else {
        m
    }
}

/// Encode a target into its canonical minimal-size compact form.
///
/// The mantissa is the minimal big-endian form of the magnitude, with a
/// leading zero byte whenever the top byte has its high bit set so the
/// mantissa never collides with the sign flag.
///
/// # Panics
///
/// Panics if the magnitude needs more than 255 bytes, which no encodable
/// target can.
pub fn target_to_bits(target: &BigInt) -> u32 {
    let neg = target.sign() == Sign::Minus;

    let mut mant = target.magnitude().to_bytes_be();
    if mant == [0] {
        mant.clear();
    } else if mant[0] & 0x80 != 0 {
        mant.insert(0, 0);
    }

    let size = mant.len();
    assert!(size <= 255, "target exceeds maximum encodable length");

    let mut encoded = (size as u32) << 24;
    if size >= 1 {
        encoded |= (mant[0] as u32) << 16;
    }
    if size >= 2 {
        encoded |= (mant[1] as u32) << 8;
    }
    if size >= 3 {
        encoded |= mant[2] as u32;
    }

    if neg {
        encoded | SIGN_BIT
    } else {
        encoded
    }
}

/// A compact target: the 32-bit wire word plus its decoded value.
///
/// Equality is by the raw compact word, not the decoded value — the type
/// exists to compare a locally computed expected target against the one a
/// peer declared, and distinct encodings of equal values must not compare
/// equal.
#[derive(Clone, Debug)]
pub struct TargetBits {
    bits: u32,
    target: BigInt,
}

impl TargetBits {
    /// Encode a target value; the stored value is the representable rounding
    /// of the input.
    pub fn from_target(target: &BigInt) -> Self {
        Self::from_bits(target_to_bits(target))
    }

    /// Accept any compact word, minimal or not.
    pub fn from_bits(bits: u32) -> Self {
        TargetBits {
            bits,
            target: bits_to_target(bits),
        }
    }

    /// Read the 4-byte little-endian compact word.
    pub fn read_from(r: &mut impl Read) -> WireResult<Self> {
        Ok(Self::from_bits(read_u32_le(r)?))
    }

    /// Write the 4-byte little-endian compact word.
    pub fn write_to(&self, w: &mut impl Write) -> WireResult<()> {
        write_u32_le(w, self.bits)
    }

    /// The raw compact word.
    #[inline]
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// The decoded target value.
    #[inline]
    pub fn target(&self) -> &BigInt {
        &self.target
    }
}

impl PartialEq for TargetBits {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits
    }
}

impl Eq for TargetBits {}

impl std::hash::Hash for TargetBits {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.bits.hash(state);
    }
}

impl fmt::Display for TargetBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.bits)
    }
}

impl Serialize for TargetBits {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.bits)
    }
}

impl<'de> Deserialize<'de> for TargetBits {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(TargetBits::from_bits(u32::deserialize(deserializer)?))
    }
}

impl From<u32> for TargetBits {
    fn from(bits: u32) -> Self {
        TargetBits::from_bits(bits)
    }
}
