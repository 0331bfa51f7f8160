//! Block-hash identity type.

use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WireResult;
use crate::wire::read_array;

/// A 32-byte binary identity, used as the map key for every header.
///
/// Stored in wire order (the raw double-SHA-256 output). The conventional
/// human-readable form for block hashes reverses the bytes; see
/// [`Hash::reversed_hex`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hash([u8; 32]);

impl Hash {
    /// The all-zero hash, used as the previous hash of a genesis header.
    pub const ZERO: Hash = Hash([0u8; 32]);

    /// Create a hash from raw bytes.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Hash(bytes)
    }

    /// Read a hash from a stream, wire order.
    pub fn read_from(r: &mut impl Read) -> WireResult<Self> {
        Ok(Hash(read_array(r, "hash")?))
    }

    /// Write the raw bytes, wire order.
    pub fn write_to(&self, w: &mut impl Write) -> WireResult<()> {
        w.write_all(&self.0)?;
        Ok(())
    }

    /// Borrow the raw bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Copy out the raw bytes.
    #[inline]
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    /// The bytes in reversed order.
    ///
    /// Reinterpreting the reversed bytes as a big-endian integer gives the
    /// numeric value compared against the proof-of-work target.
    pub fn reversed(&self) -> [u8; 32] {
        let mut out = self.0;
        out.reverse();
        out
    }

    /// Hex of the reversed bytes — the conventional display order for block
    /// hashes.
    pub fn reversed_hex(&self) -> String {
        hex::encode(self.reversed())
    }
}

impl From<[u8; 32]> for Hash {
    fn from(bytes: [u8; 32]) -> Self {
        Hash(bytes)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", hex::encode(self.0))
    }
}

impl FromStr for Hash {
    type Err = hex::FromHexError;

    /// Parse 64 hex digits in wire order.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Hash(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_equality_by_content() {
        let a = Hash::new([7u8; 32]);
        let b = Hash::new([7u8; 32]);
        let c = Hash::new([8u8; 32]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_usable_as_map_key() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(Hash::new([1u8; 32]), "one");
        assert_eq!(map.get(&Hash::new([1u8; 32])), Some(&"one"));
        assert_eq!(map.get(&Hash::new([2u8; 32])), None);
    }

    #[test]
    fn test_reversed() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0x01;
        bytes[31] = 0xFF;
        let h = Hash::new(bytes);
        let rev = h.reversed();
        assert_eq!(rev[0], 0xFF);
        assert_eq!(rev[31], 0x01);
        // Original is untouched
        assert_eq!(h.as_bytes()[0], 0x01);
    }

    #[test]
    fn test_wire_round_trip() {
        let h = Hash::new([0xAB; 32]);
        let mut buf = Vec::new();
        h.write_to(&mut buf).unwrap();
        assert_eq!(buf.len(), 32);
        let back = Hash::read_from(&mut Cursor::new(buf)).unwrap();
        assert_eq!(h, back);
    }

    #[test]
    fn test_hex_display_and_parse() {
        let h = Hash::new([0x0F; 32]);
        let s = h.to_string();
        assert_eq!(s.len(), 64);
        assert_eq!(s.parse::<Hash>().unwrap(), h);
    }

    #[test]
    fn test_reversed_hex() {
        let mut bytes = [0u8; 32];
        bytes[31] = 0xAB;
        let h = Hash::new(bytes);
        assert!(h.reversed_hex().starts_with("ab"));
    }
}
