//! Block header type.
//!
//! An immutable 80-byte-serializable record. The block hash is double
//! SHA-256 of the serialized `version..nonce` fields, computed once at
//! construction and cached; the trailing transaction count is carried for
//! the wire format but excluded from the hash.
//!
//! Construction performs no proof-of-work or context validation — that is
//! the tree's responsibility.

use std::io::{Read, Write};

use num_bigint::{BigInt, Sign};
use num_traits::{One, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::crypto::sha256d;
use crate::error::WireResult;
use crate::hash::Hash;
use crate::target::TargetBits;
use crate::varint::VarInt;
use crate::wire::{read_u32_le, write_u32_le};

/// Serialized size of the hashed header fields.
pub const HEADER_SIZE: usize = 80;

/// An immutable block header with its cached block hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockHeader {
    version: u32,
    previous: Hash,
    merkle_root: Hash,
    timestamp: u32,
    bits: TargetBits,
    nonce: u32,
    tx_count: u64,
    block_hash: Hash,
}

impl BlockHeader {
    /// Construct a header and compute its block hash.
    pub fn new(
        version: u32,
        previous: Hash,
        merkle_root: Hash,
        timestamp: u32,
        bits: TargetBits,
        nonce: u32,
        tx_count: u64,
    ) -> Self {
        let block_hash = compute_block_hash(version, &previous, &merkle_root, timestamp, &bits, nonce);
        BlockHeader {
            version,
            previous,
            merkle_root,
            timestamp,
            bits,
            nonce,
            tx_count,
            block_hash,
        }
    }

    /// Read a header from its wire form: 80 fixed bytes followed by the
    /// transaction-count varint.
    pub fn read_from(r: &mut impl Read) -> WireResult<Self> {
        let version = read_u32_le(r)?;
        let previous = Hash::read_from(r)?;
        let merkle_root = Hash::read_from(r)?;
        let timestamp = read_u32_le(r)?;
        let bits = TargetBits::read_from(r)?;
        let nonce = read_u32_le(r)?;
        let tx_count = VarInt::read_from(r)?.value();
        Ok(Self::new(
            version,
            previous,
            merkle_root,
            timestamp,
            bits,
            nonce,
            tx_count,
        ))
    }

    /// Write the wire form: 80 fixed bytes followed by the transaction-count
    /// varint.
    pub fn write_to(&self, w: &mut impl Write) -> WireResult<()> {
        self.write_hashed_fields(w)?;
        VarInt::new(self.tx_count).write_to(w)
    }

    fn write_hashed_fields(&self, w: &mut impl Write) -> WireResult<()> {
        write_u32_le(w, self.version)?;
        self.previous.write_to(w)?;
        self.merkle_root.write_to(w)?;
        write_u32_le(w, self.timestamp)?;
        self.bits.write_to(w)?;
        write_u32_le(w, self.nonce)
    }

    /// Header version.
    #[inline]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Hash of the previous block header.
    #[inline]
    pub fn previous(&self) -> &Hash {
        &self.previous
    }

    /// Merkle root of the block's transactions.
    #[inline]
    pub fn merkle_root(&self) -> &Hash {
        &self.merkle_root
    }

    /// Unix timestamp.
    #[inline]
    pub fn timestamp(&self) -> u32 {
        self.timestamp
    }

    /// Compact proof-of-work target.
    #[inline]
    pub fn bits(&self) -> &TargetBits {
        &self.bits
    }

    /// Proof-of-work nonce.
    #[inline]
    pub fn nonce(&self) -> u32 {
        self.nonce
    }

    /// Declared transaction count (zero in headers-only sync).
    #[inline]
    pub fn tx_count(&self) -> u64 {
        self.tx_count
    }

    /// The cached block hash.
    #[inline]
    pub fn block_hash(&self) -> &Hash {
        &self.block_hash
    }

    /// This block's work contribution: `2^256 / (target + 1)`.
    ///
    /// Cumulative-chain comparison sums these, so a low-target block counts
    /// for more than many high-target ones. A non-positive denominator (an
    /// adversarial negative target, only reachable with PoW checking
    /// disabled) contributes zero work.
    pub fn work(&self) -> BigInt {
        let denom = self.bits.target() + 1u32;
        if denom.sign() != Sign::Plus {
            return BigInt::zero();
        }
        (BigInt::one() << 256usize) / denom
    }

    /// Check the proof of work: the block hash, reinterpreted in reverse
    /// byte order as an unsigned big-endian integer, must not exceed the
    /// decoded target.
    pub fn check_pow(&self) -> bool {
        let hash = BigInt::from_bytes_be(Sign::Plus, &self.block_hash.reversed());
        hash <= *self.bits.target()
    }
}

fn compute_block_hash(
    version: u32,
    previous: &Hash,
    merkle_root: &Hash,
    timestamp: u32,
    bits: &TargetBits,
    nonce: u32,
) -> Hash {
    let mut buf = Vec::with_capacity(HEADER_SIZE);
    write_u32_le(&mut buf, version).expect("write to Vec cannot fail");
    previous.write_to(&mut buf).expect("write to Vec cannot fail");
    merkle_root.write_to(&mut buf).expect("write to Vec cannot fail");
    write_u32_le(&mut buf, timestamp).expect("write to Vec cannot fail");
    bits.write_to(&mut buf).expect("write to Vec cannot fail");
    write_u32_le(&mut buf, nonce).expect("write to Vec cannot fail");
    debug_assert_eq!(buf.len(), HEADER_SIZE);
    Hash::new(sha256d(&buf))
}

/// Serde representation: the constructed fields only; the cached hash is
/// recomputed on deserialization.
#[derive(Serialize, Deserialize)]
struct HeaderRepr {
    version: u32,
    previous: Hash,
    merkle_root: Hash,
    timestamp: u32,
    bits: TargetBits,
    nonce: u32,
    tx_count: u64,
}

impl Serialize for BlockHeader {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        HeaderRepr {
            version: self.version,
            previous: self.previous,
            merkle_root: self.merkle_root,
            timestamp: self.timestamp,
            bits: self.bits.clone(),
            nonce: self.nonce,
            tx_count: self.tx_count,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BlockHeader {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let r = HeaderRepr::deserialize(deserializer)?;
        Ok(BlockHeader::new(
            r.version,
            r.previous,
            r.merkle_root,
            r.timestamp,
            r.bits,
            r.nonce,
            r.tx_count,
        ))
    }
}
