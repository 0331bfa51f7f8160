//! # Headwater Core
//!
//! Value types and wire codec for the Headwater header-tree engine:
//! - 32-byte block-hash identity type
//! - Compact proof-of-work target encoding ("bits")
//! - Immutable block headers with cached double-SHA-256 hashes
//! - Little-endian wire helpers and the variable-length count integer
//!
//! These types are consensus-critical values: immutable after construction
//! and freely shared by reference. Context validation (proof-of-work,
//! difficulty) belongs to the chain crate.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod crypto;
pub mod error;
pub mod hash;
pub mod header;
pub mod target;
pub mod varint;
pub mod wire;

// Re-export commonly used types at crate root
pub use error::{WireError, WireResult};
pub use hash::Hash;
pub use header::BlockHeader;
pub use target::TargetBits;
pub use varint::VarInt;
