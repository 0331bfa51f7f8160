//! Per-tree consensus configuration.
//!
//! Consensus constants are explicit configuration passed into the tree, not
//! process-wide singletons, so independent trees (mainnet/testnet, isolated
//! test instances) coexist safely.

use num_bigint::BigInt;
use num_traits::One;

use headwater_core::{BlockHeader, Hash, TargetBits};

/// Number of blocks between difficulty retargets.
pub const RETARGET_INTERVAL: u32 = 2016;

/// Nominal timespan of one retarget interval in seconds (two weeks).
pub const RETARGET_TIMESPAN: u32 = 14 * 24 * 60 * 60;

/// Default bound on the orphan buffer.
pub const DEFAULT_MAX_ORPHANS: usize = 1024;

/// Consensus configuration for one header tree.
#[derive(Clone, Debug)]
pub struct ChainParams {
    /// The genesis header; occupies height 0 of every chain.
    pub genesis: BlockHeader,

    /// Ceiling on the retargeted difficulty target.
    pub max_target: BigInt,

    /// Whether proof-of-work and difficulty are enforced. Disabled for test
    /// networks.
    pub check_pow: bool,

    /// Blocks between difficulty retargets.
    pub retarget_interval: u32,

    /// Nominal seconds per retarget interval.
    pub retarget_timespan: u32,

    /// Orphan-buffer bound; the oldest slot is evicted beyond this.
    pub max_orphans: usize,
}

impl ChainParams {
    /// Parameters for the Bitcoin main network.
    pub fn mainnet() -> Self {
        // Merkle root in wire order (reversed display hex
        // 4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b).
        let merkle = Hash::new([
            0x3b, 0xa3, 0xed, 0xfd, 0x7a, 0x7b, 0x12, 0xb2, 0x7a, 0xc7, 0x2c, 0x3e, 0x67, 0x76,
            0x8f, 0x61, 0x7f, 0xc8, 0x1b, 0xc3, 0x88, 0x8a, 0x51, 0x32, 0x3a, 0x9f, 0xb8, 0xaa,
            0x4b, 0x1e, 0x5e, 0x4a,
        ]);
        let genesis = BlockHeader::new(
            1,
            Hash::ZERO,
            merkle,
            1231006505,
            TargetBits::from_bits(0x1d00ffff),
            2083236893,
            0,
        );
        ChainParams {
            genesis,
            max_target: (BigInt::one() << (256 - 32) as usize) - 1,
            check_pow: true,
            retarget_interval: RETARGET_INTERVAL,
            retarget_timespan: RETARGET_TIMESPAN,
            max_orphans: DEFAULT_MAX_ORPHANS,
        }
    }

    /// Parameters with proof-of-work and difficulty enforcement disabled,
    /// for test networks and simulation.
    pub fn unchecked(genesis: BlockHeader) -> Self {
        ChainParams {
            genesis,
            max_target: (BigInt::one() << (256 - 32) as usize) - 1,
            check_pow: false,
            retarget_interval: RETARGET_INTERVAL,
            retarget_timespan: RETARGET_TIMESPAN,
            max_orphans: DEFAULT_MAX_ORPHANS,
        }
    }
}
