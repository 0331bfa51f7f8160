//! Header-tree engine for a proof-of-work chain.
//!
//! This crate tracks the tree of all known block headers and selects the
//! canonical chain by cumulative work:
//! - Proof-of-work and difficulty-retarget validation on ingest
//! - Out-of-order ("orphan") header buffering with cascading attachment
//! - Chain reorganization with observer notification
//! - Sparse ancestor sampling ("block locator") for header sync
//!
//! The tree is in-memory only and purely CPU-bound; persistence is a matter
//! of replaying [`BlockTree::add`] over a stored header log. All consensus
//! constants are explicit per-tree configuration ([`ChainParams`]), so
//! independent trees for different networks coexist safely in one process.
//!
//! # Example
//!
//! ```ignore
//! use headwater_chain::{BlockTree, ChainParams};
//!
//! let mut tree = BlockTree::new(ChainParams::mainnet());
//! for header in headers {
//!     tree.add(header)?;
//! }
//! let locator = tree.block_locator();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod link;
mod locator;
mod monitor;
mod params;
mod retarget;
mod tree;

pub use error::{MisbehaveError, Severity, TreeResult};
pub use link::BlockTreeLink;
pub use monitor::TreeMonitor;
pub use params::{ChainParams, DEFAULT_MAX_ORPHANS, RETARGET_INTERVAL, RETARGET_TIMESPAN};
pub use tree::BlockTree;
