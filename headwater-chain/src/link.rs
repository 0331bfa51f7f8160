//! Tree node wrapping one header.

use num_bigint::BigInt;
use num_traits::Zero;

use headwater_core::{BlockHeader, Hash};

/// One node of the header tree.
///
/// Links form an arena keyed by block hash: a node stores its parent's key
/// and its children's keys rather than references, keeping ownership acyclic
/// for a long-lived, ever-growing structure. Created once per accepted
/// header; only the canonical-chain markers change afterwards, during
/// reorgs.
#[derive(Clone, Debug)]
pub struct BlockTreeLink {
    previous: Option<Hash>,
    header: BlockHeader,
    children: Vec<Hash>,
    chain_work: BigInt,
    height: u64,
    main_child: Option<usize>,
    on_main: bool,
}

impl BlockTreeLink {
    /// Create a non-genesis link. Not yet marked canonical.
    pub(crate) fn new(previous: Hash, header: BlockHeader, chain_work: BigInt, height: u64) -> Self {
        BlockTreeLink {
            previous: Some(previous),
            header,
            children: Vec::new(),
            chain_work,
            height,
            main_child: None,
            on_main: false,
        }
    }

    /// Create the genesis link: height 0, no parent, zero cumulative work,
    /// canonical from birth.
    pub(crate) fn genesis(header: BlockHeader) -> Self {
        BlockTreeLink {
            previous: None,
            header,
            children: Vec::new(),
            chain_work: BigInt::zero(),
            height: 0,
            main_child: None,
            on_main: true,
        }
    }

    /// The parent's hash; `None` only for genesis.
    #[inline]
    pub fn previous(&self) -> Option<&Hash> {
        self.previous.as_ref()
    }

    /// The wrapped header.
    #[inline]
    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    /// Child hashes in arrival order.
    #[inline]
    pub fn children(&self) -> &[Hash] {
        &self.children
    }

    /// Cumulative work from genesis through this header.
    #[inline]
    pub fn chain_work(&self) -> &BigInt {
        &self.chain_work
    }

    /// Distance from genesis.
    #[inline]
    pub fn height(&self) -> u64 {
        self.height
    }

    /// Whether this link is currently on the canonical chain.
    #[inline]
    pub fn is_on_main(&self) -> bool {
        self.on_main
    }

    /// The child continuing the canonical chain, or `None` at the tip or on
    /// a fork.
    pub fn main_child(&self) -> Option<&Hash> {
        self.main_child.map(|i| &self.children[i])
    }

    pub(crate) fn push_child(&mut self, child: Hash) {
        self.children.push(child);
    }

    /// Record which child continues the canonical chain.
    ///
    /// # Panics
    ///
    /// Panics if `child` is not one of this link's children — that is an
    /// internal invariant violation, not a recoverable condition.
    pub(crate) fn set_main_child(&mut self, child: &Hash) {
        let index = self
            .children
            .iter()
            .position(|c| c == child)
            .expect("main child not recorded on parent link");
        self.main_child = Some(index);
        self.on_main = true;
    }

    /// Mark this link canonical without choosing a main child (the tip).
    pub(crate) fn set_on_main(&mut self) {
        self.on_main = true;
    }

    /// Clear the canonical markers on this node only; callers walk ancestors
    /// explicitly when needed.
    pub(crate) fn set_on_fork(&mut self) {
        self.on_main = false;
        self.main_child = None;
    }
}
