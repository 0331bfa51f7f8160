//! The header tree and chain-selection engine.

use std::collections::{HashMap, VecDeque};

use num_bigint::BigInt;
use num_traits::Zero;

use headwater_core::{BlockHeader, Hash, TargetBits};

use crate::error::{MisbehaveError, TreeResult};
use crate::link::BlockTreeLink;
use crate::locator::block_locator;
use crate::monitor::TreeMonitor;
use crate::params::ChainParams;
use crate::retarget::expected_target;

/// Tree of all known block headers with canonical-chain selection by
/// cumulative work.
///
/// Headers arrive from untrusted, concurrent sources in arbitrary order; the
/// tree validates them, buffers the ones whose parent is still unknown, and
/// reorganizes the canonical chain whenever a path with strictly more
/// cumulative work appears. Every mutating or reading operation takes the
/// whole tree exclusively (`&mut self` / `&self`); shared use across
/// ingestion tasks is a `Mutex<BlockTree>` at the session layer, which also
/// guarantees a reorg is never partially visible.
pub struct BlockTree {
    params: ChainParams,

    /// Every connected, known header by hash.
    tree: HashMap<Hash, BlockTreeLink>,

    /// Headers whose parent is unknown, keyed by the missing parent hash.
    /// One slot per missing parent; the newest header wins the slot.
    orphans: HashMap<Hash, BlockHeader>,

    /// Orphan keys in slot-creation order, for eviction.
    orphan_order: VecDeque<Hash>,

    /// Canonical chain, indexed by height; entry 0 is genesis.
    main_chain: Vec<Hash>,

    /// Cumulative work of the canonical tip.
    best_work: BigInt,

    /// Hash of the canonical tip.
    main_tip: Hash,

    monitors: Vec<Box<dyn TreeMonitor>>,
}

impl BlockTree {
    /// Create a tree holding only the genesis header of `params`.
    pub fn new(params: ChainParams) -> Self {
        let genesis_hash = *params.genesis.block_hash();
        let mut tree = HashMap::new();
        tree.insert(genesis_hash, BlockTreeLink::genesis(params.genesis.clone()));

        BlockTree {
            params,
            tree,
            orphans: HashMap::new(),
            orphan_order: VecDeque::new(),
            main_chain: vec![genesis_hash],
            best_work: BigInt::zero(),
            main_tip: genesis_hash,
            monitors: Vec::new(),
        }
    }

    /// Register an observer for canonical-chain changes.
    pub fn register_monitor(&mut self, monitor: Box<dyn TreeMonitor>) {
        self.monitors.push(monitor);
    }

    /// Ingest one header, draining any orphans that were waiting on it.
    ///
    /// Returns `Ok(false)` only when the header (or an orphan drained behind
    /// it) is already known — no new data. Returns `Ok(true)` when the
    /// header was attached or buffered as an orphan.
    ///
    /// A consensus violation (failed proof of work, wrong difficulty) aborts
    /// only the current header; orphans queued on unrelated branches are
    /// unaffected.
    pub fn add(&mut self, header: BlockHeader) -> TreeResult<bool> {
        let mut header = header;
        loop {
            if self.params.check_pow && !header.check_pow() {
                return Err(MisbehaveError::critical("insufficient proof of work"));
            }

            let prev_hash = *header.previous();
            if !self.tree.contains_key(&prev_hash) {
                self.buffer_orphan(prev_hash, header);
                return Ok(true);
            }
            let prev_link = self
                .tree
                .get(&prev_hash)
                .expect("parent link present, checked above");

            if self.params.check_pow {
                let expected = expected_target(self, prev_link);
                if expected != *header.bits() {
                    return Err(MisbehaveError::critical("incorrect difficulty target"));
                }
            }

            let block_hash = *header.block_hash();
            if self.tree.contains_key(&block_hash) {
                return Ok(false);
            }

            let chain_work = prev_link.chain_work() + header.work();
            let height = prev_link.height() + 1;

            let link = BlockTreeLink::new(prev_hash, header, chain_work.clone(), height);
            self.tree
                .get_mut(&prev_hash)
                .expect("parent link present, checked above")
                .push_child(block_hash);
            assert!(
                self.tree.insert(block_hash, link).is_none(),
                "header inserted into tree twice"
            );

            if chain_work > self.best_work {
                self.reorganize(block_hash, chain_work);
            } else {
                tracing::trace!(block = %block_hash, height, "header attached to known fork");
                self.tree
                    .get_mut(&block_hash)
                    .expect("link just inserted")
                    .set_on_fork();
            }

            match self.take_orphan(&block_hash) {
                Some(next) => header = next,
                None => return Ok(true),
            }
        }
    }

    /// Replace the canonical suffix with the higher-work path ending at
    /// `new_tip`, firing monitors with the replaced set (tip-to-fork order)
    /// then the added set (fork-to-tip order).
    fn reorganize(&mut self, new_tip: Hash, new_work: BigInt) {
        let old_tip = self.main_tip;

        // Walk both tips back to the fork point, collecting each side.
        let mut replaced: Vec<Hash> = Vec::new();
        let mut added: Vec<Hash> = Vec::new();
        let mut old = old_tip;
        let mut new = new_tip;
        while self.link_height(&old) > self.link_height(&new) {
            replaced.push(old);
            old = self.parent_hash(&old);
        }
        while self.link_height(&new) > self.link_height(&old) {
            added.push(new);
            new = self.parent_hash(&new);
        }
        while old != new {
            replaced.push(old);
            old = self.parent_hash(&old);
            added.push(new);
            new = self.parent_hash(&new);
        }
        // Added side was collected tip-to-fork; deliver fork-to-tip.
        added.reverse();

        let fork = old;
        let fork_height = self.link_height(&fork);

        for hash in &replaced {
            self.tree
                .get_mut(hash)
                .expect("replaced link must exist")
                .set_on_fork();
        }

        self.main_chain.truncate(fork_height as usize + 1);
        for hash in &added {
            let parent = self.parent_hash(hash);
            self.tree
                .get_mut(&parent)
                .expect("added link's parent must exist")
                .set_main_child(hash);
            self.main_chain.push(*hash);
        }
        self.tree
            .get_mut(&new_tip)
            .expect("new tip must exist")
            .set_on_main();

        debug_assert_eq!(self.main_chain.len() as u64 - 1, self.link_height(&new_tip));

        if !replaced.is_empty() {
            tracing::info!(
                depth = replaced.len(),
                fork_height,
                tip = %new_tip,
                "canonical chain reorganized"
            );
        }

        self.best_work = new_work;
        self.main_tip = new_tip;

        // Monitors run while the tree is otherwise quiescent; take the list
        // out so header lookups stay available during delivery.
        let mut monitors = std::mem::take(&mut self.monitors);
        for hash in &replaced {
            let header = self.link(hash).expect("replaced link must exist").header();
            for monitor in monitors.iter_mut() {
                monitor.handle(header, true);
            }
        }
        for hash in &added {
            let header = self.link(hash).expect("added link must exist").header();
            for monitor in monitors.iter_mut() {
                monitor.handle(header, false);
            }
        }
        self.monitors = monitors;
    }

    fn buffer_orphan(&mut self, parent: Hash, header: BlockHeader) {
        tracing::debug!(
            parent = %parent,
            block = %header.block_hash(),
            "parent unknown, buffering orphan header"
        );
        if self.orphans.insert(parent, header).is_none() {
            self.orphan_order.push_back(parent);
            if self.orphan_order.len() > self.params.max_orphans {
                if let Some(evicted_key) = self.orphan_order.pop_front() {
                    if let Some(evicted) = self.orphans.remove(&evicted_key) {
                        tracing::warn!(
                            block = %evicted.block_hash(),
                            "orphan buffer full, evicted oldest slot"
                        );
                    }
                }
            }
        }
    }

    fn take_orphan(&mut self, hash: &Hash) -> Option<BlockHeader> {
        let header = self.orphans.remove(hash)?;
        if let Some(pos) = self.orphan_order.iter().position(|h| h == hash) {
            self.orphan_order.remove(pos);
        }
        Some(header)
    }

    /// The canonical header at `height`, if the chain is that tall.
    pub fn header_at(&self, height: u64) -> Option<&BlockHeader> {
        let hash = self.main_chain.get(usize::try_from(height).ok()?)?;
        Some(self.link(hash).expect("main chain entry must exist").header())
    }

    /// The parent of a known header.
    pub fn parent_of(&self, hash: &Hash) -> Option<&BlockHeader> {
        let parent = self.link(hash)?.previous()?;
        Some(self.link(parent).expect("parent link must exist").header())
    }

    /// The canonical child of a known header, or `None` at the tip or on a
    /// fork.
    pub fn next_of(&self, hash: &Hash) -> Option<&BlockHeader> {
        let child = self.link(hash)?.main_child()?;
        Some(self.link(child).expect("child link must exist").header())
    }

    /// All children of a known header, in arrival order. `None` if the
    /// header itself is unknown.
    pub fn children_of(&self, hash: &Hash) -> Option<Vec<&BlockHeader>> {
        let link = self.link(hash)?;
        Some(
            link.children()
                .iter()
                .map(|c| self.link(c).expect("child link must exist").header())
                .collect(),
        )
    }

    /// Whether the hash names a known header on the canonical chain.
    pub fn is_on_main(&self, hash: &Hash) -> bool {
        self.link(hash).is_some_and(|l| l.is_on_main())
    }

    /// Whether the hash names any known connected header.
    pub fn contains(&self, hash: &Hash) -> bool {
        self.tree.contains_key(hash)
    }

    /// Height of a known header (canonical or not).
    pub fn height_of(&self, hash: &Hash) -> Option<u64> {
        Some(self.link(hash)?.height())
    }

    /// Confirmation count of a canonical header: 1 at the tip, more below
    /// it. `None` for unknown or non-canonical headers.
    pub fn confirmations(&self, hash: &Hash) -> Option<u64> {
        let link = self.link(hash)?;
        if !link.is_on_main() {
            return None;
        }
        Some(self.height() - link.height() + 1)
    }

    /// The expected target for a successor of the given parent, per the
    /// retarget rule. `None` if the parent is unknown.
    pub fn expected_target(&self, parent: &Hash) -> Option<TargetBits> {
        Some(expected_target(self, self.link(parent)?))
    }

    /// Sparse, exponentially spaced ancestor hashes for header sync: recent
    /// history dense, then doubling steps, always ending at genesis.
    pub fn block_locator(&self) -> Vec<Hash> {
        block_locator(self)
    }

    /// The canonical tip header.
    pub fn tip(&self) -> &BlockHeader {
        self.link(&self.main_tip).expect("tip link must exist").header()
    }

    /// Height of the canonical tip.
    pub fn height(&self) -> u64 {
        self.main_chain.len() as u64 - 1
    }

    /// Cumulative work of the canonical tip.
    pub fn best_work(&self) -> &BigInt {
        &self.best_work
    }

    /// The genesis hash.
    pub fn genesis_hash(&self) -> &Hash {
        &self.main_chain[0]
    }

    /// Number of connected headers, genesis included.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Always false: the tree at least holds genesis.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of buffered orphan slots.
    pub fn orphan_count(&self) -> usize {
        self.orphans.len()
    }

    /// Look up the tree link for a hash.
    pub fn link(&self, hash: &Hash) -> Option<&BlockTreeLink> {
        self.tree.get(hash)
    }

    pub(crate) fn params(&self) -> &ChainParams {
        &self.params
    }

    pub(crate) fn main_chain(&self) -> &[Hash] {
        &self.main_chain
    }

    fn link_height(&self, hash: &Hash) -> u64 {
        self.link(hash).expect("link must exist").height()
    }

    fn parent_hash(&self, hash: &Hash) -> Hash {
        *self
            .link(hash)
            .expect("link must exist")
            .previous()
            .expect("walked past genesis")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use headwater_core::TargetBits;
    use num_traits::One;

    fn genesis() -> BlockHeader {
        header_on(&Hash::ZERO, 0)
    }

    /// Deterministic pseudo-random child of `previous`.
    fn header_on(previous: &Hash, salt: u32) -> BlockHeader {
        let merkle = Hash::new(headwater_core::crypto::sha256(&salt.to_le_bytes()));
        BlockHeader::new(
            1,
            *previous,
            merkle,
            salt,
            TargetBits::from_target(&BigInt::one()),
            0,
            0,
        )
    }

    fn tree() -> (BlockTree, BlockHeader) {
        let g = genesis();
        (BlockTree::new(ChainParams::unchecked(g.clone())), g)
    }

    #[test]
    fn test_new_tree_holds_genesis() {
        let (tree, g) = tree();
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.header_at(0), Some(&g));
        assert_eq!(tree.tip(), &g);
        assert!(tree.is_on_main(g.block_hash()));
        assert!(tree.best_work().is_zero());
        assert!(!tree.is_empty());
    }

    #[test]
    fn test_extend_tip() {
        let (mut tree, g) = tree();
        let h1 = header_on(g.block_hash(), 1);
        let h2 = header_on(h1.block_hash(), 2);

        assert!(tree.add(h1.clone()).unwrap());
        assert!(tree.add(h2.clone()).unwrap());

        assert_eq!(tree.height(), 2);
        assert_eq!(tree.header_at(1), Some(&h1));
        assert_eq!(tree.header_at(2), Some(&h2));
        assert_eq!(tree.header_at(3), None);
        assert!(tree.is_on_main(h1.block_hash()));
        assert!(tree.is_on_main(h2.block_hash()));
        assert_eq!(tree.tip(), &h2);
    }

    #[test]
    fn test_duplicate_returns_false_and_changes_nothing() {
        let (mut tree, g) = tree();
        let h1 = header_on(g.block_hash(), 1);
        assert!(tree.add(h1.clone()).unwrap());

        let len = tree.len();
        let height = tree.height();
        let work = tree.best_work().clone();

        assert!(!tree.add(h1.clone()).unwrap());
        assert_eq!(tree.len(), len);
        assert_eq!(tree.height(), height);
        assert_eq!(tree.best_work(), &work);
    }

    #[test]
    fn test_orphan_buffered_then_attached() {
        let (mut tree, g) = tree();
        let h1 = header_on(g.block_hash(), 1);
        let h2 = header_on(h1.block_hash(), 2);

        assert!(tree.add(h2.clone()).unwrap());
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.orphan_count(), 1);
        assert!(!tree.contains(h2.block_hash()));

        assert!(tree.add(h1.clone()).unwrap());
        assert_eq!(tree.height(), 2);
        assert_eq!(tree.orphan_count(), 0);
        assert_eq!(tree.header_at(2), Some(&h2));
    }

    #[test]
    fn test_orphan_slot_newest_wins() {
        let (mut tree, g) = tree();
        let h1 = header_on(g.block_hash(), 1);
        let a = header_on(h1.block_hash(), 2);
        let b = header_on(h1.block_hash(), 3);

        assert!(tree.add(a.clone()).unwrap());
        assert!(tree.add(b.clone()).unwrap());
        assert_eq!(tree.orphan_count(), 1);

        assert!(tree.add(h1.clone()).unwrap());
        // Only the newest orphan for the slot attached.
        assert!(tree.contains(b.block_hash()));
        assert!(!tree.contains(a.block_hash()));
    }

    #[test]
    fn test_parent_next_and_children() {
        let (mut tree, g) = tree();
        let h1 = header_on(g.block_hash(), 1);
        let h2 = header_on(h1.block_hash(), 2);
        let fork = header_on(h1.block_hash(), 3);
        tree.add(h1.clone()).unwrap();
        tree.add(h2.clone()).unwrap();
        tree.add(fork.clone()).unwrap();

        assert_eq!(tree.parent_of(h1.block_hash()), Some(&g));
        assert_eq!(tree.parent_of(g.block_hash()), None);
        assert_eq!(tree.parent_of(&Hash::new([9; 32])), None);

        assert_eq!(tree.next_of(g.block_hash()), Some(&h1));
        assert_eq!(tree.next_of(h1.block_hash()), Some(&h2));
        assert_eq!(tree.next_of(h2.block_hash()), None);
        assert_eq!(tree.next_of(fork.block_hash()), None);

        let children = tree.children_of(h1.block_hash()).unwrap();
        assert_eq!(children, vec![&h2, &fork]);
        assert_eq!(tree.children_of(&Hash::new([9; 32])), None);
    }

    #[test]
    fn test_confirmations() {
        let (mut tree, g) = tree();
        let h1 = header_on(g.block_hash(), 1);
        let h2 = header_on(h1.block_hash(), 2);
        let fork = header_on(g.block_hash(), 3);
        tree.add(h1.clone()).unwrap();
        tree.add(h2.clone()).unwrap();
        tree.add(fork.clone()).unwrap();

        assert_eq!(tree.confirmations(h2.block_hash()), Some(1));
        assert_eq!(tree.confirmations(h1.block_hash()), Some(2));
        assert_eq!(tree.confirmations(g.block_hash()), Some(3));
        assert_eq!(tree.confirmations(fork.block_hash()), None);
        assert_eq!(tree.confirmations(&Hash::new([9; 32])), None);
    }

    #[test]
    fn test_equal_work_keeps_existing_chain() {
        let (mut tree, g) = tree();
        let h1 = header_on(g.block_hash(), 1);
        let rival = header_on(g.block_hash(), 2);
        tree.add(h1.clone()).unwrap();
        tree.add(rival.clone()).unwrap();

        assert_eq!(tree.header_at(1), Some(&h1));
        assert!(tree.is_on_main(h1.block_hash()));
        assert!(!tree.is_on_main(rival.block_hash()));
        assert_eq!(tree.height_of(rival.block_hash()), Some(1));
    }

    #[test]
    fn test_orphan_eviction_drops_oldest_slot() {
        let g = genesis();
        let mut params = ChainParams::unchecked(g.clone());
        params.max_orphans = 2;
        let mut tree = BlockTree::new(params);

        let h1 = header_on(g.block_hash(), 1);
        let a = header_on(h1.block_hash(), 2);
        let b = header_on(a.block_hash(), 3);
        let c = header_on(b.block_hash(), 4);

        tree.add(a.clone()).unwrap();
        tree.add(b.clone()).unwrap();
        tree.add(c.clone()).unwrap();
        // Slot keyed by h1 (waiting for a's parent) was evicted.
        assert_eq!(tree.orphan_count(), 2);

        tree.add(h1.clone()).unwrap();
        // a was evicted, so nothing cascades.
        assert_eq!(tree.height(), 1);
        assert!(!tree.contains(a.block_hash()));
    }
}
