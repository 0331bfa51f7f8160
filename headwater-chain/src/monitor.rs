//! Reorg observer interface.

use headwater_core::BlockHeader;

/// Observer notified of every header gained or lost by the canonical chain.
///
/// During a reorganization the tree delivers all replaced headers
/// (tip-to-fork order, `replaced = true`), then all added headers
/// (fork-to-tip order, `replaced = false`), with no interleaving. A plain
/// tip extension is the degenerate case: nothing replaced, one added.
///
/// Callbacks run synchronously inside the tree's mutating call; a slow
/// monitor stalls ingestion, so implementations should be fast or hand work
/// off to their own queues.
pub trait TreeMonitor {
    /// Handle one header event.
    fn handle(&mut self, header: &BlockHeader, replaced: bool);
}
