//! Block locator construction.
//!
//! A locator samples canonical ancestors densely near the tip and then at
//! exponentially growing distances, so a sync peer can find the common
//! ancestor in O(log height) hashes even across deep reorgs.

use headwater_core::Hash;

use crate::tree::BlockTree;

/// Number of dense entries before the step starts doubling.
const DENSE_PREFIX: usize = 10;

/// Build the locator for the current canonical chain.
///
/// The result walks from the tip: the most recent `min(height, 9)` ancestors
/// plus the tip form a dense prefix, after which the step doubles per entry.
/// The final entry is always the genesis hash.
pub(crate) fn block_locator(tree: &BlockTree) -> Vec<Hash> {
    let main_chain = tree.main_chain();
    let mut locator = Vec::with_capacity(DENSE_PREFIX + 2);

    let mut height = tree.height();
    let mut step: u64 = 1;
    loop {
        locator.push(main_chain[height as usize]);
        if height == 0 {
            break;
        }
        if locator.len() >= DENSE_PREFIX {
            step *= 2;
        }
        height = height.saturating_sub(step);
    }

    locator
}
