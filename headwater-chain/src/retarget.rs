//! Difficulty retargeting.
//!
//! The standard exponential adjustment: every `retarget_interval` blocks the
//! target is scaled by the ratio of the observed interval timespan to the
//! nominal one, clamped to a factor of four in either direction and to the
//! network's maximum target. Between boundaries the target is unchanged
//! from the parent.

use num_bigint::BigInt;

use headwater_core::TargetBits;

use crate::link::BlockTreeLink;
use crate::tree::BlockTree;

/// Compute the expected target for a successor of `prev`.
///
/// # Panics
///
/// Panics if the interval walk runs past genesis, which the boundary
/// precondition makes unreachable: a boundary at height `h` means `h` is a
/// positive multiple of the interval, so `interval - 1` ancestors of the
/// parent exist.
pub(crate) fn expected_target(tree: &BlockTree, prev: &BlockTreeLink) -> TargetBits {
    let params = tree.params();
    let interval = u64::from(params.retarget_interval);

    if (prev.height() + 1) % interval != 0 {
        return prev.header().bits().clone();
    }

    // First link of the closing interval: interval - 1 blocks behind the
    // parent.
    let mut first = prev;
    for _ in 0..params.retarget_interval - 1 {
        let parent = first
            .previous()
            .expect("retarget scan walked past genesis");
        first = tree.link(parent).expect("ancestor link must exist");
    }

    let end = i64::from(prev.header().timestamp());
    let start = i64::from(first.header().timestamp());
    let nominal = i64::from(params.retarget_timespan);
    let timespan = (end - start).clamp(nominal / 4, nominal * 4);

    let mut new_target = prev.header().bits().target() * BigInt::from(timespan);
    new_target /= BigInt::from(nominal);
    if new_target > params.max_target {
        new_target.clone_from(&params.max_target);
    }

    TargetBits::from_target(&new_target)
}
