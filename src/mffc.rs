// SPDX-License-Identifier: Apache-2.0

//! Maximum fanout-free cone estimation over scratch reference counters.
//!
//! The walks read and write the per-node scratch values, which the caller
//! initialises to the fanout sizes. `recursive_deref` followed by
//! `recursive_ref` on the same node restores every counter it touched.

use crate::network::{Network, NodeRef};

pub trait NodeCostFn<N: Network> {
    fn cost(&self, ntk: &N, n: NodeRef) -> u32;
}

/// Every gate costs one.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitCost;

impl<N: Network> NodeCostFn<N> for UnitCost {
    fn cost(&self, _ntk: &N, _n: NodeRef) -> u32 {
        1
    }
}

fn is_terminal<N: Network>(ntk: &N, n: NodeRef) -> bool {
    ntk.is_constant(n) || ntk.is_ci(n)
}

fn fanin_nodes<N: Network>(ntk: &N, n: NodeRef) -> Vec<NodeRef> {
    ntk.fanins(n).iter().map(|f| ntk.get_node(*f)).collect()
}

/// Releases `n` and, transitively, every fanin whose counter drops to zero.
/// Returns the accumulated cost of the released gates.
pub fn recursive_deref<N: Network, C: NodeCostFn<N>>(ntk: &mut N, n: NodeRef, cost: &C) -> u32 {
    if is_terminal(ntk, n) {
        return 0;
    }
    let mut total = 0;
    let mut worklist = vec![n];
    while let Some(x) = worklist.pop() {
        total += cost.cost(ntk, x);
        for child in fanin_nodes(ntk, x) {
            if ntk.decr_value(child) == 0 && !is_terminal(ntk, child) {
                worklist.push(child);
            }
        }
    }
    total
}

/// Dual of [`recursive_deref`].
pub fn recursive_ref<N: Network, C: NodeCostFn<N>>(ntk: &mut N, n: NodeRef, cost: &C) -> u32 {
    if is_terminal(ntk, n) {
        return 0;
    }
    let mut total = 0;
    let mut worklist = vec![n];
    while let Some(x) = worklist.pop() {
        total += cost.cost(ntk, x);
        for child in fanin_nodes(ntk, x) {
            if ntk.incr_value(child) == 0 && !is_terminal(ntk, child) {
                worklist.push(child);
            }
        }
    }
    total
}

/// Like [`recursive_ref`], additionally reporting whether `target` is among
/// the referenced nodes or their fanins.
pub fn recursive_ref_contains<N: Network, C: NodeCostFn<N>>(
    ntk: &mut N,
    n: NodeRef,
    target: NodeRef,
    cost: &C,
) -> (u32, bool) {
    if is_terminal(ntk, n) {
        return (0, false);
    }
    let mut total = 0;
    let mut contains = false;
    let mut worklist = vec![n];
    while let Some(x) = worklist.pop() {
        total += cost.cost(ntk, x);
        contains |= x == target;
        for child in fanin_nodes(ntk, x) {
            contains |= child == target;
            if ntk.incr_value(child) == 0 && !is_terminal(ntk, child) {
                worklist.push(child);
            }
        }
    }
    (total, contains)
}

/// Cost of the cone that dies with `n`; leaves the counters unchanged.
pub fn mffc_size<N: Network, C: NodeCostFn<N>>(ntk: &mut N, n: NodeRef, cost: &C) -> u32 {
    let released = recursive_deref(ntk, n, cost);
    let restored = recursive_ref(ntk, n, cost);
    debug_assert_eq!(
        released, restored,
        "mffc_size: deref/ref mismatch at node {}",
        n.id
    );
    released
}

/// Initialises every scratch value to the node's fanout size.
pub fn init_reference_counts<N: Network>(ntk: &mut N) {
    ntk.clear_values();
    for n in ntk.nodes() {
        let fanout = ntk.fanout_size(n);
        ntk.set_value(n, fanout);
    }
}
