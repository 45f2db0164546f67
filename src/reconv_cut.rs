// SPDX-License-Identifier: Apache-2.0

//! Reconvergence-driven cut computation.
//!
//! The cut grows from a set of pivots towards the inputs, always expanding
//! the leaf whose expansion adds the fewest new leaves, until every leaf is
//! an input or the next expansion would exceed the size bound.

use serde::{Deserialize, Serialize};

use crate::network::{Network, NodeRef};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconvCutParams {
    /// Maximum number of leaves.
    pub cut_size: usize,
}

impl Default for ReconvCutParams {
    fn default() -> Self {
        Self { cut_size: 10 }
    }
}

/// Net change in cut size when `n` is replaced by its children: -1 for `n`
/// itself plus one per non-constant fanin not yet in the walk.
fn expansion_cost<N: Network>(ntk: &N, n: NodeRef, trav_id: u32) -> i64 {
    let mut cost = -1i64;
    for f in ntk.fanins(n) {
        let child = ntk.get_node(*f);
        if !ntk.is_constant(child) && ntk.visited(child) != trav_id {
            cost += 1;
        }
    }
    cost
}

/// Computes a cut of at most `params.cut_size` leaves for `pivots`.
///
/// Marks are taken with a fresh traversal id, so scratch values are left
/// untouched.
pub fn reconvergence_driven_cut<N: Network>(
    ntk: &mut N,
    pivots: &[NodeRef],
    params: &ReconvCutParams,
) -> Vec<NodeRef> {
    assert!(!pivots.is_empty(), "reconvergence_driven_cut: empty pivot set");
    let trav_id = ntk.incr_trav_id();
    let mut cut: Vec<NodeRef> = Vec::with_capacity(params.cut_size);
    for p in pivots {
        if ntk.visited(*p) != trav_id {
            ntk.set_visited(*p, trav_id);
            cut.push(*p);
        }
    }

    loop {
        assert!(
            cut.len() <= params.cut_size,
            "cut-size overflow: {} leaves for a bound of {}",
            cut.len(),
            params.cut_size
        );
        let terminal = |n: NodeRef| ntk.is_ci(n) || ntk.is_constant(n);
        // Stable: equal-cost leaves keep their order, terminals go last.
        cut.sort_by_key(|n| (terminal(*n), expansion_cost(ntk, *n, trav_id)));

        let Some(pos) = cut.iter().position(|n| !terminal(*n)) else {
            break;
        };
        let n = cut[pos];
        let cost = expansion_cost(ntk, n, trav_id);
        if cut.len() as i64 + cost > params.cut_size as i64 {
            break;
        }

        cut.remove(pos);
        let fanins: Vec<NodeRef> = ntk.fanins(n).iter().map(|f| ntk.get_node(*f)).collect();
        for child in fanins {
            if !ntk.is_constant(child) && ntk.visited(child) != trav_id {
                ntk.set_visited(child, trav_id);
                cut.push(child);
            }
        }
    }
    log::trace!("reconvergence_driven_cut: pivots={:?} cut={:?}", pivots, cut);
    cut
}
