// SPDX-License-Identifier: Apache-2.0

//! Dangling-node removal by rebuilding.
//!
//! Only logic reachable from a combinational output is copied. Rebuilding
//! goes through the destination's own node constructors, so structural
//! hashing and constant folding apply again to the copied gates.

use crate::network::{Network, NodeRef};
use crate::node_map::NodeMap;
use crate::topo::topo_order;

/// Copies the live logic of `src` into `dest`, driving the combinational
/// inputs of `src` (PIs, then ROs) by `cis`. Returns the signals that
/// correspond to the combinational outputs of `src` (POs, then RIs); no
/// outputs are created in `dest`.
pub fn cleanup_dangling_into<N: Network>(src: &N, dest: &mut N, cis: &[N::Signal]) -> Vec<N::Signal> {
    assert_eq!(
        cis.len(),
        src.num_cis(),
        "cleanup_dangling_into: {} input signals for {} combinational inputs",
        cis.len(),
        src.num_cis()
    );
    let mut old_to_new: NodeMap<Option<N::Signal>> = NodeMap::new(src);
    for (ci, s) in src.cis().into_iter().zip(cis.iter()) {
        old_to_new[ci] = Some(*s);
    }

    let map_fanin = |dest: &mut N, old_to_new: &NodeMap<Option<N::Signal>>, f: N::Signal| {
        let child: NodeRef = src.get_node(f);
        let Some(s) = old_to_new[child] else {
            panic!("cleanup_dangling_into: node {} used before it was copied", child.id);
        };
        if src.is_complemented(f) {
            dest.create_not(s)
        } else {
            s
        }
    };

    for n in topo_order(src) {
        if src.is_constant(n) {
            old_to_new[n] = Some(dest.get_constant(src.constant_value(n)));
            continue;
        }
        if src.is_ci(n) {
            continue;
        }
        let children: Vec<N::Signal> = src
            .fanins(n)
            .iter()
            .map(|f| map_fanin(dest, &old_to_new, *f))
            .collect();
        old_to_new[n] = Some(dest.clone_node(src, n, &children));
    }

    src.cos()
        .into_iter()
        .map(|co| map_fanin(dest, &old_to_new, co))
        .collect()
}

/// Returns a copy of `ntk` without dangling nodes. Inputs and outputs keep
/// their order; scratch values and event subscriptions are not carried over.
pub fn cleanup_dangling<N: Network>(ntk: &N) -> N {
    let mut dest = N::empty();
    let mut cis = Vec::with_capacity(ntk.num_cis());
    for _ in ntk.pis() {
        cis.push(dest.create_pi());
    }
    for _ in ntk.ros() {
        cis.push(dest.create_ro());
    }
    let outputs = cleanup_dangling_into(ntk, &mut dest, &cis);
    let (pos, ris) = outputs.split_at(ntk.num_pos());
    for s in pos {
        dest.create_po(*s);
    }
    for s in ris {
        dest.create_ri(*s);
    }
    log::debug!(
        "cleanup_dangling: {} nodes -> {} nodes ({} gates)",
        ntk.size(),
        dest.size(),
        dest.num_gates()
    );
    dest
}
