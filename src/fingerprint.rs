// SPDX-License-Identifier: Apache-2.0

//! Structural fingerprints that ignore node numbering.
//!
//! Two networks get the same fingerprint when their output cones are
//! isomorphic: same inputs in the same order, same node functions, same
//! fanin order and polarities. Dangling nodes do not contribute.

use ahash::AHashMap;

use crate::network::{Network, NodeRef, SignalLike};
use crate::topo::cone_postorder;

const TAG_GATE: u8 = 0;
const TAG_INPUT: u8 = 1;
const TAG_CONSTANT: u8 = 2;

fn node_hash<N: Network>(
    ntk: &N,
    n: NodeRef,
    input_position: &AHashMap<NodeRef, usize>,
    memo: &AHashMap<NodeRef, blake3::Hash>,
) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new();
    if ntk.is_constant(n) {
        hasher.update(&[TAG_CONSTANT, ntk.constant_value(n) as u8]);
    } else if ntk.is_ci(n) {
        hasher.update(&[TAG_INPUT, ntk.is_ro(n) as u8]);
        hasher.update(&(input_position[&n] as u64).to_le_bytes());
    } else {
        hasher.update(&[TAG_GATE]);
        for w in ntk.node_function(n).words() {
            hasher.update(&w.to_le_bytes());
        }
        let mut children: Vec<([u8; 32], u8)> = ntk
            .fanins(n)
            .iter()
            .map(|f| (*memo[&f.node()].as_bytes(), f.is_complemented() as u8))
            .collect();
        // Fanin order of symmetric gates follows node numbering.
        if ntk.storage().symmetric_gates() {
            children.sort();
        }
        for (child, negated) in children {
            hasher.update(&child);
            hasher.update(&[negated]);
        }
    }
    hasher.finalize()
}

/// Fingerprint of everything reachable from the combinational outputs.
pub fn network_fingerprint<N: Network>(ntk: &N) -> blake3::Hash {
    let cis = ntk.cis();
    let input_position: AHashMap<NodeRef, usize> =
        cis.iter().enumerate().map(|(i, n)| (*n, i)).collect();
    let cos = ntk.cos();
    let roots: Vec<NodeRef> = cos.iter().map(|s| s.node()).collect();

    let mut memo: AHashMap<NodeRef, blake3::Hash> = AHashMap::new();
    for n in cis.iter() {
        let h = node_hash(ntk, *n, &input_position, &memo);
        memo.insert(*n, h);
    }
    for n in cone_postorder(ntk, &cis, &roots) {
        let h = node_hash(ntk, n, &input_position, &memo);
        memo.insert(n, h);
    }

    let mut hasher = blake3::Hasher::new();
    for count in [ntk.num_pis(), ntk.num_pos(), ntk.num_latches()] {
        hasher.update(&(count as u64).to_le_bytes());
    }
    for s in cos {
        hasher.update(memo[&s.node()].as_bytes());
        hasher.update(&[s.is_complemented() as u8]);
    }
    hasher.finalize()
}
