// SPDX-License-Identifier: Apache-2.0

//! Network-wide enumeration of k-feasible cuts with truth tables.
//!
//! Every node receives a bounded set of cuts, built by merging the cut sets
//! of its fanins in topological order. A cut whose leaves contain another
//! cut's leaves is dominated and dropped. The trivial cut `{n}` is always
//! kept as the last entry of a node's set.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::network::{Network, NodeRef, SignalLike};
use crate::topo::cone_postorder;
use crate::truth_table::TruthTable;
use crate::tt_cache::TruthTableCache;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutEnumerationParams {
    /// Maximum number of leaves per cut.
    pub cut_size: usize,
    /// Maximum number of cuts per node, trivial cut included.
    pub cut_limit: usize,
    /// Shrink each cut onto the support of its function.
    pub minimize_truth_table: bool,
}

impl Default for CutEnumerationParams {
    fn default() -> Self {
        Self {
            cut_size: 4,
            cut_limit: 12,
            minimize_truth_table: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cut<D> {
    leaves: Vec<NodeRef>,
    signature: u64,
    func: u32,
    pub data: D,
}

fn signature_of(leaves: &[NodeRef]) -> u64 {
    leaves.iter().fold(0u64, |acc, l| acc | (1u64 << (l.id % 64)))
}

impl<D> Cut<D> {
    pub fn leaves(&self) -> &[NodeRef] {
        &self.leaves
    }

    pub fn size(&self) -> usize {
        self.leaves.len()
    }

    /// True when every leaf of `self` is a leaf of `other`.
    pub fn dominates<E>(&self, other: &Cut<E>) -> bool {
        if self.leaves.len() > other.leaves.len() || (self.signature & other.signature) != self.signature {
            return false;
        }
        self.leaves.iter().all(|l| other.leaves.binary_search(l).is_ok())
    }
}

/// Cut sets of every node that existed when enumeration ran.
#[derive(Debug, Clone)]
pub struct NetworkCuts<D> {
    cuts: Vec<Vec<Cut<D>>>,
    cache: TruthTableCache,
}

impl<D> NetworkCuts<D> {
    /// Number of nodes covered; nodes created later have no cuts.
    pub fn nodes_size(&self) -> usize {
        self.cuts.len()
    }

    pub fn cuts(&self, n: NodeRef) -> &[Cut<D>] {
        &self.cuts[n.id]
    }

    pub fn cuts_mut(&mut self, n: NodeRef) -> &mut [Cut<D>] {
        &mut self.cuts[n.id]
    }

    pub fn truth_table(&self, cut: &Cut<D>) -> TruthTable {
        self.cache.get(cut.func)
    }

    pub fn total_cuts(&self) -> usize {
        self.cuts.iter().map(|c| c.len()).sum()
    }
}

/// Inserts `cut` unless an existing cut dominates it, evicting the cuts it
/// dominates. The set stays sorted by size.
fn insert_cut<D>(set: &mut Vec<Cut<D>>, cut: Cut<D>) {
    if set.iter().any(|c| c.dominates(&cut)) {
        return;
    }
    set.retain(|c| !cut.dominates(c));
    let pos = set.partition_point(|c| c.size() <= cut.size());
    set.insert(pos, cut);
}

fn merge_leaves(parts: &[&[NodeRef]], limit: usize) -> Option<Vec<NodeRef>> {
    let mut merged: Vec<NodeRef> = Vec::new();
    for part in parts {
        for l in part.iter() {
            if let Err(pos) = merged.binary_search(l) {
                merged.insert(pos, *l);
                if merged.len() > limit {
                    return None;
                }
            }
        }
    }
    Some(merged)
}

pub fn cut_enumeration<N: Network, D: Default + Clone>(
    ntk: &N,
    params: &CutEnumerationParams,
) -> NetworkCuts<D> {
    assert!(params.cut_limit >= 1, "cut_limit must leave room for the trivial cut");
    let t0 = Instant::now();
    let mut result = NetworkCuts {
        cuts: vec![Vec::new(); ntk.size()],
        cache: TruthTableCache::new(),
    };
    let buffer_lit = result.cache.insert(TruthTable::var(1, 0));
    let trivial = |n: NodeRef| Cut {
        leaves: vec![n],
        signature: signature_of(&[n]),
        func: buffer_lit,
        data: D::default(),
    };

    let all: Vec<NodeRef> = ntk.nodes().collect();
    let mut truncated_nodes = 0usize;
    for n in cone_postorder(ntk, &[], &all) {
        if ntk.is_constant(n) {
            let func = result.cache.insert(TruthTable::const0(0).with_polarity(ntk.constant_value(n)));
            result.cuts[n.id] = vec![Cut {
                leaves: Vec::new(),
                signature: 0,
                func,
                data: D::default(),
            }];
            continue;
        }
        if ntk.is_ci(n) {
            result.cuts[n.id] = vec![trivial(n)];
            continue;
        }

        let fanins: Vec<N::Signal> = ntk.fanins(n).to_vec();
        let function = ntk.node_function(n);
        let mut set: Vec<Cut<D>> = Vec::new();
        let mut choice = vec![0usize; fanins.len()];
        let mut hit_limit = false;
        'product: loop {
            let parts: Vec<&Cut<D>> = fanins
                .iter()
                .zip(choice.iter())
                .map(|(f, i)| &result.cuts[f.node().id][*i])
                .collect();
            let leaf_parts: Vec<&[NodeRef]> = parts.iter().map(|c| c.leaves()).collect();
            if let Some(merged) = merge_leaves(&leaf_parts, params.cut_size) {
                let inputs: Vec<TruthTable> = parts
                    .iter()
                    .zip(fanins.iter())
                    .map(|(c, f)| {
                        let positions: Vec<usize> = c
                            .leaves()
                            .iter()
                            .map(|l| merged.partition_point(|m| m < l))
                            .collect();
                        result
                            .cache
                            .get(c.func)
                            .expand(&positions, merged.len())
                            .with_polarity(f.is_complemented())
                    })
                    .collect();
                let tt = function.compose(&inputs);
                let (tt, leaves) = if params.minimize_truth_table {
                    let (small, support) = tt.min_base();
                    (small, support.into_iter().map(|i| merged[i]).collect())
                } else {
                    (tt, merged)
                };
                let func = result.cache.insert(tt);
                insert_cut(
                    &mut set,
                    Cut {
                        signature: signature_of(&leaves),
                        leaves,
                        func,
                        data: D::default(),
                    },
                );
            }

            // Advance the odometer over the fanin cut sets.
            let mut k = 0;
            loop {
                if k == choice.len() {
                    break 'product;
                }
                choice[k] += 1;
                if choice[k] < result.cuts[fanins[k].node().id].len() {
                    break;
                }
                choice[k] = 0;
                k += 1;
            }
            if set.len() >= 4 * params.cut_limit {
                hit_limit = true;
                break;
            }
        }

        if set.len() > params.cut_limit - 1 {
            hit_limit = true;
            set.truncate(params.cut_limit - 1);
        }
        if hit_limit {
            truncated_nodes += 1;
        }
        set.push(trivial(n));
        result.cuts[n.id] = set;
    }

    log::debug!(
        "cut_enumeration: nodes={} cut_size={} cut_limit={} total_cuts={} truncated_nodes={} elapsed_ms={}",
        ntk.size(),
        params.cut_size,
        params.cut_limit,
        result.total_cuts(),
        truncated_nodes,
        t0.elapsed().as_millis()
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Aig, GateNetwork, Mig};

    #[test]
    fn test_dominance() {
        let small: Cut<()> = Cut {
            leaves: vec![NodeRef::new(1), NodeRef::new(3)],
            signature: signature_of(&[NodeRef::new(1), NodeRef::new(3)]),
            func: 0,
            data: (),
        };
        let large: Cut<()> = Cut {
            leaves: vec![NodeRef::new(1), NodeRef::new(2), NodeRef::new(3)],
            signature: signature_of(&[NodeRef::new(1), NodeRef::new(2), NodeRef::new(3)]),
            func: 0,
            data: (),
        };
        assert!(small.dominates(&large));
        assert!(!large.dominates(&small));
    }

    #[test]
    fn test_and_chain_cuts() {
        let mut aig = Aig::new();
        let a = aig.create_pi();
        let b = aig.create_pi();
        let c = aig.create_pi();
        let ab = aig.create_and(a, b);
        let f = aig.create_and(ab, !c);
        aig.create_po(f);
        let cuts: NetworkCuts<()> = cut_enumeration(&aig, &CutEnumerationParams::default());
        let set = cuts.cuts(f.node);
        let leaves: Vec<Vec<NodeRef>> = set.iter().map(|c| c.leaves().to_vec()).collect();
        assert_eq!(
            leaves,
            vec![
                vec![c.node, ab.node],
                vec![a.node, b.node, c.node],
                vec![f.node],
            ]
        );
        // a & b & !c over (a, b, c)
        assert_eq!(cuts.truth_table(&set[1]).to_string(), "08");
        assert_eq!(cuts.truth_table(&set[2]), TruthTable::var(1, 0));
    }

    #[test]
    fn test_truth_table_minimization_drops_redundant_leaf() {
        let mut mig = Mig::new();
        let a = mig.create_pi();
        let b = mig.create_pi();
        let c = mig.create_pi();
        let inner = mig.create_maj(a, b, c);
        // maj(a, maj(a, b, c), c) == maj(a, b, c)
        let outer = mig.create_maj(a, inner, c);
        mig.create_po(outer);
        let cuts: NetworkCuts<()> = cut_enumeration(&mig, &CutEnumerationParams::default());
        let set = cuts.cuts(outer.node);
        let full = set
            .iter()
            .find(|cut| cut.leaves() == [a.node, b.node, c.node])
            .expect("cut over the inputs");
        assert_eq!(cuts.truth_table(full).to_string(), "e8");
        assert!(set.iter().all(|c| c.size() <= 4));
    }

    #[test]
    fn test_cut_limit_is_respected() {
        let mut aig = Aig::new();
        let ins: Vec<_> = (0..8).map(|_| aig.create_pi()).collect();
        let mut layer = ins.clone();
        while layer.len() > 1 {
            layer = layer.chunks(2).map(|p| aig.create_and(p[0], p[1])).collect();
        }
        aig.create_po(layer[0]);
        let params = CutEnumerationParams {
            cut_limit: 3,
            ..Default::default()
        };
        let cuts: NetworkCuts<()> = cut_enumeration(&aig, &params);
        for n in aig.nodes() {
            assert!(cuts.cuts(n).len() <= 3);
            if aig.is_gate(n) {
                assert_eq!(cuts.cuts(n).last().unwrap().leaves(), [n]);
            }
        }
    }
}
