// SPDX-License-Identifier: Apache-2.0

//! Translation of a network into another network kind, one gate at a time.
//!
//! Every live gate of the source is handed to a resynthesis oracle together
//! with its local function; the first candidate the oracle proposes becomes
//! the gate's image in the destination. Typical uses turn k-LUT networks
//! into AIGs or MIGs.

use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::network::Network;
use crate::node_map::NodeMap;
use crate::resynthesis::Resynthesis;
use crate::topo::topo_order;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeResynthesisParams {
    pub verbose: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeResynthesisStats {
    pub time_total: Duration,
    /// Source gates translated.
    pub nodes: usize,
    /// Gates in the destination when the translation finished.
    pub gates: usize,
}

impl NodeResynthesisStats {
    pub fn report(&self) {
        log::info!("[i] total time = {:>5.2} secs", self.time_total.as_secs_f64());
        log::info!("[i] nodes={} gates={}", self.nodes, self.gates);
    }
}

/// Builds a `D` equivalent to `src`.
///
/// Combinational inputs map to PIs then ROs, and outputs to POs then RIs,
/// in source order. Dangling source gates are not translated. Fails when
/// the oracle proposes nothing for some gate.
pub fn node_resynthesis<D, S, R>(
    src: &S,
    resyn: &mut R,
    params: &NodeResynthesisParams,
) -> Result<(D, NodeResynthesisStats)>
where
    S: Network,
    D: Network,
    R: Resynthesis<D>,
{
    let t0 = Instant::now();
    let mut stats = NodeResynthesisStats::default();
    let mut dest = D::empty();
    let mut old_to_new: NodeMap<Option<D::Signal>> = NodeMap::new(src);
    for n in src.pis() {
        old_to_new[*n] = Some(dest.create_pi());
    }
    for n in src.ros() {
        old_to_new[*n] = Some(dest.create_ro());
    }

    for n in topo_order(src) {
        if src.is_constant(n) {
            old_to_new[n] = Some(dest.get_constant(src.constant_value(n)));
            continue;
        }
        if src.is_ci(n) {
            continue;
        }
        let mut children: Vec<D::Signal> = Vec::with_capacity(src.fanin_size(n));
        for f in src.fanins(n) {
            let child = src.get_node(*f);
            let Some(s) = old_to_new[child] else {
                bail!("node_resynthesis: node {} used before it was translated", child.id);
            };
            children.push(if src.is_complemented(*f) { dest.create_not(s) } else { s });
        }
        let function = src.node_function(n);
        let mut image: Option<D::Signal> = None;
        resyn.resynthesize(&mut dest, &function, &children, &mut |_: &mut D, s: D::Signal| {
            image = Some(s);
            false
        });
        let Some(image) = image else {
            bail!(
                "node_resynthesis: no implementation for node {} with function {}",
                n.id,
                function
            );
        };
        log::trace!("node_resynthesis: {} -> {:?}", n.id, image);
        old_to_new[n] = Some(image);
        stats.nodes += 1;
    }

    let num_pos = src.num_pos();
    for (i, co) in src.cos().into_iter().enumerate() {
        let child = src.get_node(co);
        let Some(s) = old_to_new[child] else {
            bail!("node_resynthesis: output {} reads untranslated node {}", i, child.id);
        };
        let s = if src.is_complemented(co) { dest.create_not(s) } else { s };
        if i < num_pos {
            dest.create_po(s);
        } else {
            dest.create_ri(s);
        }
    }

    stats.gates = dest.num_gates();
    stats.time_total = t0.elapsed();
    log::debug!(
        "node_resynthesis: {} gates -> {} gates",
        stats.nodes,
        stats.gates
    );
    if params.verbose {
        stats.report();
    }
    Ok((dest, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Aig, GateNetwork, Klut, Mig};
    use crate::resynthesis::{MajorityResynthesis, ShannonResynthesis};
    use crate::simulation::check_equivalence;
    use crate::truth_table::TruthTable;

    fn sample_klut() -> Klut {
        let mut klut = Klut::new();
        let a = klut.create_pi();
        let b = klut.create_pi();
        let c = klut.create_pi();
        let d = klut.create_pi();
        // 0x6a5c over (a, b, c, d), then a majority with the last input.
        let f = klut.create_node(&[a, b, c, d], TruthTable::from_u64(4, 0x6a5c));
        let g = klut.create_maj(f, a, d);
        let _dangling = klut.create_xor(b, c);
        klut.create_po(g);
        klut.create_po(f);
        klut
    }

    #[test]
    fn test_klut_to_mig_and_aig() {
        let klut = sample_klut();
        let (mig, stats): (Mig, _) =
            node_resynthesis(&klut, &mut ShannonResynthesis::new(), &NodeResynthesisParams::default())
                .unwrap();
        assert_eq!(stats.nodes, 2);
        assert_eq!(stats.gates, mig.num_gates());
        assert_eq!(mig.num_pis(), 4);
        assert_eq!(mig.num_pos(), 2);
        check_equivalence(&klut, &mig, 1, 0).unwrap();

        let (aig, _): (Aig, _) =
            node_resynthesis(&klut, &mut ShannonResynthesis::new(), &NodeResynthesisParams::default())
                .unwrap();
        check_equivalence(&klut, &aig, 1, 0).unwrap();
    }

    #[test]
    fn test_exact_matches_give_one_gate_per_lut() {
        let mut klut = Klut::new();
        let a = klut.create_pi();
        let b = klut.create_pi();
        let c = klut.create_pi();
        let ab = klut.create_and(a, b);
        let top = klut.create_or(ab, c);
        klut.create_po(top);
        let (mig, stats): (Mig, _) =
            node_resynthesis(&klut, &mut MajorityResynthesis::new(), &NodeResynthesisParams::default())
                .unwrap();
        assert_eq!(stats.nodes, 2);
        assert_eq!(mig.num_gates(), 2);
        check_equivalence(&klut, &mig, 1, 0).unwrap();
    }

    #[test]
    fn test_missing_implementation_is_an_error() {
        let mut klut = Klut::new();
        let a = klut.create_pi();
        let b = klut.create_pi();
        let x = klut.create_xor(a, b);
        klut.create_po(x);
        let err = node_resynthesis::<Mig, _, _>(
            &klut,
            &mut MajorityResynthesis::new(),
            &NodeResynthesisParams::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("no implementation"));
    }

    #[test]
    fn test_registers_and_constants_carry_over() {
        let mut klut = Klut::new();
        let a = klut.create_pi();
        let state = klut.create_ro();
        let next = klut.create_xor(a, state);
        klut.create_po(state);
        klut.create_po(klut.get_constant(true));
        klut.create_ri(next);
        let (aig, _): (Aig, _) =
            node_resynthesis(&klut, &mut ShannonResynthesis::new(), &NodeResynthesisParams::default())
                .unwrap();
        assert_eq!(aig.num_pis(), 1);
        assert_eq!(aig.num_latches(), 1);
        assert_eq!(aig.pos()[1], aig.get_constant(true));
        check_equivalence(&klut, &aig, 1, 0).unwrap();
    }
}
