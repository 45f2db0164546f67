// SPDX-License-Identifier: Apache-2.0

//! Functional simulation of networks.
//!
//! Exhaustive simulation assigns one truth-table variable per combinational
//! input; random simulation pushes 64 input patterns per word through the
//! network at once.

use ahash::AHashMap;
use anyhow::{Result, bail};
use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::network::{Network, NodeRef, SignalLike};
use crate::node_map::NodeMap;
use crate::topo::cone_postorder;
use crate::truth_table::TruthTable;

/// Largest input count simulated exhaustively.
pub const MAX_EXHAUSTIVE_INPUTS: usize = 16;

fn eval_node<N: Network>(ntk: &N, n: NodeRef, values: &AHashMap<NodeRef, TruthTable>, num_vars: usize) -> TruthTable {
    if ntk.is_constant(n) {
        return if ntk.constant_value(n) {
            TruthTable::const1(num_vars)
        } else {
            TruthTable::const0(num_vars)
        };
    }
    assert!(
        !ntk.is_ci(n),
        "simulation window reaches input {} outside its boundary",
        n.id
    );
    let fanins: Vec<TruthTable> = ntk
        .fanins(n)
        .iter()
        .map(|f| values[&f.node()].with_polarity(f.is_complemented()))
        .collect();
    ntk.node_function(n).compose(&fanins)
}

/// Simulates the cone between `inputs` (variable `i` is `inputs[i]`) and
/// `targets`, returning one table per target.
pub fn simulate_cone<N: Network>(ntk: &N, inputs: &[NodeRef], targets: &[NodeRef]) -> Vec<TruthTable> {
    let num_vars = inputs.len();
    let mut values: AHashMap<NodeRef, TruthTable> = AHashMap::new();
    for (i, n) in inputs.iter().enumerate() {
        values.insert(*n, TruthTable::var(num_vars, i));
    }
    for n in cone_postorder(ntk, inputs, targets) {
        let tt = eval_node(ntk, n, &values, num_vars);
        values.insert(n, tt);
    }
    targets.iter().map(|t| values[t].clone()).collect()
}

/// Truth table of every node over all combinational inputs.
pub fn simulate_nodes<N: Network>(ntk: &N) -> NodeMap<TruthTable> {
    let cis = ntk.cis();
    assert!(
        cis.len() <= MAX_EXHAUSTIVE_INPUTS,
        "exhaustive simulation of {} inputs exceeds the limit of {}",
        cis.len(),
        MAX_EXHAUSTIVE_INPUTS
    );
    let all: Vec<NodeRef> = ntk.nodes().collect();
    let tables = simulate_cone(ntk, &cis, &all);
    let mut map = NodeMap::new(ntk);
    for (n, tt) in all.into_iter().zip(tables) {
        map[n] = tt;
    }
    map
}

/// Truth table of every combinational output, polarity applied.
pub fn simulate_outputs<N: Network>(ntk: &N) -> Vec<TruthTable> {
    let cis = ntk.cis();
    assert!(
        cis.len() <= MAX_EXHAUSTIVE_INPUTS,
        "exhaustive simulation of {} inputs exceeds the limit of {}",
        cis.len(),
        MAX_EXHAUSTIVE_INPUTS
    );
    let cos = ntk.cos();
    let roots: Vec<NodeRef> = cos.iter().map(|s| s.node()).collect();
    let tables = simulate_cone(ntk, &cis, &roots);
    tables
        .into_iter()
        .zip(cos)
        .map(|(tt, s)| tt.with_polarity(s.is_complemented()))
        .collect()
}

/// Bit-parallel simulation of the combinational outputs for the given input
/// words (one word per combinational input).
pub fn simulate_words<N: Network>(ntk: &N, input_words: &[u64]) -> Vec<u64> {
    let cis = ntk.cis();
    assert_eq!(input_words.len(), cis.len(), "one word per combinational input");
    let mut values: AHashMap<NodeRef, u64> = AHashMap::new();
    for (n, w) in cis.iter().zip(input_words) {
        values.insert(*n, *w);
    }
    let cos = ntk.cos();
    let roots: Vec<NodeRef> = cos.iter().map(|s| s.node()).collect();
    for n in cone_postorder(ntk, &cis, &roots) {
        let word = if ntk.is_constant(n) {
            if ntk.constant_value(n) { u64::MAX } else { 0 }
        } else {
            let fanins: Vec<u64> = ntk
                .fanins(n)
                .iter()
                .map(|f| {
                    let w = values[&f.node()];
                    if f.is_complemented() { !w } else { w }
                })
                .collect();
            ntk.node_function(n).compose_word(&fanins)
        };
        values.insert(n, word);
    }
    cos.iter()
        .map(|s| {
            let w = values[&s.node()];
            if s.is_complemented() { !w } else { w }
        })
        .collect()
}

fn describe_assignment(bits: impl Iterator<Item = bool>) -> String {
    bits.enumerate()
        .map(|(i, b)| format!("ci{}={}", i, b as u8))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Checks that `a` and `b` compute the same combinational outputs.
///
/// Small networks are compared exhaustively; larger ones with `rounds`
/// words of seeded random patterns.
pub fn check_equivalence<A: Network, B: Network>(a: &A, b: &B, rounds: usize, seed: u64) -> Result<()> {
    if a.num_cis() != b.num_cis() {
        bail!(
            "input count mismatch: {} vs {}",
            a.num_cis(),
            b.num_cis()
        );
    }
    if a.num_cos() != b.num_cos() {
        bail!(
            "output count mismatch: {} vs {}",
            a.num_cos(),
            b.num_cos()
        );
    }

    if a.num_cis() <= MAX_EXHAUSTIVE_INPUTS {
        let ta = simulate_outputs(a);
        let tb = simulate_outputs(b);
        for (i, (x, y)) in ta.iter().zip(tb.iter()).enumerate() {
            if x != y {
                let diff = x.xor(y);
                let bit = (0..diff.num_bits()).find(|k| diff.get_bit(*k)).unwrap_or(0);
                let num_cis = a.num_cis();
                bail!(
                    "output {} differs: {} vs {}; counterexample {}",
                    i,
                    x,
                    y,
                    describe_assignment((0..num_cis).map(|v| (bit >> v) & 1 == 1))
                );
            }
        }
        return Ok(());
    }

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    for round in 0..rounds {
        let words: Vec<u64> = (0..a.num_cis()).map(|_| rng.next_u64()).collect();
        let wa = simulate_words(a, &words);
        let wb = simulate_words(b, &words);
        for (i, (x, y)) in wa.iter().zip(wb.iter()).enumerate() {
            let diff = x ^ y;
            if diff != 0 {
                let lane = diff.trailing_zeros();
                bail!(
                    "output {} differs in random round {}; counterexample {}",
                    i,
                    round,
                    describe_assignment(words.iter().map(|w| (w >> lane) & 1 == 1))
                );
            }
        }
    }
    log::debug!(
        "check_equivalence: {} random rounds over {} inputs agree",
        rounds,
        a.num_cis()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Aig, GateNetwork, Klut, Mig};

    #[test]
    fn test_simulate_aig_xor() {
        let mut aig = Aig::new();
        let a = aig.create_pi();
        let b = aig.create_pi();
        let f = aig.create_xor(a, b);
        aig.create_po(f);
        aig.create_po(!f);
        let outs = simulate_outputs(&aig);
        assert_eq!(outs[0].to_string(), "6");
        assert_eq!(outs[1].to_string(), "9");
    }

    #[test]
    fn test_simulate_nodes_includes_dangling() {
        let mut mig = Mig::new();
        let a = mig.create_pi();
        let b = mig.create_pi();
        let c = mig.create_pi();
        let m = mig.create_maj(a, b, c);
        let tables = simulate_nodes(&mig);
        assert_eq!(tables[m].to_string(), "e8");
        assert!(tables[mig.get_constant(false)].is_const0());
    }

    #[test]
    fn test_equivalence_across_kinds() {
        let mut aig = Aig::new();
        let mut klut = Klut::new();
        let (a, b, c) = (aig.create_pi(), aig.create_pi(), aig.create_pi());
        let f = aig.create_maj(a, b, c);
        aig.create_po(f);
        let (x, y, z) = (klut.create_pi(), klut.create_pi(), klut.create_pi());
        let g = klut.create_maj(x, y, z);
        klut.create_po(g);
        assert!(check_equivalence(&aig, &klut, 4, 0).is_ok());

        let h = klut.create_and(x, y);
        klut.create_po(h);
        assert!(check_equivalence(&aig, &klut, 4, 0).is_err());
    }

    #[test]
    fn test_random_simulation_finds_difference() {
        let mut a = Aig::new();
        let mut b = Aig::new();
        let ins_a: Vec<_> = (0..20).map(|_| a.create_pi()).collect();
        let ins_b: Vec<_> = (0..20).map(|_| b.create_pi()).collect();
        let fa = a.create_and(ins_a[0], ins_a[19]);
        let fb = b.create_or(ins_b[0], ins_b[19]);
        a.create_po(fa);
        b.create_po(fb);
        let err = check_equivalence(&a, &b, 2, 7).unwrap_err();
        assert!(err.to_string().contains("output 0 differs"));
    }
}
