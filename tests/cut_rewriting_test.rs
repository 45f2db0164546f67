// SPDX-License-Identifier: Apache-2.0

//! End-to-end rewriting: rewrite, clean up, and compare against the input
//! network.

use std::collections::BTreeSet;

use pretty_assertions::assert_eq;
use test_case::test_case;

use logic_rewrite::conflict_graph::{maximum_weighted_independent_set_gwmin, network_cuts_graph};
use logic_rewrite::cut_enumeration::{CutEnumerationParams, cut_enumeration};
use logic_rewrite::cut_rewriting::CutRewritingData;
use logic_rewrite::fingerprint::network_fingerprint;
use logic_rewrite::mffc::{NodeCostFn, UnitCost, init_reference_counts};
use logic_rewrite::resynthesis::{LutResynthesis, MajorityResynthesis, ShannonResynthesis};
use logic_rewrite::simulation::check_equivalence;
use logic_rewrite::test_utils::{
    RandomNetworkParams, random_aig, random_mig, setup_maj_of_maj, setup_redundant_graph,
    setup_simple_graph,
};
use logic_rewrite::topo::cut_gates;
use logic_rewrite::{
    Aig, CandidateSelection, CutRewritingParams, GateNetwork, Klut, Mig, Network, NodeRef, Signal,
    TruthTable, cleanup_dangling, cut_rewriting, cut_rewriting_on_nodes, cut_rewriting_with_cost,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_maj_of_maj_collapses_to_one_gate() {
    init_logger();
    let mut g = setup_maj_of_maj();
    let original = g.mig.clone();
    let stats = cut_rewriting(
        &mut g.mig,
        &mut MajorityResynthesis::new(),
        &CutRewritingParams::default(),
    );
    assert_eq!(stats.substitutions, 1);
    let clean = cleanup_dangling(&g.mig);
    assert_eq!(clean.size(), 5);
    assert_eq!(clean.num_gates(), 1);
    check_equivalence(&original, &clean, 1, 0).unwrap();
}

#[test_case(false; "const0")]
#[test_case(true; "const1")]
fn test_constant_output_is_untouched(value: bool) {
    init_logger();
    let mut mig = Mig::new();
    let constant = mig.get_constant(value);
    mig.create_po(constant);
    cut_rewriting(&mut mig, &mut MajorityResynthesis::new(), &CutRewritingParams::default());
    let clean = cleanup_dangling(&mig);
    assert_eq!(clean.size(), 1);
    assert_eq!(clean.num_gates(), 0);
    assert_eq!(clean.pos(), &[clean.get_constant(value)]);
}

#[test_case(false; "plain")]
#[test_case(true; "complemented")]
fn test_projection_output_is_untouched(negated: bool) {
    init_logger();
    let mut aig = Aig::new();
    let a = aig.create_pi();
    aig.create_po(if negated { !a } else { a });
    cut_rewriting(&mut aig, &mut ShannonResynthesis::new(), &CutRewritingParams::default());
    let clean = cleanup_dangling(&aig);
    assert_eq!(clean.size(), 2);
    assert_eq!(clean.num_pis(), 1);
    assert_eq!(clean.is_complemented(clean.pos()[0]), negated);
    assert_eq!(clean.get_node(clean.pos()[0]), clean.pis()[0]);
}

#[test_case(CandidateSelection::MinimizeWeight, false; "gwmin")]
#[test_case(CandidateSelection::Greedy, false; "greedy")]
#[test_case(CandidateSelection::MinimizeWeight, true; "gwmin_dont_cares")]
fn test_redundant_logic_is_removed(strategy: CandidateSelection, use_dont_cares: bool) {
    init_logger();
    let mut g = setup_redundant_graph();
    let original = g.aig.clone();
    let params = CutRewritingParams {
        candidate_selection_strategy: strategy,
        use_dont_cares,
        ..Default::default()
    };
    let stats = cut_rewriting(&mut g.aig, &mut ShannonResynthesis::new(), &params);
    assert!(stats.candidates > 0);
    assert!(stats.substitutions >= 1);
    let clean = cleanup_dangling(&g.aig);
    assert!(clean.num_gates() < original.num_gates());
    if strategy == CandidateSelection::MinimizeWeight && !use_dont_cares {
        // The best candidate at the root is i0 & (i1 | i2).
        assert_eq!(stats.substitutions, 1);
        assert_eq!(clean.num_gates(), 2);
    }
    check_equivalence(&original, &clean, 1, 0).unwrap();
}

#[test]
fn test_rewriting_is_restricted_to_given_nodes() {
    init_logger();
    let mut g = setup_redundant_graph();
    let mut resyn = ShannonResynthesis::new();
    let params = CutRewritingParams::default();

    let inputs_only: BTreeSet<_> = [g.i0.node, g.i1.node, g.i2.node].into_iter().collect();
    let stats = cut_rewriting_on_nodes(&mut g.aig, &inputs_only, &mut resyn, &params, &UnitCost);
    assert_eq!(stats.candidates, 0);
    assert_eq!(g.aig.pos(), &[g.o]);

    let root: BTreeSet<_> = [g.o.node].into_iter().collect();
    let stats = cut_rewriting_on_nodes(&mut g.aig, &root, &mut resyn, &params, &UnitCost);
    assert_eq!(stats.substitutions, 1);
    assert_eq!(cleanup_dangling(&g.aig).num_gates(), 2);
}

#[test]
fn test_lut_collapsing() {
    init_logger();
    let mut klut = Klut::new();
    let ins: Vec<_> = (0..4).map(|_| klut.create_pi()).collect();
    let x = klut.create_and(ins[0], ins[1]);
    let y = klut.create_or(x, ins[2]);
    let z = klut.create_xor(y, ins[3]);
    klut.create_po(z);
    let original = klut.clone();
    let stats = cut_rewriting(&mut klut, &mut LutResynthesis, &CutRewritingParams::default());
    assert_eq!(stats.substitutions, 1);
    let clean = cleanup_dangling(&klut);
    assert_eq!(clean.num_gates(), 1);
    assert_eq!(clean.fanin_size(clean.pos()[0]), 4);
    check_equivalence(&original, &clean, 1, 0).unwrap();
}

#[test_case(1)]
#[test_case(2)]
#[test_case(3)]
#[test_case(4)]
fn test_random_aig_stays_equivalent(seed: u64) {
    init_logger();
    let shape = RandomNetworkParams {
        num_inputs: 8,
        num_gates: 80,
        num_outputs: 6,
    };
    let original = random_aig(&shape, seed);
    let mut current = cleanup_dangling(&original);
    let mut resyn = ShannonResynthesis::new();
    for pass in 0..2 {
        let params = CutRewritingParams {
            use_dont_cares: pass == 1,
            ..Default::default()
        };
        cut_rewriting(&mut current, &mut resyn, &params);
        current = cleanup_dangling(&current);
        check_equivalence(&original, &current, 1, seed).unwrap();
    }
}

#[test_case(5)]
#[test_case(6)]
fn test_random_mig_stays_equivalent(seed: u64) {
    init_logger();
    let shape = RandomNetworkParams {
        num_inputs: 7,
        num_gates: 60,
        num_outputs: 5,
    };
    let original = random_mig(&shape, seed);
    let mut current = original.clone();
    cut_rewriting(&mut current, &mut MajorityResynthesis::new(), &CutRewritingParams::default());
    let current = cleanup_dangling(&current);
    check_equivalence(&original, &current, 1, seed).unwrap();
}

#[test_case(CandidateSelection::MinimizeWeight, 21; "gwmin_21")]
#[test_case(CandidateSelection::MinimizeWeight, 22; "gwmin_22")]
#[test_case(CandidateSelection::Greedy, 23; "greedy_23")]
#[test_case(CandidateSelection::Greedy, 24; "greedy_24")]
fn test_zero_gain_candidates_stay_equivalent(strategy: CandidateSelection, seed: u64) {
    init_logger();
    let shape = RandomNetworkParams {
        num_inputs: 8,
        num_gates: 80,
        num_outputs: 6,
    };
    let original = cleanup_dangling(&random_aig(&shape, seed));
    let strict = CutRewritingParams {
        candidate_selection_strategy: strategy,
        ..Default::default()
    };
    let relaxed = CutRewritingParams {
        allow_zero_gain: true,
        ..strict.clone()
    };

    let mut baseline = original.clone();
    let strict_stats = cut_rewriting(&mut baseline, &mut ShannonResynthesis::new(), &strict);
    let mut current = original.clone();
    let stats = cut_rewriting(&mut current, &mut ShannonResynthesis::new(), &relaxed);
    assert!(stats.candidates >= strict_stats.candidates);
    let current = cleanup_dangling(&current);
    check_equivalence(&original, &current, 1, seed).unwrap();

    let mig = random_mig(&shape, seed);
    let mut rewritten = mig.clone();
    cut_rewriting(&mut rewritten, &mut MajorityResynthesis::new(), &relaxed);
    check_equivalence(&mig, &cleanup_dangling(&rewritten), 1, seed).unwrap();
}

struct DoubleCost;

impl<N: Network> NodeCostFn<N> for DoubleCost {
    fn cost(&self, _ntk: &N, _n: NodeRef) -> u32 {
        2
    }
}

/// Odd-numbered gates are three times as expensive as even ones.
struct ParityCost;

impl<N: Network> NodeCostFn<N> for ParityCost {
    fn cost(&self, _ntk: &N, n: NodeRef) -> u32 {
        if n.id % 2 == 1 { 3 } else { 1 }
    }
}

#[test]
fn test_rewriting_with_weighted_cost() {
    init_logger();
    let mut g = setup_redundant_graph();
    let original = g.aig.clone();
    let stats = cut_rewriting_with_cost(
        &mut g.aig,
        &mut ShannonResynthesis::new(),
        &CutRewritingParams::default(),
        &DoubleCost,
    );
    assert!(stats.substitutions >= 1);
    // Every gain is a difference of two even costs.
    assert_eq!(stats.total_gain % 2, 0);
    let clean = cleanup_dangling(&g.aig);
    assert!(clean.num_gates() < original.num_gates());
    check_equivalence(&original, &clean, 1, 0).unwrap();
}

#[test_case(31)]
#[test_case(32)]
fn test_random_aig_with_uneven_cost_stays_equivalent(seed: u64) {
    init_logger();
    let shape = RandomNetworkParams {
        num_inputs: 8,
        num_gates: 80,
        num_outputs: 6,
    };
    let original = cleanup_dangling(&random_aig(&shape, seed));
    let mut current = original.clone();
    cut_rewriting_with_cost(
        &mut current,
        &mut ShannonResynthesis::new(),
        &CutRewritingParams::default(),
        &ParityCost,
    );
    check_equivalence(&original, &cleanup_dangling(&current), 1, seed).unwrap();
}

#[test]
fn test_sequential_network_keeps_registers() {
    init_logger();
    let mut aig = Aig::new();
    let a = aig.create_pi();
    let s0 = aig.create_ro();
    let s1 = aig.create_ro();
    // (a & s0 & s1) | (a & s0 & !s1) | (a & s1), which is a & (s0 | s1).
    let a_s0 = aig.create_and(a, s0);
    let x = aig.create_and(a_s0, s1);
    let y = aig.create_and(a_s0, !s1);
    let z = aig.create_and(a, s1);
    let t = aig.create_or(x, y);
    let next = aig.create_or(t, z);
    let toggle = aig.create_xor(a, s0);
    aig.create_po(next);
    aig.create_ri(next);
    aig.create_ri(toggle);
    let original = aig.clone();

    let stats = cut_rewriting(&mut aig, &mut ShannonResynthesis::new(), &CutRewritingParams::default());
    assert!(stats.substitutions >= 1);
    assert_eq!(aig.ros(), original.ros());
    let clean = cleanup_dangling(&aig);
    assert_eq!(clean.num_pis(), 1);
    assert_eq!(clean.ros().len(), 2);
    assert_eq!(clean.num_latches(), 2);
    assert!(clean.num_gates() < original.num_gates());
    check_equivalence(&original, &clean, 1, 0).unwrap();
}

#[test]
fn test_cleanup_is_idempotent() {
    let g = setup_simple_graph();
    let once = cleanup_dangling(&g.aig);
    let twice = cleanup_dangling(&once);
    assert_eq!(once.size(), twice.size());
    assert_eq!(once.num_pis(), twice.num_pis());
    assert_eq!(once.pos(), twice.pos());
    assert_eq!(network_fingerprint(&once), network_fingerprint(&twice));
    assert_eq!(network_fingerprint(&g.aig), network_fingerprint(&once));
}

#[test]
fn test_structural_hashing_dedups() {
    let mut aig = Aig::new();
    let a = aig.create_pi();
    let b = aig.create_pi();
    let f = aig.create_and(a, !b);
    let size = aig.size();
    assert_eq!(aig.create_and(!b, a), f);
    assert_eq!(aig.size(), size);

    let mut mig = Mig::new();
    let x = mig.create_pi();
    let y = mig.create_pi();
    let z = mig.create_pi();
    let m = mig.create_maj(x, y, z);
    let size = mig.size();
    assert_eq!(mig.create_maj(z, x, y), m);
    // Self-duality: maj(!x, !y, !z) is the complement of the same node.
    assert_eq!(mig.create_maj(!x, !y, !z), !m);
    assert_eq!(mig.size(), size);

    let mut klut = Klut::new();
    let p = klut.create_pi();
    let q = klut.create_pi();
    let l = klut.create_node(&[p, q], TruthTable::from_u64(2, 0b0110));
    let size = klut.size();
    assert_eq!(klut.create_node(&[p, q], TruthTable::from_u64(2, 0b0110)), l);
    assert_eq!(klut.size(), size);
}

#[test]
fn test_selected_candidates_touch_disjoint_gates() {
    let shape = RandomNetworkParams {
        num_inputs: 6,
        num_gates: 50,
        num_outputs: 4,
    };
    let mut aig = cleanup_dangling(&random_aig(&shape, 17));
    let mut cuts = cut_enumeration::<Aig, CutRewritingData<Signal>>(&aig, &CutEnumerationParams::default());
    for n in aig.nodes() {
        for cut in cuts.cuts_mut(n) {
            cut.data.gain = cut.size() as i32;
        }
    }
    init_reference_counts(&mut aig);
    let (mut graph, vertex_to_cut) = network_cuts_graph(&mut aig, &cuts, false, &UnitCost);
    let selected = maximum_weighted_independent_set_gwmin(&mut graph);
    assert!(!selected.is_empty());

    let mut touched: BTreeSet<usize> = BTreeSet::new();
    for v in selected {
        let (pivot, index) = vertex_to_cut[v];
        let cut = &cuts.cuts(pivot)[index];
        for gate in cut_gates(&aig, cut.leaves(), pivot) {
            assert!(touched.insert(gate.id), "gate {} selected twice", gate.id);
        }
    }
}
