// SPDX-License-Identifier: Apache-2.0

//! Cut rewriting.
//!
//! Every gate's cuts are offered to a resynthesis oracle; the best candidate
//! per cut is scored by how many gates it saves (the pivot's dereferenced
//! cone minus the gates the candidate would add). Candidates whose cut cones
//! overlap conflict, and a weighted independent set of the conflict graph is
//! substituted into the network in one batch.
//!
//! Replaced gates are left dangling; run [`crate::cleanup::cleanup_dangling`]
//! afterwards to obtain a compact network.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::conflict_graph::{
    maximal_weighted_independent_set, maximum_weighted_independent_set_gwmin,
    network_cuts_graph,
};
use crate::cut_enumeration::{CutEnumerationParams, NetworkCuts, cut_enumeration};
use crate::dont_cares::{DEFAULT_MAX_TFI_INPUTS, satisfiability_dont_cares};
use crate::mffc::{
    NodeCostFn, UnitCost, init_reference_counts, mffc_size, recursive_deref, recursive_ref,
    recursive_ref_contains,
};
use crate::network::{Network, NodeRef};
use crate::resynthesis::Resynthesis;
use crate::topo::{find_cycle_nodes, in_transitive_fanin};

/// Emit a progress line every this many visited pivots.
const PROGRESS_EVERY_NODES: usize = 1000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSelection {
    /// Greedy weighted independent set ranked by `gain / (degree + 1)`.
    #[default]
    MinimizeWeight,
    /// First-come maximal independent set in candidate order.
    Greedy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutRewritingParams {
    pub cut_enumeration: CutEnumerationParams,
    /// Also keep candidates that save nothing.
    pub allow_zero_gain: bool,
    /// Pass satisfiability don't-cares to oracles that accept them.
    pub use_dont_cares: bool,
    pub candidate_selection_strategy: CandidateSelection,
    pub progress: bool,
    pub verbose: bool,
    pub very_verbose: bool,
}

impl Default for CutRewritingParams {
    fn default() -> Self {
        Self {
            cut_enumeration: CutEnumerationParams::default(),
            allow_zero_gain: false,
            use_dont_cares: false,
            candidate_selection_strategy: CandidateSelection::MinimizeWeight,
            progress: false,
            verbose: false,
            very_verbose: false,
        }
    }
}

impl CutRewritingParams {
    /// Parses parameters from JSON; absent fields take their defaults.
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("parsing cut rewriting parameters")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CutRewritingStats {
    pub time_total: Duration,
    pub time_cuts: Duration,
    pub time_rewriting: Duration,
    pub time_mis: Duration,
    /// Cuts that received an accepted replacement.
    pub candidates: usize,
    pub vertices: usize,
    pub edges: usize,
    pub selected: usize,
    pub substitutions: usize,
    /// Sum of the gains of all candidates, selected or not.
    pub total_gain: u64,
}

impl CutRewritingStats {
    pub fn report(&self) {
        log::info!("[i] total time       = {:>8.2} secs", self.time_total.as_secs_f64());
        log::info!("[i] cut enum. time   = {:>8.2} secs", self.time_cuts.as_secs_f64());
        log::info!("[i] rewriting time   = {:>8.2} secs", self.time_rewriting.as_secs_f64());
        log::info!("[i] ind. set time    = {:>8.2} secs", self.time_mis.as_secs_f64());
        log::info!(
            "[i] candidates={} vertices={} edges={} selected={} substitutions={} total_gain={}",
            self.candidates,
            self.vertices,
            self.edges,
            self.selected,
            self.substitutions,
            self.total_gain
        );
    }
}

/// Per-cut rewriting annotation. A cut without an accepted candidate keeps
/// gain `-1` and no replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CutRewritingData<S> {
    pub gain: i32,
    pub replacement: Option<S>,
}

impl<S> Default for CutRewritingData<S> {
    fn default() -> Self {
        Self {
            gain: -1,
            replacement: None,
        }
    }
}

/// Rewrites the whole network with unit gate costs.
pub fn cut_rewriting<N, R>(ntk: &mut N, resyn: &mut R, params: &CutRewritingParams) -> CutRewritingStats
where
    N: Network,
    R: Resynthesis<N>,
{
    cut_rewriting_with_cost(ntk, resyn, params, &UnitCost)
}

pub fn cut_rewriting_with_cost<N, R, C>(
    ntk: &mut N,
    resyn: &mut R,
    params: &CutRewritingParams,
    cost: &C,
) -> CutRewritingStats
where
    N: Network,
    R: Resynthesis<N>,
    C: NodeCostFn<N>,
{
    let pivots: Vec<NodeRef> = ntk.nodes().collect();
    run(ntk, &pivots, resyn, params, cost)
}

/// Like [`cut_rewriting_with_cost`], but only gates in `nodes` are
/// considered as pivots. Cuts are still enumerated network-wide.
pub fn cut_rewriting_on_nodes<N, R, C>(
    ntk: &mut N,
    nodes: &BTreeSet<NodeRef>,
    resyn: &mut R,
    params: &CutRewritingParams,
    cost: &C,
) -> CutRewritingStats
where
    N: Network,
    R: Resynthesis<N>,
    C: NodeCostFn<N>,
{
    let pivots: Vec<NodeRef> = nodes.iter().copied().filter(|n| n.id < ntk.size()).collect();
    run(ntk, &pivots, resyn, params, cost)
}

fn run<N, R, C>(
    ntk: &mut N,
    pivots: &[NodeRef],
    resyn: &mut R,
    params: &CutRewritingParams,
    cost: &C,
) -> CutRewritingStats
where
    N: Network,
    R: Resynthesis<N>,
    C: NodeCostFn<N>,
{
    let t_total = Instant::now();
    let mut stats = CutRewritingStats::default();

    let t_cuts = Instant::now();
    let mut cuts: NetworkCuts<CutRewritingData<N::Signal>> =
        cut_enumeration(ntk, &params.cut_enumeration);
    stats.time_cuts = t_cuts.elapsed();

    init_reference_counts(ntk);
    for (visited, &n) in pivots.iter().enumerate() {
        if params.progress && visited % PROGRESS_EVERY_NODES == 0 {
            log::info!(
                "cut_rewriting: pivot {}/{} candidates={} gain={}",
                visited,
                pivots.len(),
                stats.candidates,
                stats.total_gain
            );
        }
        if n.id >= cuts.nodes_size() || ntk.is_constant(n) || ntk.is_ci(n) {
            continue;
        }
        if mffc_size(ntk, n, cost) == 1 {
            continue;
        }
        let t_rewrite = Instant::now();
        for i in 0..cuts.cuts(n).len() {
            if let Some((gain, replacement)) =
                rewrite_cut(ntk, &cuts, n, i, resyn, params, cost)
            {
                let data = &mut cuts.cuts_mut(n)[i].data;
                data.gain = gain;
                data.replacement = Some(replacement);
                stats.candidates += 1;
                stats.total_gain += gain as u64;
            }
        }
        stats.time_rewriting += t_rewrite.elapsed();
    }

    let t_mis = Instant::now();
    let (mut graph, vertex_to_cut) =
        network_cuts_graph(ntk, &cuts, params.allow_zero_gain, cost);
    stats.vertices = graph.num_vertices();
    stats.edges = graph.num_edges();
    if params.very_verbose {
        log::info!(
            "cut_rewriting: conflict graph has {} vertices and {} edges",
            stats.vertices,
            stats.edges
        );
    }
    let selected = match params.candidate_selection_strategy {
        CandidateSelection::MinimizeWeight => maximum_weighted_independent_set_gwmin(&mut graph),
        CandidateSelection::Greedy => maximal_weighted_independent_set(&mut graph),
    };
    stats.time_mis = t_mis.elapsed();
    stats.selected = selected.len();

    for v in selected {
        let (pivot, cut_index) = vertex_to_cut[v];
        let Some(replacement) = cuts.cuts(pivot)[cut_index].data.replacement else {
            continue;
        };
        let target = ntk.get_node(replacement);
        if target == pivot || ntk.is_constant(target) {
            continue;
        }
        // An earlier substitution may have routed the pivot into the
        // replacement's cone.
        if in_transitive_fanin(ntk, target, pivot) {
            log::debug!(
                "cut_rewriting: skipping node {} whose replacement now depends on it",
                pivot.id
            );
            continue;
        }
        if params.very_verbose {
            log::info!(
                "cut_rewriting: substitute node {} with {:?} (gain {})",
                pivot.id,
                replacement,
                cuts.cuts(pivot)[cut_index].data.gain
            );
        }
        ntk.substitute_node(pivot, replacement);
        stats.substitutions += 1;
    }
    debug_assert!(
        find_cycle_nodes(ntk).is_empty(),
        "cut_rewriting: substitutions introduced a cycle"
    );

    stats.time_total = t_total.elapsed();
    if params.verbose {
        stats.report();
    }
    stats
}

/// Queries the oracle for cut `cut_index` of `pivot` and returns the best
/// accepted candidate with its gain. Reference counters are restored on
/// return.
fn rewrite_cut<N, R, C>(
    ntk: &mut N,
    cuts: &NetworkCuts<CutRewritingData<N::Signal>>,
    pivot: NodeRef,
    cut_index: usize,
    resyn: &mut R,
    params: &CutRewritingParams,
    cost: &C,
) -> Option<(i32, N::Signal)>
where
    N: Network,
    R: Resynthesis<N>,
    C: NodeCostFn<N>,
{
    let cut = &cuts.cuts(pivot)[cut_index];
    if cut.size() <= 2 {
        return None;
    }
    let leaves: Vec<NodeRef> = cut.leaves().to_vec();
    let function = cuts.truth_table(cut);
    debug_assert_eq!(function.num_vars(), leaves.len());
    let children: Vec<N::Signal> = leaves.iter().map(|l| ntk.make_signal(*l)).collect();

    let released = recursive_deref(ntk, pivot, cost) as i32;
    let min_gain = if params.allow_zero_gain { 0 } else { 1 };
    let mut best: Option<(i32, N::Signal)> = None;
    let mut on_signal = |ntk: &mut N, candidate: N::Signal| -> bool {
        let node = ntk.get_node(candidate);
        let (added, contains) = recursive_ref_contains(ntk, node, pivot, cost);
        recursive_deref(ntk, node, cost);
        let gain = if contains { -1 } else { released - added as i32 };
        if params.very_verbose {
            log::debug!(
                "cut_rewriting: node {} cut {:?} candidate {:?} gain {}",
                pivot.id,
                leaves,
                candidate,
                gain
            );
        }
        if gain >= min_gain && best.is_none_or(|(g, _)| gain > g) {
            best = Some((gain, candidate));
        }
        true
    };
    if params.use_dont_cares && R::SUPPORTS_DONT_CARES {
        let dont_cares = satisfiability_dont_cares(ntk, &leaves, DEFAULT_MAX_TFI_INPUTS);
        resyn.resynthesize_with_dont_cares(ntk, &function, &dont_cares, &children, &mut on_signal);
    } else {
        resyn.resynthesize(ntk, &function, &children, &mut on_signal);
    }
    recursive_ref(ntk, pivot, cost);
    best
}
