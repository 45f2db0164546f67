// SPDX-License-Identifier: Apache-2.0

pub mod cleanup;
pub mod config;
pub mod conflict_graph;
pub mod cut_enumeration;
pub mod cut_rewriting;
pub mod dont_cares;
pub mod fingerprint;
pub mod mffc;
pub mod network;
pub mod node_map;
pub mod node_resynthesis;
pub mod reconv_cut;
pub mod resynthesis;
pub mod simulation;
pub mod test_utils;
pub mod topo;
pub mod truth_table;
pub mod tt_cache;

pub use cleanup::{cleanup_dangling, cleanup_dangling_into};
pub use cut_rewriting::{
    CandidateSelection, CutRewritingParams, CutRewritingStats, cut_rewriting,
    cut_rewriting_on_nodes, cut_rewriting_with_cost,
};
pub use node_resynthesis::{NodeResynthesisParams, NodeResynthesisStats, node_resynthesis};
pub use network::{Aig, GateNetwork, Klut, Mig, Network, NodeRef, Signal};
pub use truth_table::TruthTable;
