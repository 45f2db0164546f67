// SPDX-License-Identifier: Apache-2.0

//! Satisfiability don't-cares at a cut boundary.

use crate::network::{Network, NodeRef};
use crate::reconv_cut::{ReconvCutParams, reconvergence_driven_cut};
use crate::simulation::simulate_cone;
use crate::truth_table::TruthTable;

pub const DEFAULT_MAX_TFI_INPUTS: usize = 16;

/// Returns the leaf assignments that cannot occur, as a table over
/// `leaves.len()` variables (variable `i` is `leaves[i]`).
///
/// The leaves' joint transitive fanin is bounded by a reconvergence-driven
/// cut of at most `max_tfi_inputs` nodes; patterns not produced by any
/// assignment of that cut are don't-cares.
pub fn satisfiability_dont_cares<N: Network>(
    ntk: &mut N,
    leaves: &[NodeRef],
    max_tfi_inputs: usize,
) -> TruthTable {
    let params = ReconvCutParams {
        cut_size: max_tfi_inputs.max(leaves.len()),
    };
    let window = reconvergence_driven_cut(ntk, leaves, &params);
    let tables = simulate_cone(ntk, &window, leaves);

    let mut care = TruthTable::const0(leaves.len());
    for m in 0..(1usize << window.len()) {
        let pattern = tables
            .iter()
            .enumerate()
            .fold(0usize, |acc, (i, tt)| acc | ((tt.get_bit(m) as usize) << i));
        care.set_bit(pattern, true);
    }
    log::trace!(
        "satisfiability_dont_cares: leaves={} window={} care_minterms={}",
        leaves.len(),
        window.len(),
        care.count_ones()
    );
    care.not()
}
