// SPDX-License-Identifier: Apache-2.0

//! Collapses a cut into one lookup table over the leaves its function
//! actually depends on.

use super::{OnSignal, Resynthesis};
use crate::network::{Klut, NodeRef};
use crate::truth_table::TruthTable;

#[derive(Debug, Clone, Copy, Default)]
pub struct LutResynthesis;

impl Resynthesis<Klut> for LutResynthesis {
    fn resynthesize(
        &mut self,
        ntk: &mut Klut,
        function: &TruthTable,
        leaves: &[NodeRef],
        on_signal: &mut OnSignal<'_, Klut>,
    ) {
        assert_eq!(function.num_vars(), leaves.len());
        let (shrunk, support) = function.min_base();
        let s = if shrunk.num_vars() == 1 && shrunk == TruthTable::var(1, 0) {
            leaves[support[0]]
        } else {
            let children: Vec<NodeRef> = support.iter().map(|v| leaves[*v]).collect();
            ntk.create_node(&children, shrunk)
        };
        on_signal(ntk, s);
    }
}
