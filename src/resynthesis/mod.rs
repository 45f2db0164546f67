// SPDX-License-Identifier: Apache-2.0

//! Resynthesis oracles: given a cut function and its leaves, build candidate
//! implementations in the network and report them one at a time.
//!
//! Candidates are reported through `on_signal`, which receives the network
//! back so the caller can inspect and annotate it between proposals.
//! Returning `false` from `on_signal` asks the oracle to stop.

pub mod lut;
pub mod majority;
pub mod shannon;

pub use lut::LutResynthesis;
pub use majority::MajorityResynthesis;
pub use shannon::ShannonResynthesis;

use crate::network::Network;
use crate::truth_table::TruthTable;

pub type OnSignal<'a, N> = dyn FnMut(&mut N, <N as Network>::Signal) -> bool + 'a;

pub trait Resynthesis<N: Network> {
    /// Whether `resynthesize_with_dont_cares` makes use of its mask. The
    /// rewriting engine only computes don't-cares for oracles that do.
    const SUPPORTS_DONT_CARES: bool = false;

    /// `leaves[i]` drives variable `i` of `function`.
    fn resynthesize(
        &mut self,
        ntk: &mut N,
        function: &TruthTable,
        leaves: &[N::Signal],
        on_signal: &mut OnSignal<'_, N>,
    );

    /// Like `resynthesize`, but outputs on assignments set in `dont_cares`
    /// may be chosen freely.
    fn resynthesize_with_dont_cares(
        &mut self,
        ntk: &mut N,
        function: &TruthTable,
        dont_cares: &TruthTable,
        leaves: &[N::Signal],
        on_signal: &mut OnSignal<'_, N>,
    ) {
        let _ = dont_cares;
        self.resynthesize(ntk, function, leaves, on_signal);
    }
}

impl<N, F> Resynthesis<N> for F
where
    N: Network,
    F: FnMut(&mut N, &TruthTable, &[N::Signal], &mut OnSignal<'_, N>),
{
    fn resynthesize(
        &mut self,
        ntk: &mut N,
        function: &TruthTable,
        leaves: &[N::Signal],
        on_signal: &mut OnSignal<'_, N>,
    ) {
        self(ntk, function, leaves, on_signal)
    }
}

/// Adapts a closure that also takes a don't-care mask.
pub struct WithDontCares<F>(pub F);

impl<N, F> Resynthesis<N> for WithDontCares<F>
where
    N: Network,
    F: FnMut(&mut N, &TruthTable, &TruthTable, &[N::Signal], &mut OnSignal<'_, N>),
{
    const SUPPORTS_DONT_CARES: bool = true;

    fn resynthesize(
        &mut self,
        ntk: &mut N,
        function: &TruthTable,
        leaves: &[N::Signal],
        on_signal: &mut OnSignal<'_, N>,
    ) {
        let none = TruthTable::const0(function.num_vars());
        (self.0)(ntk, function, &none, leaves, on_signal)
    }

    fn resynthesize_with_dont_cares(
        &mut self,
        ntk: &mut N,
        function: &TruthTable,
        dont_cares: &TruthTable,
        leaves: &[N::Signal],
        on_signal: &mut OnSignal<'_, N>,
    ) {
        (self.0)(ntk, function, dont_cares, leaves, on_signal)
    }
}
