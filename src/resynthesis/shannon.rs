// SPDX-License-Identifier: Apache-2.0

//! Shannon decomposition over any gate-level network.
//!
//! A function is split on one variable into its two cofactors, which are
//! built recursively and joined with the cheapest gate that fits: AND/OR
//! when one cofactor is constant, XOR when the cofactors are complements,
//! otherwise an if-then-else. Assignments outside the care set are used to
//! drop variables and to detect terminals early.

use ahash::AHashMap;

use super::{OnSignal, Resynthesis};
use crate::network::GateNetwork;
use crate::truth_table::TruthTable;

#[derive(Debug, Clone, Default)]
pub struct ShannonResynthesis {
    /// Upper bound on candidates per call; `0` means one per split variable.
    pub max_candidates: usize,
}

impl ShannonResynthesis {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Returns the constant value of `s`, if it is one.
fn constant_of<N: GateNetwork>(ntk: &N, s: N::Signal) -> Option<bool> {
    let n = ntk.get_node(s);
    if ntk.is_constant(n) {
        Some(ntk.constant_value(n) ^ ntk.is_complemented(s))
    } else {
        None
    }
}

/// Whether `on` depends on `var` somewhere both cofactors are cared for.
fn depends(on: &TruthTable, care: &TruthTable, var: usize) -> bool {
    let both = care.cofactor0(var).and(&care.cofactor1(var));
    !on.cofactor0(var)
        .xor(&on.cofactor1(var))
        .and(&both)
        .is_const0()
}

struct Builder<'a, N: GateNetwork> {
    leaves: &'a [N::Signal],
    memo: AHashMap<(TruthTable, TruthTable), N::Signal>,
}

impl<N: GateNetwork> Builder<'_, N> {
    /// Removes variables that only matter where one cofactor is a
    /// don't-care, merging the cared-for halves.
    fn drop_free_vars(&self, on: &mut TruthTable, care: &mut TruthTable) {
        for var in 0..on.num_vars() {
            if (on.has_var(var) || care.has_var(var)) && !depends(on, care, var) {
                let care1 = care.cofactor1(var);
                let merged = TruthTable::ite(&care1, &on.cofactor1(var), &on.cofactor0(var));
                *care = care.cofactor0(var).or(&care1);
                *on = merged.and(care);
            }
        }
    }

    fn terminal(&self, ntk: &mut N, on: &TruthTable, care: &TruthTable) -> Option<N::Signal> {
        if on.is_const0() {
            return Some(ntk.get_constant(false));
        }
        if on == care {
            return Some(ntk.get_constant(true));
        }
        let n = on.num_vars();
        for (i, leaf) in self.leaves.iter().enumerate() {
            let lit = TruthTable::var(n, i);
            if on.xor(&lit).and(care).is_const0() {
                return Some(*leaf);
            }
            if on.xor(&lit.not()).and(care).is_const0() {
                return Some(ntk.create_not(*leaf));
            }
        }
        None
    }

    fn build(
        &mut self,
        ntk: &mut N,
        on: &TruthTable,
        care: &TruthTable,
        split: Option<usize>,
    ) -> N::Signal {
        let mut care = care.clone();
        let mut on = on.and(&care);
        if care.is_const0() {
            return ntk.get_constant(false);
        }
        self.drop_free_vars(&mut on, &mut care);
        if let Some(s) = self.terminal(ntk, &on, &care) {
            return s;
        }
        let key = (on.clone(), care.clone());
        if split.is_none() {
            if let Some(s) = self.memo.get(&key) {
                return *s;
            }
        }

        let var = match split {
            Some(v) if on.has_var(v) => v,
            _ => match (0..on.num_vars()).rev().find(|v| on.has_var(*v)) {
                Some(v) => v,
                None => unreachable!("non-terminal function without support"),
            },
        };
        let (on0, on1) = (on.cofactor0(var), on.cofactor1(var));
        let (care0, care1) = (care.cofactor0(var), care.cofactor1(var));
        let x = self.leaves[var];

        let s0 = self.build(ntk, &on0, &care0, None);
        let s1 = self.build(ntk, &on1, &care1, None);
        let result = if s0 == s1 {
            s0
        } else {
            match (constant_of(ntk, s0), constant_of(ntk, s1)) {
                (Some(false), _) => ntk.create_and(x, s1),
                (Some(true), _) => {
                    let nx = ntk.create_not(x);
                    ntk.create_or(nx, s1)
                }
                (_, Some(false)) => {
                    let nx = ntk.create_not(x);
                    ntk.create_and(nx, s0)
                }
                (_, Some(true)) => ntk.create_or(x, s0),
                _ if care0 == care1 && on0.xor(&on1).and(&care0) == care0 => {
                    ntk.create_xor(x, s0)
                }
                _ => ntk.create_ite(x, s1, s0),
            }
        };
        if split.is_none() {
            self.memo.insert(key, result);
        }
        result
    }
}

impl ShannonResynthesis {
    fn run<N: GateNetwork>(
        &self,
        ntk: &mut N,
        function: &TruthTable,
        care: &TruthTable,
        leaves: &[N::Signal],
        on_signal: &mut OnSignal<'_, N>,
    ) {
        assert_eq!(
            function.num_vars(),
            leaves.len(),
            "function arity does not match the number of leaves"
        );
        let mut builder = Builder::<N> {
            leaves,
            memo: AHashMap::new(),
        };
        let on = function.and(care);
        let split_vars: Vec<usize> = (0..function.num_vars())
            .rev()
            .filter(|v| depends(&on, care, *v))
            .collect();
        if split_vars.is_empty() {
            let s = builder.build(ntk, function, care, None);
            on_signal(ntk, s);
            return;
        }
        let limit = if self.max_candidates == 0 {
            split_vars.len()
        } else {
            self.max_candidates
        };
        let mut proposed: Vec<N::Signal> = Vec::new();
        for var in split_vars.into_iter().take(limit) {
            let s = builder.build(ntk, function, care, Some(var));
            if proposed.contains(&s) {
                continue;
            }
            proposed.push(s);
            if !on_signal(ntk, s) {
                return;
            }
        }
    }
}

impl<N: GateNetwork> Resynthesis<N> for ShannonResynthesis {
    const SUPPORTS_DONT_CARES: bool = true;

    fn resynthesize(
        &mut self,
        ntk: &mut N,
        function: &TruthTable,
        leaves: &[N::Signal],
        on_signal: &mut OnSignal<'_, N>,
    ) {
        let care = TruthTable::const1(function.num_vars());
        self.run(ntk, function, &care, leaves, on_signal);
    }

    fn resynthesize_with_dont_cares(
        &mut self,
        ntk: &mut N,
        function: &TruthTable,
        dont_cares: &TruthTable,
        leaves: &[N::Signal],
        on_signal: &mut OnSignal<'_, N>,
    ) {
        let care = dont_cares.not();
        self.run(ntk, function, &care, leaves, on_signal);
    }
}
