// SPDX-License-Identifier: Apache-2.0

//! Exact matching of small majority-expressible functions.
//!
//! Recognises constants, projections, two- and three-input AND (OR by
//! duality) and three-input majority, each with arbitrary input and output
//! complementation. Anything else yields no candidate.

use super::{OnSignal, Resynthesis};
use crate::network::GateNetwork;
use crate::truth_table::TruthTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    And2,
    And3,
    Maj3,
}

/// A matched implementation: a gate shape over `(leaf, complemented)`
/// literals plus an output complement.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Match {
    shape: Shape,
    literals: Vec<(usize, bool)>,
    negate_output: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MajorityResynthesis;

impl MajorityResynthesis {
    pub fn new() -> Self {
        Self
    }
}

fn literal_table(num_vars: usize, (var, negated): (usize, bool)) -> TruthTable {
    TruthTable::var(num_vars, var).with_polarity(negated)
}

fn polarities(arity: usize) -> impl Iterator<Item = Vec<bool>> {
    (0..1usize << arity).map(move |mask| (0..arity).map(|i| (mask >> i) & 1 == 1).collect())
}

fn find_match(function: &TruthTable) -> Option<Match> {
    let n = function.num_vars();
    let support = function.support();
    let shapes: &[(Shape, usize)] = match support.len() {
        2 => &[(Shape::And2, 2)],
        3 => &[(Shape::And3, 3), (Shape::Maj3, 3)],
        _ => &[],
    };
    for &(shape, arity) in shapes {
        for negated in polarities(arity) {
            let literals: Vec<(usize, bool)> =
                support.iter().copied().zip(negated.iter().copied()).collect();
            let tables: Vec<TruthTable> = literals.iter().map(|l| literal_table(n, *l)).collect();
            let tt = match shape {
                Shape::And2 => tables[0].and(&tables[1]),
                Shape::And3 => tables[0].and(&tables[1]).and(&tables[2]),
                Shape::Maj3 => TruthTable::maj(&tables[0], &tables[1], &tables[2]),
            };
            for negate_output in [false, true] {
                if tt.with_polarity(negate_output) == *function {
                    return Some(Match {
                        shape,
                        literals,
                        negate_output,
                    });
                }
            }
        }
    }
    None
}

impl<N: GateNetwork> Resynthesis<N> for MajorityResynthesis {
    fn resynthesize(
        &mut self,
        ntk: &mut N,
        function: &TruthTable,
        leaves: &[N::Signal],
        on_signal: &mut OnSignal<'_, N>,
    ) {
        assert_eq!(
            function.num_vars(),
            leaves.len(),
            "function arity does not match the number of leaves"
        );
        if function.is_const0() || function.is_const1() {
            let s = ntk.get_constant(function.is_const1());
            on_signal(ntk, s);
            return;
        }
        for (i, leaf) in leaves.iter().enumerate() {
            let var = TruthTable::var(function.num_vars(), i);
            if *function == var {
                on_signal(ntk, *leaf);
                return;
            }
            if *function == var.not() {
                let s = ntk.create_not(*leaf);
                on_signal(ntk, s);
                return;
            }
        }

        let Some(m) = find_match(function) else {
            return;
        };
        let mut literals = Vec::with_capacity(m.literals.len());
        for (var, negated) in m.literals.iter().copied() {
            let s = if negated {
                ntk.create_not(leaves[var])
            } else {
                leaves[var]
            };
            literals.push(s);
        }
        let s = match m.shape {
            Shape::And2 => ntk.create_and(literals[0], literals[1]),
            Shape::And3 => {
                let t = ntk.create_and(literals[0], literals[1]);
                ntk.create_and(t, literals[2])
            }
            Shape::Maj3 => ntk.create_maj(literals[0], literals[1], literals[2]),
        };
        let s = if m.negate_output { ntk.create_not(s) } else { s };
        log::trace!("majority resynthesis: {} matched as {:?}", function, m.shape);
        on_signal(ntk, s);
    }
}
