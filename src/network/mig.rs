// SPDX-License-Identifier: Apache-2.0

//! Majority-inverter graph: three-input majority gates with complemented
//! edges. AND and OR are majority gates with a constant fanin.

use super::storage::Storage;
use super::{GateNetwork, Network, NodeRef, Signal};
use crate::truth_table::TruthTable;

#[derive(Debug, Clone)]
pub struct Mig {
    storage: Storage<Signal>,
    maj_lit: u32,
}

impl Default for Mig {
    fn default() -> Self {
        Self::new()
    }
}

impl Mig {
    pub fn new() -> Self {
        let mut storage = Storage::new(&[false], true);
        let maj_lit = storage.insert_function(TruthTable::maj(
            &TruthTable::var(3, 0),
            &TruthTable::var(3, 1),
            &TruthTable::var(3, 2),
        ));
        Self { storage, maj_lit }
    }
}

impl Network for Mig {
    type Signal = Signal;

    fn storage(&self) -> &Storage<Signal> {
        &self.storage
    }

    fn storage_mut(&mut self) -> &mut Storage<Signal> {
        &mut self.storage
    }

    fn get_constant(&self, value: bool) -> Signal {
        Signal::new(NodeRef::new(0), value)
    }

    fn create_not(&mut self, a: Signal) -> Signal {
        a.negate()
    }

    fn clone_node(&mut self, _other: &Self, source: NodeRef, children: &[Signal]) -> Signal {
        assert_eq!(
            children.len(),
            3,
            "MIG node {} must be cloned with three children",
            source.id
        );
        self.create_maj(children[0], children[1], children[2])
    }

    fn empty() -> Self {
        Self::new()
    }
}

impl GateNetwork for Mig {
    fn create_and(&mut self, a: Signal, b: Signal) -> Signal {
        let zero = self.get_constant(false);
        self.create_maj(zero, a, b)
    }

    fn create_or(&mut self, a: Signal, b: Signal) -> Signal {
        let one = self.get_constant(true);
        self.create_maj(one, a, b)
    }

    fn create_maj(&mut self, a: Signal, b: Signal, c: Signal) -> Signal {
        let mut children = [a, b, c];
        children.sort();
        let [a, b, c] = children;

        // maj(x, x, y) = x and maj(x, !x, y) = y
        if a.node == b.node {
            return if a.negated == b.negated { a } else { c };
        }
        if b.node == c.node {
            return if b.negated == c.negated { b } else { a };
        }
        if a.node == c.node {
            return if a.negated == c.negated { a } else { b };
        }

        // Self-duality: keep at most one complemented fanin.
        let num_negated = children.iter().filter(|s| s.negated).count();
        let (children, negate_output) = if num_negated >= 2 {
            (children.map(|s| s.negate()), true)
        } else {
            (children, false)
        };
        let n = self.storage.create_node(children.to_vec(), self.maj_lit);
        Signal::new(n, negate_output)
    }
}
