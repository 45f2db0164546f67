// SPDX-License-Identifier: Apache-2.0

//! And-inverter graph: two-input AND gates with complemented edges.

use super::storage::Storage;
use super::{GateNetwork, Network, NodeRef, Signal};
use crate::truth_table::TruthTable;

#[derive(Debug, Clone)]
pub struct Aig {
    storage: Storage<Signal>,
    and_lit: u32,
}

impl Default for Aig {
    fn default() -> Self {
        Self::new()
    }
}

impl Aig {
    pub fn new() -> Self {
        let mut storage = Storage::new(&[false], true);
        let and_lit = storage.insert_function(TruthTable::var(2, 0).and(&TruthTable::var(2, 1)));
        Self { storage, and_lit }
    }
}

impl Network for Aig {
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
            2,
            "AIG node {} must be cloned with two children",
            source.id
        );
        self.create_and(children[0], children[1])
    }

    fn empty() -> Self {
        Self::new()
    }
}

impl GateNetwork for Aig {
    fn create_and(&mut self, a: Signal, b: Signal) -> Signal {
        let (a, b) = if a <= b { (a, b) } else { (b, a) };
        if a.node == b.node {
            return if a.negated == b.negated {
                a
            } else {
                self.get_constant(false)
            };
        }
        // The constant node has index 0 and therefore sorts first.
        if a.node.id == 0 {
            return if a.negated { b } else { self.get_constant(false) };
        }
        let n = self.storage.create_node(vec![a, b], self.and_lit);
        Signal::new(n, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_hashing_dedups() {
        let mut aig = Aig::new();
        let a = aig.create_pi();
        let b = aig.create_pi();
        let f1 = aig.create_and(a, b);
        let size = aig.size();
        let f2 = aig.create_and(b, a);
        assert_eq!(f1, f2);
        assert_eq!(aig.size(), size);
        assert_eq!(aig.fanout_size(a.node), 1);
    }

    #[test]
    fn test_constant_folding() {
        let mut aig = Aig::new();
        let a = aig.create_pi();
        let zero = aig.get_constant(false);
        let one = aig.get_constant(true);
        assert_eq!(aig.create_and(a, zero), zero);
        assert_eq!(aig.create_and(one, a), a);
        assert_eq!(aig.create_and(a, a), a);
        assert_eq!(aig.create_and(a, !a), zero);
        assert_eq!(aig.num_gates(), 0);
    }

    #[test]
    fn test_or_is_de_morgan() {
        let mut aig = Aig::new();
        let a = aig.create_pi();
        let b = aig.create_pi();
        let f = aig.create_or(a, b);
        assert!(f.negated);
        assert_eq!(aig.fanins(f.node), &[!a, !b]);
    }

    #[test]
    fn test_substitute_rewires_parents_and_outputs() {
        let mut aig = Aig::new();
        let a = aig.create_pi();
        let b = aig.create_pi();
        let c = aig.create_pi();
        let ab = aig.create_and(a, b);
        let top = aig.create_and(ab, c);
        aig.create_po(!ab);
        aig.create_po(top);
        aig.substitute_node(ab.node, !c);
        assert_eq!(aig.pos()[0], c);
        assert_eq!(aig.fanins(top.node), &[c, !c]);
        assert_eq!(aig.fanout_size(ab.node), 0);
        assert_eq!(aig.fanout_size(c.node), 3);
    }

    #[test]
    fn test_substitute_keeps_references_from_replacement() {
        let mut aig = Aig::new();
        let a = aig.create_pi();
        let b = aig.create_pi();
        let c = aig.create_pi();
        let ab = aig.create_and(a, b);
        let top = aig.create_and(ab, c);
        let wider = aig.create_and(ab, !c);
        aig.create_po(top);
        assert_eq!(aig.fanout_size(ab.node), 2);
        aig.substitute_node(ab.node, wider);
        assert!(aig.fanins(wider.node).contains(&ab));
        assert_eq!(aig.fanout_size(ab.node), 1);
        assert_eq!(aig.fanout_size(wider.node), 1);
    }

    #[test]
    fn test_events_fire_in_order() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let mut aig = Aig::new();
        let a = aig.create_pi();
        let b = aig.create_pi();
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_add = log.clone();
        aig.events()
            .subscribe_add(move |n| log_add.borrow_mut().push(format!("add {}", n.id)));
        let log_mod = log.clone();
        aig.events().subscribe_modified(move |n, old| {
            log_mod
                .borrow_mut()
                .push(format!("mod {} had {}", n.id, old.len()))
        });
        let ab = aig.create_and(a, b);
        let top = aig.create_and(ab, b);
        aig.substitute_node(ab.node, a);
        assert_eq!(
            *log.borrow(),
            vec![
                format!("add {}", ab.node.id),
                format!("add {}", top.node.id),
                format!("mod {} had 2", top.node.id),
            ]
        );
    }
}
