// SPDX-License-Identifier: Apache-2.0

//! k-input lookup-table network.
//!
//! Signals and nodes coincide, so complementation is an explicit NOT node.
//! The constants false and true live at indices 0 and 1.

use super::storage::Storage;
use super::{GateNetwork, Network, NodeRef};
use crate::truth_table::TruthTable;

#[derive(Debug, Clone)]
pub struct Klut {
    storage: Storage<NodeRef>,
}

impl Default for Klut {
    fn default() -> Self {
        Self::new()
    }
}

impl Klut {
    pub fn new() -> Self {
        Self {
            storage: Storage::new(&[false, true], false),
        }
    }

    /// Creates a LUT computing `function` over `children`; variable `i` of
    /// the function is driven by `children[i]`.
    pub fn create_node(&mut self, children: &[NodeRef], function: TruthTable) -> NodeRef {
        assert_eq!(
            children.len(),
            function.num_vars(),
            "LUT function arity does not match its fanin count"
        );
        if children.is_empty() {
            return self.get_constant(function.get_bit(0));
        }
        let func = self.storage.insert_function(function);
        self.storage.create_node(children.to_vec(), func)
    }
}

impl Network for Klut {
    type Signal = NodeRef;

    fn storage(&self) -> &Storage<NodeRef> {
        &self.storage
    }

    fn storage_mut(&mut self) -> &mut Storage<NodeRef> {
        &mut self.storage
    }

    fn get_constant(&self, value: bool) -> NodeRef {
        NodeRef::new(value as usize)
    }

    fn create_not(&mut self, a: NodeRef) -> NodeRef {
        self.create_node(&[a], TruthTable::var(1, 0).not())
    }

    fn clone_node(&mut self, other: &Self, source: NodeRef, children: &[NodeRef]) -> NodeRef {
        self.create_node(children, other.node_function(source))
    }

    fn empty() -> Self {
        Self::new()
    }
}

impl GateNetwork for Klut {
    fn create_and(&mut self, a: NodeRef, b: NodeRef) -> NodeRef {
        self.create_node(&[a, b], TruthTable::from_u64(2, 0b1000))
    }

    fn create_or(&mut self, a: NodeRef, b: NodeRef) -> NodeRef {
        self.create_node(&[a, b], TruthTable::from_u64(2, 0b1110))
    }

    fn create_xor(&mut self, a: NodeRef, b: NodeRef) -> NodeRef {
        self.create_node(&[a, b], TruthTable::from_u64(2, 0b0110))
    }

    fn create_ite(&mut self, cond: NodeRef, then: NodeRef, els: NodeRef) -> NodeRef {
        // Variable order is (cond, then, else).
        self.create_node(&[cond, then, els], TruthTable::from_u64(3, 0xD8))
    }

    fn create_maj(&mut self, a: NodeRef, b: NodeRef, c: NodeRef) -> NodeRef {
        self.create_node(&[a, b, c], TruthTable::from_u64(3, 0xE8))
    }
}
