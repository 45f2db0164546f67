// SPDX-License-Identifier: Apache-2.0

//! Structurally hashed logic networks.
//!
//! All network kinds share one node arena ([`Storage`]) and expose the same
//! capability surface through the [`Network`] trait. Algorithms are written
//! against that trait, so a missing capability is a compile-time error.

pub mod aig;
pub mod events;
pub mod klut;
pub mod mig;
pub mod storage;

use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

pub use aig::Aig;
pub use events::Events;
pub use klut::Klut;
pub use mig::Mig;
pub use storage::{NodeKind, Storage, Traversal};

use crate::truth_table::TruthTable;

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct NodeRef {
    pub id: usize,
}

impl NodeRef {
    pub const fn new(id: usize) -> Self {
        Self { id }
    }
}

/// A node reference plus an output complementation bit.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Signal {
    pub node: NodeRef,
    pub negated: bool,
}

impl Signal {
    pub const fn new(node: NodeRef, negated: bool) -> Self {
        Self { node, negated }
    }

    #[must_use]
    pub fn negate(&self) -> Self {
        Self {
            node: self.node,
            negated: !self.negated,
        }
    }
}

impl std::ops::Not for Signal {
    type Output = Signal;

    fn not(self) -> Signal {
        self.negate()
    }
}

impl From<NodeRef> for Signal {
    fn from(node: NodeRef) -> Self {
        Signal {
            node,
            negated: false,
        }
    }
}

/// What the storage needs to know about a fanin edge.
pub trait SignalLike: Copy + Eq + Hash + Ord + Debug {
    fn node(self) -> NodeRef;
    fn is_complemented(self) -> bool;
    fn from_node(node: NodeRef) -> Self;
    /// The edge obtained by pointing `self` at `target` instead of its
    /// current node, composing polarities.
    fn retarget(self, target: Self) -> Self;
}

impl SignalLike for Signal {
    fn node(self) -> NodeRef {
        self.node
    }

    fn is_complemented(self) -> bool {
        self.negated
    }

    fn from_node(node: NodeRef) -> Self {
        node.into()
    }

    fn retarget(self, target: Self) -> Self {
        Signal {
            node: target.node,
            negated: target.negated ^ self.negated,
        }
    }
}

impl SignalLike for NodeRef {
    fn node(self) -> NodeRef {
        self
    }

    fn is_complemented(self) -> bool {
        false
    }

    fn from_node(node: NodeRef) -> Self {
        node
    }

    fn retarget(self, target: Self) -> Self {
        target
    }
}

/// Iterator over every node index of a network, dangling ones included.
#[derive(Debug, Clone)]
pub struct NodeRange(std::ops::Range<usize>);

impl Iterator for NodeRange {
    type Item = NodeRef;

    fn next(&mut self) -> Option<NodeRef> {
        self.0.next().map(NodeRef::new)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

/// Capability surface shared by every network kind.
///
/// Everything except construction of kind-specific nodes is provided on top
/// of the shared [`Storage`].
pub trait Network: Sized {
    type Signal: SignalLike;

    fn storage(&self) -> &Storage<Self::Signal>;
    fn storage_mut(&mut self) -> &mut Storage<Self::Signal>;

    fn get_constant(&self, value: bool) -> Self::Signal;
    fn create_not(&mut self, a: Self::Signal) -> Self::Signal;

    /// Re-creates `source` (a node of `other`) with the same function over
    /// `children`.
    fn clone_node(&mut self, other: &Self, source: NodeRef, children: &[Self::Signal])
    -> Self::Signal;

    /// A fresh, empty network of the same kind.
    fn empty() -> Self;

    fn size(&self) -> usize {
        self.storage().size()
    }

    fn nodes(&self) -> NodeRange {
        NodeRange(0..self.size())
    }

    fn num_pis(&self) -> usize {
        self.storage().pis().len()
    }

    fn num_pos(&self) -> usize {
        self.storage().pos().len()
    }

    fn num_latches(&self) -> usize {
        self.storage().ris().len()
    }

    fn num_cis(&self) -> usize {
        self.storage().pis().len() + self.storage().ros().len()
    }

    fn num_cos(&self) -> usize {
        self.storage().pos().len() + self.storage().ris().len()
    }

    fn num_gates(&self) -> usize {
        self.storage().num_gates()
    }

    fn get_node(&self, s: Self::Signal) -> NodeRef {
        s.node()
    }

    fn make_signal(&self, n: NodeRef) -> Self::Signal {
        Self::Signal::from_node(n)
    }

    fn is_complemented(&self, s: Self::Signal) -> bool {
        s.is_complemented()
    }

    fn node_to_index(&self, n: NodeRef) -> usize {
        n.id
    }

    fn index_to_node(&self, index: usize) -> NodeRef {
        NodeRef::new(index)
    }

    fn kind(&self, n: NodeRef) -> NodeKind {
        self.storage().node(n).kind
    }

    fn is_constant(&self, n: NodeRef) -> bool {
        matches!(self.kind(n), NodeKind::Constant(_))
    }

    fn constant_value(&self, n: NodeRef) -> bool {
        match self.kind(n) {
            NodeKind::Constant(v) => v,
            other => panic!("node {:?} is not a constant: {:?}", n, other),
        }
    }

    fn is_pi(&self, n: NodeRef) -> bool {
        matches!(self.kind(n), NodeKind::Pi)
    }

    fn is_ro(&self, n: NodeRef) -> bool {
        matches!(self.kind(n), NodeKind::Ro)
    }

    fn is_ci(&self, n: NodeRef) -> bool {
        matches!(self.kind(n), NodeKind::Pi | NodeKind::Ro)
    }

    fn is_gate(&self, n: NodeRef) -> bool {
        matches!(self.kind(n), NodeKind::Gate)
    }

    fn pis(&self) -> &[NodeRef] {
        self.storage().pis()
    }

    fn ros(&self) -> &[NodeRef] {
        self.storage().ros()
    }

    /// Combinational inputs: primary inputs followed by register outputs.
    fn cis(&self) -> Vec<NodeRef> {
        let mut cis = self.pis().to_vec();
        cis.extend_from_slice(self.ros());
        cis
    }

    fn pos(&self) -> &[Self::Signal] {
        self.storage().pos()
    }

    fn ris(&self) -> &[Self::Signal] {
        self.storage().ris()
    }

    /// Combinational outputs: primary outputs followed by register inputs.
    fn cos(&self) -> Vec<Self::Signal> {
        let mut cos = self.pos().to_vec();
        cos.extend_from_slice(self.ris());
        cos
    }

    fn fanins(&self, n: NodeRef) -> &[Self::Signal] {
        &self.storage().node(n).children
    }

    fn fanin_size(&self, n: NodeRef) -> usize {
        self.fanins(n).len()
    }

    fn fanout_size(&self, n: NodeRef) -> u32 {
        self.storage().node(n).fanout
    }

    fn node_function(&self, n: NodeRef) -> TruthTable {
        self.storage().node_function(n)
    }

    fn create_pi(&mut self) -> Self::Signal {
        let n = self.storage_mut().add_input(NodeKind::Pi);
        Self::Signal::from_node(n)
    }

    /// Adds a register output; it acts as a combinational input.
    fn create_ro(&mut self) -> Self::Signal {
        let n = self.storage_mut().add_input(NodeKind::Ro);
        Self::Signal::from_node(n)
    }

    fn create_po(&mut self, s: Self::Signal) -> usize {
        self.storage_mut().add_po(s)
    }

    /// Adds a register input; it acts as a combinational output.
    fn create_ri(&mut self, s: Self::Signal) -> usize {
        self.storage_mut().add_ri(s)
    }

    fn substitute_node(&mut self, old: NodeRef, new: Self::Signal) {
        self.storage_mut().substitute_node(old, new);
    }

    fn value(&self, n: NodeRef) -> u32 {
        self.storage().traversal().value(n)
    }

    fn set_value(&mut self, n: NodeRef, v: u32) {
        self.storage_mut().traversal_mut().set_value(n, v);
    }

    /// Returns the value before the increment.
    fn incr_value(&mut self, n: NodeRef) -> u32 {
        self.storage_mut().traversal_mut().incr_value(n)
    }

    /// Returns the value after the decrement.
    fn decr_value(&mut self, n: NodeRef) -> u32 {
        self.storage_mut().traversal_mut().decr_value(n)
    }

    fn clear_values(&mut self) {
        self.storage_mut().traversal_mut().clear_values();
    }

    fn visited(&self, n: NodeRef) -> u32 {
        self.storage().traversal().visited(n)
    }

    fn set_visited(&mut self, n: NodeRef, v: u32) {
        self.storage_mut().traversal_mut().set_visited(n, v);
    }

    fn trav_id(&self) -> u32 {
        self.storage().traversal().trav_id()
    }

    fn incr_trav_id(&mut self) -> u32 {
        self.storage_mut().traversal_mut().incr_trav_id()
    }

    fn clear_visited(&mut self) {
        self.storage_mut().traversal_mut().clear_visited();
    }

    fn events(&mut self) -> &mut Events<Self::Signal> {
        self.storage_mut().events_mut()
    }
}

/// Boolean gate construction on top of a network's native node kind.
pub trait GateNetwork: Network {
    fn create_and(&mut self, a: Self::Signal, b: Self::Signal) -> Self::Signal;

    fn create_or(&mut self, a: Self::Signal, b: Self::Signal) -> Self::Signal {
        let na = self.create_not(a);
        let nb = self.create_not(b);
        let n = self.create_and(na, nb);
        self.create_not(n)
    }

    fn create_xor(&mut self, a: Self::Signal, b: Self::Signal) -> Self::Signal {
        let nb = self.create_not(b);
        let na = self.create_not(a);
        let t0 = self.create_and(a, nb);
        let t1 = self.create_and(na, b);
        self.create_or(t0, t1)
    }

    fn create_ite(&mut self, cond: Self::Signal, then: Self::Signal, els: Self::Signal) -> Self::Signal {
        let ncond = self.create_not(cond);
        let t0 = self.create_and(cond, then);
        let t1 = self.create_and(ncond, els);
        self.create_or(t0, t1)
    }

    fn create_maj(&mut self, a: Self::Signal, b: Self::Signal, c: Self::Signal) -> Self::Signal {
        let ab = self.create_and(a, b);
        let a_or_b = self.create_or(a, b);
        let c_and = self.create_and(c, a_or_b);
        self.create_or(ab, c_and)
    }
}
