// SPDX-License-Identifier: Apache-2.0

//! Node arena shared by every network kind.
//!
//! Nodes are addressed by dense indices. Fanout counters are maintained
//! incrementally by node creation, output creation and substitution; nothing
//! else touches them.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use super::events::Events;
use super::{NodeRef, SignalLike};
use crate::truth_table::TruthTable;
use crate::tt_cache::{LIT_CONST0, LIT_CONST1, TruthTableCache};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Constant(bool),
    Pi,
    /// Register output.
    Ro,
    Gate,
}

#[derive(Debug, Clone)]
pub struct StorageNode<S> {
    pub kind: NodeKind,
    pub children: Vec<S>,
    /// Literal into the truth-table cache.
    pub func: u32,
    pub fanout: u32,
}

/// Per-node scratch state for graph walks.
///
/// `values` are free-form counters (cost estimation uses them as reference
/// counts). A node is visited in the current walk iff its mark equals
/// `trav_id`; callers bump `trav_id` before each walk.
#[derive(Debug, Clone, Default)]
pub struct Traversal {
    values: Vec<u32>,
    visited: Vec<u32>,
    trav_id: u32,
}

impl Traversal {
    fn grow(&mut self, len: usize) {
        self.values.resize(len, 0);
        self.visited.resize(len, 0);
    }

    pub fn value(&self, n: NodeRef) -> u32 {
        self.values[n.id]
    }

    pub fn set_value(&mut self, n: NodeRef, v: u32) {
        self.values[n.id] = v;
    }

    pub fn incr_value(&mut self, n: NodeRef) -> u32 {
        let old = self.values[n.id];
        self.values[n.id] = old + 1;
        old
    }

    pub fn decr_value(&mut self, n: NodeRef) -> u32 {
        let v = &mut self.values[n.id];
        assert!(*v > 0, "reference counter underflow at node {}", n.id);
        *v -= 1;
        *v
    }

    pub fn clear_values(&mut self) {
        self.values.iter_mut().for_each(|v| *v = 0);
    }

    pub fn visited(&self, n: NodeRef) -> u32 {
        self.visited[n.id]
    }

    pub fn set_visited(&mut self, n: NodeRef, v: u32) {
        self.visited[n.id] = v;
    }

    pub fn trav_id(&self) -> u32 {
        self.trav_id
    }

    pub fn incr_trav_id(&mut self) -> u32 {
        self.trav_id += 1;
        self.trav_id
    }

    pub fn clear_visited(&mut self) {
        self.visited.iter_mut().for_each(|v| *v = 0);
    }
}

#[derive(Debug, Clone)]
pub struct Storage<S> {
    nodes: Vec<StorageNode<S>>,
    pis: Vec<NodeRef>,
    ros: Vec<NodeRef>,
    pos: Vec<S>,
    ris: Vec<S>,
    strash: AHashMap<(Vec<S>, u32), NodeRef>,
    cache: TruthTableCache,
    traversal: Traversal,
    events: Events<S>,
    num_constants: usize,
    /// Gate functions are symmetric, so fanins are kept sorted.
    symmetric_gates: bool,
}

impl<S: SignalLike> Storage<S> {
    /// Creates an arena holding one constant node per entry of `constants`.
    pub fn new(constants: &[bool], symmetric_gates: bool) -> Self {
        let mut storage = Self {
            nodes: Vec::new(),
            pis: Vec::new(),
            ros: Vec::new(),
            pos: Vec::new(),
            ris: Vec::new(),
            strash: AHashMap::new(),
            cache: TruthTableCache::new(),
            traversal: Traversal::default(),
            events: Events::default(),
            num_constants: constants.len(),
            symmetric_gates,
        };
        for value in constants {
            storage.nodes.push(StorageNode {
                kind: NodeKind::Constant(*value),
                children: Vec::new(),
                func: if *value { LIT_CONST1 } else { LIT_CONST0 },
                fanout: 0,
            });
        }
        storage.traversal.grow(storage.nodes.len());
        storage
    }

    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    pub fn symmetric_gates(&self) -> bool {
        self.symmetric_gates
    }

    pub fn num_gates(&self) -> usize {
        self.nodes.len() - self.num_constants - self.pis.len() - self.ros.len()
    }

    pub fn node(&self, n: NodeRef) -> &StorageNode<S> {
        assert!(
            n.id < self.nodes.len(),
            "node {} out of bounds for network of size {}",
            n.id,
            self.nodes.len()
        );
        &self.nodes[n.id]
    }

    pub fn pis(&self) -> &[NodeRef] {
        &self.pis
    }

    pub fn ros(&self) -> &[NodeRef] {
        &self.ros
    }

    pub fn pos(&self) -> &[S] {
        &self.pos
    }

    pub fn ris(&self) -> &[S] {
        &self.ris
    }

    pub fn traversal(&self) -> &Traversal {
        &self.traversal
    }

    pub fn traversal_mut(&mut self) -> &mut Traversal {
        &mut self.traversal
    }

    pub fn events_mut(&mut self) -> &mut Events<S> {
        &mut self.events
    }

    pub fn insert_function(&mut self, tt: TruthTable) -> u32 {
        self.cache.insert(tt)
    }

    pub fn function(&self, literal: u32) -> TruthTable {
        self.cache.get(literal)
    }

    pub fn node_function(&self, n: NodeRef) -> TruthTable {
        self.cache.get(self.node(n).func)
    }

    fn push_node(&mut self, node: StorageNode<S>) -> NodeRef {
        let n = NodeRef::new(self.nodes.len());
        self.nodes.push(node);
        self.traversal.grow(self.nodes.len());
        n
    }

    pub fn add_input(&mut self, kind: NodeKind) -> NodeRef {
        let n = self.push_node(StorageNode {
            kind,
            children: Vec::new(),
            func: crate::tt_cache::LIT_BUFFER,
            fanout: 0,
        });
        match kind {
            NodeKind::Pi => self.pis.push(n),
            NodeKind::Ro => self.ros.push(n),
            other => panic!("add_input called with non-input kind {:?}", other),
        }
        self.events.notify_add(n);
        n
    }

    pub fn add_po(&mut self, s: S) -> usize {
        self.nodes[s.node().id].fanout += 1;
        self.pos.push(s);
        self.pos.len() - 1
    }

    pub fn add_ri(&mut self, s: S) -> usize {
        self.nodes[s.node().id].fanout += 1;
        self.ris.push(s);
        self.ris.len() - 1
    }

    /// Returns the existing node for `(children, func)` or appends a new one.
    pub fn create_node(&mut self, children: Vec<S>, func: u32) -> NodeRef {
        let key = (children, func);
        if let Some(existing) = self.strash.get(&key) {
            return *existing;
        }
        let (children, func) = key;
        for c in children.iter() {
            self.nodes[c.node().id].fanout += 1;
        }
        let n = self.push_node(StorageNode {
            kind: NodeKind::Gate,
            children: children.clone(),
            func,
            fanout: 0,
        });
        log::trace!("create_node: {} <- {:?} func={}", n.id, children, func);
        self.strash.insert((children, func), n);
        self.events.notify_add(n);
        n
    }

    /// Redirects every reference to `old` towards `new`.
    ///
    /// `old` keeps its own fanins. `new` itself is never rewritten, so no
    /// self-loop can form; when `new` reads `old`, those references remain
    /// and stay counted in `old`'s fanout.
    pub fn substitute_node(&mut self, old: NodeRef, new: S) {
        assert!(
            matches!(self.node(old).kind, NodeKind::Gate),
            "substitute_node: node {} is not a gate",
            old.id
        );
        if new.node() == old {
            log::trace!("substitute_node: {} replaced by itself", old.id);
            return;
        }

        let old_key = (self.nodes[old.id].children.clone(), self.nodes[old.id].func);
        if self.strash.get(&old_key) == Some(&old) {
            self.strash.remove(&old_key);
        }

        let mut modified: Vec<(NodeRef, Vec<S>)> = Vec::new();
        let mut released = 0;
        for idx in 0..self.nodes.len() {
            if idx == new.node().id || !matches!(self.nodes[idx].kind, NodeKind::Gate) {
                continue;
            }
            if !self.nodes[idx].children.iter().any(|c| c.node() == old) {
                continue;
            }
            let parent = NodeRef::new(idx);
            let old_children = self.nodes[idx].children.clone();
            let func = self.nodes[idx].func;
            let stale_key = (old_children.clone(), func);
            if self.strash.get(&stale_key) == Some(&parent) {
                self.strash.remove(&stale_key);
            }

            let mut moved = 0;
            let mut children = old_children.clone();
            for c in children.iter_mut() {
                if c.node() == old {
                    *c = c.retarget(new);
                    moved += 1;
                }
            }
            if self.symmetric_gates {
                children.sort();
            }
            self.nodes[new.node().id].fanout += moved;
            released += moved;
            self.nodes[idx].children = children.clone();
            self.strash.entry((children, func)).or_insert(parent);
            modified.push((parent, old_children));
        }

        let mut moved = 0;
        for s in self.pos.iter_mut().chain(self.ris.iter_mut()) {
            if s.node() == old {
                *s = s.retarget(new);
                moved += 1;
            }
        }
        self.nodes[new.node().id].fanout += moved;
        released += moved;
        let remaining = self.nodes[old.id].fanout.saturating_sub(released);
        self.nodes[old.id].fanout = remaining;

        log::trace!(
            "substitute_node: {} -> {:?}, {} parents rewritten",
            old.id,
            new,
            modified.len()
        );
        for (parent, old_children) in modified {
            self.events.notify_modified(parent, &old_children);
        }
    }
}
