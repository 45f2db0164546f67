// SPDX-License-Identifier: Apache-2.0

//! Per-node annotations keyed by node identity.
//!
//! A map is sized from the network it was created for. It does not track
//! later growth: after adding nodes, call `resize` (keeps entries) or
//! `reset` (discards them) before touching the new indices.

use std::ops::{Index, IndexMut};

use ahash::AHashMap;

use crate::network::{Network, NodeRef, Signal};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeMap<T> {
    data: Vec<T>,
}

impl<T: Clone + Default> NodeMap<T> {
    pub fn new<N: Network>(ntk: &N) -> Self {
        Self::with_value(ntk, T::default())
    }

    pub fn with_value<N: Network>(ntk: &N, value: T) -> Self {
        Self {
            data: vec![value; ntk.size()],
        }
    }

    /// Grows the map to the current network size, defaulting new entries.
    pub fn resize<N: Network>(&mut self, ntk: &N) {
        if ntk.size() > self.data.len() {
            self.data.resize(ntk.size(), T::default());
        }
    }

    pub fn reset<N: Network>(&mut self, ntk: &N, value: T) {
        self.data.clear();
        self.data.resize(ntk.size(), value);
    }
}

impl<T> NodeMap<T> {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, n: NodeRef) -> Option<&T> {
        self.data.get(n.id)
    }

    fn check(&self, n: NodeRef) {
        assert!(
            n.id < self.data.len(),
            "node map access at {} out of bounds ({} entries); resize the map after growing the network",
            n.id,
            self.data.len()
        );
    }
}

impl<T> Index<NodeRef> for NodeMap<T> {
    type Output = T;

    fn index(&self, n: NodeRef) -> &T {
        self.check(n);
        &self.data[n.id]
    }
}

impl<T> IndexMut<NodeRef> for NodeMap<T> {
    fn index_mut(&mut self, n: NodeRef) -> &mut T {
        self.check(n);
        &mut self.data[n.id]
    }
}

impl<T> Index<Signal> for NodeMap<T> {
    type Output = T;

    fn index(&self, s: Signal) -> &T {
        &self[s.node]
    }
}

impl<T> IndexMut<Signal> for NodeMap<T> {
    fn index_mut(&mut self, s: Signal) -> &mut T {
        &mut self[s.node]
    }
}

/// Sparse variant for annotations on a small subset of nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnorderedNodeMap<T> {
    data: AHashMap<NodeRef, T>,
}

impl<T> Default for UnorderedNodeMap<T> {
    fn default() -> Self {
        Self {
            data: AHashMap::new(),
        }
    }
}

impl<T> UnorderedNodeMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, n: NodeRef) -> bool {
        self.data.contains_key(&n)
    }

    pub fn insert(&mut self, n: NodeRef, value: T) -> Option<T> {
        self.data.insert(n, value)
    }

    pub fn get(&self, n: NodeRef) -> Option<&T> {
        self.data.get(&n)
    }

    pub fn erase(&mut self, n: NodeRef) -> Option<T> {
        self.data.remove(&n)
    }

    pub fn reset(&mut self) {
        self.data.clear();
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T> Index<NodeRef> for UnorderedNodeMap<T> {
    type Output = T;

    fn index(&self, n: NodeRef) -> &T {
        match self.data.get(&n) {
            Some(v) => v,
            None => panic!("node {} has no entry in the map", n.id),
        }
    }
}

impl<T> Index<Signal> for UnorderedNodeMap<T> {
    type Output = T;

    fn index(&self, s: Signal) -> &T {
        &self[s.node]
    }
}
