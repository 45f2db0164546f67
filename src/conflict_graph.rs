// SPDX-License-Identifier: Apache-2.0

//! Conflict graph over rewrite candidates and independent-set selection.
//!
//! A vertex is one `(pivot, cut)` candidate weighted by its gain. Two
//! candidates conflict when their cut cones share a gate, since applying
//! both would edit the same logic.

use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap};

use crate::cut_enumeration::NetworkCuts;
use crate::cut_rewriting::CutRewritingData;
use crate::mffc::{NodeCostFn, mffc_size};
use crate::network::{Network, NodeRef};
use crate::topo::cut_gates;

#[derive(Debug, Clone, Default)]
pub struct ConflictGraph {
    weights: Vec<u32>,
    alive: Vec<bool>,
    adjacent: Vec<BTreeSet<usize>>,
    num_vertices: usize,
    num_edges: usize,
}

impl ConflictGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vertex(&mut self, weight: u32) -> usize {
        self.weights.push(weight);
        self.alive.push(true);
        self.adjacent.push(BTreeSet::new());
        self.num_vertices += 1;
        self.weights.len() - 1
    }

    pub fn add_edge(&mut self, v1: usize, v2: usize) {
        if v1 == v2 || self.adjacent[v1].contains(&v2) {
            return;
        }
        self.adjacent[v1].insert(v2);
        self.adjacent[v2].insert(v1);
        self.num_edges += 1;
    }

    pub fn remove_vertex(&mut self, v: usize) {
        assert!(self.alive[v], "vertex {} removed twice", v);
        self.alive[v] = false;
        let neighbors = std::mem::take(&mut self.adjacent[v]);
        self.num_edges -= neighbors.len();
        for w in neighbors {
            self.adjacent[w].remove(&v);
        }
        self.num_vertices -= 1;
    }

    pub fn has_vertex(&self, v: usize) -> bool {
        self.alive[v]
    }

    pub fn neighbors(&self, v: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacent[v].iter().copied()
    }

    pub fn has_edge(&self, v1: usize, v2: usize) -> bool {
        self.adjacent[v1].contains(&v2)
    }

    pub fn degree(&self, v: usize) -> usize {
        self.adjacent[v].len()
    }

    pub fn weight(&self, v: usize) -> u32 {
        self.weights[v]
    }

    /// `weight / (degree + 1)`.
    pub fn gwmin_value(&self, v: usize) -> f64 {
        self.weights[v] as f64 / (self.degree(v) + 1) as f64
    }

    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    /// Total number of vertices ever added, removed ones included.
    pub fn capacity(&self) -> usize {
        self.weights.len()
    }

    fn take_with_neighbors(&mut self, v: usize) {
        let neighbors: Vec<usize> = self.neighbors(v).collect();
        self.remove_vertex(v);
        for w in neighbors {
            self.remove_vertex(w);
        }
    }
}

/// Heap entry ranking a vertex by `weight / (degree + 1)`, then by higher
/// degree, then by lower index. Ratios are compared exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rank {
    weight: u64,
    degree: u64,
    vertex: usize,
}

impl Ord for Rank {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = self.weight * (other.degree + 1);
        let rhs = other.weight * (self.degree + 1);
        lhs.cmp(&rhs)
            .then(self.degree.cmp(&other.degree))
            .then(other.vertex.cmp(&self.vertex))
    }
}

impl PartialOrd for Rank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Greedy weighted independent set (GWMIN).
///
/// Repeatedly takes the live vertex with the best rank and removes it
/// together with its neighbors. Ranks are refreshed as degrees drop.
pub fn maximum_weighted_independent_set_gwmin(g: &mut ConflictGraph) -> Vec<usize> {
    let rank = |g: &ConflictGraph, v: usize| Rank {
        weight: g.weight(v) as u64,
        degree: g.degree(v) as u64,
        vertex: v,
    };
    let mut heap: BinaryHeap<Rank> = (0..g.capacity())
        .filter(|v| g.has_vertex(*v))
        .map(|v| rank(g, v))
        .collect();

    let mut selected = Vec::new();
    while let Some(top) = heap.pop() {
        if !g.has_vertex(top.vertex) || g.degree(top.vertex) as u64 != top.degree {
            continue;
        }
        selected.push(top.vertex);
        // Vertices two hops away lose degree; collect them before removal.
        let mut touched: BTreeSet<usize> = BTreeSet::new();
        for w in g.neighbors(top.vertex) {
            touched.extend(g.neighbors(w));
        }
        g.take_with_neighbors(top.vertex);
        for u in touched {
            if g.has_vertex(u) {
                heap.push(rank(g, u));
            }
        }
    }
    selected
}

/// Plain greedy maximal independent set in insertion order.
pub fn maximal_weighted_independent_set(g: &mut ConflictGraph) -> Vec<usize> {
    let mut selected = Vec::new();
    for v in 0..g.capacity() {
        if !g.has_vertex(v) {
            continue;
        }
        selected.push(v);
        g.take_with_neighbors(v);
    }
    selected
}

/// Builds the conflict graph of all retained candidates in `cuts`.
///
/// Returns the graph and, per vertex, the pivot node and the index of the
/// cut within the pivot's cut set. Scratch values must hold the current
/// reference counts.
pub fn network_cuts_graph<N: Network, C: NodeCostFn<N>>(
    ntk: &mut N,
    cuts: &NetworkCuts<CutRewritingData<N::Signal>>,
    allow_zero_gain: bool,
    cost: &C,
) -> (ConflictGraph, Vec<(NodeRef, usize)>) {
    let min_gain = if allow_zero_gain { 0 } else { 1 };
    let mut g = ConflictGraph::new();
    let mut vertex_to_cut: Vec<(NodeRef, usize)> = Vec::new();
    let mut touched_by: Vec<Vec<usize>> = vec![Vec::new(); ntk.size()];

    for n in ntk.nodes() {
        if n.id >= cuts.nodes_size() || ntk.is_constant(n) || ntk.is_ci(n) {
            continue;
        }
        if mffc_size(ntk, n, cost) == 1 {
            continue;
        }
        for (i, cut) in cuts.cuts(n).iter().enumerate() {
            if cut.size() <= 2 || cut.data.gain < min_gain {
                continue;
            }
            let v = g.add_vertex(cut.data.gain as u32);
            debug_assert_eq!(v, vertex_to_cut.len());
            vertex_to_cut.push((n, i));
            for gate in cut_gates(ntk, cut.leaves(), n) {
                touched_by[gate.id].push(v);
            }
        }
    }

    for vertices in touched_by.iter() {
        for j in 1..vertices.len() {
            for i in 0..j {
                g.add_edge(vertices[i], vertices[j]);
            }
        }
    }
    log::debug!(
        "network_cuts_graph: {} vertices, {} edges",
        g.num_vertices(),
        g.num_edges()
    );
    (g, vertex_to_cut)
}
