// SPDX-License-Identifier: Apache-2.0

use std::collections::VecDeque;

use bitvec::vec::BitVec;

use crate::network::{Network, NodeRef};

/// Appends to `order` the postorder of every unvisited node reachable from
/// `roots`, marking nodes in `visited` as they complete. Nodes already
/// marked act as boundaries and are not emitted.
fn postorder_into<N: Network>(
    ntk: &N,
    roots: impl IntoIterator<Item = NodeRef>,
    visited: &mut BitVec,
    order: &mut Vec<NodeRef>,
) {
    let mut stack: Vec<(NodeRef, usize)> = Vec::new();
    for root in roots {
        if visited[root.id] {
            continue;
        }
        stack.push((root, 0));
        while let Some(top) = stack.last_mut() {
            let (n, next) = *top;
            if visited[n.id] {
                stack.pop();
                continue;
            }
            let fanins = ntk.fanins(n);
            if next < fanins.len() {
                top.1 += 1;
                let child = ntk.get_node(fanins[next]);
                if !visited[child.id] {
                    stack.push((child, 0));
                }
            } else {
                visited.set(n.id, true);
                order.push(n);
                stack.pop();
            }
        }
    }
}

/// Topological order of the live part of the network: constants, then
/// combinational inputs in creation order, then every gate reachable from a
/// combinational output, fanins first.
pub fn topo_order<N: Network>(ntk: &N) -> Vec<NodeRef> {
    let mut visited: BitVec = BitVec::repeat(false, ntk.size());
    let mut order = Vec::new();
    for n in ntk.nodes() {
        if ntk.is_constant(n) {
            visited.set(n.id, true);
            order.push(n);
        }
    }
    for n in ntk.cis() {
        visited.set(n.id, true);
        order.push(n);
    }
    let roots: Vec<NodeRef> = ntk.cos().into_iter().map(|s| ntk.get_node(s)).collect();
    postorder_into(ntk, roots, &mut visited, &mut order);
    order
}

/// Postorder of the cone above `boundary` that feeds `roots`. Boundary
/// nodes are not emitted; anything else reached (constants included) is.
pub fn cone_postorder<N: Network>(ntk: &N, boundary: &[NodeRef], roots: &[NodeRef]) -> Vec<NodeRef> {
    let mut visited: BitVec = BitVec::repeat(false, ntk.size());
    for b in boundary {
        visited.set(b.id, true);
    }
    let mut order = Vec::new();
    postorder_into(ntk, roots.iter().copied(), &mut visited, &mut order);
    order
}

/// Gates in the cone of `root` above `leaves`, in topological order.
///
/// The walk stops at leaves, constants and combinational inputs, so a leaf
/// set minimized onto the function's support still yields a finite cone: it
/// then also covers the gates between the dropped leaves and the inputs.
/// `root` is included unless it is itself a leaf.
pub fn cut_gates<N: Network>(ntk: &N, leaves: &[NodeRef], root: NodeRef) -> Vec<NodeRef> {
    let mut visited: BitVec = BitVec::repeat(false, ntk.size());
    for l in leaves {
        visited.set(l.id, true);
    }
    for n in ntk.nodes() {
        if ntk.is_constant(n) || ntk.is_ci(n) {
            visited.set(n.id, true);
        }
    }
    let mut order = Vec::new();
    postorder_into(ntk, [root], &mut visited, &mut order);
    order
}

/// Whether `target` is `root` or lies in its transitive fanin.
pub fn in_transitive_fanin<N: Network>(ntk: &N, root: NodeRef, target: NodeRef) -> bool {
    let mut visited: BitVec = BitVec::repeat(false, ntk.size());
    let mut stack = vec![root];
    while let Some(n) = stack.pop() {
        if n == target {
            return true;
        }
        if visited[n.id] {
            continue;
        }
        visited.set(n.id, true);
        stack.extend(ntk.fanins(n).iter().map(|f| ntk.get_node(*f)));
    }
    false
}

/// Returns the nodes left over by a Kahn-style sweep; empty when the fanin
/// relation is acyclic.
pub fn find_cycle_nodes<N: Network>(ntk: &N) -> Vec<NodeRef> {
    let size = ntk.size();
    let mut indegree = vec![0usize; size];
    let mut parents: Vec<Vec<usize>> = vec![Vec::new(); size];
    for n in ntk.nodes() {
        for f in ntk.fanins(n) {
            indegree[n.id] += 1;
            parents[ntk.get_node(*f).id].push(n.id);
        }
    }
    let mut queue: VecDeque<usize> = (0..size).filter(|i| indegree[*i] == 0).collect();
    let mut seen = 0usize;
    while let Some(i) = queue.pop_front() {
        seen += 1;
        for p in parents[i].iter() {
            indegree[*p] -= 1;
            if indegree[*p] == 0 {
                queue.push_back(*p);
            }
        }
    }
    if seen == size {
        return Vec::new();
    }
    (0..size)
        .filter(|i| indegree[*i] > 0)
        .map(NodeRef::new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Aig, GateNetwork};

    #[test]
    fn test_topo_order_skips_dangling() {
        let mut aig = Aig::new();
        let a = aig.create_pi();
        let b = aig.create_pi();
        let c = aig.create_pi();
        let ab = aig.create_and(a, b);
        let dangling = aig.create_and(a, c);
        let top = aig.create_and(ab, c);
        aig.create_po(top);
        let order = topo_order(&aig);
        assert_eq!(
            order,
            vec![NodeRef::new(0), a.node, b.node, c.node, ab.node, top.node]
        );
        assert!(!order.contains(&dangling.node));
    }

    #[test]
    fn test_cut_gates_stops_at_leaves() {
        let mut aig = Aig::new();
        let a = aig.create_pi();
        let b = aig.create_pi();
        let c = aig.create_pi();
        let ab = aig.create_and(a, b);
        let top = aig.create_and(ab, c);
        assert_eq!(cut_gates(&aig, &[ab.node, c.node], top.node), vec![top.node]);
        assert_eq!(
            cut_gates(&aig, &[a.node, b.node, c.node], top.node),
            vec![ab.node, top.node]
        );
    }

    #[test]
    fn test_cut_gates_with_leaves_short_of_the_inputs() {
        let mut aig = Aig::new();
        let a = aig.create_pi();
        let b = aig.create_pi();
        let c = aig.create_pi();
        let ab = aig.create_and(a, b);
        let top = aig.create_and(ab, c);
        // `b` is not a leaf; the walk ends at the input instead.
        let gates = cut_gates(&aig, &[a.node, c.node], top.node);
        assert_eq!(gates, vec![ab.node, top.node]);
        assert!(gates.iter().all(|n| aig.is_gate(*n)));
        assert_eq!(cut_gates(&aig, &[], top.node), vec![ab.node, top.node]);
    }

    #[test]
    fn test_in_transitive_fanin() {
        let mut aig = Aig::new();
        let a = aig.create_pi();
        let b = aig.create_pi();
        let c = aig.create_pi();
        let ab = aig.create_and(a, b);
        let top = aig.create_and(ab, c);
        assert!(in_transitive_fanin(&aig, top.node, a.node));
        assert!(in_transitive_fanin(&aig, top.node, top.node));
        assert!(!in_transitive_fanin(&aig, ab.node, c.node));
        assert!(!in_transitive_fanin(&aig, a.node, top.node));
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let mut aig = Aig::new();
        let a = aig.create_pi();
        let b = aig.create_pi();
        let mut f = aig.create_and(a, b);
        for i in 0..200_000 {
            let other = if i % 2 == 0 { a } else { !b };
            f = aig.create_and(f, other);
        }
        aig.create_po(f);
        let order = topo_order(&aig);
        assert_eq!(order.len(), aig.size());
        assert!(find_cycle_nodes(&aig).is_empty());
    }
}
