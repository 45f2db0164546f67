// SPDX-License-Identifier: Apache-2.0

//! Sample networks shared by unit tests, integration tests and benches.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::network::{Aig, GateNetwork, Mig, Network, Signal};

pub struct TestGraph {
    pub aig: Aig,
    pub i0: Signal,
    pub i1: Signal,
    pub i2: Signal,
    pub i3: Signal,
    pub a: Signal,
    pub b: Signal,
    pub c: Signal,
    pub o: Signal,
}

/// Graph:
/// i0 --\
///       AND(a) --\
/// i1 --|          \
///       AND(b) -- AND(o) [output]
/// i2 --|
///       AND(c) [output]
/// i3 --/
pub fn setup_simple_graph() -> TestGraph {
    let mut aig = Aig::new();
    let i0 = aig.create_pi();
    let i1 = aig.create_pi();
    let i2 = aig.create_pi();
    let i3 = aig.create_pi();

    let a = aig.create_and(i0, i1);
    let b = aig.create_and(i1, i2);
    let c = aig.create_and(i2, i3);

    let o = aig.create_and(a, b);
    aig.create_po(o);
    aig.create_po(c);
    TestGraph {
        aig,
        i0,
        i1,
        i2,
        i3,
        a,
        b,
        c,
        o,
    }
}

pub struct TestMajOfMaj {
    pub mig: Mig,
    pub a: Signal,
    pub b: Signal,
    pub c: Signal,
    pub inner: Signal,
    pub top: Signal,
}

/// `maj(a, maj(a, b, c), c)`, which is just `maj(a, b, c)`.
pub fn setup_maj_of_maj() -> TestMajOfMaj {
    let mut mig = Mig::new();
    let a = mig.create_pi();
    let b = mig.create_pi();
    let c = mig.create_pi();
    let inner = mig.create_maj(a, b, c);
    let top = mig.create_maj(a, inner, c);
    mig.create_po(top);
    TestMajOfMaj {
        mig,
        a,
        b,
        c,
        inner,
        top,
    }
}

pub struct TestRedundantGraph {
    pub aig: Aig,
    pub i0: Signal,
    pub i1: Signal,
    pub i2: Signal,
    pub o: Signal,
}

/// `(i0 & i1 & i2) | (i0 & i1 & !i2) | (i0 & i2)` in six AND gates; the
/// function is `i0 & (i1 | i2)`.
pub fn setup_redundant_graph() -> TestRedundantGraph {
    let mut aig = Aig::new();
    let i0 = aig.create_pi();
    let i1 = aig.create_pi();
    let i2 = aig.create_pi();
    let ab = aig.create_and(i0, i1);
    let abc = aig.create_and(ab, i2);
    let abnc = aig.create_and(ab, !i2);
    let ac = aig.create_and(i0, i2);
    let t = aig.create_or(abc, abnc);
    let o = aig.create_or(t, ac);
    aig.create_po(o);
    TestRedundantGraph { aig, i0, i1, i2, o }
}

/// Shape of a random network.
#[derive(Debug, Clone, Copy)]
pub struct RandomNetworkParams {
    pub num_inputs: usize,
    pub num_gates: usize,
    pub num_outputs: usize,
}

/// Builds a random network whose gates draw their fanins, with random
/// polarity, from everything created before them. `make_gate` receives the
/// chosen fanins (three of them) and returns the new gate.
fn random_network<N, F>(params: &RandomNetworkParams, seed: u64, mut make_gate: F) -> N
where
    N: GateNetwork,
    F: FnMut(&mut N, [N::Signal; 3]) -> N::Signal,
{
    assert!(params.num_inputs > 0, "random network needs at least one input");
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut ntk = N::empty();
    let mut signals: Vec<N::Signal> = (0..params.num_inputs).map(|_| ntk.create_pi()).collect();
    for _ in 0..params.num_gates {
        let mut pick = || {
            let s = signals[rng.gen_range(0..signals.len())];
            if rng.gen_bool(0.5) { ntk.create_not(s) } else { s }
        };
        let fanins = [pick(), pick(), pick()];
        let g = make_gate(&mut ntk, fanins);
        signals.push(g);
    }
    let num_outputs = params.num_outputs.min(signals.len());
    for s in signals.iter().rev().take(num_outputs) {
        ntk.create_po(*s);
    }
    ntk
}

pub fn random_aig(params: &RandomNetworkParams, seed: u64) -> Aig {
    random_network(params, seed, |aig: &mut Aig, [x, y, _]| aig.create_and(x, y))
}

pub fn random_mig(params: &RandomNetworkParams, seed: u64) -> Mig {
    random_network(params, seed, |mig: &mut Mig, [x, y, z]| mig.create_maj(x, y, z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::network_fingerprint;

    #[test]
    fn test_random_networks_are_reproducible() {
        let params = RandomNetworkParams {
            num_inputs: 6,
            num_gates: 40,
            num_outputs: 4,
        };
        let a = random_aig(&params, 11);
        let b = random_aig(&params, 11);
        assert_eq!(network_fingerprint(&a), network_fingerprint(&b));
        assert_eq!(a.num_pis(), 6);
        assert_eq!(a.num_pos(), 4);
        let m = random_mig(&params, 11);
        assert_eq!(m.num_pos(), 4);
    }

    #[test]
    fn test_sample_graph_shapes() {
        let g = setup_simple_graph();
        assert_eq!(g.aig.num_gates(), 4);
        assert_eq!(g.aig.pos(), &[g.o, g.c]);
        let m = setup_maj_of_maj();
        assert_eq!(m.mig.size(), 6);
        assert_eq!(m.mig.num_gates(), 2);
        let r = setup_redundant_graph();
        assert_eq!(r.aig.num_gates(), 6);
    }
}
