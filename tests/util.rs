#![allow(dead_code)]
use geo_regions::{
    config::VerticalWrap,
    topology::{GeoGrid, GridTopology, Owner, RegionGraph, WeightedAdjacency},
};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Uniform-weight torus grid.
pub fn torus(w: u32, h: u32) -> GeoGrid {
    GeoGrid::uniform(GridTopology::with_wrap(w, h, VerticalWrap::Torus).unwrap())
}

/// Uniform-weight spherical grid (pole reflection).
pub fn sphere(w: u32, h: u32) -> GeoGrid {
    GeoGrid::uniform(GridTopology::new(w, h).unwrap())
}

/// Connected random field graph with small integer weights.
pub fn random_graph(n: usize, extra_edges: usize, seed: u64) -> RegionGraph {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut b = RegionGraph::builder();
    for i in 0..n {
        b.add_node(Owner::field(i as u32));
    }
    for v in 1..n {
        let u = rng.gen_range(0..v);
        b.add_edge(u, v, f64::from(rng.gen_range(1..5u32))).unwrap();
    }
    for _ in 0..extra_edges {
        let u = rng.gen_range(0..n);
        let v = rng.gen_range(0..n);
        if u != v {
            b.add_edge(u, v, f64::from(rng.gen_range(1..5u32))).unwrap();
        }
    }
    b.build()
}

/// Admissibility rules shared by the engine and the reference.
pub struct Rules<'a> {
    pub barriers: &'a [bool],
    pub elevation: &'a [f32],
    pub max_gain: Option<f64>,
}

/// Single-source Bellman-Ford from `seed` under the growth rules. Other
/// seeds are never entered; barriers are entered but never left.
pub fn reference_costs<A: WeightedAdjacency>(
    adj: &A,
    seed: usize,
    seeds: &[usize],
    rules: &Rules<'_>,
) -> Vec<f64> {
    let n = adj.len();
    let mut dist = vec![f64::INFINITY; n];
    dist[seed] = 0.0;
    for _ in 0..n {
        let mut changed = false;
        for u in 0..n {
            if !dist[u].is_finite() || (u != seed && rules.barriers[u]) {
                continue;
            }
            let du = dist[u];
            adj.for_each_neighbour(u, |v, w| {
                if seeds.contains(&v) {
                    return;
                }
                if let Some(gain) = rules.max_gain {
                    if u != seed
                        && f64::from(rules.elevation[v]) < f64::from(rules.elevation[u]) - gain
                    {
                        return;
                    }
                }
                if du + w < dist[v] {
                    dist[v] = du + w;
                    changed = true;
                }
            });
        }
        if !changed {
            break;
        }
    }
    dist
}

/// Assert vec is a permutation of another vec (order-agnostic).
pub fn assert_permutation<T: Ord + Copy + std::fmt::Debug>(got: &[T], want: &[T]) {
    let mut a = got.to_vec();
    a.sort_unstable();
    let mut b = want.to_vec();
    b.sort_unstable();
    assert_eq!(a, b, "not a permutation\n got={:?}\nwant={:?}", got, want);
}

/// Ids of `labels` carrying `label`, ascending.
pub fn ids_with(labels: &[i32], label: i32) -> Vec<usize> {
    labels
        .iter()
        .enumerate()
        .filter(|&(_, &l)| l == label)
        .map(|(i, _)| i)
        .collect()
}
