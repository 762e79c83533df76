//! Multi-source region growing (Dijkstra with admissibility rules).
//!
//! Every id ends up with the seed it can reach most cheaply, subject to:
//!
//! * **barriers**: a barrier id is closed the first time any neighbour
//!   relaxes it. It keeps that label and cost but is never expanded, unless
//!   it is itself a seed.
//! * **monotonic elevation**: a non-seed id may only step into a neighbour
//!   whose elevation is at least `elev[id] - max_elevation_gain`. Steps out
//!   of a seed are exempt.
//! * **distance cap**: ids popped with a cost above `max_cost` are closed
//!   but not expanded.
//!
//! Labels are seed ids (`UNSET_LABEL` until reached). A neighbour is only
//! relabelled on a strict cost improvement, and the queue pops equal costs
//! in ascending id order, so results are reproducible.

use crate::algs::priority_queue::IndexedPriorityQueue;
use crate::config::GrowConfig;
use crate::data::{FixedArray, GrowableBag};
use crate::debug_invariants::{DebugInvariants, ensure};
use crate::region_error::RegionError;
use crate::topology::adjacency::WeightedAdjacency;

/// Label of an id no seed reached.
pub const UNSET_LABEL: i32 = -1;

/// Builder for one region-growing run.
///
/// ```
/// # use geo_regions::algs::region_grow::RegionGrow;
/// # use geo_regions::topology::{GeoGrid, GridTopology};
/// let grid = GeoGrid::uniform(GridTopology::new(8, 4)?);
/// let growth = RegionGrow::new(&grid).seeds([0, 20]).run()?;
/// assert_eq!(growth.label(1), Some(0));
/// # Ok::<(), geo_regions::region_error::RegionError>(())
/// ```
pub struct RegionGrow<'a, A: WeightedAdjacency> {
    adjacency: &'a A,
    seeds: Vec<(usize, f64)>,
    barriers: Option<&'a [bool]>,
    elevation: Option<&'a [f32]>,
    config: GrowConfig,
}

impl<'a, A: WeightedAdjacency> RegionGrow<'a, A> {
    pub fn new(adjacency: &'a A) -> Self {
        Self {
            adjacency,
            seeds: Vec::new(),
            barriers: None,
            elevation: None,
            config: GrowConfig::default(),
        }
    }

    /// Add seeds with initial cost `0.0`.
    pub fn seeds<I: IntoIterator<Item = usize>>(mut self, it: I) -> Self {
        self.seeds.extend(it.into_iter().map(|id| (id, 0.0)));
        self
    }

    /// Add seeds with explicit initial costs.
    pub fn seeds_with_cost<I: IntoIterator<Item = (usize, f64)>>(mut self, it: I) -> Self {
        self.seeds.extend(it);
        self
    }

    /// Per-id barrier mask.
    pub fn barriers(mut self, mask: &'a [bool]) -> Self {
        self.barriers = Some(mask);
        self
    }

    /// Per-id elevation, consulted only when `max_elevation_gain` is set.
    pub fn elevation(mut self, elevation: &'a [f32]) -> Self {
        self.elevation = Some(elevation);
        self
    }

    pub fn config(mut self, config: GrowConfig) -> Self {
        self.config = config;
        self
    }

    /// Run with a freshly allocated queue.
    pub fn run(self) -> Result<RegionGrowth, RegionError> {
        let mut queue = IndexedPriorityQueue::new(self.adjacency.len());
        self.run_with(&mut queue)
    }

    /// Run reusing `queue`, which must span the same id domain. The queue is
    /// cleared first and left empty.
    pub fn run_with(self, queue: &mut IndexedPriorityQueue) -> Result<RegionGrowth, RegionError> {
        let RegionGrow {
            adjacency,
            seeds,
            barriers,
            elevation,
            config,
        } = self;
        let n = adjacency.len();
        config.validate()?;
        check_len("queue domain", n, queue.domain())?;
        if let Some(b) = barriers {
            check_len("barrier mask", n, b.len())?;
        }
        if let Some(e) = elevation {
            check_len("elevation", n, e.len())?;
        }
        if i32::try_from(n).is_err() {
            return Err(RegionError::IdOutOfDomain {
                id: n,
                domain: i32::MAX as usize,
            });
        }
        let slope = match (config.max_elevation_gain, elevation) {
            (Some(gain), Some(e)) => Some((gain, e)),
            _ => None,
        };

        queue.clear();
        let mut closed = FixedArray::filled(n, false);
        let mut is_seed = FixedArray::filled(n, false);
        let mut labels = FixedArray::filled(n, UNSET_LABEL);
        let mut costs = FixedArray::filled(n, f64::INFINITY);

        let mut seed_ids = Vec::with_capacity(seeds.len());
        for &(id, cost) in &seeds {
            if id >= n {
                return Err(RegionError::IdOutOfDomain { id, domain: n });
            }
            if cost.is_nan() || cost < 0.0 {
                return Err(RegionError::InvalidCost { id, cost });
            }
            is_seed[id] = true;
            labels[id] = id as i32;
            if queue.add_or_update(id, cost)? {
                costs[id] = cost;
            }
            seed_ids.push(id);
        }
        seed_ids.sort_unstable();
        seed_ids.dedup();
        log::debug!(
            "region grow: {} ids, {} seeds, barriers={}, slope rule={}, cap={:?}",
            n,
            seed_ids.len(),
            barriers.is_some(),
            slope.is_some(),
            config.max_cost
        );

        let mut stats = GrowStats::default();
        while let Some((id, cost)) = queue.try_pop_with_cost() {
            if closed[id] {
                continue;
            }
            settle_cost(&mut costs, &closed, id, cost)?;
            closed[id] = true;
            stats.settled += 1;
            if config.max_cost.is_some_and(|cap| cost > cap) {
                stats.capped += 1;
                continue;
            }

            let label = labels[id];
            let from_seed = is_seed[id];
            let mut failure = None;
            adjacency.for_each_neighbour(id, |nb, weight| {
                if failure.is_some() || closed[nb] || is_seed[nb] {
                    return;
                }
                if let Some((gain, elev)) = slope {
                    if !from_seed && f64::from(elev[nb]) < f64::from(elev[id]) - gain {
                        return;
                    }
                }
                let next = cost + weight;
                if barriers.is_some_and(|b| b[nb]) {
                    if let Err(e) = settle_cost(&mut costs, &closed, nb, next) {
                        failure = Some(e);
                        return;
                    }
                    closed[nb] = true;
                    labels[nb] = label;
                    stats.settled += 1;
                    stats.barrier_hits += 1;
                    return;
                }
                let relaxed = queue.add_or_update(nb, next).and_then(|better| {
                    if better {
                        settle_cost(&mut costs, &closed, nb, next)?;
                    }
                    Ok(better)
                });
                match relaxed {
                    Ok(true) => labels[nb] = label,
                    Ok(false) => {}
                    Err(e) => failure = Some(e),
                }
            });
            if let Some(e) = failure {
                return Err(e);
            }
        }

        let unreached = labels.iter().filter(|&&l| l == UNSET_LABEL).count();
        if unreached > 0 {
            log::warn!("region grow: {unreached} of {n} ids unreached");
        }
        log::debug!(
            "region grow: settled {}, barriers closed {}, capped {}",
            stats.settled,
            stats.barrier_hits,
            stats.capped
        );

        let growth = RegionGrowth {
            labels,
            costs,
            closed,
            seeds: seed_ids,
            stats,
        };
        growth.debug_assert_invariants();
        Ok(growth)
    }
}

/// Record the cost of an id that is still open; a closed id's cost is final.
fn settle_cost(
    costs: &mut FixedArray<f64>,
    closed: &FixedArray<bool>,
    id: usize,
    cost: f64,
) -> Result<(), RegionError> {
    ensure(!closed[id], || {
        format!("cost of closed id {id} rewritten from {} to {cost}", costs[id])
    })?;
    costs[id] = cost;
    Ok(())
}

fn check_len(what: &'static str, expected: usize, found: usize) -> Result<(), RegionError> {
    if expected == found {
        Ok(())
    } else {
        Err(RegionError::LengthMismatch {
            what,
            expected,
            found,
        })
    }
}

/// Counters collected during a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GrowStats {
    /// Ids closed, barriers included.
    pub settled: usize,
    /// Barriers closed on first relaxation.
    pub barrier_hits: usize,
    /// Ids closed above the cost cap.
    pub capped: usize,
}

/// Frozen output of a region-growing run.
#[derive(Debug)]
pub struct RegionGrowth {
    labels: FixedArray<i32>,
    costs: FixedArray<f64>,
    closed: FixedArray<bool>,
    seeds: Vec<usize>,
    stats: GrowStats,
}

impl RegionGrowth {
    /// Seed that owns `id`, if any reached it.
    #[inline]
    pub fn label(&self, id: usize) -> Option<usize> {
        match self.labels.get(id) {
            Ok(&l) if l != UNSET_LABEL => Some(l as usize),
            _ => None,
        }
    }

    /// Settled cost of `id`, if any seed reached it.
    #[inline]
    pub fn cost(&self, id: usize) -> Option<f64> {
        self.label(id).map(|_| self.costs[id])
    }

    #[inline]
    pub fn is_closed(&self, id: usize) -> bool {
        self.closed.get(id).is_ok_and(|&c| c)
    }

    pub fn labels(&self) -> &[i32] {
        self.labels.as_slice()
    }

    pub fn costs(&self) -> &[f64] {
        self.costs.as_slice()
    }

    /// Distinct seed ids, ascending.
    pub fn seeds(&self) -> &[usize] {
        &self.seeds
    }

    pub fn stats(&self) -> GrowStats {
        self.stats
    }

    /// Check that every id labelled by another id traces back to a seed
    /// whose owner satisfies `is_source`.
    ///
    /// `expected` names the source kind in the error.
    pub fn validate_ancestry<F>(&self, is_source: F, expected: &'static str) -> Result<(), RegionError>
    where
        F: Fn(usize) -> bool,
    {
        for (id, &l) in self.labels.iter().enumerate() {
            if l == UNSET_LABEL || l as usize == id {
                continue;
            }
            let seed = l as usize;
            if self.seeds.binary_search(&seed).is_err() || self.labels[seed] != l {
                return Err(RegionError::MissingSeedAncestor { id, label: seed });
            }
            if !is_source(seed) {
                return Err(RegionError::UnexpectedSourceKind { id, seed, expected });
            }
        }
        Ok(())
    }

    /// Per-seed member lists (ascending ids) of every labelled id for which
    /// `include` holds. Seeds appear in [`seeds`](Self::seeds) order.
    pub fn membership<F>(&self, include: F) -> SeedMembership
    where
        F: Fn(usize) -> bool,
    {
        let mut members: Vec<GrowableBag<u32>> =
            self.seeds.iter().map(|_| GrowableBag::new()).collect();
        for (id, &l) in self.labels.iter().enumerate() {
            if l == UNSET_LABEL || !include(id) {
                continue;
            }
            if let Ok(slot) = self.seeds.binary_search(&(l as usize)) {
                members[slot].add(id as u32);
            }
        }
        SeedMembership {
            seeds: self.seeds.clone(),
            members,
        }
    }

    /// Release the per-id arrays; returns the id domain size.
    pub fn dispose(self) -> usize {
        let n = self.labels.dispose();
        self.costs.dispose();
        self.closed.dispose();
        n
    }
}

impl DebugInvariants for RegionGrowth {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "RegionGrowth");
    }

    fn validate_invariants(&self) -> Result<(), RegionError> {
        for &s in &self.seeds {
            ensure(self.labels[s] == s as i32, || {
                format!("seed {s} carries label {}", self.labels[s])
            })?;
        }
        for (id, &l) in self.labels.iter().enumerate() {
            if l == UNSET_LABEL {
                continue;
            }
            ensure(self.closed[id], || format!("labelled id {id} never closed"))?;
            ensure(self.costs[id].is_finite(), || {
                format!("labelled id {id} has cost {}", self.costs[id])
            })?;
        }
        Ok(())
    }
}

/// Member ids grouped by the seed that owns them.
#[derive(Debug, Default)]
pub struct SeedMembership {
    seeds: Vec<usize>,
    members: Vec<GrowableBag<u32>>,
}

impl SeedMembership {
    #[inline]
    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }

    pub fn seeds(&self) -> &[usize] {
        &self.seeds
    }

    /// Members of the `index`-th seed.
    pub fn members(&self, index: usize) -> Result<&[u32], RegionError> {
        self.members
            .get(index)
            .map(|b| b.as_slice())
            .ok_or(RegionError::IndexOutOfRange {
                container: "SeedMembership",
                index,
                len: self.members.len(),
            })
    }

    /// Member lists in seed order, ready for [`io::membership`](crate::io::membership).
    pub fn lists(&self) -> &[GrowableBag<u32>] {
        &self.members
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &[u32])> + '_ {
        self.seeds
            .iter()
            .copied()
            .zip(self.members.iter().map(|b| b.as_slice()))
    }

    /// Release every list; returns the total member count.
    pub fn dispose(self) -> usize {
        self.members.into_iter().map(GrowableBag::dispose).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::graph::{Owner, RegionGraph};

    /// 0 -1- 1 -1- 2 -1- 3, plus 0 -5- 3.
    fn ring4() -> RegionGraph {
        let mut b = RegionGraph::builder();
        for i in 0..4 {
            b.add_node(Owner::field(i));
        }
        b.add_edge(0, 1, 1.0).unwrap();
        b.add_edge(1, 2, 1.0).unwrap();
        b.add_edge(2, 3, 1.0).unwrap();
        b.add_edge(0, 3, 5.0).unwrap();
        b.build()
    }

    #[test]
    fn single_seed_costs_are_shortest_paths() {
        let g = ring4();
        let r = RegionGrow::new(&g).seeds([0]).run().unwrap();
        assert_eq!(r.costs(), &[0.0, 1.0, 2.0, 3.0]);
        assert!((0..4).all(|i| r.label(i) == Some(0)));
        assert_eq!(r.stats().settled, 4);
        r.validate_invariants().unwrap();
    }

    #[test]
    fn two_seeds_split_by_cost() {
        let g = ring4();
        let r = RegionGrow::new(&g).seeds([0, 3]).run().unwrap();
        assert_eq!(r.labels(), &[0, 0, 3, 3]);
        let m = r.membership(|_| true);
        assert_eq!(m.seeds(), &[0, 3]);
        assert_eq!(m.members(0).unwrap(), &[0, 1]);
        assert_eq!(m.members(1).unwrap(), &[2, 3]);
        assert!(m.members(2).is_err());
    }

    #[test]
    fn barrier_absorbs_without_propagating() {
        let g = ring4();
        let barriers = [false, true, false, false];
        let r = RegionGrow::new(&g)
            .seeds([0])
            .barriers(&barriers)
            .run()
            .unwrap();
        assert_eq!(r.label(1), Some(0));
        assert_eq!(r.cost(1), Some(1.0));
        // 2 is reached through 3 over the expensive edge.
        assert_eq!(r.cost(3), Some(5.0));
        assert_eq!(r.cost(2), Some(6.0));
        assert_eq!(r.stats().barrier_hits, 1);
    }

    #[test]
    fn barrier_keeps_first_reach_cost() {
        // 0 -1- 1 -10- 2(barrier) -1- 3 -2- 0: 1 pops first and closes 2 at
        // 11; the cheaper route through 3 arrives later and is ignored.
        let mut b = RegionGraph::builder();
        for i in 0..4 {
            b.add_node(Owner::field(i));
        }
        b.add_edge(0, 1, 1.0).unwrap();
        b.add_edge(1, 2, 10.0).unwrap();
        b.add_edge(2, 3, 1.0).unwrap();
        b.add_edge(3, 0, 2.0).unwrap();
        let g = b.build();
        let barriers = [false, false, true, false];
        let r = RegionGrow::new(&g)
            .seeds([0])
            .barriers(&barriers)
            .run()
            .unwrap();
        assert_eq!(r.cost(2), Some(11.0));
        assert_eq!(r.costs(), &[0.0, 1.0, 11.0, 2.0]);
        assert_eq!(r.stats().barrier_hits, 1);
    }

    #[test]
    fn closed_cost_cannot_be_rewritten() {
        let mut costs = FixedArray::filled(2, f64::INFINITY);
        let mut closed = FixedArray::filled(2, false);
        settle_cost(&mut costs, &closed, 0, 3.0).unwrap();
        closed[0] = true;
        assert!(matches!(
            settle_cost(&mut costs, &closed, 0, 1.0),
            Err(RegionError::InvariantViolation(_))
        ));
        assert_eq!(costs[0], 3.0);
    }

    #[test]
    fn cap_closes_but_does_not_expand() {
        let g = ring4();
        let cfg = GrowConfig {
            max_cost: Some(0.5),
            ..Default::default()
        };
        let r = RegionGrow::new(&g).seeds([0]).config(cfg).run().unwrap();
        // 1 and 3 are relaxed by the seed, popped above the cap, and stop.
        assert_eq!(r.labels(), &[0, 0, UNSET_LABEL, 0]);
        assert_eq!(r.stats().capped, 2);
    }

    #[test]
    fn elevation_rule_is_waived_for_seed_hop() {
        let g = ring4();
        let elev = [10.0f32, 0.0, -5.0, 20.0];
        let cfg = GrowConfig {
            max_elevation_gain: Some(1.0),
            ..Default::default()
        };
        let r = RegionGrow::new(&g)
            .seeds([0])
            .elevation(&elev)
            .config(cfg)
            .run()
            .unwrap();
        // 0 -> 1 and 0 -> 3 leave the seed; 1 -> 2 drops 5 > 1 and is refused,
        // 3 -> 2 drops 25 and is refused as well.
        assert_eq!(r.labels(), &[0, 0, UNSET_LABEL, 0]);
    }

    #[test]
    fn ancestry_checks_source_kind() {
        let g = ring4();
        let r = RegionGrow::new(&g).seeds([0, 3]).run().unwrap();
        r.validate_ancestry(|s| s == 0 || s == 3, "river").unwrap();
        assert_eq!(
            r.validate_ancestry(|s| s == 0, "river"),
            Err(RegionError::UnexpectedSourceKind {
                id: 2,
                seed: 3,
                expected: "river"
            })
        );
    }

    #[test]
    fn rejects_bad_inputs() {
        let g = ring4();
        assert!(matches!(
            RegionGrow::new(&g).seeds([9]).run(),
            Err(RegionError::IdOutOfDomain { id: 9, domain: 4 })
        ));
        assert!(matches!(
            RegionGrow::new(&g).seeds_with_cost([(0, -1.0)]).run(),
            Err(RegionError::InvalidCost { id: 0, .. })
        ));
        assert!(matches!(
            RegionGrow::new(&g).seeds([0]).barriers(&[false]).run(),
            Err(RegionError::LengthMismatch { what: "barrier mask", .. })
        ));
        let mut wrong = IndexedPriorityQueue::new(3);
        assert!(RegionGrow::new(&g).seeds([0]).run_with(&mut wrong).is_err());
    }

    #[test]
    fn queue_is_reusable_across_runs() {
        let g = ring4();
        let mut q = IndexedPriorityQueue::new(4);
        let a = RegionGrow::new(&g).seeds([0]).run_with(&mut q).unwrap();
        let b = RegionGrow::new(&g).seeds([2]).run_with(&mut q).unwrap();
        assert_eq!(a.costs(), &[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(b.costs(), &[2.0, 1.0, 0.0, 1.0]);
        assert!(q.is_empty());
        assert_eq!(b.dispose(), 4);
    }
}
