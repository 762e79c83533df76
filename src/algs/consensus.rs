//! Neighbour-majority label propagation to a fixpoint.
//!
//! Each sweep computes, for every unset node, the commonest label among its
//! set, non-excluded neighbours, and only then commits all of them at once,
//! so the result of a sweep does not depend on visiting order. Sweeps repeat
//! until one commits nothing. Nodes with no voting neighbour stay unset;
//! that is a valid terminal state.

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::config::ConsensusConfig;
use crate::data::{BoundedList, FixedArray};
use crate::region_error::RegionError;
use crate::topology::adjacency::WeightedAdjacency;

/// Index of the largest tally entry; the lowest index wins ties.
///
/// Scans in ascending order and keeps the first index whose count is
/// strictly greater than every count before it. Fails with
/// [`RegionError::EmptyTally`] when no entry is positive.
pub fn commonest<T>(tally: &[T]) -> Result<usize, RegionError>
where
    T: Copy + PartialOrd + Default,
{
    let mut best: Option<(usize, T)> = None;
    for (i, &count) in tally.iter().enumerate() {
        let floor = best.map_or(T::default(), |(_, c)| c);
        if count > floor {
            best = Some((i, count));
        }
    }
    best.map(|(i, _)| i).ok_or(RegionError::EmptyTally)
}

/// Outcome of [`Consensus::run`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConsensusReport {
    /// Sweeps executed, including the final no-change sweep when converged.
    pub sweeps: usize,
    /// Labels written across all sweeps.
    pub assigned: usize,
    /// Nodes still unset at the end.
    pub remaining_unset: usize,
    /// `false` only when the sweep cap stopped the run early.
    pub converged: bool,
}

/// Majority-vote fill over a static adjacency.
pub struct Consensus<'a, A, E> {
    adjacency: &'a A,
    unset: u32,
    label_count: usize,
    excluded: E,
    config: ConsensusConfig,
}

impl<'a, A> Consensus<'a, A, fn(usize) -> bool>
where
    A: WeightedAdjacency + Sync,
{
    /// Labels are ordinals in `0..label_count`; `unset` marks nodes to fill.
    pub fn new(adjacency: &'a A, label_count: usize, unset: u32) -> Self {
        fn nothing_excluded(_: usize) -> bool {
            false
        }
        Self {
            adjacency,
            unset,
            label_count,
            excluded: nothing_excluded,
            config: ConsensusConfig::default(),
        }
    }
}

impl<'a, A, E> Consensus<'a, A, E>
where
    A: WeightedAdjacency + Sync,
    E: Fn(usize) -> bool + Sync,
{
    /// Neighbours for which `excluded` returns true never vote.
    pub fn excluding<F>(self, excluded: F) -> Consensus<'a, A, F>
    where
        F: Fn(usize) -> bool + Sync,
    {
        Consensus {
            adjacency: self.adjacency,
            unset: self.unset,
            label_count: self.label_count,
            excluded,
            config: self.config,
        }
    }

    pub fn config(mut self, config: ConsensusConfig) -> Self {
        self.config = config;
        self
    }

    /// Run sweeps until a fixpoint (or the configured sweep cap).
    pub fn run(&self, labels: &mut [u32]) -> Result<ConsensusReport, RegionError> {
        self.validate(labels)?;
        let n = labels.len();
        let mut pending_buf = FixedArray::filled(n, 0usize);
        let mut pending = BoundedList::new(pending_buf.as_mut_slice());
        for (id, &l) in labels.iter().enumerate() {
            if l == self.unset {
                pending.push(id)?;
            }
        }
        log::debug!(
            "consensus: {} of {} nodes unset, {} labels",
            pending.len(),
            n,
            self.label_count
        );

        let mut report = ConsensusReport {
            sweeps: 0,
            assigned: 0,
            remaining_unset: pending.len(),
            converged: false,
        };
        loop {
            if let Some(cap) = self.config.max_sweeps {
                if report.sweeps >= cap {
                    log::warn!(
                        "consensus stopped at sweep cap {cap} with {} nodes unset",
                        pending.len()
                    );
                    break;
                }
            }
            let changed = self.sweep_pending(labels, pending.as_slice())?;
            report.sweeps += 1;
            report.assigned += changed;
            if changed == 0 {
                report.converged = true;
                break;
            }
            let unset = self.unset;
            pending.retain(|id| labels[id] == unset);
        }
        report.remaining_unset = pending.len();
        log::debug!(
            "consensus: {} sweeps, {} assigned, {} left unset",
            report.sweeps,
            report.assigned,
            report.remaining_unset
        );
        Ok(report)
    }

    /// One synchronous sweep over every unset node; returns labels committed.
    pub fn sweep(&self, labels: &mut [u32]) -> Result<usize, RegionError> {
        self.validate(labels)?;
        let pending: Vec<usize> = (0..labels.len())
            .filter(|&id| labels[id] == self.unset)
            .collect();
        self.sweep_pending(labels, &pending)
    }

    fn validate(&self, labels: &[u32]) -> Result<(), RegionError> {
        self.config.validate()?;
        if labels.len() != self.adjacency.len() {
            return Err(RegionError::LengthMismatch {
                what: "labels vs adjacency",
                expected: self.adjacency.len(),
                found: labels.len(),
            });
        }
        if let Some(id) = labels
            .iter()
            .position(|&l| l != self.unset && l as usize >= self.label_count)
        {
            return Err(RegionError::LabelOutOfRange {
                id,
                label: labels[id],
                label_count: self.label_count,
            });
        }
        Ok(())
    }

    fn sweep_pending(&self, labels: &mut [u32], pending: &[usize]) -> Result<usize, RegionError> {
        let committed: &[u32] = labels;

        #[cfg(feature = "rayon")]
        let tentative: Vec<Option<u32>> = pending
            .par_iter()
            .map_init(
                || vec![0.0f64; self.label_count],
                |tally, &id| self.vote(committed, id, tally),
            )
            .collect::<Result<_, _>>()?;
        #[cfg(not(feature = "rayon"))]
        let tentative: Vec<Option<u32>> = {
            let mut tally = vec![0.0f64; self.label_count];
            pending
                .iter()
                .map(|&id| self.vote(committed, id, &mut tally))
                .collect::<Result<_, _>>()?
        };

        let mut changed = 0;
        for (&id, t) in pending.iter().zip(tentative) {
            if let Some(label) = t {
                labels[id] = label;
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// Weighted tally of `id`'s neighbours under the committed labels.
    fn vote(&self, labels: &[u32], id: usize, tally: &mut [f64]) -> Result<Option<u32>, RegionError> {
        tally.fill(0.0);
        let mut total = 0.0;
        self.adjacency.for_each_neighbour(id, |n, _| {
            let l = labels[n];
            if l == self.unset || (self.excluded)(n) {
                return;
            }
            let w = self.config.weight(l as usize);
            tally[l as usize] += w;
            total += w;
        });
        if total <= 0.0 {
            return Ok(None);
        }
        commonest(tally).map(|l| Some(l as u32))
    }
}

/// Fill unset labels by neighbour majority; see [`Consensus`].
pub fn propagate<A, E>(
    adjacency: &A,
    labels: &mut [u32],
    label_count: usize,
    unset: u32,
    excluded: E,
    config: &ConsensusConfig,
) -> Result<ConsensusReport, RegionError>
where
    A: WeightedAdjacency + Sync,
    E: Fn(usize) -> bool + Sync,
{
    Consensus::new(adjacency, label_count, unset)
        .excluding(excluded)
        .config(config.clone())
        .run(labels)
}
