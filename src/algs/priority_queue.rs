//! Indexed binary min-heap over a dense id domain.
//!
//! Supports insert, decrease-key and extract-min in O(log n), O(1) cost
//! lookup, and O(1) amortised `clear` so one queue can be reused across
//! runs over the same domain.
//!
//! Entries are ordered by `(cost, id)`: among equal costs the lower id pops
//! first. This makes pop order deterministic across runs and builds.

use core::cmp::Ordering;

use crate::data::FixedArray;
use crate::debug_invariants::{DebugInvariants, ensure};
use crate::region_error::RegionError;

const NOT_QUEUED: usize = usize::MAX;

/// Min-priority frontier keyed by dense ids in `0..domain`.
#[derive(Debug)]
pub struct IndexedPriorityQueue {
    /// Heap-ordered ids.
    heap: Vec<usize>,
    /// id -> position in `heap`, or `NOT_QUEUED`.
    slot: FixedArray<usize>,
    /// id -> best known cost; meaningful only when `stamp[id] == generation`.
    cost: FixedArray<f64>,
    stamp: FixedArray<u32>,
    generation: u32,
}

impl IndexedPriorityQueue {
    /// Allocate a queue for ids `0..domain`.
    pub fn new(domain: usize) -> Self {
        Self {
            heap: Vec::new(),
            slot: FixedArray::filled(domain, NOT_QUEUED),
            cost: FixedArray::filled(domain, f64::INFINITY),
            stamp: FixedArray::filled(domain, 0),
            generation: 1,
        }
    }

    /// Size of the id domain.
    #[inline]
    pub fn domain(&self) -> usize {
        self.slot.len()
    }

    /// Number of queued entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[inline]
    pub fn is_queued(&self, id: usize) -> bool {
        id < self.domain() && self.slot[id] != NOT_QUEUED
    }

    /// Best known cost of `id`, whether or not it has been popped since.
    #[inline]
    pub fn try_get_cost(&self, id: usize) -> Option<f64> {
        (id < self.domain() && self.stamp[id] == self.generation).then(|| self.cost[id])
    }

    /// Insert a new entry; `id` must not currently be queued.
    pub fn add(&mut self, id: usize, cost: f64) -> Result<(), RegionError> {
        self.check(id, cost)?;
        if self.slot[id] != NOT_QUEUED {
            return Err(RegionError::AlreadyQueued(id));
        }
        self.insert(id, cost);
        Ok(())
    }

    /// Insert `id`, or lower its cost if `cost` improves on the best known
    /// one.
    ///
    /// Returns `true` if the entry was inserted or its cost decreased. An
    /// equal or higher cost is a no-op, including for an id already popped
    /// since the last [`clear`](Self::clear).
    pub fn add_or_update(&mut self, id: usize, cost: f64) -> Result<bool, RegionError> {
        self.check(id, cost)?;
        let known = self.stamp[id] == self.generation;
        if known && cost >= self.cost[id] {
            return Ok(false);
        }
        let pos = self.slot[id];
        if pos == NOT_QUEUED {
            self.insert(id, cost);
        } else {
            self.cost[id] = cost;
            self.sift_up(pos);
        }
        Ok(true)
    }

    /// Minimum entry without removing it.
    pub fn peek(&self) -> Option<(usize, f64)> {
        self.heap.first().map(|&id| (id, self.cost[id]))
    }

    /// Remove and return the id with minimum cost.
    pub fn try_pop(&mut self) -> Option<usize> {
        let last = self.heap.len().checked_sub(1)?;
        self.heap.swap(0, last);
        let id = self.heap.pop()?;
        self.slot[id] = NOT_QUEUED;
        if !self.heap.is_empty() {
            self.slot[self.heap[0]] = 0;
            self.sift_down(0);
        }
        Some(id)
    }

    /// Like [`try_pop`](Self::try_pop) but also returns the popped cost.
    pub fn try_pop_with_cost(&mut self) -> Option<(usize, f64)> {
        self.try_pop().map(|id| (id, self.cost[id]))
    }

    /// Forget every entry and every recorded cost, keeping the allocation.
    pub fn clear(&mut self) {
        for &id in &self.heap {
            self.slot[id] = NOT_QUEUED;
        }
        self.heap.clear();
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            // Stamps from 2^32 generations ago would alias; reset them once.
            self.stamp.fill(0);
            self.generation = 1;
        }
    }

    fn check(&self, id: usize, cost: f64) -> Result<(), RegionError> {
        if id >= self.domain() {
            return Err(RegionError::IdOutOfDomain {
                id,
                domain: self.domain(),
            });
        }
        if cost.is_nan() {
            return Err(RegionError::InvalidCost { id, cost });
        }
        Ok(())
    }

    fn insert(&mut self, id: usize, cost: f64) {
        self.cost[id] = cost;
        self.stamp[id] = self.generation;
        let pos = self.heap.len();
        self.heap.push(id);
        self.slot[id] = pos;
        self.sift_up(pos);
    }

    #[inline]
    fn order(&self, a: usize, b: usize) -> Ordering {
        self.cost[a].total_cmp(&self.cost[b]).then(a.cmp(&b))
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if self.order(self.heap[pos], self.heap[parent]) != Ordering::Less {
                break;
            }
            self.swap_slots(pos, parent);
            pos = parent;
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * pos + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let mut child = left;
            if right < len && self.order(self.heap[right], self.heap[left]) == Ordering::Less {
                child = right;
            }
            if self.order(self.heap[child], self.heap[pos]) != Ordering::Less {
                break;
            }
            self.swap_slots(pos, child);
            pos = child;
        }
    }

    #[inline]
    fn swap_slots(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.slot[self.heap[a]] = a;
        self.slot[self.heap[b]] = b;
    }
}

impl DebugInvariants for IndexedPriorityQueue {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "IndexedPriorityQueue");
    }

    fn validate_invariants(&self) -> Result<(), RegionError> {
        for (pos, &id) in self.heap.iter().enumerate() {
            ensure(self.slot[id] == pos, || {
                format!("id {id} at heap position {pos} but slot says {}", self.slot[id])
            })?;
            ensure(self.stamp[id] == self.generation, || {
                format!("queued id {id} carries a stale cost")
            })?;
            if pos > 0 {
                let parent = self.heap[(pos - 1) / 2];
                ensure(self.order(parent, id) != Ordering::Greater, || {
                    format!("heap order broken between {parent} and {id}")
                })?;
            }
        }
        let queued = self.slot.iter().filter(|&&s| s != NOT_QUEUED).count();
        ensure(queued == self.heap.len(), || {
            format!("{queued} slots marked queued, heap holds {}", self.heap.len())
        })
    }
}
