#![cfg_attr(docsrs, feature(doc_cfg))]
//! # geo-regions
//!
//! geo-regions partitions an equirectangular raster of the sphere, or a
//! static field/river graph, into labelled regions. It is a batch engine:
//! inputs are fully materialised arrays, a run executes to completion, and
//! its output arrays are handed back to the caller.
//!
//! ## Features
//! - Explicitly owned containers: [`FixedArray`](data::FixedArray),
//!   [`GrowableBag`](data::GrowableBag) with swap-remove change records, and
//!   bounded stack/queue/list frontiers over caller-supplied buffers
//! - Grid topology with x wraparound and pole reflection, plus a spherical
//!   metric for geodesic step costs
//! - An indexed priority queue with decrease-key and O(1) reuse
//! - Multi-source region growing with barrier, monotonic-elevation and
//!   distance-cap rules, and river drainage basins built on it
//! - Flood-fill connected components and representative points
//! - Neighbour-majority consensus propagation to a fixpoint
//! - Parallel per-pixel passes (feature `rayon`, on by default)
//! - The length-prefixed membership file layout
//!
//! ## Determinism
//!
//! Equal-cost frontier entries pop in ascending id order and consensus ties
//! go to the lowest label ordinal, so a run over the same input always gives
//! the same output, with or without `rayon`.
//!
//! ## Invariant checking
//!
//! Structural self-checks ([`DebugInvariants`]) run in debug builds, or in
//! release builds with the `strict-invariants` / `check-invariants` features.

pub mod algs;
pub mod config;
pub mod data;
pub mod debug_invariants;
pub mod io;
pub mod region_error;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// The most-used types in one import.
pub mod prelude {
    pub use crate::algs::consensus::{Consensus, ConsensusReport, propagate};
    pub use crate::algs::drainage::{RiverBasins, river_basins};
    pub use crate::algs::flood_fill::{Blob, FloodFill};
    pub use crate::algs::priority_queue::IndexedPriorityQueue;
    pub use crate::algs::region_grow::{RegionGrow, RegionGrowth, SeedMembership, UNSET_LABEL};
    pub use crate::config::{ConsensusConfig, FloodOrder, GrowConfig, VerticalWrap};
    pub use crate::data::{BagMove, BoundedList, BoundedQueue, BoundedStack, FixedArray, GrowableBag};
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::region_error::RegionError;
    pub use crate::topology::{
        GeoGrid, GridTopology, Owner, OwnerKind, RegionGraph, WeightedAdjacency,
    };
}
