//! Traversal and aggregation engines.

pub mod consensus;
pub mod drainage;
pub mod flood_fill;
pub mod parallel;
pub mod priority_queue;
pub mod region_grow;

pub use consensus::{Consensus, ConsensusReport, commonest, propagate};
pub use drainage::{RiverBasins, river_basins, river_basins_from};
pub use flood_fill::{Blob, FloodFill, representatives};
pub use parallel::{LabelHistogram, label_histograms, par_map_indexed};
pub use priority_queue::IndexedPriorityQueue;
pub use region_grow::{GrowStats, RegionGrow, RegionGrowth, SeedMembership, UNSET_LABEL};
