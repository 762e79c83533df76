//! Raster and graph topology: grid wrapping, spherical metric, static graphs.

pub mod adjacency;
pub mod geo_grid;
pub mod graph;
pub mod grid;
pub mod sphere;

pub use adjacency::WeightedAdjacency;
pub use geo_grid::{GeoGrid, StepWeight};
pub use graph::{Edge, EdgeId, GraphBuilder, Node, NodeId, Owner, OwnerKind, RegionGraph};
pub use grid::GridTopology;
pub use sphere::{GeoCoord, UnitVector};
