//! River drainage basins on a field/river graph.
//!
//! Region growth is seeded from river nodes; every other river node is a
//! barrier, so water never drains through one river into another. Every
//! field node a river reaches is attributed to that river, and the result is
//! reduced to a sorted list of field indices per river index.

use crate::algs::region_grow::{RegionGrow, RegionGrowth};
use crate::config::GrowConfig;
use crate::data::{FixedArray, GrowableBag};
use crate::region_error::RegionError;
use crate::topology::graph::{NodeId, OwnerKind, RegionGraph};

/// Fields drained by each river.
#[derive(Debug)]
pub struct RiverBasins {
    growth: RegionGrowth,
    fields: Vec<GrowableBag<u32>>,
}

impl RiverBasins {
    /// The underlying node-level assignment.
    pub fn growth(&self) -> &RegionGrowth {
        &self.growth
    }

    /// One past the largest river index in the graph.
    #[inline]
    pub fn river_count(&self) -> usize {
        self.fields.len()
    }

    /// Field indices drained by river `river`, ascending and unique.
    pub fn fields_of(&self, river: usize) -> Result<&[u32], RegionError> {
        self.fields
            .get(river)
            .map(|b| b.as_slice())
            .ok_or(RegionError::IndexOutOfRange {
                container: "RiverBasins",
                index: river,
                len: self.fields.len(),
            })
    }

    /// Per-river field lists, indexed by river index.
    pub fn lists(&self) -> &[GrowableBag<u32>] {
        &self.fields
    }

    pub fn dispose(self) -> usize {
        let n = self.growth.dispose();
        for b in self.fields {
            b.dispose();
        }
        n
    }
}

/// Grow from every river node.
pub fn river_basins(
    graph: &RegionGraph,
    elevation: Option<&[f32]>,
    config: &GrowConfig,
) -> Result<RiverBasins, RegionError> {
    let sources: Vec<NodeId> = graph.nodes_of_kind(OwnerKind::River).collect();
    river_basins_from(graph, &sources, elevation, config)
}

/// Grow from `sources` only; remaining river nodes act as barriers.
pub fn river_basins_from(
    graph: &RegionGraph,
    sources: &[NodeId],
    elevation: Option<&[f32]>,
    config: &GrowConfig,
) -> Result<RiverBasins, RegionError> {
    let n = graph.node_count();
    let mut barriers = FixedArray::filled(n, false);
    let mut river_count = 0usize;
    for id in graph.nodes_of_kind(OwnerKind::River) {
        barriers[id] = true;
        river_count = river_count.max(graph.owner(id).index as usize + 1);
    }
    for &s in sources {
        if s >= n {
            return Err(RegionError::IdOutOfDomain { id: s, domain: n });
        }
        if graph.owner(s).kind != OwnerKind::River {
            return Err(RegionError::UnexpectedSourceKind {
                id: s,
                seed: s,
                expected: OwnerKind::River.as_str(),
            });
        }
    }

    let mut grow = RegionGrow::new(graph)
        .seeds(sources.iter().copied())
        .barriers(barriers.as_slice())
        .config(config.clone());
    if let Some(e) = elevation {
        grow = grow.elevation(e);
    }
    let growth = grow.run()?;
    growth.validate_ancestry(
        |seed| graph.owner(seed).kind == OwnerKind::River,
        OwnerKind::River.as_str(),
    )?;

    let mut fields: Vec<GrowableBag<u32>> = (0..river_count).map(|_| GrowableBag::new()).collect();
    for id in graph.nodes_of_kind(OwnerKind::Field) {
        if let Some(seed) = growth.label(id) {
            let river = graph.owner(seed).index as usize;
            fields[river].add(graph.owner(id).index);
        }
    }
    for list in &mut fields {
        list.sort_dedup();
    }
    log::debug!(
        "drainage: {} sources over {} rivers, {} field nodes attributed",
        sources.len(),
        river_count,
        fields.iter().map(GrowableBag::len).sum::<usize>()
    );
    barriers.dispose();
    Ok(RiverBasins { growth, fields })
}
