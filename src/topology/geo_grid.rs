//! 4-neighbour raster adjacency weighted by geodesic distance.

use crate::algs::parallel::par_map_indexed;
use crate::data::FixedArray;
use crate::topology::adjacency::WeightedAdjacency;
use crate::topology::grid::GridTopology;
use crate::topology::sphere::{UnitVector, angular_distance, pixel_to_unit};

/// How a raster step is priced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepWeight {
    /// Great-circle angle between pixel centres.
    Geodesic,
    /// Every step costs `1.0` (hop count).
    Uniform,
}

/// A [`GridTopology`] plus per-pixel unit vectors, usable as [`WeightedAdjacency`].
#[derive(Debug)]
pub struct GeoGrid {
    topology: GridTopology,
    centres: FixedArray<UnitVector>,
    weight: StepWeight,
}

impl GeoGrid {
    /// Precompute pixel centres; steps are priced by great-circle distance.
    pub fn geodesic(topology: GridTopology) -> Self {
        Self::with_weight(topology, StepWeight::Geodesic)
    }

    pub fn uniform(topology: GridTopology) -> Self {
        Self::with_weight(topology, StepWeight::Uniform)
    }

    pub fn with_weight(topology: GridTopology, weight: StepWeight) -> Self {
        let centres = par_map_indexed(topology.pixel_count(), |flat| {
            pixel_to_unit(&topology, flat)
        });
        Self {
            topology,
            centres: FixedArray::from_vec(centres),
            weight,
        }
    }

    #[inline]
    pub fn topology(&self) -> &GridTopology {
        &self.topology
    }

    #[inline]
    pub fn centre(&self, flat: usize) -> &UnitVector {
        &self.centres[flat]
    }

    pub fn centres(&self) -> &[UnitVector] {
        self.centres.as_slice()
    }

    /// Cost of stepping between two adjacent pixels.
    #[inline]
    pub fn step_cost(&self, a: usize, b: usize) -> f64 {
        match self.weight {
            StepWeight::Geodesic => angular_distance(&self.centres[a], &self.centres[b]),
            StepWeight::Uniform => 1.0,
        }
    }
}

impl WeightedAdjacency for GeoGrid {
    #[inline]
    fn len(&self) -> usize {
        self.topology.pixel_count()
    }

    fn for_each_neighbour<F>(&self, id: usize, mut f: F)
    where
        F: FnMut(usize, f64),
    {
        let mut seen = [usize::MAX; 4];
        for (k, n) in self.topology.neighbours4(id).into_iter().enumerate() {
            // Tiny grids fold neighbours onto each other or onto `id`.
            if n == id || seen[..k].contains(&n) {
                continue;
            }
            seen[k] = n;
            f(n, self.step_cost(id, n));
        }
    }
}
