//! Connected components of equal-valued pixels on a wrapping raster.
//!
//! The frontier is a [`BoundedStack`] or [`BoundedQueue`] over one scratch
//! buffer of `pixel_count` slots, so blob shape can never overflow it. Ids
//! are marked closed when pushed, which bounds the frontier and guarantees
//! each id is visited exactly once.

use crate::algs::parallel::par_map_indexed;
use crate::config::FloodOrder;
use crate::data::{BoundedQueue, BoundedStack, FixedArray, GrowableBag};
use crate::region_error::RegionError;
use crate::topology::geo_grid::GeoGrid;
use crate::topology::grid::GridTopology;
use crate::topology::sphere::{angular_distance, spherical_centroid};

/// Push/pop seam over the two bounded frontiers.
trait Frontier {
    fn put(&mut self, id: usize) -> Result<(), RegionError>;
    fn take(&mut self) -> Option<usize>;
}

impl Frontier for BoundedStack<'_, usize> {
    #[inline]
    fn put(&mut self, id: usize) -> Result<(), RegionError> {
        self.push(id)
    }
    #[inline]
    fn take(&mut self) -> Option<usize> {
        self.pop()
    }
}

impl Frontier for BoundedQueue<'_, usize> {
    #[inline]
    fn put(&mut self, id: usize) -> Result<(), RegionError> {
        self.push_back(id)
    }
    #[inline]
    fn take(&mut self) -> Option<usize> {
        self.pop_front()
    }
}

/// A maximal 4-connected set of pixels sharing one value.
#[derive(Debug)]
pub struct Blob {
    value: u32,
    members: GrowableBag<u32>,
}

impl Blob {
    #[inline]
    pub fn value(&self) -> u32 {
        self.value
    }

    /// Member flat indices in visit order.
    pub fn members(&self) -> &[u32] {
        self.members.as_slice()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in ascending order.
    pub fn into_sorted(mut self) -> Vec<u32> {
        self.members.sort_unstable();
        self.members.into_vec()
    }

    /// Member closest to the blob's spherical centroid; ties go to the lower
    /// id. Falls back to the lowest id when the centres cancel out (a blob
    /// wrapping the whole sphere).
    pub fn representative(&self, grid: &GeoGrid) -> Option<usize> {
        // Sum in id order so the result does not depend on visit order.
        let mut ids: Vec<usize> = self.members.iter().map(|&m| m as usize).collect();
        ids.sort_unstable();
        let Some(centroid) = spherical_centroid(ids.iter().map(|&m| grid.centre(m))) else {
            return ids.first().copied();
        };
        ids.into_iter()
            .map(|m| (angular_distance(&centroid, grid.centre(m)), m))
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
            .map(|(_, m)| m)
    }

    pub fn dispose(self) -> usize {
        self.members.dispose()
    }
}

/// Representative pixel of every blob, computed in parallel.
pub fn representatives(blobs: &[Blob], grid: &GeoGrid) -> Vec<Option<usize>> {
    par_map_indexed(blobs.len(), |i| blobs[i].representative(grid))
}

/// Reusable flood-fill state for one raster.
#[derive(Debug)]
pub struct FloodFill {
    topology: GridTopology,
    order: FloodOrder,
    closed: FixedArray<bool>,
    frontier: FixedArray<usize>,
}

impl FloodFill {
    pub fn new(topology: GridTopology) -> Self {
        Self::with_order(topology, FloodOrder::default())
    }

    pub fn with_order(topology: GridTopology, order: FloodOrder) -> Self {
        let n = topology.pixel_count();
        Self {
            topology,
            order,
            closed: FixedArray::filled(n, false),
            frontier: FixedArray::filled(n, 0),
        }
    }

    #[inline]
    pub fn topology(&self) -> &GridTopology {
        &self.topology
    }

    /// Forget every visited pixel.
    pub fn reset(&mut self) {
        self.closed.fill(false);
    }

    /// The blob containing `start`, independent of earlier calls.
    pub fn fill(&mut self, start: usize, values: &[u32]) -> Result<Blob, RegionError> {
        self.check(values)?;
        if start >= values.len() {
            return Err(RegionError::IndexOutOfRange {
                container: "FloodFill",
                index: start,
                len: values.len(),
            });
        }
        self.reset();
        self.fill_from(start, values)
    }

    /// Partition the whole raster into blobs, in order of their lowest id.
    pub fn components(&mut self, values: &[u32]) -> Result<Vec<Blob>, RegionError> {
        self.check(values)?;
        self.reset();
        let mut blobs = Vec::new();
        for id in 0..values.len() {
            if !self.closed[id] {
                blobs.push(self.fill_from(id, values)?);
            }
        }
        log::debug!(
            "flood fill: {} pixels in {} components",
            values.len(),
            blobs.len()
        );
        Ok(blobs)
    }

    fn check(&self, values: &[u32]) -> Result<(), RegionError> {
        let n = self.topology.pixel_count();
        if values.len() != n {
            return Err(RegionError::LengthMismatch {
                what: "flood fill values",
                expected: n,
                found: values.len(),
            });
        }
        Ok(())
    }

    fn fill_from(&mut self, start: usize, values: &[u32]) -> Result<Blob, RegionError> {
        let FloodFill {
            topology,
            order,
            closed,
            frontier,
        } = self;
        let value = values[start];
        let mut members = GrowableBag::new();
        closed[start] = true;
        match order {
            FloodOrder::DepthFirst => {
                let mut stack = BoundedStack::new(frontier.as_mut_slice());
                stack.put(start)?;
                drain(&mut stack, topology, closed, values, value, &mut members)?;
            }
            FloodOrder::BreadthFirst => {
                let mut queue = BoundedQueue::new(frontier.as_mut_slice());
                queue.put(start)?;
                drain(&mut queue, topology, closed, values, value, &mut members)?;
            }
        }
        Ok(Blob { value, members })
    }
}

fn drain<F: Frontier>(
    frontier: &mut F,
    topology: &GridTopology,
    closed: &mut FixedArray<bool>,
    values: &[u32],
    value: u32,
    members: &mut GrowableBag<u32>,
) -> Result<(), RegionError> {
    while let Some(id) = frontier.take() {
        members.add(id as u32);
        for n in topology.neighbours4(id) {
            if !closed[n] && values[n] == value {
                closed[n] = true;
                frontier.put(n)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VerticalWrap;

    #[test]
    fn columns_join_across_the_seam() {
        // Columns 0 and 3 hold 1, columns 1 and 2 hold 0.
        let topo = GridTopology::with_wrap(4, 4, VerticalWrap::Torus).unwrap();
        let values: Vec<u32> = (0..16).map(|i| u32::from(i % 4 == 0 || i % 4 == 3)).collect();
        for order in [FloodOrder::DepthFirst, FloodOrder::BreadthFirst] {
            let mut ff = FloodFill::with_order(topo, order);
            let blob = ff.fill(5, &values).unwrap();
            assert_eq!(blob.value(), 0);
            assert_eq!(blob.into_sorted(), vec![1, 2, 5, 6, 9, 10, 13, 14]);
            let blob = ff.fill(0, &values).unwrap();
            assert_eq!(blob.into_sorted(), vec![0, 3, 4, 7, 8, 11, 12, 15]);
        }
    }

    #[test]
    fn pole_crossing_connects_opposite_longitudes() {
        let topo = GridTopology::new(4, 4).unwrap();
        let mut values = vec![0u32; 16];
        values[0] = 1;
        values[2] = 1;
        let mut ff = FloodFill::new(topo);
        assert_eq!(ff.fill(0, &values).unwrap().into_sorted(), vec![0, 2]);
        let blobs = ff.components(&values).unwrap();
        assert_eq!(blobs.len(), 2);
        assert_eq!(blobs[1].len(), 14);
    }

    #[test]
    fn blob_is_the_same_from_every_member() {
        assert!(GridTopology::new(5, 3).is_err());
        let topo = GridTopology::new(6, 3).unwrap();
        let mut values = vec![0u32; 18];
        // Row 0 pixels 0 and 3 meet over the north pole.
        values[0] = 1;
        values[3] = 1;
        values[9] = 1;
        let mut ff = FloodFill::new(topo);
        let from_first = ff.fill(0, &values).unwrap().into_sorted();
        assert_eq!(from_first, vec![0, 3, 9]);
        for start in [3, 9] {
            assert_eq!(ff.fill(start, &values).unwrap().into_sorted(), from_first);
        }
    }

    #[test]
    fn components_cover_every_pixel_once() {
        let topo = GridTopology::new(6, 3).unwrap();
        let values: Vec<u32> = (0..18).map(|i| (i * 7 % 5) as u32 % 3).collect();
        let mut ff = FloodFill::new(topo);
        let blobs = ff.components(&values).unwrap();
        let mut seen = vec![0u8; 18];
        for b in &blobs {
            for &m in b.members() {
                seen[m as usize] += 1;
                assert_eq!(values[m as usize], b.value());
            }
        }
        assert!(seen.iter().all(|&c| c == 1));
    }

    #[test]
    fn representative_sits_near_the_middle() {
        let topo = GridTopology::new(16, 8).unwrap();
        let grid = GeoGrid::uniform(topo);
        // A 3x3 block centred on (8, 4).
        let mut values = vec![0u32; 128];
        for y in 3..6 {
            for x in 7..10 {
                values[topo.flat(x, y)] = 1;
            }
        }
        let mut ff = FloodFill::new(topo);
        let blob = ff.fill(topo.flat(8, 4), &values).unwrap();
        assert_eq!(blob.representative(&grid), Some(topo.flat(8, 4)));
        let blobs = ff.components(&values).unwrap();
        let reps = representatives(&blobs, &grid);
        assert_eq!(reps.len(), blobs.len());
        assert!(reps.iter().all(Option::is_some));
    }

    #[test]
    fn rejects_mismatched_raster() {
        let mut ff = FloodFill::new(GridTopology::new(2, 2).unwrap());
        assert!(matches!(
            ff.fill(0, &[0, 0, 0]),
            Err(RegionError::LengthMismatch { .. })
        ));
        assert!(matches!(
            ff.fill(4, &[0; 4]),
            Err(RegionError::IndexOutOfRange { index: 4, .. })
        ));
    }
}
