//! The adjacency seam shared by every traversal engine.

/// A static, dense-id adjacency with non-negative edge weights.
///
/// Ids are `0..len()`. Implementations must report each undirected edge from
/// both endpoints and must not change while an engine holds a reference.
pub trait WeightedAdjacency {
    /// Size of the id domain.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Call `f(neighbour, weight)` for every edge leaving `id`.
    fn for_each_neighbour<F>(&self, id: usize, f: F)
    where
        F: FnMut(usize, f64);
}
