//! Static node/edge graph linking fields and river points.
//!
//! Nodes carry an [`Owner`] (which field or river they sample) and the ids
//! of their incident edges; edges carry their endpoints and precomputed
//! great-circle length. The graph is immutable once built.

use crate::region_error::RegionError;
use crate::topology::adjacency::WeightedAdjacency;

/// Dense node index.
pub type NodeId = usize;
/// Dense edge index.
pub type EdgeId = usize;

/// What a node belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OwnerKind {
    Field,
    River,
}

impl OwnerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OwnerKind::Field => "field",
            OwnerKind::River => "river",
        }
    }
}

/// Owning entity of a node: its kind and index within that kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Owner {
    pub kind: OwnerKind,
    pub index: u32,
}

impl Owner {
    pub fn field(index: u32) -> Self {
        Self {
            kind: OwnerKind::Field,
            index,
        }
    }

    pub fn river(index: u32) -> Self {
        Self {
            kind: OwnerKind::River,
            index,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub owner: Owner,
    pub edges: Vec<EdgeId>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub endpoints: (NodeId, NodeId),
    pub distance: f64,
}

impl Edge {
    /// The endpoint opposite `node`.
    #[inline]
    pub fn other(&self, node: NodeId) -> NodeId {
        if self.endpoints.0 == node {
            self.endpoints.1
        } else {
            self.endpoints.0
        }
    }
}

/// Read-only graph consumed by the engines.
#[derive(Clone, Debug, Default)]
pub struct RegionGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl RegionGraph {
    pub fn builder() -> GraphBuilder {
        GraphBuilder::default()
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// # Panics
    /// Panics if `id >= node_count()`.
    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// # Panics
    /// Panics if `id >= edge_count()`.
    #[inline]
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id]
    }

    /// Owner of node `id`.
    ///
    /// # Panics
    /// Panics if `id >= node_count()`.
    #[inline]
    pub fn owner(&self, id: NodeId) -> Owner {
        self.nodes[id].owner
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Ids of all nodes owned by `kind`, ascending.
    pub fn nodes_of_kind(&self, kind: OwnerKind) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, n)| n.owner.kind == kind)
            .map(|(i, _)| i)
    }

    /// `(neighbour, distance)` pairs of `id`, in edge-list order.
    pub fn neighbours(&self, id: NodeId) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.nodes[id].edges.iter().map(move |&e| {
            let edge = &self.edges[e];
            (edge.other(id), edge.distance)
        })
    }
}

impl WeightedAdjacency for RegionGraph {
    #[inline]
    fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    fn for_each_neighbour<F>(&self, id: usize, mut f: F)
    where
        F: FnMut(usize, f64),
    {
        for (n, w) in self.neighbours(id) {
            f(n, w);
        }
    }
}

/// Validating builder for [`RegionGraph`].
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl GraphBuilder {
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(nodes),
            edges: Vec::with_capacity(edges),
        }
    }

    pub fn add_node(&mut self, owner: Owner) -> NodeId {
        self.nodes.push(Node {
            owner,
            edges: Vec::new(),
        });
        self.nodes.len() - 1
    }

    /// Connect `a` and `b`; the edge id is recorded on both endpoints.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId, distance: f64) -> Result<EdgeId, RegionError> {
        let id = self.edges.len();
        let nodes = self.nodes.len();
        for node in [a, b] {
            if node >= nodes {
                return Err(RegionError::InvalidEdge {
                    edge: id,
                    node,
                    nodes,
                });
            }
        }
        if !distance.is_finite() || distance < 0.0 {
            return Err(RegionError::InvalidWeight {
                edge: id,
                weight: distance,
            });
        }
        self.edges.push(Edge {
            endpoints: (a, b),
            distance,
        });
        self.nodes[a].edges.push(id);
        if a != b {
            self.nodes[b].edges.push(id);
        }
        Ok(id)
    }

    pub fn build(self) -> RegionGraph {
        log::debug!(
            "region graph built: {} nodes, {} edges",
            self.nodes.len(),
            self.edges.len()
        );
        RegionGraph {
            nodes: self.nodes,
            edges: self.edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_are_recorded_on_both_endpoints() {
        let mut b = RegionGraph::builder();
        let r = b.add_node(Owner::river(0));
        let f = b.add_node(Owner::field(3));
        let e = b.add_edge(r, f, 0.25).unwrap();
        let g = b.build();
        assert_eq!(g.node(r).edges, vec![e]);
        assert_eq!(g.node(f).edges, vec![e]);
        assert_eq!(g.neighbours(f).collect::<Vec<_>>(), vec![(r, 0.25)]);
        assert_eq!(g.nodes_of_kind(OwnerKind::River).collect::<Vec<_>>(), vec![r]);
    }

    #[test]
    fn builder_rejects_bad_edges() {
        let mut b = RegionGraph::builder();
        let a = b.add_node(Owner::field(0));
        assert!(matches!(
            b.add_edge(a, 5, 1.0),
            Err(RegionError::InvalidEdge { node: 5, .. })
        ));
        let c = b.add_node(Owner::field(1));
        assert!(matches!(
            b.add_edge(a, c, -1.0),
            Err(RegionError::InvalidWeight { .. })
        ));
        assert!(b.add_edge(a, c, f64::NAN).is_err());
        assert_eq!(b.build().edge_count(), 0);
    }
}
