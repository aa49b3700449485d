//! Directed street multigraph with a spatial index over its nodes

use geo::Point;
use hashbrown::HashMap;
use petgraph::{
    graph::{DiGraph, EdgeIndex, NodeIndex},
    visit::EdgeRef,
};
use rstar::{RTree, primitives::GeomWithData};

use super::components::{RoadEdge, RoadNode, SpeedLimit};
use crate::{Error, NodeId};

/// Node position (`[lon, lat]`) stored in the R-tree together with its graph index
pub type IndexedPoint = GeomWithData<[f64; 2], NodeIndex>;

/// Drivable street network of a city.
///
/// Parallel edges between the same pair of nodes are allowed; each one is
/// addressed by its slot, the order in which it was inserted.
#[derive(Debug, Clone, Default)]
pub struct RoadGraph {
    pub(crate) graph: DiGraph<RoadNode, RoadEdge>,
    rtree: RTree<IndexedPoint>,
    node_lookup: HashMap<NodeId, NodeIndex>,
}

impl RoadGraph {
    pub fn builder() -> RoadGraphBuilder {
        RoadGraphBuilder::default()
    }

    /// Builds a graph from node and edge lists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] on duplicated node ids, non-finite node
    /// coordinates or edges whose endpoints are not in `nodes`.
    pub fn from_parts(
        nodes: Vec<RoadNode>,
        edges: Vec<(NodeId, NodeId, RoadEdge)>,
    ) -> Result<Self, Error> {
        let mut graph = DiGraph::with_capacity(nodes.len(), edges.len());
        let mut node_lookup = HashMap::with_capacity(nodes.len());

        for node in nodes {
            let id = node.id;
            if !(node.lat().is_finite() && node.lon().is_finite()) {
                return Err(Error::InvalidData(format!("Node {id} has non-finite coordinates")));
            }
            let index = graph.add_node(node);
            if node_lookup.insert(id, index).is_some() {
                return Err(Error::InvalidData(format!("Duplicated node id {id}")));
            }
        }

        for (from, to, edge) in edges {
            let resolve = |id: NodeId| {
                node_lookup.get(&id).copied().ok_or_else(|| {
                    Error::InvalidData(format!("Edge {from} -> {to} references unknown node {id}"))
                })
            };
            let (a, b) = (resolve(from)?, resolve(to)?);
            graph.add_edge(a, b, edge);
        }

        let points = graph
            .node_indices()
            .map(|index| {
                let geometry = graph[index].geometry;
                IndexedPoint::new([geometry.x(), geometry.y()], index)
            })
            .collect();

        Ok(Self {
            graph,
            rtree: RTree::bulk_load(points),
            node_lookup,
        })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node(&self, index: NodeIndex) -> Option<&RoadNode> {
        self.graph.node_weight(index)
    }

    pub fn node_index(&self, id: NodeId) -> Option<NodeIndex> {
        self.node_lookup.get(&id).copied()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &RoadNode> {
        self.graph.node_weights()
    }

    /// Nearest node to `point`, by Euclidean distance in the lon/lat plane
    pub fn nearest_node(&self, point: &Point<f64>) -> Option<NodeIndex> {
        self.rtree
            .nearest_neighbor(&[point.x(), point.y()])
            .map(|indexed| indexed.data)
    }

    pub fn edge(&self, index: EdgeIndex) -> Option<&RoadEdge> {
        self.graph.edge_weight(index)
    }

    pub fn edge_mut(&mut self, index: EdgeIndex) -> Option<&mut RoadEdge> {
        self.graph.edge_weight_mut(index)
    }

    /// External ids of the endpoints of an edge
    pub fn edge_endpoints(&self, index: EdgeIndex) -> Option<(NodeId, NodeId)> {
        let (a, b) = self.graph.edge_endpoints(index)?;
        Some((self.graph[a].id, self.graph[b].id))
    }

    /// All parallel edges `from -> to`, ordered by slot
    pub fn edges_between(&self, from: NodeId, to: NodeId) -> Vec<EdgeIndex> {
        let (Some(a), Some(b)) = (self.node_index(from), self.node_index(to)) else {
            return Vec::new();
        };
        let mut slots: Vec<EdgeIndex> = self
            .graph
            .edges_connecting(a, b)
            .map(|edge| edge.id())
            .collect();
        slots.sort_unstable();
        slots
    }

    pub fn edge_slot(&self, from: NodeId, to: NodeId, slot: usize) -> Option<&RoadEdge> {
        self.edges_between(from, to)
            .get(slot)
            .and_then(|&index| self.edge(index))
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeIndex, &RoadEdge)> {
        self.graph
            .edge_references()
            .map(|edge| (edge.id(), edge.weight()))
    }

    pub fn edges_mut(&mut self) -> impl Iterator<Item = &mut RoadEdge> {
        self.graph.edge_weights_mut()
    }

    /// Clears congestion and travel times on every edge
    pub fn reset_traffic(&mut self) {
        self.edges_mut().for_each(RoadEdge::reset_traffic);
    }
}

/// Incremental construction of a [`RoadGraph`]
#[derive(Debug, Default)]
pub struct RoadGraphBuilder {
    nodes: Vec<RoadNode>,
    edges: Vec<(NodeId, NodeId, RoadEdge)>,
}

impl RoadGraphBuilder {
    #[must_use]
    pub fn node(mut self, id: NodeId, lat: f64, lon: f64) -> Self {
        self.nodes.push(RoadNode::new(id, lat, lon));
        self
    }

    #[must_use]
    pub fn edge(
        mut self,
        from: NodeId,
        to: NodeId,
        length: f64,
        speed_limit: Option<SpeedLimit>,
    ) -> Self {
        self.edges.push((from, to, RoadEdge::new(length, speed_limit)));
        self
    }

    /// Adds `a -> b` and `b -> a` with the same attributes
    #[must_use]
    pub fn two_way(self, a: NodeId, b: NodeId, length: f64, speed_limit: Option<SpeedLimit>) -> Self {
        self.edge(a, b, length, speed_limit.clone())
            .edge(b, a, length, speed_limit)
    }

    /// # Errors
    ///
    /// See [`RoadGraph::from_parts`].
    pub fn build(self) -> Result<RoadGraph, Error> {
        RoadGraph::from_parts(self.nodes, self.edges)
    }
}
