//! Mapping of approximate polylines onto the edges of the road graph

use geo::Point;
use itertools::Itertools;
use log::trace;
use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::{NodeId, RoadGraph, routing::dijkstra::dijkstra_path};

/// Pair of snapped waypoints with no path between them in either direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnapGap {
    pub origin: NodeId,
    pub destination: NodeId,
}

/// Result of snapping one polyline
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapOutcome {
    /// Edges covered by the polyline, in travel order
    pub edges: Vec<EdgeIndex>,
    pub gaps: Vec<SnapGap>,
}

/// Strategy turning a polyline into a sequence of graph edges
pub trait Snapper: Sync {
    fn snap(&self, graph: &RoadGraph, waypoints: &[Point<f64>]) -> SnapOutcome;
}

/// Snaps every waypoint to its nearest node and bridges consecutive nodes
/// with the geometrically shortest path, trying the reverse direction when
/// one-way streets break the forward one.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestNodeSnapper;

impl Snapper for NearestNodeSnapper {
    fn snap(&self, graph: &RoadGraph, waypoints: &[Point<f64>]) -> SnapOutcome {
        let mut outcome = SnapOutcome::default();

        let nodes: Vec<NodeIndex> = waypoints
            .iter()
            .filter_map(|point| graph.nearest_node(point))
            .dedup()
            .collect();

        for (origin, destination) in nodes.into_iter().tuple_windows() {
            let path = dijkstra_path(graph, origin, destination, |edge| edge.length)
                .or_else(|| dijkstra_path(graph, destination, origin, |edge| edge.length));

            match path {
                Some(path) => outcome.edges.extend(path.edges),
                None => {
                    let gap = SnapGap {
                        origin: graph.graph[origin].id,
                        destination: graph.graph[destination].id,
                    };
                    trace!(
                        "No path between nodes {} and {} in either direction",
                        gap.origin, gap.destination
                    );
                    outcome.gaps.push(gap);
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 1 -> 2 -> 3 one-way, 4 isolated
    fn one_way_street() -> RoadGraph {
        RoadGraph::builder()
            .node(1, 41.0, 2.0)
            .node(2, 41.0, 2.001)
            .node(3, 41.0, 2.002)
            .node(4, 41.01, 2.01)
            .edge(1, 2, 84.0, None)
            .edge(2, 3, 84.0, None)
            .build()
            .unwrap()
    }

    fn endpoints(graph: &RoadGraph, outcome: &SnapOutcome) -> Vec<(NodeId, NodeId)> {
        outcome
            .edges
            .iter()
            .map(|&e| graph.edge_endpoints(e).unwrap())
            .collect()
    }

    #[test]
    fn bridges_consecutive_waypoints() {
        let graph = one_way_street();
        let outcome = NearestNodeSnapper.snap(
            &graph,
            &[Point::new(2.00001, 41.0), Point::new(2.00199, 41.00001)],
        );
        assert_eq!(endpoints(&graph, &outcome), vec![(1, 2), (2, 3)]);
        assert!(outcome.gaps.is_empty());
    }

    #[test]
    fn falls_back_to_reverse_direction() {
        let graph = one_way_street();
        let outcome = NearestNodeSnapper.snap(&graph, &[Point::new(2.002, 41.0), Point::new(2.001, 41.0)]);
        assert_eq!(endpoints(&graph, &outcome), vec![(2, 3)]);
    }

    #[test]
    fn disconnected_waypoints_are_reported() {
        let graph = one_way_street();
        let outcome = NearestNodeSnapper.snap(&graph, &[Point::new(2.002, 41.0), Point::new(2.01, 41.01)]);
        assert!(outcome.edges.is_empty());
        assert_eq!(
            outcome.gaps,
            vec![SnapGap {
                origin: 3,
                destination: 4
            }]
        );
    }

    #[test]
    fn waypoints_on_the_same_node_cover_nothing() {
        let graph = one_way_street();
        let outcome = NearestNodeSnapper.snap(&graph, &[Point::new(2.0, 41.0), Point::new(2.00001, 41.0)]);
        assert_eq!(outcome, SnapOutcome::default());
    }
}
