use geo::Point;
use log::debug;

use super::{dijkstra::dijkstra_path, geocode::Geocoder};
use crate::{Error, NodeId, RoadGraph, TravelTime};

/// Minimum travel-time path through the road graph
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Node ids from origin to destination, empty when both coincide
    pub nodes: Vec<NodeId>,
    /// Total congestion-weighted travel time in seconds
    pub travel_time: TravelTime,
    /// Node positions along the route, `x` is longitude and `y` latitude
    pub geometry: Vec<Point<f64>>,
}

impl Route {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Resolves place names and answers shortest-path queries
#[derive(Debug, Clone)]
pub struct Router<G> {
    geocoder: G,
}

impl<G: Geocoder> Router<G> {
    pub fn new(geocoder: G) -> Self {
        Self { geocoder }
    }

    /// Geocodes `place` and snaps it to the nearest graph node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnresolvableLocation`] if the place is unknown or the
    /// graph has no nodes.
    pub fn resolve(&self, graph: &RoadGraph, place: &str) -> Result<NodeId, Error> {
        let (lat, lon) = self
            .geocoder
            .geocode(place)
            .ok_or_else(|| Error::UnresolvableLocation(place.to_string()))?;
        let index = graph
            .nearest_node(&Point::new(lon, lat))
            .ok_or_else(|| Error::UnresolvableLocation(place.to_string()))?;
        let node = graph.graph[index].id;
        debug!("Resolved {place:?} ({lat}, {lon}) to node {node}");
        Ok(node)
    }

    /// Resolves both places and routes between them.
    ///
    /// # Errors
    ///
    /// See [`Router::resolve`] and [`shortest_path`].
    pub fn route(&self, graph: &RoadGraph, from: &str, to: &str) -> Result<Route, Error> {
        let origin = self.resolve(graph, from)?;
        let destination = self.resolve(graph, to)?;
        shortest_path(graph, origin, destination)
    }
}

/// Dijkstra over `itime`; impassable and uncosted edges are never used.
///
/// # Errors
///
/// Returns [`Error::InvalidNodeIndex`] for ids missing from the graph and
/// [`Error::NoPath`] if `destination` cannot be reached over finite edges.
pub fn shortest_path(graph: &RoadGraph, origin: NodeId, destination: NodeId) -> Result<Route, Error> {
    let start = graph
        .node_index(origin)
        .ok_or(Error::InvalidNodeIndex(origin))?;
    let target = graph
        .node_index(destination)
        .ok_or(Error::InvalidNodeIndex(destination))?;

    if start == target {
        return Ok(Route {
            nodes: Vec::new(),
            travel_time: 0.0,
            geometry: Vec::new(),
        });
    }

    let path = dijkstra_path(graph, start, target, |edge| edge.travel_time()).ok_or(
        Error::NoPath {
            origin,
            destination,
        },
    )?;

    let (nodes, geometry) = path
        .nodes
        .iter()
        .map(|&index| {
            let node = &graph.graph[index];
            (node.id, node.geometry)
        })
        .unzip();

    Ok(Route {
        nodes,
        travel_time: path.cost,
        geometry,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{routing::Gazetteer, traffic::CostModel};

    fn costed_line() -> RoadGraph {
        let mut graph = RoadGraph::builder()
            .node(1, 41.0, 2.0)
            .node(2, 41.0, 2.001)
            .node(3, 41.0, 2.002)
            .node(4, 41.5, 2.5)
            .two_way(1, 2, 84.0, None)
            .two_way(2, 3, 84.0, None)
            .build()
            .unwrap();
        CostModel::default().compute_times(&mut graph).unwrap();
        graph
    }

    #[test]
    fn resolves_places_to_nearest_node() {
        let graph = costed_line();
        let router = Router::new(
            [("Plaça A", (41.0001, 2.0)), ("Plaça C", (41.0, 2.0021))]
                .into_iter()
                .collect::<Gazetteer>(),
        );
        assert_eq!(router.resolve(&graph, "plaça a").unwrap(), 1);
        let route = router.route(&graph, "Plaça A", "Plaça C").unwrap();
        assert_eq!(route.nodes, vec![1, 2, 3]);
        assert_eq!(route.geometry.len(), 3);
    }

    #[test]
    fn unknown_place_is_unresolvable() {
        let graph = costed_line();
        let router = Router::new(Gazetteer::new());
        assert!(matches!(
            router.resolve(&graph, "Atlantis"),
            Err(Error::UnresolvableLocation(_))
        ));
        assert!(matches!(
            router.resolve(&RoadGraph::default(), "41.0,2.0"),
            Err(Error::UnresolvableLocation(_))
        ));
    }

    #[test]
    fn same_origin_and_destination_is_empty() {
        let route = shortest_path(&costed_line(), 2, 2).unwrap();
        assert!(route.is_empty());
        assert_eq!(route.travel_time, 0.0);
    }

    #[test]
    fn disconnected_nodes_have_no_path() {
        let graph = costed_line();
        assert!(matches!(
            shortest_path(&graph, 1, 4),
            Err(Error::NoPath {
                origin: 1,
                destination: 4
            })
        ));
        assert!(matches!(
            shortest_path(&graph, 1, 99),
            Err(Error::InvalidNodeIndex(99))
        ));
    }

    #[test]
    fn uncosted_graph_is_not_routable() {
        let graph = RoadGraph::builder()
            .node(1, 0.0, 0.0)
            .node(2, 0.0, 0.001)
            .edge(1, 2, 10.0, None)
            .build()
            .unwrap();
        assert!(matches!(shortest_path(&graph, 1, 2), Err(Error::NoPath { .. })));
    }
}
