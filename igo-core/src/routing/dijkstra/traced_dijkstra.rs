use std::collections::BinaryHeap;

use hashbrown::{HashMap, hash_map::Entry};
use petgraph::{
    graph::{EdgeIndex, NodeIndex},
    visit::EdgeRef,
};

use super::state::State;
use crate::{RoadGraph, TravelTime, model::RoadEdge};

/// Path found by [`dijkstra_path`]
#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPath {
    /// Visited nodes including both endpoints
    pub nodes: Vec<NodeIndex>,
    /// Traversed edges, `nodes.len() - 1` of them
    pub edges: Vec<EdgeIndex>,
    pub cost: TravelTime,
}

/// Dijkstra's algorithm from `start` to `target` under an arbitrary edge weight.
///
/// Edges whose weight is infinite or NaN are never traversed, negative
/// weights are clamped to zero. Among parallel edges the cheapest one is used.
/// Returns `None` when `target` is unreachable.
pub fn dijkstra_path<F>(
    graph: &RoadGraph,
    start: NodeIndex,
    target: NodeIndex,
    weight: F,
) -> Option<ShortestPath>
where
    F: Fn(&RoadEdge) -> TravelTime,
{
    let inner = &graph.graph;
    inner.node_weight(start)?;
    inner.node_weight(target)?;

    let estimated_nodes = inner.node_count().min(1000);
    let mut distances: HashMap<NodeIndex, TravelTime> = HashMap::with_capacity(estimated_nodes);
    let mut predecessors: HashMap<NodeIndex, (NodeIndex, EdgeIndex)> =
        HashMap::with_capacity(estimated_nodes);
    let mut heap = BinaryHeap::with_capacity(estimated_nodes / 4);

    heap.push(State {
        cost: 0.0,
        node: start,
    });
    distances.insert(start, 0.0);

    while let Some(State { cost, node }) = heap.pop() {
        if node == target {
            break;
        }

        // Skip if we've found a better path
        if let Some(&best) = distances.get(&node) {
            if cost > best {
                continue;
            }
        }

        for edge in inner.edges(node) {
            let edge_cost = weight(edge.weight());
            if !edge_cost.is_finite() {
                continue;
            }
            let next = edge.target();
            let next_cost = cost + edge_cost.max(0.0);

            match distances.entry(next) {
                Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                }
                Entry::Occupied(mut entry) => {
                    if next_cost >= *entry.get() {
                        continue;
                    }
                    *entry.get_mut() = next_cost;
                }
            }
            predecessors.insert(next, (node, edge.id()));
            heap.push(State {
                cost: next_cost,
                node: next,
            });
        }
    }

    let cost = *distances.get(&target)?;

    let mut nodes = vec![target];
    let mut edges = Vec::new();
    let mut current = target;
    while current != start {
        let &(previous, edge) = predecessors.get(&current)?;
        nodes.push(previous);
        edges.push(edge);
        current = previous;
    }
    nodes.reverse();
    edges.reverse();

    Some(ShortestPath { nodes, edges, cost })
}
