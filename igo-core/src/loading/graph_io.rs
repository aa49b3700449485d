//! JSON persistence of the base road graph
//!
//! Only the static attributes are stored; congestion and travel times are
//! always recomputed after loading.

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    Error, NodeId, RoadGraph,
    model::{RoadEdge, RoadNode, SpeedLimit},
};

#[derive(Debug, Serialize, Deserialize)]
struct GraphDocument {
    nodes: Vec<NodeRecord>,
    edges: Vec<EdgeRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct NodeRecord {
    id: NodeId,
    lat: f64,
    lon: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct EdgeRecord {
    from: NodeId,
    to: NodeId,
    length: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    speed_limit: Option<SpeedLimit>,
}

pub fn graph_exists(path: &Path) -> bool {
    path.is_file()
}

/// Reads a graph previously written by [`save_graph`].
///
/// # Errors
///
/// Fails on I/O errors, invalid JSON, or edges referencing unknown nodes.
pub fn load_graph(path: &Path) -> Result<RoadGraph, Error> {
    let file = File::open(path).map_err(|e| {
        Error::IoError(std::io::Error::new(
            e.kind(),
            format!("Failed to open graph '{}': {}", path.display(), e),
        ))
    })?;
    let document: GraphDocument = serde_json::from_reader(BufReader::new(file))?;
    let graph = from_document(document)?;
    info!(
        "Loaded road graph from {} ({} nodes, {} edges)",
        path.display(),
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

/// # Errors
///
/// Fails on I/O or serialization errors.
pub fn save_graph(graph: &RoadGraph, path: &Path) -> Result<(), Error> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(writer, &to_document(graph))?;
    Ok(())
}

fn from_document(document: GraphDocument) -> Result<RoadGraph, Error> {
    let nodes = document
        .nodes
        .into_iter()
        .map(|node| RoadNode::new(node.id, node.lat, node.lon))
        .collect();
    let edges = document
        .edges
        .into_iter()
        .map(|edge| {
            (
                edge.from,
                edge.to,
                RoadEdge::new(edge.length, edge.speed_limit),
            )
        })
        .collect();
    RoadGraph::from_parts(nodes, edges)
}

fn to_document(graph: &RoadGraph) -> GraphDocument {
    let nodes = graph
        .nodes()
        .map(|node| NodeRecord {
            id: node.id,
            lat: node.lat(),
            lon: node.lon(),
        })
        .collect();
    let edges = graph
        .edges()
        .filter_map(|(index, edge)| {
            let (from, to) = graph.edge_endpoints(index)?;
            Some(EdgeRecord {
                from,
                to,
                length: edge.length,
                speed_limit: edge.speed_limit.clone(),
            })
        })
        .collect();
    GraphDocument { nodes, edges }
}
