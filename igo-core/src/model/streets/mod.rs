//! Road network model

pub mod components;
pub mod network;

pub use components::{RoadEdge, RoadNode, SpeedLimit};
pub use network::{IndexedPoint, RoadGraph, RoadGraphBuilder};
