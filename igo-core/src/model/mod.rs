//! Data model for congestion-aware routing
//!
//! Contains the road network and the traffic datasets stamped onto it.

pub mod streets;
pub mod traffic;

pub use streets::{RoadEdge, RoadGraph, RoadGraphBuilder, RoadNode, SpeedLimit};
pub use traffic::{CongestionReport, CongestionState, Segment, TrafficRecord};
