//! Congestion-aware routing over a city street network.
//!
//! Static street segments and live congestion reports are joined by id,
//! stamped onto a road graph through nearest-node snapping, and turned into
//! per-edge travel times that drive shortest-path queries.

pub mod engine;
pub mod error;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod routing;
pub mod traffic;

pub use engine::{RefreshSummary, RoutingEngine};
pub use error::Error;
pub use model::{CongestionReport, CongestionState, RoadGraph, Segment, TrafficRecord};

/// Identifier of a segment in both traffic feeds
pub type SegmentId = i64;
/// External (OSM) identifier of a road graph node
pub type NodeId = i64;
/// Travel time in seconds
pub type TravelTime = f64;
