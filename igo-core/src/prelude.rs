// Re-export key components
pub use crate::engine::{RefreshSummary, RoutingEngine};
pub use crate::loading::{
    CoordinateOrder, EngineConfig, FeedFormat, graph_exists, load_graph, read_congestions,
    read_congestions_file, read_segments, read_segments_file, save_graph,
};
pub use crate::model::{
    CongestionReport, CongestionState, RoadEdge, RoadGraph, RoadNode, Segment, SpeedLimit,
    TrafficRecord,
};
pub use crate::routing::{Gazetteer, Geocoder, Route, Router, shortest_path};
pub use crate::traffic::{
    CongestionMapper, CostModel, FailedSnapSet, NearestNodeSnapper, PONDERATION_TABLE_VERSION,
    Ponderations, Snapper, join,
};
pub use crate::Error;

// Core identifier types
pub use crate::NodeId;
pub use crate::SegmentId;
pub use crate::TravelTime; // seconds
