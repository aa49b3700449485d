//! Street network components - nodes, edges and their traffic attributes

use geo::Point;
use serde::{Deserialize, Serialize};

use crate::{NodeId, TravelTime, model::CongestionState};

/// Road graph node
#[derive(Debug, Clone, PartialEq)]
pub struct RoadNode {
    /// External (OSM) ID of the node
    pub id: NodeId,
    /// Node coordinates, `x` is longitude and `y` latitude
    pub geometry: Point<f64>,
}

impl RoadNode {
    pub fn new(id: NodeId, lat: f64, lon: f64) -> Self {
        Self {
            id,
            geometry: Point::new(lon, lat),
        }
    }

    pub fn lat(&self) -> f64 {
        self.geometry.y()
    }

    pub fn lon(&self) -> f64 {
        self.geometry.x()
    }
}

/// Posted speed limit of an edge in km/h.
///
/// Simplified graphs merge several OSM ways into one edge, in which case
/// every merged limit is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpeedLimit {
    Single(f64),
    Multiple(Vec<f64>),
}

/// Road graph edge (street segment between two intersections)
#[derive(Debug, Clone, PartialEq)]
pub struct RoadEdge {
    /// Length in meters
    pub length: f64,
    pub speed_limit: Option<SpeedLimit>,
    /// Congestion stamped by the last refresh, `None` when unknown
    pub congestion: Option<CongestionState>,
    /// Congestion-weighted traversal time in seconds, `None` until costed
    pub itime: Option<TravelTime>,
}

impl RoadEdge {
    pub fn new(length: f64, speed_limit: Option<SpeedLimit>) -> Self {
        Self {
            length,
            speed_limit,
            congestion: None,
            itime: None,
        }
    }

    /// Routing weight; edges that were never costed are not traversable.
    pub fn travel_time(&self) -> TravelTime {
        self.itime.unwrap_or(f64::INFINITY)
    }

    pub(crate) fn reset_traffic(&mut self) {
        self.congestion = None;
        self.itime = None;
    }
}
