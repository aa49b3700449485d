//! Place resolution and congestion-aware shortest paths

pub mod dijkstra;
pub mod geocode;
pub mod router;

pub use geocode::{Gazetteer, Geocoder};
pub use router::{Route, Router, shortest_path};
