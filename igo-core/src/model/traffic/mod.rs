//! Traffic datasets: static street segments and live congestion reports

pub mod types;

pub use types::{CongestionReport, CongestionState, Segment, TrafficRecord};
