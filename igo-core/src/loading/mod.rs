//! This module is responsible for decoding the traffic feeds and for
//! persisting the base road graph.

mod config;
pub mod feeds;
pub mod graph_io;

pub use config::{CoordinateOrder, EngineConfig, FeedFormat};
pub use feeds::{read_congestions, read_congestions_file, read_segments, read_segments_file};
pub use graph_io::{graph_exists, load_graph, save_graph};
