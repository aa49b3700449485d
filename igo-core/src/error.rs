use thiserror::Error;

use crate::NodeId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed input data: {0}")]
    DataIntegrity(String),
    #[error("Invalid data for edge {from} -> {to}: {reason}")]
    InvalidEdgeData {
        from: NodeId,
        to: NodeId,
        reason: String,
    },
    #[error("Location not recognised: {0}")]
    UnresolvableLocation(String),
    #[error("No route found between nodes {origin} and {destination}")]
    NoPath { origin: NodeId, destination: NodeId },
    #[error("Unknown graph node {0}")]
    InvalidNodeIndex(NodeId),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Unrecoverable error: {0}")]
    UnrecoverableError(&'static str),
}

impl Error {
    /// Query-level failures are the caller's problem, not a fault of the engine.
    pub fn is_query_failure(&self) -> bool {
        matches!(
            self,
            Error::UnresolvableLocation(_) | Error::NoPath { .. } | Error::InvalidNodeIndex(_)
        )
    }
}
