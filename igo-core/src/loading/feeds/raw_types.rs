use serde::Deserialize;

/// Row of the segment feed, decoded by position
#[derive(Debug, Deserialize)]
pub struct FeedSegment {
    pub id: String,
    pub name: String,
    pub coordinates: String,
}

/// Row of the congestion feed, decoded by position
#[derive(Debug, Deserialize)]
pub struct FeedCongestion {
    pub id: String,
    pub timestamp: String,
    #[serde(default)]
    pub current_state: String,
    /// Forecast for the next interval, not used for routing
    #[serde(default)]
    #[allow(dead_code)]
    pub forecast_state: String,
}
