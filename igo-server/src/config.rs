use std::{collections::BTreeMap, net::SocketAddr, path::Path, path::PathBuf, time::Duration};

use anyhow::Context;
use igo_core::prelude::{EngineConfig, Gazetteer};
use serde::Deserialize;
use tracing::warn;

/// Feeds are published every five minutes; polling faster only rereads them.
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
    /// Base road graph in JSON form
    pub graph: PathBuf,
    pub feeds: FeedPaths,
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
    #[serde(default)]
    pub engine: EngineConfig,
    /// Known place names as `name = [lat, lon]`
    #[serde(default)]
    pub places: BTreeMap<String, [f64; 2]>,
}

/// Locations of the two traffic feeds, usually kept up to date by an
/// external downloader
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeedPaths {
    pub segments: PathBuf,
    pub congestions: PathBuf,
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn default_refresh_interval() -> u64 {
    MIN_REFRESH_INTERVAL.as_secs()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_max_concurrent_requests() -> usize {
    64
}

impl ServerConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config '{}'", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid config '{}'", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.engine.validate()?;
        Ok(config)
    }

    pub fn refresh_interval(&self) -> Duration {
        let requested = Duration::from_secs(self.refresh_interval_secs);
        if requested < MIN_REFRESH_INTERVAL {
            warn!(
                "Refresh interval of {}s is below the feed publication period, using {}s",
                requested.as_secs(),
                MIN_REFRESH_INTERVAL.as_secs()
            );
            return MIN_REFRESH_INTERVAL;
        }
        requested
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn gazetteer(&self) -> Gazetteer {
        self.places
            .iter()
            .map(|(name, &[lat, lon])| (name, (lat, lon)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use igo_core::prelude::Geocoder;

    use super::*;

    const CONFIG: &str = r#"
graph = "barcelona.graph.json"
refresh_interval_secs = 60

[feeds]
segments = "transit_relacio_trams.csv"
congestions = "trams.dat"

[engine]
default_speed_kmh = 30.0

[engine.segment_feed]
delimiter = ","
has_headers = true
coordinate_order = "lon_lat"

[engine.ponderations]
version = 2
unknown = 1.0
states = [1.75, 1.0, 1.25, 1.5, 2.0, 3.0, inf]

[places]
"Zona Franca" = [41.3546, 2.1410]
"#;

    #[test]
    fn parses_full_config() {
        let config = ServerConfig::parse(CONFIG).unwrap();
        assert_eq!(config.listen, default_listen());
        assert_eq!(config.engine.ponderations.unknown, 1.0);
        assert!(config.engine.ponderations.states[6].is_infinite());
        assert!(!config.engine.ponderations.is_unversioned_override());
        assert_eq!(
            config.engine.segment_feed.coordinate_order,
            igo_core::prelude::CoordinateOrder::LonLat
        );
        assert_eq!(
            config.gazetteer().geocode("zona franca"),
            Some((41.3546, 2.1410))
        );
    }

    #[test]
    fn refresh_interval_is_clamped() {
        let config = ServerConfig::parse(CONFIG).unwrap();
        assert_eq!(config.refresh_interval(), MIN_REFRESH_INTERVAL);
    }

    #[test]
    fn invalid_engine_section_is_rejected() {
        let config = CONFIG.replace("default_speed_kmh = 30.0", "default_speed_kmh = -1.0");
        assert!(ServerConfig::parse(&config).is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let config = format!("colour = \"blue\"\n{CONFIG}");
        assert!(ServerConfig::parse(&config).is_err());
    }
}
