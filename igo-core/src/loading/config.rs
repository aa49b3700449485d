use serde::{Deserialize, Serialize};

use crate::{Error, traffic::Ponderations};

/// Axis order of the flattened coordinate list of the segment feed.
///
/// The Barcelona open-data segment feed (`transit_relacio_trams`) publishes
/// longitude first, so it needs `coordinate_order = "lon_lat"` in the
/// `segment_feed` section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateOrder {
    #[default]
    LatLon,
    LonLat,
}

/// Layout of a delimited feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedFormat {
    pub delimiter: char,
    pub has_headers: bool,
    #[serde(default)]
    pub coordinate_order: CoordinateOrder,
}

impl FeedFormat {
    /// `id,name,"lat,lon,lat,lon,..."` with a description row on top.
    /// See [`CoordinateOrder`] for lon-first feeds.
    pub fn segments() -> Self {
        Self {
            delimiter: ',',
            has_headers: true,
            coordinate_order: CoordinateOrder::LatLon,
        }
    }

    /// `id#YYYYMMDDHHMMSS#state#forecast` without header
    pub fn congestions() -> Self {
        Self {
            delimiter: '#',
            has_headers: false,
            coordinate_order: CoordinateOrder::LatLon,
        }
    }

    pub(crate) fn delimiter_byte(&self) -> Result<u8, Error> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                Error::InvalidData(format!(
                    "Feed delimiter {:?} is not a single ASCII character",
                    self.delimiter
                ))
            })
    }
}

/// Tunable policy of the routing engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Speed assumed for edges without a posted limit, in km/h
    pub default_speed_kmh: f64,
    pub ponderations: Ponderations,
    pub segment_feed: FeedFormat,
    pub congestion_feed: FeedFormat,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_speed_kmh: 30.0,
            ponderations: Ponderations::default(),
            segment_feed: FeedFormat::segments(),
            congestion_feed: FeedFormat::congestions(),
        }
    }
}

impl EngineConfig {
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] for a non-positive default speed,
    /// negative or NaN ponderations, or non-ASCII delimiters.
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.default_speed_kmh.is_finite() && self.default_speed_kmh > 0.0) {
            return Err(Error::InvalidData(format!(
                "Default speed must be a positive number of km/h, got {}",
                self.default_speed_kmh
            )));
        }
        self.ponderations.validate()?;
        self.segment_feed.delimiter_byte()?;
        self.congestion_feed.delimiter_byte()?;
        Ok(())
    }
}
