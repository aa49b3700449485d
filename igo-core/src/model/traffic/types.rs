use std::fmt;

use chrono::NaiveDateTime;
use geo::Point;
use serde::{Deserialize, Serialize};

use crate::{Error, SegmentId};

/// Reported traffic state of a street segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum CongestionState {
    NoData = 0,
    VeryFluid = 1,
    Fluid = 2,
    Dense = 3,
    VeryDense = 4,
    Congested = 5,
    Blocked = 6,
}

impl CongestionState {
    pub const ALL: [CongestionState; 7] = [
        CongestionState::NoData,
        CongestionState::VeryFluid,
        CongestionState::Fluid,
        CongestionState::Dense,
        CongestionState::VeryDense,
        CongestionState::Congested,
        CongestionState::Blocked,
    ];

    pub fn as_index(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for CongestionState {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(value))
            .copied()
            .ok_or_else(|| Error::DataIntegrity(format!("congestion state {value} is not in 0..=6")))
    }
}

impl From<CongestionState> for u8 {
    fn from(state: CongestionState) -> Self {
        state as u8
    }
}

impl fmt::Display for CongestionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CongestionState::NoData => "no data",
            CongestionState::VeryFluid => "very fluid",
            CongestionState::Fluid => "fluid",
            CongestionState::Dense => "dense",
            CongestionState::VeryDense => "very dense",
            CongestionState::Congested => "congested",
            CongestionState::Blocked => "blocked",
        };
        f.write_str(label)
    }
}

/// Named street stretch from the static segment dataset
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub id: SegmentId,
    pub name: String,
    /// Polyline waypoints, `x` is longitude and `y` latitude
    coordinates: Vec<Point<f64>>,
}

impl Segment {
    /// # Errors
    ///
    /// Returns [`Error::DataIntegrity`] if the polyline has fewer than two
    /// points or a non-finite coordinate.
    pub fn new(id: SegmentId, name: String, coordinates: Vec<Point<f64>>) -> Result<Self, Error> {
        if coordinates.len() < 2 {
            return Err(Error::DataIntegrity(format!(
                "segment {id} has {} waypoint(s), at least 2 are required",
                coordinates.len()
            )));
        }
        if let Some(point) = coordinates
            .iter()
            .find(|point| !(point.x().is_finite() && point.y().is_finite()))
        {
            return Err(Error::DataIntegrity(format!(
                "segment {id} has a non-finite waypoint {:?}",
                point.x_y()
            )));
        }
        Ok(Self {
            id,
            name,
            coordinates,
        })
    }

    /// Builds a segment from `(lat, lon)` pairs
    ///
    /// # Errors
    ///
    /// See [`Segment::new`].
    pub fn from_lat_lon(
        id: SegmentId,
        name: impl Into<String>,
        coordinates: &[(f64, f64)],
    ) -> Result<Self, Error> {
        let points = coordinates
            .iter()
            .map(|&(lat, lon)| Point::new(lon, lat))
            .collect();
        Self::new(id, name.into(), points)
    }

    pub fn coordinates(&self) -> &[Point<f64>] {
        &self.coordinates
    }
}

/// Live congestion observation keyed by segment id
#[derive(Debug, Clone, PartialEq)]
pub struct CongestionReport {
    pub id: SegmentId,
    pub timestamp: NaiveDateTime,
    pub state: Option<CongestionState>,
}

/// A segment joined with its congestion report
#[derive(Debug, Clone, PartialEq)]
pub struct TrafficRecord {
    pub id: SegmentId,
    pub name: String,
    pub coordinates: Vec<Point<f64>>,
    /// `None` when no report matched the segment
    pub timestamp: Option<NaiveDateTime>,
    /// `None` when congestion is unknown
    pub state: Option<CongestionState>,
}
