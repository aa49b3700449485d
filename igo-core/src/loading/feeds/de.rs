use chrono::NaiveDateTime;
use geo::Point;
use itertools::Itertools;

use crate::{CongestionState, SegmentId, loading::CoordinateOrder};

/// Format of report timestamps, e.g. `20211102153505`
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

pub(super) fn parse_id(raw: &str) -> Result<SegmentId, String> {
    raw.trim()
        .parse()
        .map_err(|_| format!("identifier {raw:?} is not an integer"))
}

/// Parses a flattened, comma-joined list of coordinates into points
pub(super) fn parse_coordinates(
    raw: &str,
    order: CoordinateOrder,
) -> Result<Vec<Point<f64>>, String> {
    let values = raw
        .split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| {
            value
                .parse::<f64>()
                .map_err(|_| format!("coordinate {value:?} is not a number"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if values.len() % 2 != 0 {
        return Err(format!(
            "coordinate list has an odd number of values ({})",
            values.len()
        ));
    }

    values
        .into_iter()
        .tuples::<(f64, f64)>()
        .map(|(first, second)| {
            let (lat, lon) = match order {
                CoordinateOrder::LatLon => (first, second),
                CoordinateOrder::LonLat => (second, first),
            };
            check_position(lat, lon)?;
            Ok(Point::new(lon, lat))
        })
        .collect()
}

fn check_position(lat: f64, lon: f64) -> Result<(), String> {
    if !(lat.is_finite() && (-90.0..=90.0).contains(&lat)) {
        return Err(format!("latitude {lat} is outside -90..=90"));
    }
    if !(lon.is_finite() && (-180.0..=180.0).contains(&lon)) {
        return Err(format!("longitude {lon} is outside -180..=180"));
    }
    Ok(())
}

pub(super) fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT)
        .map_err(|e| format!("timestamp {raw:?} is not in YYYYMMDDHHMMSS format: {e}"))
}

/// Empty field means the state was not reported
pub(super) fn parse_state(raw: &str) -> Result<Option<CongestionState>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let value: u8 = raw
        .parse()
        .map_err(|_| format!("congestion state {raw:?} is not in 0..=6"))?;
    CongestionState::try_from(value)
        .map(Some)
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_follow_configured_order() {
        let raw = "41.38,2.15, 41.39,2.16";
        let lat_lon = parse_coordinates(raw, CoordinateOrder::LatLon).unwrap();
        assert_eq!(lat_lon, vec![Point::new(2.15, 41.38), Point::new(2.16, 41.39)]);
        let lon_lat = parse_coordinates(raw, CoordinateOrder::LonLat).unwrap();
        assert_eq!(lon_lat[0], Point::new(41.38, 2.15));
    }

    #[test]
    fn odd_coordinate_count_is_rejected() {
        assert!(parse_coordinates("41.38,2.15,41.39", CoordinateOrder::LatLon).is_err());
        assert!(parse_coordinates("41.38,north", CoordinateOrder::LatLon).is_err());
    }

    #[test]
    fn non_finite_and_out_of_range_positions_are_rejected() {
        for raw in ["NaN,2.0,41.0,2.1", "41.0,inf,41.0,2.1", "41.0,2.0,-inf,2.1"] {
            assert!(parse_coordinates(raw, CoordinateOrder::LatLon).is_err(), "{raw}");
        }
        assert!(parse_coordinates("91.0,2.0,41.0,2.1", CoordinateOrder::LatLon).is_err());
        // Second value is the latitude
        assert!(parse_coordinates("2.15,141.38", CoordinateOrder::LonLat).is_err());
        assert!(parse_coordinates("2.15,41.38", CoordinateOrder::LonLat).is_ok());
    }

    #[test]
    fn timestamps_and_states() {
        let ts = parse_timestamp("20211102153505").unwrap();
        assert_eq!(ts.to_string(), "2021-11-02 15:35:05");
        assert!(parse_timestamp("2021-11-02").is_err());

        assert_eq!(parse_state("").unwrap(), None);
        assert_eq!(parse_state("3").unwrap(), Some(CongestionState::Dense));
        assert!(parse_state("7").is_err());
        assert!(parse_state("-1").is_err());
        assert!(parse_state("blocked").is_err());
    }

    #[test]
    fn ids_must_be_integers() {
        assert_eq!(parse_id(" 12 ").unwrap(), 12);
        assert!(parse_id("12a").is_err());
    }
}
