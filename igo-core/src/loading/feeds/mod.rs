//! Decoding of the segment and congestion feeds
//!
//! Both feeds are plain delimited text. Fetching the bytes is left to the
//! caller; these functions only turn rows into validated model types.

mod de;
mod raw_types;

use std::{fs::File, io::Read, path::Path};

use csv::StringRecord;
use log::{debug, info};
use serde::de::DeserializeOwned;

pub use de::TIMESTAMP_FORMAT;
use raw_types::{FeedCongestion, FeedSegment};

use super::FeedFormat;
use crate::{CongestionReport, Error, Segment};

/// Decodes the static segment feed.
///
/// # Errors
///
/// Returns [`Error::DataIntegrity`] on the first malformed row (non-integer id,
/// unparsable or odd coordinate list, fewer than two waypoints).
pub fn read_segments<R: Read>(reader: R, format: &FeedFormat) -> Result<Vec<Segment>, Error> {
    let segments = decode_rows(reader, format, |row: FeedSegment| {
        let id = de::parse_id(&row.id)?;
        let coordinates = de::parse_coordinates(&row.coordinates, format.coordinate_order)?;
        Segment::new(id, row.name.trim().to_string(), coordinates).map_err(|e| e.to_string())
    })?;
    info!("Decoded {} street segments", segments.len());
    Ok(segments)
}

/// Decodes the live congestion feed.
///
/// # Errors
///
/// Returns [`Error::DataIntegrity`] on the first malformed row (non-integer id,
/// bad timestamp, state outside `0..=6`).
pub fn read_congestions<R: Read>(
    reader: R,
    format: &FeedFormat,
) -> Result<Vec<CongestionReport>, Error> {
    let reports = decode_rows(reader, format, |row: FeedCongestion| {
        Ok(CongestionReport {
            id: de::parse_id(&row.id)?,
            timestamp: de::parse_timestamp(&row.timestamp)?,
            state: de::parse_state(&row.current_state)?,
        })
    })?;
    info!("Decoded {} congestion reports", reports.len());
    Ok(reports)
}

/// # Errors
///
/// See [`read_segments`]; also fails if the file cannot be opened.
pub fn read_segments_file(path: &Path, format: &FeedFormat) -> Result<Vec<Segment>, Error> {
    read_segments(open_feed(path)?, format)
}

/// # Errors
///
/// See [`read_congestions`]; also fails if the file cannot be opened.
pub fn read_congestions_file(
    path: &Path,
    format: &FeedFormat,
) -> Result<Vec<CongestionReport>, Error> {
    read_congestions(open_feed(path)?, format)
}

fn open_feed(path: &Path) -> Result<File, Error> {
    File::open(path).map_err(|e| {
        Error::IoError(std::io::Error::new(
            e.kind(),
            format!("Failed to open feed '{}': {}", path.display(), e),
        ))
    })
}

fn decode_rows<R, Raw, T, F>(reader: R, format: &FeedFormat, convert: F) -> Result<Vec<T>, Error>
where
    R: Read,
    Raw: DeserializeOwned,
    F: Fn(Raw) -> Result<T, String>,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(format.delimiter_byte()?)
        .has_headers(format.has_headers)
        .flexible(true)
        .trim(csv::Trim::Fields)
        .from_reader(reader);

    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    while csv_reader.read_record(&mut record)? {
        let line = record.position().map_or(0, csv::Position::line);
        if record.iter().all(str::is_empty) {
            debug!("Skipping empty feed line {line}");
            continue;
        }
        let row = record
            .deserialize::<Raw>(None)
            .map_err(|e| Error::DataIntegrity(format!("line {line}: {e}")))
            .and_then(|raw| {
                convert(raw).map_err(|reason| Error::DataIntegrity(format!("line {line}: {reason}")))
            })?;
        rows.push(row);
    }
    Ok(rows)
}
