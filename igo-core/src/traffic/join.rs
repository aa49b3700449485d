use hashbrown::{HashMap, hash_map::Entry};
use log::{debug, warn};

use crate::{CongestionReport, Segment, SegmentId, TrafficRecord};

/// Joins segments with their congestion reports by id.
///
/// Produces one record per segment, in segment order. When several reports
/// share an id the first one wins; a segment without a report gets an
/// unknown state.
pub fn join(segments: &[Segment], reports: &[CongestionReport]) -> Vec<TrafficRecord> {
    let mut by_id: HashMap<SegmentId, &CongestionReport> = HashMap::with_capacity(reports.len());
    let mut duplicates = 0usize;
    for report in reports {
        match by_id.entry(report.id) {
            Entry::Vacant(entry) => {
                entry.insert(report);
            }
            Entry::Occupied(_) => duplicates += 1,
        }
    }
    if duplicates > 0 {
        warn!("{duplicates} congestion reports repeat an earlier id and were ignored");
    }

    let mut unmatched = 0usize;
    let records: Vec<TrafficRecord> = segments
        .iter()
        .map(|segment| {
            let report = by_id.get(&segment.id);
            if report.is_none() {
                unmatched += 1;
            }
            TrafficRecord {
                id: segment.id,
                name: segment.name.clone(),
                coordinates: segment.coordinates().to_vec(),
                timestamp: report.map(|r| r.timestamp),
                state: report.and_then(|r| r.state),
            }
        })
        .collect();

    debug!(
        "Joined {} segments with {} reports ({unmatched} without report)",
        segments.len(),
        reports.len()
    );
    records
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;
    use crate::CongestionState;

    fn segment(id: SegmentId) -> Segment {
        Segment::from_lat_lon(id, format!("street {id}"), &[(41.0, 2.0), (41.001, 2.0)]).unwrap()
    }

    fn report(id: SegmentId, state: Option<CongestionState>) -> CongestionReport {
        CongestionReport {
            id,
            timestamp: NaiveDateTime::parse_from_str("20211102153505", "%Y%m%d%H%M%S").unwrap(),
            state,
        }
    }

    #[test]
    fn one_record_per_segment_in_input_order() {
        let segments = vec![segment(3), segment(1), segment(2)];
        let reports = vec![
            report(1, Some(CongestionState::Fluid)),
            report(3, Some(CongestionState::Blocked)),
        ];
        let records = join(&segments, &reports);

        assert_eq!(
            records.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![3, 1, 2]
        );
        assert_eq!(records[0].state, Some(CongestionState::Blocked));
        assert_eq!(records[1].state, Some(CongestionState::Fluid));
        assert_eq!(records[2].state, None);
        assert_eq!(records[2].timestamp, None);
        assert_eq!(records[1].name, "street 1");
    }

    #[test]
    fn first_duplicate_report_wins() {
        let records = join(
            &[segment(7)],
            &[
                report(7, Some(CongestionState::Dense)),
                report(7, Some(CongestionState::Congested)),
            ],
        );
        assert_eq!(records[0].state, Some(CongestionState::Dense));
    }

    #[test]
    fn report_without_state_keeps_timestamp() {
        let records = join(&[segment(7)], &[report(7, None)]);
        assert_eq!(records[0].state, None);
        assert!(records[0].timestamp.is_some());
    }
}
