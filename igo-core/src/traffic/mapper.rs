use hashbrown::HashSet;
use log::{debug, info, warn};
use rayon::prelude::*;

use super::snap::{NearestNodeSnapper, SnapGap, SnapOutcome, Snapper};
use crate::{NodeId, RoadGraph, SegmentId, TrafficRecord};

/// Waypoint pair of a segment that could not be mapped onto the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailedSnap {
    pub segment: SegmentId,
    pub gap: SnapGap,
}

/// Every failed snap of a refresh, in record order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FailedSnapSet {
    failures: Vec<FailedSnap>,
}

impl FailedSnapSet {
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FailedSnap> {
        self.failures.iter()
    }

    /// Distinct graph nodes involved in at least one failure
    pub fn nodes(&self) -> HashSet<NodeId> {
        self.failures
            .iter()
            .flat_map(|failure| [failure.gap.origin, failure.gap.destination])
            .collect()
    }

    /// Distinct segments left (partly) untagged
    pub fn segments(&self) -> HashSet<SegmentId> {
        self.failures.iter().map(|failure| failure.segment).collect()
    }
}

/// Propagates the congestion state of traffic records onto road graph edges
#[derive(Debug, Clone, Default)]
pub struct CongestionMapper<S = NearestNodeSnapper> {
    snapper: S,
}

impl<S: Snapper> CongestionMapper<S> {
    pub fn new(snapper: S) -> Self {
        Self { snapper }
    }

    /// Clears all traffic state of `graph` and stamps every record onto it.
    ///
    /// Snapping is read-only and runs in parallel; stamping follows record
    /// order, so a later record overwrites an earlier one on shared edges.
    pub fn apply(&self, graph: &mut RoadGraph, records: &[TrafficRecord]) -> FailedSnapSet {
        graph.reset_traffic();

        let snapped: Vec<SnapOutcome> = {
            let graph: &RoadGraph = graph;
            records
                .par_iter()
                .map(|record| self.snapper.snap(graph, &record.coordinates))
                .collect()
        };

        let mut failed = FailedSnapSet::default();
        let mut stamps = 0usize;
        for (record, outcome) in records.iter().zip(snapped) {
            for edge in &outcome.edges {
                if let Some(edge) = graph.edge_mut(*edge) {
                    edge.congestion = record.state;
                    stamps += 1;
                }
            }
            if !outcome.gaps.is_empty() {
                debug!(
                    "Segment {} ({}) has {} unmapped waypoint pair(s)",
                    record.id,
                    record.name,
                    outcome.gaps.len()
                );
            }
            failed
                .failures
                .extend(outcome.gaps.into_iter().map(|gap| FailedSnap {
                    segment: record.id,
                    gap,
                }));
        }

        if !failed.is_empty() {
            warn!(
                "{} waypoint pairs of {} segments could not be mapped onto the road graph",
                failed.len(),
                failed.segments().len()
            );
        }
        info!(
            "Stamped congestion of {} records ({stamps} edge updates)",
            records.len()
        );
        failed
    }
}

#[cfg(test)]
mod tests {
    use geo::Point;

    use super::*;
    use crate::CongestionState;

    fn street() -> RoadGraph {
        RoadGraph::builder()
            .node(1, 41.0, 2.0)
            .node(2, 41.0, 2.001)
            .node(3, 41.0, 2.002)
            .node(9, 42.0, 3.0)
            .two_way(1, 2, 84.0, None)
            .two_way(2, 3, 84.0, None)
            .build()
            .unwrap()
    }

    fn record(id: SegmentId, lons: &[f64], lat: f64, state: Option<CongestionState>) -> TrafficRecord {
        TrafficRecord {
            id,
            name: format!("segment {id}"),
            coordinates: lons.iter().map(|&lon| Point::new(lon, lat)).collect(),
            timestamp: None,
            state,
        }
    }

    #[test]
    fn later_record_wins_on_shared_edges() {
        let mut graph = street();
        let records = vec![
            record(1, &[2.0, 2.002], 41.0, Some(CongestionState::Fluid)),
            record(2, &[2.001, 2.002], 41.0, Some(CongestionState::Congested)),
        ];
        CongestionMapper::new(NearestNodeSnapper).apply(&mut graph, &records);

        assert_eq!(
            graph.edge_slot(1, 2, 0).unwrap().congestion,
            Some(CongestionState::Fluid)
        );
        assert_eq!(
            graph.edge_slot(2, 3, 0).unwrap().congestion,
            Some(CongestionState::Congested)
        );
        assert_eq!(graph.edge_slot(3, 2, 0).unwrap().congestion, None);
    }

    #[test]
    fn previous_stamps_are_cleared() {
        let mut graph = street();
        let mapper = CongestionMapper::new(NearestNodeSnapper);
        mapper.apply(
            &mut graph,
            &[record(1, &[2.0, 2.001], 41.0, Some(CongestionState::Blocked))],
        );
        assert_eq!(
            graph.edge_slot(1, 2, 0).unwrap().congestion,
            Some(CongestionState::Blocked)
        );

        mapper.apply(&mut graph, &[]);
        assert!(graph.edges().all(|(_, edge)| edge.congestion.is_none()));
    }

    #[test]
    fn gaps_are_collected_without_aborting() {
        let mut graph = street();
        let records = vec![
            record(5, &[2.002, 3.0], 41.5, Some(CongestionState::Dense)),
            record(6, &[2.0, 2.001], 41.0, Some(CongestionState::Dense)),
        ];
        let failed = CongestionMapper::new(NearestNodeSnapper).apply(&mut graph, &records);

        assert_eq!(failed.len(), 1);
        assert_eq!(failed.segments().into_iter().collect::<Vec<_>>(), vec![5]);
        assert!(failed.nodes().contains(&9));
        assert_eq!(
            graph.edge_slot(1, 2, 0).unwrap().congestion,
            Some(CongestionState::Dense)
        );
    }
}
