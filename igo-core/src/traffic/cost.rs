//! Congestion-weighted traversal times

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    CongestionState, Error, RoadGraph, TravelTime,
    loading::EngineConfig,
    model::{RoadEdge, SpeedLimit},
};

/// Revision of the default ponderation table. Bump it whenever
/// [`Ponderations::default`] changes.
pub const PONDERATION_TABLE_VERSION: u32 = 1;

const KMH_TO_MS: f64 = 1.0 / 3.6;

/// Multipliers applied to free-flow travel time per congestion state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ponderations {
    pub version: u32,
    /// Factor for edges without congestion information
    pub unknown: f64,
    /// Factor for states 0 (no data) to 6 (blocked)
    pub states: [f64; 7],
}

impl Default for Ponderations {
    fn default() -> Self {
        Self {
            version: PONDERATION_TABLE_VERSION,
            // Unknown traffic is assumed to be worse than free flow
            unknown: 1.75,
            states: [1.75, 1.0, 1.25, 1.5, 2.0, 3.0, f64::INFINITY],
        }
    }
}

impl Ponderations {
    /// True when the factors differ from the default table but `version`
    /// still names it
    pub fn is_unversioned_override(&self) -> bool {
        let default = Self::default();
        self.version == default.version
            && (self.unknown != default.unknown || self.states != default.states)
    }

    pub fn factor(&self, state: Option<CongestionState>) -> f64 {
        state.map_or(self.unknown, |state| self.states[state.as_index()])
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] if a factor is NaN or not positive.
    pub fn validate(&self) -> Result<(), Error> {
        let labels = std::iter::once("unknown".to_string())
            .chain(CongestionState::ALL.iter().map(ToString::to_string));
        for (label, factor) in labels.zip(std::iter::once(self.unknown).chain(self.states)) {
            if factor.is_nan() || factor <= 0.0 {
                return Err(Error::InvalidData(format!(
                    "Ponderation for {label} congestion must be positive, got {factor}"
                )));
            }
        }
        Ok(())
    }
}

/// Derives every edge's `itime` from its length, speed limit and congestion
#[derive(Debug, Clone, PartialEq)]
pub struct CostModel {
    pub ponderations: Ponderations,
    pub default_speed_kmh: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl CostModel {
    pub fn from_config(config: &EngineConfig) -> Self {
        if config.ponderations.is_unversioned_override() {
            warn!(
                "Ponderation table overrides the defaults but keeps version {}; \
                 refresh summaries cannot tell the tables apart",
                config.ponderations.version
            );
        }
        Self {
            ponderations: config.ponderations.clone(),
            default_speed_kmh: config.default_speed_kmh,
        }
    }

    /// Computes `itime` for all edges of `graph`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEdgeData`] for the first edge with a
    /// non-positive speed or an invalid length. No edge is modified then.
    pub fn compute_times(&self, graph: &mut RoadGraph) -> Result<(), Error> {
        let times = graph
            .edges()
            .map(|(index, edge)| {
                self.edge_time(edge).map_err(|reason| {
                    let (from, to) = graph.edge_endpoints(index).unwrap_or_default();
                    Error::InvalidEdgeData { from, to, reason }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let blocked = times.iter().filter(|time| time.is_infinite()).count();
        for (edge, time) in graph.edges_mut().zip(times) {
            edge.itime = Some(time);
        }
        info!(
            "Computed travel times for {} edges ({blocked} impassable)",
            graph.edge_count()
        );
        Ok(())
    }

    /// Free-flow speed of an edge in m/s
    fn speed(&self, edge: &RoadEdge) -> Result<f64, String> {
        let kmh = match &edge.speed_limit {
            Some(SpeedLimit::Single(limit)) => *limit,
            Some(SpeedLimit::Multiple(limits)) if limits.is_empty() => {
                return Err("empty speed limit list".to_string());
            }
            #[allow(clippy::cast_precision_loss)]
            Some(SpeedLimit::Multiple(limits)) => limits.iter().sum::<f64>() / limits.len() as f64,
            None => self.default_speed_kmh,
        };
        if !kmh.is_finite() || kmh <= 0.0 {
            return Err(format!("speed {kmh} km/h is not positive"));
        }
        Ok(kmh * KMH_TO_MS)
    }

    fn edge_time(&self, edge: &RoadEdge) -> Result<TravelTime, String> {
        if !edge.length.is_finite() || edge.length < 0.0 {
            return Err(format!("length {} m is invalid", edge.length));
        }
        let speed = self.speed(edge)?;
        let factor = self.ponderations.factor(edge.congestion);
        if factor.is_infinite() {
            return Ok(f64::INFINITY);
        }
        Ok(edge.length / speed * factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(length: f64, speed_limit: Option<SpeedLimit>, state: Option<CongestionState>) -> RoadEdge {
        RoadEdge {
            congestion: state,
            ..RoadEdge::new(length, speed_limit)
        }
    }

    #[test]
    fn default_table() {
        let table = Ponderations::default();
        assert_eq!(table.factor(None), 1.75);
        assert_eq!(table.factor(Some(CongestionState::NoData)), 1.75);
        assert_eq!(table.factor(Some(CongestionState::VeryFluid)), 1.0);
        assert_eq!(table.factor(Some(CongestionState::Fluid)), 1.25);
        assert_eq!(table.factor(Some(CongestionState::Dense)), 1.5);
        assert_eq!(table.factor(Some(CongestionState::VeryDense)), 2.0);
        assert_eq!(table.factor(Some(CongestionState::Congested)), 3.0);
        assert_eq!(table.factor(Some(CongestionState::Blocked)), f64::INFINITY);
        table.validate().unwrap();
    }

    #[test]
    fn speed_list_uses_mean_before_conversion() {
        let model = CostModel::default();
        let speed = model
            .speed(&edge(100.0, Some(SpeedLimit::Multiple(vec![50.0, 30.0])), None))
            .unwrap();
        assert!((speed - 40.0 / 3.6).abs() < 1e-12);
    }

    #[test]
    fn missing_limit_uses_default_speed() {
        let model = CostModel::default();
        let time = model
            .edge_time(&edge(100.0, None, Some(CongestionState::VeryFluid)))
            .unwrap();
        assert!((time - 12.0).abs() < 1e-9);
    }

    #[test]
    fn blocked_edges_are_impassable_even_when_empty() {
        let model = CostModel::default();
        let time = model
            .edge_time(&edge(0.0, None, Some(CongestionState::Blocked)))
            .unwrap();
        assert_eq!(time, f64::INFINITY);
    }

    #[test]
    fn non_positive_speed_is_rejected_atomically() {
        let mut graph = RoadGraph::builder()
            .node(1, 0.0, 0.0)
            .node(2, 0.0, 0.001)
            .edge(1, 2, 100.0, None)
            .edge(2, 1, 100.0, Some(SpeedLimit::Single(0.0)))
            .build()
            .unwrap();
        let error = CostModel::default().compute_times(&mut graph).unwrap_err();
        assert!(matches!(error, Error::InvalidEdgeData { from: 2, to: 1, .. }));
        assert!(graph.edges().all(|(_, edge)| edge.itime.is_none()));
    }

    #[test]
    fn empty_speed_list_is_rejected() {
        let model = CostModel::default();
        assert!(model
            .edge_time(&edge(10.0, Some(SpeedLimit::Multiple(Vec::new())), None))
            .is_err());
    }

    #[test]
    fn overridden_table_must_bump_version() {
        let mut table = Ponderations::default();
        assert!(!table.is_unversioned_override());

        table.states[5] = 4.0;
        assert!(table.is_unversioned_override());

        table.version = PONDERATION_TABLE_VERSION + 1;
        assert!(!table.is_unversioned_override());
    }

    #[test]
    fn zero_ponderation_is_invalid() {
        let mut table = Ponderations::default();
        table.states[1] = 0.0;
        assert!(table.validate().is_err());
    }
}
