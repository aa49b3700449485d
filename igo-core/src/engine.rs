//! Owner of the live road graph and its refresh/query lifecycle.
//!
//! A refresh never touches the graph that queries are reading. It clones the
//! current graph, runs join → congestion mapping → costing on the copy and
//! swaps the copy in only when every step succeeded, so a failed refresh
//! leaves the last good graph in effect. Refreshes are serialised by a mutex;
//! queries only hold the read lock long enough to clone an [`Arc`].

use std::{
    io::Read,
    sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock},
};

use chrono::NaiveDateTime;
use log::{info, warn};

use crate::{
    CongestionReport, Error, NodeId, RoadGraph, Segment,
    loading::{EngineConfig, read_congestions, read_segments},
    routing::{Geocoder, Route, Router, shortest_path},
    traffic::{CongestionMapper, CostModel, FailedSnapSet, join},
};

/// What a successful refresh did
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshSummary {
    pub segments: usize,
    pub reports: usize,
    /// Segments that found a congestion report
    pub matched: usize,
    /// Edges carrying a known congestion state after the refresh
    pub tagged_edges: usize,
    pub failed: FailedSnapSet,
    /// Most recent report timestamp, if any report matched
    pub latest_report: Option<NaiveDateTime>,
    pub ponderation_version: u32,
}

pub struct RoutingEngine<G> {
    live: RwLock<Arc<RoadGraph>>,
    /// Held for the whole refresh; stores the summary of the last success
    writer: Mutex<Option<RefreshSummary>>,
    mapper: CongestionMapper,
    cost_model: CostModel,
    router: Router<G>,
    config: EngineConfig,
}

impl<G: Geocoder> RoutingEngine<G> {
    /// Creates an engine whose graph is costed without any congestion data.
    ///
    /// # Errors
    ///
    /// Fails if `config` is invalid or an edge of `base` has invalid data.
    pub fn new(base: RoadGraph, config: EngineConfig, geocoder: G) -> Result<Self, Error> {
        config.validate()?;
        let cost_model = CostModel::from_config(&config);

        let mut graph = base;
        graph.reset_traffic();
        cost_model.compute_times(&mut graph)?;
        info!(
            "Routing engine ready ({} nodes, {} edges)",
            graph.node_count(),
            graph.edge_count()
        );

        Ok(Self {
            live: RwLock::new(Arc::new(graph)),
            writer: Mutex::new(None),
            mapper: CongestionMapper::default(),
            cost_model,
            router: Router::new(geocoder),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Snapshot of the graph as of the last completed refresh
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnrecoverableError`] if a writer panicked while holding the lock.
    pub fn graph(&self) -> Result<Arc<RoadGraph>, Error> {
        self.live
            .read()
            .map(|graph| Arc::clone(&graph))
            .map_err(|_| Error::UnrecoverableError("road graph lock poisoned"))
    }

    pub fn last_refresh(&self) -> Option<RefreshSummary> {
        self.lock_writer().clone()
    }

    /// The writer lock only guards the last summary, which a panicking
    /// refresh never leaves half-written.
    fn lock_writer(&self) -> MutexGuard<'_, Option<RefreshSummary>> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Rebuilds the weighted graph from fresh datasets and swaps it in.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEdgeData`] if costing fails; the previous graph
    /// stays in effect.
    pub fn refresh(
        &self,
        segments: &[Segment],
        reports: &[CongestionReport],
    ) -> Result<RefreshSummary, Error> {
        let mut last = self.lock_writer();

        let mut graph = RoadGraph::clone(&*self.graph()?);
        let records = join(segments, reports);
        let failed = self.mapper.apply(&mut graph, &records);
        if let Err(e) = self.cost_model.compute_times(&mut graph) {
            warn!("Refresh aborted, keeping previous graph: {e}");
            return Err(e);
        }

        let summary = RefreshSummary {
            segments: segments.len(),
            reports: reports.len(),
            matched: records.iter().filter(|r| r.timestamp.is_some()).count(),
            tagged_edges: graph
                .edges()
                .filter(|(_, edge)| edge.congestion.is_some())
                .count(),
            failed,
            latest_report: records.iter().filter_map(|r| r.timestamp).max(),
            ponderation_version: self.cost_model.ponderations.version,
        };

        *self
            .live
            .write()
            .map_err(|_| Error::UnrecoverableError("road graph lock poisoned"))? = Arc::new(graph);

        info!(
            "Refresh complete: {} of {} segments matched, {} edges tagged, {} failed snaps",
            summary.matched,
            summary.segments,
            summary.tagged_edges,
            summary.failed.len()
        );
        *last = Some(summary.clone());
        Ok(summary)
    }

    /// Decodes both feeds with the configured formats and refreshes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataIntegrity`] on malformed feeds, otherwise see
    /// [`RoutingEngine::refresh`]. The previous graph stays in effect.
    pub fn refresh_from_feeds<S: Read, C: Read>(
        &self,
        segments: S,
        congestions: C,
    ) -> Result<RefreshSummary, Error> {
        let segments = read_segments(segments, &self.config.segment_feed)?;
        let reports = read_congestions(congestions, &self.config.congestion_feed)?;
        self.refresh(&segments, &reports)
    }

    /// # Errors
    ///
    /// See [`Router::resolve`].
    pub fn resolve(&self, place: &str) -> Result<NodeId, Error> {
        let graph = self.graph()?;
        self.router.resolve(&graph, place)
    }

    /// # Errors
    ///
    /// See [`Router::route`].
    pub fn route(&self, from: &str, to: &str) -> Result<Route, Error> {
        let graph = self.graph()?;
        self.router.route(&graph, from, to)
    }

    /// # Errors
    ///
    /// See [`shortest_path`].
    pub fn route_between(&self, origin: NodeId, destination: NodeId) -> Result<Route, Error> {
        let graph = self.graph()?;
        shortest_path(&graph, origin, destination)
    }
}
