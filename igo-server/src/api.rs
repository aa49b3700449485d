use std::{sync::Arc, time::Duration};

use axum::{
    BoxError, Json, Router,
    error_handling::HandleErrorLayer,
    extract::{Query, State},
    http::{Method, StatusCode},
    routing::get,
};
use igo_core::prelude::{RefreshSummary, Route};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{Engine, error::ApiError};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
}

pub struct Limits {
    pub request_timeout: Duration,
    pub max_concurrent_requests: usize,
}

pub fn router(state: AppState, limits: &Limits) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/route", get(route))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(limits.request_timeout)
                .concurrency_limit(limits.max_concurrent_requests),
        )
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET])
                .allow_origin(Any),
        )
        .with_state(state)
}

async fn handle_middleware_error(error: BoxError) -> (StatusCode, Json<serde_json::Value>) {
    let status = if error.is::<tower::timeout::error::Elapsed>() {
        StatusCode::REQUEST_TIMEOUT
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(serde_json::json!({ "message": error.to_string() })))
}

async fn health() -> StatusCode {
    StatusCode::OK
}

#[derive(Debug, Deserialize)]
pub struct RouteQuery {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub nodes: Vec<i64>,
    pub travel_time_seconds: f64,
    /// `[lat, lon]` per node
    pub coordinates: Vec<[f64; 2]>,
}

impl From<Route> for RouteResponse {
    fn from(route: Route) -> Self {
        Self {
            coordinates: route
                .geometry
                .iter()
                .map(|point| [point.y(), point.x()])
                .collect(),
            nodes: route.nodes,
            travel_time_seconds: route.travel_time,
        }
    }
}

async fn route(
    State(state): State<AppState>,
    Query(query): Query<RouteQuery>,
) -> Result<Json<RouteResponse>, ApiError> {
    let engine = Arc::clone(&state.engine);
    // Geocoding may block
    let route =
        tokio::task::spawn_blocking(move || engine.route(&query.from, &query.to)).await??;
    Ok(Json(route.into()))
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub nodes: usize,
    pub edges: usize,
    pub last_refresh: Option<RefreshStatus>,
}

#[derive(Debug, Serialize)]
pub struct RefreshStatus {
    pub segments: usize,
    pub reports: usize,
    pub matched: usize,
    pub tagged_edges: usize,
    pub failed_snaps: usize,
    pub failed_segments: Vec<i64>,
    pub latest_report: Option<String>,
    pub ponderation_version: u32,
}

impl From<RefreshSummary> for RefreshStatus {
    fn from(summary: RefreshSummary) -> Self {
        let mut failed_segments: Vec<i64> = summary.failed.segments().into_iter().collect();
        failed_segments.sort_unstable();
        Self {
            segments: summary.segments,
            reports: summary.reports,
            matched: summary.matched,
            tagged_edges: summary.tagged_edges,
            failed_snaps: summary.failed.len(),
            failed_segments,
            latest_report: summary
                .latest_report
                .map(|ts| ts.format("%Y-%m-%dT%H:%M:%S").to_string()),
            ponderation_version: summary.ponderation_version,
        }
    }
}

async fn status(State(state): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    let graph = state.engine.graph()?;
    Ok(Json(StatusResponse {
        nodes: graph.node_count(),
        edges: graph.edge_count(),
        last_refresh: state.engine.last_refresh().map(RefreshStatus::from),
    }))
}
