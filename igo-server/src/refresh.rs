//! Periodic rebuild of the weighted graph from the feed files

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use igo_core::prelude::RefreshSummary;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{info, warn};

use crate::{Engine, config::FeedPaths};

/// Reads both feeds and refreshes the engine on the blocking pool.
pub async fn refresh_once(engine: &Arc<Engine>, feeds: &FeedPaths) -> anyhow::Result<RefreshSummary> {
    let segments = tokio::fs::read(&feeds.segments)
        .await
        .with_context(|| format!("Failed to read segment feed '{}'", feeds.segments.display()))?;
    let congestions = tokio::fs::read(&feeds.congestions).await.with_context(|| {
        format!(
            "Failed to read congestion feed '{}'",
            feeds.congestions.display()
        )
    })?;

    let engine = Arc::clone(engine);
    let summary = tokio::task::spawn_blocking(move || {
        engine.refresh_from_feeds(segments.as_slice(), congestions.as_slice())
    })
    .await??;
    Ok(summary)
}

/// Refreshes every `period` until the task is dropped. Failures keep the
/// previous graph and are retried on the next tick.
pub async fn run(engine: Arc<Engine>, feeds: FeedPaths, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the initial refresh already ran.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        match refresh_once(&engine, &feeds).await {
            Ok(summary) => info!(
                matched = summary.matched,
                tagged_edges = summary.tagged_edges,
                failed_snaps = summary.failed.len(),
                "Traffic refreshed"
            ),
            Err(e) => warn!("Traffic refresh failed, keeping previous graph: {e:#}"),
        }
    }
}
