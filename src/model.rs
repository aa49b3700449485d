use std::{collections::BTreeMap, path::PathBuf};

use anyhow::Context;
use clap::Args;
use igo_core::prelude::*;
use tracing::info;

/// Inputs shared by every command
#[derive(Args, Debug)]
pub struct DataArgs {
    /// Base road graph (JSON).
    #[arg(env = "IGO_GRAPH", long)]
    pub graph: PathBuf,

    /// Segment feed (CSV). Without both feeds the graph is routed with
    /// unknown congestion everywhere.
    #[arg(env = "IGO_SEGMENTS", long, requires = "congestions")]
    pub segments: Option<PathBuf>,

    /// Congestion feed (`#`-delimited).
    #[arg(env = "IGO_CONGESTIONS", long, requires = "segments")]
    pub congestions: Option<PathBuf>,

    /// Engine policy overrides (TOML).
    #[arg(long)]
    pub engine_config: Option<PathBuf>,
}

pub type Engine = RoutingEngine<Gazetteer>;

/// Builds the engine and applies the feeds, if given.
pub fn load_engine(
    args: &DataArgs,
    places: Gazetteer,
) -> anyhow::Result<(Engine, Option<RefreshSummary>)> {
    let config = match &args.engine_config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read '{}'", path.display()))?;
            toml::from_str::<EngineConfig>(&text)
                .with_context(|| format!("Invalid engine config '{}'", path.display()))?
        }
        None => EngineConfig::default(),
    };

    if !graph_exists(&args.graph) {
        anyhow::bail!(
            "Road graph '{}' not found; export the base graph as JSON first",
            args.graph.display()
        );
    }
    let graph = load_graph(&args.graph)?;
    let engine = Engine::new(graph, config, places)?;

    let summary = match (&args.segments, &args.congestions) {
        (Some(segments), Some(congestions)) => {
            let config = engine.config();
            let segments = read_segments_file(segments, &config.segment_feed)?;
            let reports = read_congestions_file(congestions, &config.congestion_feed)?;
            let summary = engine.refresh(&segments, &reports)?;
            info!(
                matched = summary.matched,
                tagged_edges = summary.tagged_edges,
                "Applied traffic feeds"
            );
            Some(summary)
        }
        _ => None,
    };
    Ok((engine, summary))
}

/// Reads a TOML table of `"place name" = [lat, lon]`
pub fn load_places(path: Option<&PathBuf>) -> anyhow::Result<Gazetteer> {
    let Some(path) = path else {
        return Ok(Gazetteer::new());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read places '{}'", path.display()))?;
    let places: BTreeMap<String, [f64; 2]> = toml::from_str(&text)
        .with_context(|| format!("Invalid places file '{}'", path.display()))?;
    Ok(places
        .iter()
        .map(|(name, &[lat, lon])| (name, (lat, lon)))
        .collect())
}
