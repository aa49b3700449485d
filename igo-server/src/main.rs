use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use igo_core::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

mod api;
mod config;
mod error;
mod refresh;

use config::ServerConfig;

pub type Engine = RoutingEngine<Gazetteer>;

#[derive(Parser)]
#[command(version, about = "Congestion-aware routing service", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(env = "IGO_CONFIG", long, default_value = "igo.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        // Standard logger, configured via the RUST_LOG env variable
        .with(tracing_subscriber::fmt::layer().with_filter(EnvFilter::from_default_env()))
        .init();

    let config = ServerConfig::load(&cli.config)?;
    anyhow::ensure!(
        graph_exists(&config.graph),
        "Road graph '{}' not found",
        config.graph.display()
    );
    let graph = load_graph(&config.graph)?;
    let engine = Arc::new(Engine::new(graph, config.engine.clone(), config.gazetteer())?);
    info!("Loaded {} known places", config.places.len());

    match refresh::refresh_once(&engine, &config.feeds).await {
        Ok(summary) => info!(
            matched = summary.matched,
            failed_snaps = summary.failed.len(),
            "Initial traffic refresh complete"
        ),
        Err(e) => warn!("Initial traffic refresh failed, routing without congestion: {e:#}"),
    }
    let refresher = tokio::spawn(refresh::run(
        Arc::clone(&engine),
        config.feeds.clone(),
        config.refresh_interval(),
    ));

    let limits = api::Limits {
        request_timeout: config.request_timeout(),
        max_concurrent_requests: config.max_concurrent_requests,
    };
    let app = api::router(api::AppState { engine }, &limits);

    let listener = tokio::net::TcpListener::bind(config.listen).await?;
    info!("igo server listening on {}", config.listen);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Ctrl-C received; shutting down...");
            }
        })
        .await?;

    refresher.abort();
    Ok(())
}
