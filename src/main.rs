use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

mod model;
mod routing;
mod snaps;

#[derive(Parser)]
#[command(version, about = "Congestion-aware road routing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fastest route between two places under current congestion
    Route(routing::RouteArgs),
    /// Report segments whose waypoints could not be snapped onto the graph
    Snaps(snaps::SnapsArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(EnvFilter::from_default_env()),
        )
        .init();

    match cli.command {
        Command::Route(args) => routing::run(args),
        Command::Snaps(args) => snaps::run(args),
    }
}
