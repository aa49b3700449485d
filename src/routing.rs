use std::path::PathBuf;

use clap::Args;
use igo_core::prelude::*;
use serde::Serialize;

use crate::model::{DataArgs, load_engine, load_places};

#[derive(Args, Debug)]
pub struct RouteArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Place names (TOML table of `"name" = [lat, lon]`).
    #[arg(long)]
    pub places: Option<PathBuf>,

    /// Print the route as JSON.
    #[arg(long)]
    pub json: bool,

    /// Origin: a known place name or `lat,lon`.
    pub from: String,

    /// Destination: a known place name or `lat,lon`.
    pub to: String,
}

#[derive(Serialize)]
struct RouteOutput<'a> {
    from: &'a str,
    to: &'a str,
    travel_time_seconds: f64,
    nodes: &'a [NodeId],
    coordinates: Vec<[f64; 2]>,
}

pub fn run(args: RouteArgs) -> anyhow::Result<()> {
    let places = load_places(args.places.as_ref())?;
    let (engine, _) = load_engine(&args.data, places)?;
    let route = engine.route(&args.from, &args.to)?;

    if args.json {
        let output = RouteOutput {
            from: &args.from,
            to: &args.to,
            travel_time_seconds: route.travel_time,
            nodes: &route.nodes,
            coordinates: route.geometry.iter().map(|p| [p.y(), p.x()]).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if route.is_empty() {
        println!("{} and {} resolve to the same node", args.from, args.to);
        return Ok(());
    }
    println!(
        "{} -> {}: {} ({} nodes)",
        args.from,
        args.to,
        format_duration(route.travel_time),
        route.nodes.len()
    );
    for (id, point) in route.nodes.iter().zip(&route.geometry) {
        println!("  {id:>12}  {:.6},{:.6}", point.y(), point.x());
    }
    Ok(())
}

fn format_duration(seconds: f64) -> String {
    let total = seconds.round() as u64;
    match (total / 3600, total % 3600 / 60, total % 60) {
        (0, 0, s) => format!("{s}s"),
        (0, m, s) => format!("{m}m {s:02}s"),
        (h, m, s) => format!("{h}h {m:02}m {s:02}s"),
    }
}
