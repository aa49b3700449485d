use clap::Args;
use igo_core::prelude::*;
use itertools::Itertools;

use crate::model::{DataArgs, load_engine};

#[derive(Args, Debug)]
pub struct SnapsArgs {
    #[command(flatten)]
    pub data: DataArgs,
}

/// Lists the segment waypoints that could not be bridged on the graph.
pub fn run(args: SnapsArgs) -> anyhow::Result<()> {
    if args.data.segments.is_none() {
        anyhow::bail!("--segments and --congestions are required to diagnose snapping");
    }
    let (_, summary) = load_engine(&args.data, Gazetteer::new())?;
    let Some(summary) = summary else {
        return Ok(());
    };

    println!(
        "{} segments, {} reports, {} matched, {} edges tagged",
        summary.segments, summary.reports, summary.matched, summary.tagged_edges
    );
    if summary.failed.is_empty() {
        println!("All segments snapped onto the graph");
        return Ok(());
    }

    println!(
        "{} unbridged gaps in {} segments",
        summary.failed.len(),
        summary.failed.segments().len()
    );
    for (segment, failures) in &summary
        .failed
        .iter()
        .sorted_by_key(|f| f.segment)
        .chunk_by(|f| f.segment)
    {
        let gaps = failures
            .map(|f| format!("{}->{}", f.gap.origin, f.gap.destination))
            .join(", ");
        println!("  segment {segment}: {gaps}");
    }
    Ok(())
}
