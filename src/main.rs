//! `edge` - estimate the effective bid-ask spread of one OHLC CSV file.
//!
//! Usage:
//!   edge [OPTIONS] <CSV>
//!
//! The file needs a header row with `open`, `high`, `low` and `close` columns
//! (any case); `timestamp` and `volume` are optional. Rows must be in time order.
//! Log verbosity follows `RUST_LOG`, e.g. `RUST_LOG=edge_spread=debug`.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use edge_spread::{read_candles_from_csv, Degeneracy, EdgeBuilder, EdgeMoments};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "edge")]
#[command(about = "EDGE bid-ask spread estimate from open, high, low and close prices")]
#[command(version)]
struct Args {
    /// CSV file with open, high, low, close columns
    csv: PathBuf,

    /// Report a negative estimate instead of 0 when the squared spread is negative
    #[arg(long)]
    signed: bool,

    /// Print the estimate and its moments as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    file: &'a str,
    bars: usize,
    signed: bool,
    spread: f64,
    degeneracy: Option<Degeneracy>,
    moments: EdgeMoments,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let candles = read_candles_from_csv(&args.csv)
        .map_err(|e| anyhow!("{e}"))
        .with_context(|| format!("failed to load candles from {}", args.csv.display()))?;
    info!(bars = candles.len(), file = %args.csv.display(), "loaded candles");

    let out = EdgeBuilder::new().sign(args.signed).apply(&candles)?;
    let degeneracy = out.moments.degeneracy();
    if let Some(reason) = degeneracy {
        warn!(?reason, "sample carries no spread information; estimate is NaN");
    }

    if args.json {
        let file = args.csv.to_string_lossy();
        let report = Report {
            file: &file,
            bars: candles.len(),
            signed: args.signed,
            spread: out.value,
            degeneracy,
            moments: out.moments,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", out.value);
    }

    Ok(())
}
