//! Opswatch Control - CLI for operational-text reduction
//!
//! Turns CI build console transcripts into per-module and per-plugin
//! timing CSVs, and application error logs into ranked frequency reports.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use opswatch_common::config::OpswatchConfig;
use opswatchctl::commands;
use tracing::Level;

#[derive(Parser)]
#[command(name = "opswatchctl")]
#[command(about = "Reduce CI build consoles and rank error-log patterns", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import CSV extracts and regroup them into day-sharded JSON
    Collect {
        /// Directory holding extract-*.csv files
        #[arg(long)]
        log_dir: Option<PathBuf>,

        /// Directory the day shards are written to
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Rank the most frequent error patterns from day-sharded JSON
    Stats {
        /// Directory holding log*.json day shards
        #[arg(long)]
        log_dir: Option<PathBuf>,

        /// Since-date in ISO format (yyyy-mm-dd), defaults to 14 days ago
        #[arg(long)]
        since: Option<NaiveDate>,

        /// Top N results to display
        #[arg(long)]
        top: Option<usize>,
    },

    /// Reduce a build console log into module and plugin timing CSVs
    BuildReport {
        /// Build execution directory, named <job>.<id>
        #[arg(long)]
        build_dir: PathBuf,

        /// Directory the CSVs are written to
        #[arg(long)]
        export_dir: Option<PathBuf>,
    },
}

fn require_dir(flag: Option<PathBuf>, configured: Option<PathBuf>, name: &str) -> Result<PathBuf> {
    flag.or(configured)
        .with_context(|| format!("{name} is not set and has no configured default"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let cli = Cli::parse();
    let config = OpswatchConfig::load();

    match cli.command {
        Commands::Collect { log_dir, out_dir } => {
            let log_dir = require_dir(log_dir, config.log_dir.clone(), "--log-dir")?;
            let out_dir = require_dir(out_dir, config.out_dir.clone(), "--out-dir")?;
            commands::collect::run(&log_dir, &out_dir)
        }
        Commands::Stats { log_dir, since, top } => {
            let log_dir = require_dir(log_dir, config.log_dir.clone(), "--log-dir")?;
            let since = since.unwrap_or_else(|| Utc::now().date_naive() - Duration::days(14));
            let top = top.unwrap_or(config.top_default);
            commands::stats::run(&log_dir, since, top).await.map(|_| ())
        }
        Commands::BuildReport { build_dir, export_dir } => {
            let export_dir = require_dir(export_dir, config.export_dir.clone(), "--export-dir")?;
            commands::build_report::run(&build_dir, &export_dir)
        }
    }
}
