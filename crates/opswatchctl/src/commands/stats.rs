//! Stats command
//!
//! Imports the day-sharded JSON entries, filters them by since-date and
//! prints the ranked frequency report.

use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;
use opswatch_common::json_store;
use opswatch_common::summary_extractor::{LogSummary, SummaryExtractor};
use owo_colors::OwoColorize;
use tracing::info;

pub async fn run(log_dir: &Path, since: NaiveDate, top_n: usize) -> Result<Vec<LogSummary>> {
    let mut entries = json_store::import_dir(log_dir).await?;
    match entries.iter().map(|e| e.date.date_naive()).max() {
        Some(end) => {
            entries.retain(|e| e.date.date_naive() >= since);
            info!("{} entries extracted ({since} to {end}).", entries.len());
        }
        None => info!("0 entries extracted."),
    }

    let summaries = SummaryExtractor::new(&entries).top(top_n);
    println!("{}", format!("Top {} errors:", summaries.len()).bold());
    for summary in &summaries {
        println!("- {:>6}: {}", summary.count, summary.description);
    }
    Ok(summaries)
}
