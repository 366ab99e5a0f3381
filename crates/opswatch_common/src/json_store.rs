//! Day-sharded JSON store
//!
//! Classified entries are persisted as one JSON array per calendar day,
//! named `log.<YYYY-MM-DD>.json`. Imports fan the shards out on blocking
//! worker tasks, one per file, and join them back in: a shard that fails
//! to parse is logged and contributes nothing, the batch carries on.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{error, info};

use crate::log_entry::LogEntry;

/// Lists the day shards (`log*.json`) of a directory, sorted by name.
pub fn list_log_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    let listing = fs::read_dir(dir)
        .with_context(|| format!("Failed to list log directory: {}", dir.display()))?;
    for dirent in listing {
        let path = dirent?.path();
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if path.is_file() && name.starts_with("log") && name.ends_with(".json") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Imports one day shard.
pub fn import_file(path: &Path) -> Result<Vec<LogEntry>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open shard: {}", path.display()))?;
    let entries: Vec<LogEntry> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse shard: {}", path.display()))?;
    Ok(entries)
}

/// Imports every day shard of a directory concurrently.
///
/// One blocking worker task per file; results are joined in listing
/// order. A failed file is logged at error level and contributes an
/// empty set.
pub async fn import_dir(dir: &Path) -> Result<Vec<LogEntry>> {
    let paths = list_log_paths(dir)?;
    let mut handles = Vec::with_capacity(paths.len());
    for path in paths {
        handles.push(tokio::task::spawn_blocking(move || {
            match import_file(&path) {
                Ok(entries) => {
                    info!("{}: {} entries", path.display(), entries.len());
                    entries
                }
                Err(e) => {
                    error!("{}: failed to import: {e:#}", path.display());
                    Vec::new()
                }
            }
        }));
    }
    let mut entries = Vec::new();
    for handle in handles {
        entries.extend(handle.await.context("Import worker panicked")?);
    }
    Ok(entries)
}

/// Rewrites the day shards for the given entries: entries are grouped by
/// calendar day, sorted by date, and each day's shard is replaced.
pub fn export_by_day(entries: &[LogEntry], out_dir: &Path) -> Result<()> {
    let mut by_day: BTreeMap<NaiveDate, Vec<&LogEntry>> = BTreeMap::new();
    for entry in entries {
        by_day.entry(entry.date.date_naive()).or_default().push(entry);
    }
    for (day, mut day_entries) in by_day {
        day_entries.sort();
        let path = out_dir.join(format!("log.{}.json", day.format("%Y-%m-%d")));
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to replace shard: {}", path.display()))?;
        }
        let file = File::create(&path)
            .with_context(|| format!("Failed to create shard: {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &day_entries)
            .with_context(|| format!("Failed to write shard: {}", path.display()))?;
    }
    Ok(())
}
