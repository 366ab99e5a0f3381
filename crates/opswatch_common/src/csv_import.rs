//! CSV extract import
//!
//! Reads monitoring-platform CSV exports (`extract-*.csv`): a header row
//! naming at least `date, host, service, status, message`, then one row
//! per log event. Fields may be double-quoted, with embedded quotes
//! doubled and newlines allowed inside quoted fields, so records are
//! scanned character-wise rather than split per line.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use tracing::warn;

use crate::log_entry::LogEntry;

/// Lists the CSV extracts (`extract-*.csv`) of a directory, sorted.
pub fn list_extract_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    let listing = fs::read_dir(dir)
        .with_context(|| format!("Failed to list extract directory: {}", dir.display()))?;
    for dirent in listing {
        let path = dirent?.path();
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if path.is_file() && name.starts_with("extract-") && name.ends_with(".csv") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Imports one CSV extract into classified entries.
///
/// Rows that cannot be interpreted (wrong field count, unparseable date)
/// are skipped with a warning; a missing or incomplete header fails the
/// whole file.
pub fn import_file(path: &Path) -> Result<Vec<LogEntry>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read extract: {}", path.display()))?;
    let mut records = parse_records(&text).into_iter();

    let header = match records.next() {
        Some(h) => h,
        None => bail!("Empty extract: {}", path.display()),
    };
    let col = |name: &str| {
        header
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .with_context(|| format!("Missing column '{name}' in {}", path.display()))
    };
    let date_col = col("date")?;
    let host_col = col("host")?;
    let service_col = col("service")?;
    let status_col = col("status")?;
    let message_col = col("message")?;

    let mut entries = Vec::new();
    for (i, record) in records.enumerate() {
        if record.len() == 1 && record[0].is_empty() {
            continue; // trailing blank line
        }
        if record.len() <= message_col.max(date_col) {
            warn!("{}: row {} has too few fields, skipped", path.display(), i + 2);
            continue;
        }
        let date = match DateTime::parse_from_rfc3339(&record[date_col]) {
            Ok(d) => d.with_timezone(&Utc),
            Err(e) => {
                warn!("{}: row {} has a bad date ({e}), skipped", path.display(), i + 2);
                continue;
            }
        };
        entries.push(LogEntry::new(
            date,
            record[host_col].as_str(),
            record[service_col].as_str(),
            record[status_col].as_str(),
            record[message_col].as_str(),
        ));
    }
    Ok(entries)
}

/// Splits CSV text into records of fields. Quoted fields may contain
/// commas, doubled quotes and newlines; `\r\n` and `\n` both terminate a
/// record outside quotes.
fn parse_records(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                _ => field.push(c),
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => {
                    record.push(std::mem::take(&mut field));
                }
                '\r' => {
                    if chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
                '\n' => {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
                _ => field.push(c),
            }
        }
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    records
}
