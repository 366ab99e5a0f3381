//! Build console log model
//!
//! A CI build console transcript stamps every transported line with a
//! wall-clock `HH:MM:SS ` prefix. Inside the build-execution window each
//! logical record additionally starts with a `[INFO]`, `[WARNING]` or
//! `[ERROR]` marker; marker-less lines are continuations of the previous
//! record (stack traces, wrapped tool output).

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Severity of a leveled build record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warn => "WARNING",
            Level::Error => "ERROR",
        }
    }

    /// Console marker for this level, e.g. `[INFO]`.
    pub fn marker(&self) -> &'static str {
        match self {
            Level::Info => "[INFO]",
            Level::Warn => "[WARNING]",
            Level::Error => "[ERROR]",
        }
    }
}

/// A timestamped console line, before level assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    pub time: NaiveTime,
    pub message: String,
}

impl RawLine {
    /// True when the first 8 characters form a `DD:DD:DD` time stamp.
    pub fn has_time_prefix(line: &str) -> bool {
        let b = line.as_bytes();
        if b.len() < 8 {
            return false;
        }
        let digit = |i: usize| b[i].is_ascii_digit();
        digit(0) && digit(1) && b[2] == b':' && digit(3) && digit(4) && b[5] == b':' && digit(6) && digit(7)
    }

    /// Parses one console line. Returns `None` when the line carries no
    /// valid time prefix (untimestamped tool noise, or an out-of-range
    /// stamp such as `99:99:99`).
    pub fn parse(line: &str) -> Option<Self> {
        if !Self::has_time_prefix(line) {
            return None;
        }
        let time = NaiveTime::parse_from_str(&line[..8], "%H:%M:%S").ok()?;
        // Offset 8 is the mandated separator between stamp and message.
        let message = line.get(9..).unwrap_or("").to_string();
        Some(Self { time, message })
    }
}

/// Parses a sequence of console lines into timestamped raw lines,
/// preserving order. Lines without a valid time prefix are dropped with a
/// warning.
pub fn parse_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Vec<RawLine> {
    let mut raw = Vec::new();
    for line in lines {
        match RawLine::parse(line) {
            Some(r) => raw.push(r),
            None => warn!("Failed to understand line: {line}"),
        }
    }
    raw
}

/// A leveled build record. The message may span multiple physical lines
/// when continuations have been merged into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRecord {
    pub time: NaiveTime,
    pub level: Level,
    pub message: String,
}

impl BuildRecord {
    fn extend_message(&mut self, extra: &str) {
        self.message.push('\n');
        self.message.push_str(extra);
    }
}

/// Errors raised while assembling leveled records.
#[derive(Debug, Error)]
pub enum BuildLogError {
    /// A continuation line appeared before any leveled record existed.
    #[error("continuation line at {time} has no preceding leveled record: {message}")]
    OrphanContinuation { time: NaiveTime, message: String },
    /// A module body started without the expected `Building ` header.
    #[error("expected a module header at {time}, got: {message}")]
    MissingModuleHeader { time: NaiveTime, message: String },
}

fn strip_marker(message: &str) -> Option<(Level, &str)> {
    // [ERROR] lands in the Warn bucket. Historical routing; downstream
    // counts depend on it, so it stays.
    let (level, rest) = if let Some(rest) = message.strip_prefix(Level::Info.marker()) {
        (Level::Info, rest)
    } else if let Some(rest) = message.strip_prefix(Level::Warn.marker()) {
        (Level::Warn, rest)
    } else if let Some(rest) = message.strip_prefix(Level::Error.marker()) {
        (Level::Warn, rest)
    } else {
        return None;
    };
    Some((level, rest.strip_prefix(' ').unwrap_or(rest)))
}

/// Folds a pre-sliced window of raw lines into leveled records, merging
/// each continuation line into the record that owns it.
pub fn assemble(raw: &[RawLine]) -> Result<Vec<BuildRecord>, BuildLogError> {
    let mut records: Vec<BuildRecord> = Vec::with_capacity(raw.len());
    for line in raw {
        match strip_marker(&line.message) {
            Some((level, rest)) => records.push(BuildRecord {
                time: line.time,
                level,
                message: rest.to_string(),
            }),
            None => match records.last_mut() {
                Some(last) => last.extend_message(&line.message),
                None => {
                    return Err(BuildLogError::OrphanContinuation {
                        time: line.time,
                        message: line.message.clone(),
                    })
                }
            },
        }
    }
    Ok(records)
}
