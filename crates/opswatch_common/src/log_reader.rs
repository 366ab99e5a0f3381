//! Console log reader
//!
//! Reads one CI build console file and splits it into the sections
//! before, during and after the build execution. Only the build window is
//! assembled into leveled records; the surrounding sections stay raw.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::build_log::{self, BuildRecord, RawLine};

const BUILD_START_PREFIX: &str = "Executing Maven:";
const BUILD_END_PREFIX: &str = "[INFO] Final Memory:";

/// One console file, split around the build-execution window.
#[derive(Debug, Clone)]
pub struct ConsoleLog {
    pub before: Vec<RawLine>,
    pub build: Vec<BuildRecord>,
    pub after: Vec<RawLine>,
}

/// Reads and sections a console log file.
///
/// The build window starts after the line whose message begins with
/// `Executing Maven:` (the marker line itself belongs to no section) and
/// ends at the `[INFO] Final Memory:` record plus the one record that
/// follows it. Continuation merging applies inside the window only.
pub fn read_console_log(path: &Path) -> Result<ConsoleLog> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read log file: {}", path.display()))?;
    let raw = build_log::parse_lines(text.lines());
    section(raw, path)
}

fn section(raw: Vec<RawLine>, path: &Path) -> Result<ConsoleLog> {
    let mut it = raw.into_iter();
    let mut before = Vec::new();
    let mut in_build = false;
    while let Some(line) = it.next() {
        if line.message.starts_with(BUILD_START_PREFIX) {
            in_build = true;
            break;
        }
        before.push(line);
    }

    let mut window = Vec::new();
    if in_build {
        while let Some(line) = it.next() {
            let ends = line.message.starts_with(BUILD_END_PREFIX);
            window.push(line);
            if ends {
                if let Some(next) = it.next() {
                    window.push(next);
                }
                break;
            }
        }
    }
    let build = build_log::assemble(&window)
        .with_context(|| format!("Malformed build window in {}", path.display()))?;

    let after: Vec<RawLine> = it.collect();

    let mut by_level: HashMap<&str, usize> = HashMap::new();
    for record in &build {
        *by_level.entry(record.level.as_str()).or_insert(0) += 1;
    }
    let mut levels: Vec<String> = by_level.iter().map(|(k, v)| format!("{k}: {v}")).collect();
    levels.sort();
    info!("Before: {} lines", before.len());
    info!("Build:  {}", levels.join(", "));
    info!("After:  {} lines", after.len());

    Ok(ConsoleLog { before, build, after })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_log(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(f, "{line}").unwrap();
        }
        f
    }

    #[test]
    fn test_read_sections() {
        let f = write_log(&[
            "16:54:58 Started by upstream project",
            "16:54:59 Executing Maven: -B -f pom.xml clean install",
            "16:55:00 [INFO] Scanning for projects...",
            "16:55:01 [INFO] Reactor Build Order:",
            "16:55:02 [INFO] Final Memory: 371M/618M",
            "16:55:02 [INFO] ------------------------------------------------------------------------",
            "16:55:03 Notifying upstream projects",
        ]);
        let console = read_console_log(f.path()).unwrap();
        assert_eq!(console.before.len(), 1);
        assert_eq!(console.build.len(), 4);
        assert_eq!(console.build[0].message, "Scanning for projects...");
        assert!(console.build[2].message.starts_with("Final Memory:"));
        assert_eq!(console.after.len(), 1);
    }

    #[test]
    fn test_continuations_merge_inside_window() {
        let f = write_log(&[
            "16:54:59 Executing Maven: clean install",
            "16:55:00 [ERROR] java.lang.NullPointerException",
            "16:55:00 \tat com.example.Foo.bar(Foo.java:42)",
            "16:55:02 [INFO] Final Memory: 371M/618M",
        ]);
        let console = read_console_log(f.path()).unwrap();
        assert_eq!(console.build.len(), 2);
        assert!(console.build[0].message.contains('\n'));
    }

    #[test]
    fn test_no_build_marker_means_everything_before() {
        let f = write_log(&[
            "16:54:58 Started by upstream project",
            "16:54:59 some tooling output",
        ]);
        let console = read_console_log(f.path()).unwrap();
        assert_eq!(console.before.len(), 2);
        assert!(console.build.is_empty());
        assert!(console.after.is_empty());
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = read_console_log(Path::new("/nonexistent/jenkins.log")).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read log file"));
    }

    #[test]
    fn test_orphan_continuation_in_window_is_fatal() {
        let f = write_log(&[
            "16:54:59 Executing Maven: clean install",
            "16:55:00 stray continuation with no record",
        ]);
        assert!(read_console_log(f.path()).is_err());
    }
}
