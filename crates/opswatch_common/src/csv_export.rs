//! CSV export of build summaries
//!
//! Flat tabular exports of the reducer's result sets. Every field is
//! double-quoted; embedded quotes are escaped by doubling.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::build_summary::{ModuleSummary, PluginExecSummary};

pub const MODULES_FILE: &str = "build-modules.csv";
pub const PLUGINS_FILE: &str = "build-plugins.csv";

const MODULES_HEADER: &str =
    "\"jobName\",\"jobId\",\"module\",\"moduleId\",\"start\",\"end\",\"durationSeconds\"";
const PLUGINS_HEADER: &str = "\"jobName\",\"jobId\",\"moduleId\",\"module\",\"plugin\",\"version\",\"goal\",\"execId\",\"start\",\"end\",\"durationSeconds\"";

fn quoted(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn module_row(m: &ModuleSummary) -> String {
    [
        quoted(&m.job_name),
        quoted(&m.job_exec_id.to_string()),
        quoted(&m.module_name),
        quoted(&m.module_id),
        quoted(&m.start_time.format("%H:%M:%S").to_string()),
        quoted(&m.end_time.format("%H:%M:%S").to_string()),
        quoted(&format!("{:.3}", m.duration().num_seconds() as f64)),
    ]
    .join(",")
}

fn plugin_row(p: &PluginExecSummary) -> String {
    [
        quoted(&p.job_name),
        quoted(&p.job_exec_id.to_string()),
        quoted(&p.module_id),
        quoted(&p.module_name),
        quoted(&p.plugin_name),
        quoted(&p.plugin_version),
        quoted(&p.plugin_goal),
        quoted(&p.plugin_exec_id),
        quoted(&p.start_time.format("%H:%M:%S").to_string()),
        quoted(&p.end_time.format("%H:%M:%S").to_string()),
        quoted(&format!("{:.3}", p.duration().num_seconds() as f64)),
    ]
    .join(",")
}

fn write_rows(path: &Path, header: &str, rows: Vec<String>) -> Result<()> {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(header.to_string());
    lines.extend(rows);
    let mut text = lines.join("\n");
    text.push('\n');
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}

/// Writes `build-modules.csv` into `export_dir`, one row per module,
/// ordered by job, execution id and start time.
pub fn export_module_summaries(export_dir: &Path, modules: &[ModuleSummary]) -> Result<()> {
    let mut sorted: Vec<&ModuleSummary> = modules.iter().collect();
    sorted.sort_by(|a, b| {
        (&a.job_name, a.job_exec_id, a.start_time, &a.module_name)
            .cmp(&(&b.job_name, b.job_exec_id, b.start_time, &b.module_name))
    });
    let rows = sorted.into_iter().map(module_row).collect();
    write_rows(&export_dir.join(MODULES_FILE), MODULES_HEADER, rows)
}

/// Writes `build-plugins.csv` into `export_dir`, one row per plugin
/// execution (synthetic downloads included).
pub fn export_plugin_summaries(export_dir: &Path, plugins: &[PluginExecSummary]) -> Result<()> {
    let mut sorted: Vec<&PluginExecSummary> = plugins.iter().collect();
    sorted.sort_by(|a, b| {
        (&a.job_name, a.job_exec_id, a.start_time, &a.plugin_name)
            .cmp(&(&b.job_name, b.job_exec_id, b.start_time, &b.plugin_name))
    });
    let rows = sorted.into_iter().map(plugin_row).collect();
    write_rows(&export_dir.join(PLUGINS_FILE), PLUGINS_HEADER, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn t(s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(16, 55, s).unwrap()
    }

    #[test]
    fn test_quote_doubling() {
        assert_eq!(quoted("plain"), "\"plain\"");
        assert_eq!(quoted("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_module_row() {
        let mut m = ModuleSummary::open("myJob", 123, "Module 1 1.0.0-SNAPSHOT", t(4));
        m.touch(t(6));
        let m = m.with_module_id("module1");
        assert_eq!(
            module_row(&m),
            "\"myJob\",\"123\",\"Module 1 1.0.0-SNAPSHOT\",\"module1\",\"16:55:04\",\"16:55:06\",\"2.000\""
        );
    }

    #[test]
    fn test_export_files() {
        let dir = tempfile::tempdir().unwrap();
        let m = ModuleSummary::open("job", 1, "Module 1", t(0));
        let p = PluginExecSummary::open_download("job", 1, "Module 1", t(0));
        export_module_summaries(dir.path(), &[m]).unwrap();
        export_plugin_summaries(dir.path(), &[p]).unwrap();

        let modules = std::fs::read_to_string(dir.path().join(MODULES_FILE)).unwrap();
        assert!(modules.starts_with("\"jobName\""));
        assert_eq!(modules.lines().count(), 2);

        let plugins = std::fs::read_to_string(dir.path().join(PLUGINS_FILE)).unwrap();
        assert!(plugins.contains("\"__download__\""));
    }
}
