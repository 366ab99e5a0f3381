//! Build report command
//!
//! Reduces one build execution's console log into module and plugin
//! timing summaries and exports them as CSV. The job identity comes from
//! the build directory name, `<job>.<id>`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use opswatch_common::{csv_export, log_reader, module_reducer};
use tracing::info;
use walkdir::WalkDir;

const CONSOLE_LOG_NAME: &str = "jenkins.log";

/// Derives `(job_name, job_exec_id)` from a build directory name such as
/// `nos-master.277`.
pub fn job_identity(build_dir: &Path) -> Result<(String, u32)> {
    let name = build_dir
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Not a build directory: {}", build_dir.display()))?;
    let mut tokens = name.split('.');
    let job = tokens.next().unwrap_or("");
    let id = tokens
        .next()
        .with_context(|| format!("Build directory must be named <job>.<id>: {name}"))?;
    let id: u32 = id
        .parse()
        .with_context(|| format!("Build execution id is not a number: {id}"))?;
    if job.is_empty() {
        bail!("Build directory has an empty job name: {name}");
    }
    Ok((job.to_string(), id))
}

fn find_console_log(build_dir: &Path) -> Result<PathBuf> {
    for dirent in WalkDir::new(build_dir).into_iter().filter_map(|e| e.ok()) {
        if dirent.file_type().is_file() && dirent.file_name() == CONSOLE_LOG_NAME {
            return Ok(dirent.into_path());
        }
    }
    bail!("No {CONSOLE_LOG_NAME} under {}", build_dir.display())
}

pub fn run(build_dir: &Path, export_dir: &Path) -> Result<()> {
    let (job_name, job_exec_id) = job_identity(build_dir)?;
    info!("Reducing build {job_name} #{job_exec_id}");

    let log_path = find_console_log(build_dir)?;
    let console = log_reader::read_console_log(&log_path)?;
    let reduction = module_reducer::reduce(&job_name, job_exec_id, &console.build)?;

    csv_export::export_module_summaries(export_dir, &reduction.modules)?;
    csv_export::export_plugin_summaries(export_dir, &reduction.plugins)?;
    info!(
        "Exported {} module summaries and {} plugin executions.",
        reduction.modules.len(),
        reduction.plugins.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_identity() {
        let (job, id) = job_identity(Path::new("/builds/nos-master.277")).unwrap();
        assert_eq!(job, "nos-master");
        assert_eq!(id, 277);
    }

    #[test]
    fn test_job_identity_rejects_bad_names() {
        assert!(job_identity(Path::new("/builds/no-id-here")).is_err());
        assert!(job_identity(Path::new("/builds/job.notanumber")).is_err());
        assert!(job_identity(Path::new("/builds/.277")).is_err());
    }
}
