//! Build timing summaries
//!
//! Value types produced by the module reducer: one [`ModuleSummary`] per
//! build module, one [`PluginExecSummary`] per plugin invocation plus one
//! synthetic download entry per module charged with the dependency
//! resolution time preceding the first real plugin run.

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};

/// Pseudo-plugin identity charged with dependency-download activity.
pub const DOWNLOAD_PLUGIN_NAME: &str = "__download__";
pub const DOWNLOAD_PLUGIN_VERSION: &str = "1.0.0";
pub const DOWNLOAD_PLUGIN_GOAL: &str = "download";
pub const DOWNLOAD_PLUGIN_EXEC_ID: &str = "download";

/// Timing summary of one build module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSummary {
    pub job_name: String,
    pub job_exec_id: u32,
    pub module_name: String,
    /// Empty until the backfill pass correlates the name to an id.
    pub module_id: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl ModuleSummary {
    /// Opens a summary at a module header. Start and end coincide until
    /// body lines advance the end time.
    pub fn open(job_name: &str, job_exec_id: u32, module_name: &str, time: NaiveTime) -> Self {
        Self {
            job_name: job_name.to_string(),
            job_exec_id,
            module_name: module_name.to_string(),
            module_id: String::new(),
            start_time: time,
            end_time: time,
        }
    }

    pub fn touch(&mut self, time: NaiveTime) {
        self.end_time = time;
    }

    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    pub fn with_module_id(mut self, module_id: &str) -> Self {
        self.module_id = module_id.to_string();
        self
    }
}

/// Timing summary of one plugin execution within a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginExecSummary {
    pub job_name: String,
    pub job_exec_id: u32,
    /// Empty until the declaration line provides it, or until backfill.
    pub module_id: String,
    pub module_name: String,
    pub plugin_name: String,
    pub plugin_version: String,
    pub plugin_goal: String,
    pub plugin_exec_id: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl PluginExecSummary {
    #[allow(clippy::too_many_arguments)]
    pub fn open(
        job_name: &str,
        job_exec_id: u32,
        module_id: &str,
        module_name: &str,
        plugin_name: &str,
        plugin_version: &str,
        plugin_goal: &str,
        plugin_exec_id: &str,
        time: NaiveTime,
    ) -> Self {
        Self {
            job_name: job_name.to_string(),
            job_exec_id,
            module_id: module_id.to_string(),
            module_name: module_name.to_string(),
            plugin_name: plugin_name.to_string(),
            plugin_version: plugin_version.to_string(),
            plugin_goal: plugin_goal.to_string(),
            plugin_exec_id: plugin_exec_id.to_string(),
            start_time: time,
            end_time: time,
        }
    }

    /// Opens the synthetic download pseudo-execution for a module header.
    /// The module id is unknown at this point and left empty for backfill.
    pub fn open_download(job_name: &str, job_exec_id: u32, module_name: &str, time: NaiveTime) -> Self {
        Self::open(
            job_name,
            job_exec_id,
            "",
            module_name,
            DOWNLOAD_PLUGIN_NAME,
            DOWNLOAD_PLUGIN_VERSION,
            DOWNLOAD_PLUGIN_GOAL,
            DOWNLOAD_PLUGIN_EXEC_ID,
            time,
        )
    }

    pub fn touch(&mut self, time: NaiveTime) {
        self.end_time = time;
    }

    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    pub fn with_module_id(mut self, module_id: &str) -> Self {
        self.module_id = module_id.to_string();
        self
    }

    pub fn is_download(&self) -> bool {
        self.plugin_name == DOWNLOAD_PLUGIN_NAME
    }
}
