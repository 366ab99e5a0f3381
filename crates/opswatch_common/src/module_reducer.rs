//! Build transcript reducer
//!
//! Reduces the leveled records of one build execution into per-module and
//! per-plugin-execution timing summaries. The scanner advances through the
//! transcript with a single cursor and passes through its phases in strict
//! order, never revisiting an earlier one:
//!
//! 1. `PreReactor` — everything before `Reactor Build Order:` (dependency
//!    chatter, nothing extracted).
//! 2. `Reactor` — the module build-order listing, up to the first
//!    separator line (nothing extracted).
//! 3. `Modules` — the productive phase. Each module opens at a
//!    `Building <name>` header together with a synthetic download
//!    pseudo-execution; plugin declarations rotate the current execution;
//!    the separator line closes the current module. `Reactor Summary:`
//!    terminates the scan.
//! 4. `Done`.
//!
//! Exhausting the input mid-`Modules` counts as an implicit terminal:
//! in-progress summaries are finalized, not dropped.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::build_log::{BuildLogError, BuildRecord};
use crate::build_summary::{ModuleSummary, PluginExecSummary};

const SEP_LINE: &str =
    "------------------------------------------------------------------------";
const REACTOR_BUILD_ORDER_LINE: &str = "Reactor Build Order:";
const REACTOR_SUMMARY_LINE: &str = "Reactor Summary:";
const MODULE_HEADER_PREFIX: &str = "Building ";

lazy_static! {
    /// Plugin declaration: `--- name:version:goal (execId) @ moduleId ---`
    static ref PLUGIN_DECLARATION: Regex =
        Regex::new(r"^--- ([\w-]+):([\w.-]+):([\w-]+) \(([\w-]+)\) @ ([\w-]+) ---$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReducerState {
    PreReactor,
    Reactor,
    Modules,
    Done,
}

/// Result of reducing one build execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReduction {
    pub modules: Vec<ModuleSummary>,
    pub plugins: Vec<PluginExecSummary>,
}

/// Reduces a build's leveled records into module and plugin summaries.
///
/// `job_name` and `job_exec_id` identify the build execution and are
/// stamped onto every summary. Returns an error when the transcript is
/// malformed (a module body where a header was expected).
pub fn reduce(
    job_name: &str,
    job_exec_id: u32,
    records: &[BuildRecord],
) -> Result<BuildReduction, BuildLogError> {
    let mut state = ReducerState::PreReactor;
    let mut modules: Vec<ModuleSummary> = Vec::new();
    let mut plugins: Vec<PluginExecSummary> = Vec::new();
    let mut current_module: Option<ModuleSummary> = None;
    let mut current_plugin: Option<PluginExecSummary> = None;
    let mut at_module_header = true;

    let mut it = records.iter();
    while let Some(record) = it.next() {
        match state {
            ReducerState::PreReactor => {
                if record.message == REACTOR_BUILD_ORDER_LINE {
                    state = ReducerState::Reactor;
                }
            }
            ReducerState::Reactor => {
                if record.message == SEP_LINE {
                    state = ReducerState::Modules;
                }
            }
            ReducerState::Modules => {
                if record.message == REACTOR_SUMMARY_LINE {
                    state = ReducerState::Done;
                    continue;
                }
                if at_module_header {
                    let module_name = record
                        .message
                        .strip_prefix(MODULE_HEADER_PREFIX)
                        .ok_or_else(|| BuildLogError::MissingModuleHeader {
                            time: record.time,
                            message: record.message.clone(),
                        })?;
                    // The header also opens the download pseudo-execution;
                    // rotating in a new one finalizes the previous module's
                    // last plugin execution.
                    if let Some(p) = current_plugin.take() {
                        plugins.push(p);
                    }
                    current_module = Some(ModuleSummary::open(
                        job_name,
                        job_exec_id,
                        module_name,
                        record.time,
                    ));
                    current_plugin = Some(PluginExecSummary::open_download(
                        job_name,
                        job_exec_id,
                        module_name,
                        record.time,
                    ));
                    at_module_header = false;
                    // The record directly under the header is always the
                    // decorative separator.
                    it.next();
                } else if record.message == SEP_LINE {
                    // Closes the module only. The current plugin execution
                    // stays open until the next declaration, the next
                    // header, or the terminal line.
                    if let Some(m) = current_module.take() {
                        modules.push(m);
                    }
                    at_module_header = true;
                } else if let Some(caps) = PLUGIN_DECLARATION.captures(&record.message) {
                    if let Some(p) = current_plugin.take() {
                        plugins.push(p);
                    }
                    let module_name = current_module
                        .as_ref()
                        .map(|m| m.module_name.as_str())
                        .unwrap_or("");
                    current_plugin = Some(PluginExecSummary::open(
                        job_name,
                        job_exec_id,
                        &caps[5],
                        module_name,
                        &caps[1],
                        &caps[2],
                        &caps[3],
                        &caps[4],
                        record.time,
                    ));
                } else {
                    // Ordinary body line: both projections move forward.
                    if let Some(m) = current_module.as_mut() {
                        m.touch(record.time);
                    }
                    if let Some(p) = current_plugin.as_mut() {
                        p.touch(record.time);
                    }
                }
            }
            ReducerState::Done => break,
        }
    }

    // Terminal, explicit or implied by end of input: finalize in-progress
    // work rather than dropping it.
    if let Some(m) = current_module.take() {
        modules.push(m);
    }
    if let Some(p) = current_plugin.take() {
        plugins.push(p);
    }

    Ok(backfill(modules, plugins))
}

/// Backfill pass: a module's id only becomes known at its first real
/// plugin declaration, so summaries opened at the header carry an empty
/// id. Correlate `module_name -> first non-empty module_id` over the
/// finalized plugin executions, then project both result sets with the
/// mapped ids substituted. Pure projection, no rescan of the input.
fn backfill(modules: Vec<ModuleSummary>, plugins: Vec<PluginExecSummary>) -> BuildReduction {
    let mut ids: HashMap<String, String> = HashMap::new();
    for p in &plugins {
        if !p.module_id.is_empty() && !ids.contains_key(&p.module_name) {
            ids.insert(p.module_name.clone(), p.module_id.clone());
        }
    }
    let modules = modules
        .into_iter()
        .map(|m| match ids.get(&m.module_name) {
            Some(id) if m.module_id.is_empty() => m.with_module_id(id),
            _ => m,
        })
        .collect();
    let plugins = plugins
        .into_iter()
        .map(|p| match ids.get(&p.module_name) {
            Some(id) if p.module_id.is_empty() => p.with_module_id(id),
            _ => p,
        })
        .collect();
    BuildReduction { modules, plugins }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_log::Level;
    use chrono::NaiveTime;

    fn log(second: u32, message: &str) -> BuildRecord {
        BuildRecord {
            time: NaiveTime::from_hms_opt(16, 55, second).unwrap(),
            level: Level::Info,
            message: message.to_string(),
        }
    }

    const SEP: &str =
        "------------------------------------------------------------------------";

    fn three_module_transcript() -> Vec<BuildRecord> {
        vec![
            log(0, "Scanning for projects..."),
            log(1, "Downloading: http://example.com/plugin-2.0.6.pom"),
            log(1, "Downloaded: http://example.com/plugin-2.0.6.pom (0 B at 0.0 KB/sec)"),
            log(1, SEP),
            log(2, "Reactor Build Order:"),
            log(2, ""),
            log(2, "Module 1"),
            log(2, "Module 2"),
            log(2, "Module 3"),
            log(3, ""),
            log(3, SEP),
            log(4, "Building Module 1 1.0.0-SNAPSHOT"),
            log(4, SEP),
            log(4, "Downloading: http://example.com/plugin-2.0.6.pom"),
            log(5, "Downloaded: http://example.com/plugin-2.0.6.pom (0 B at 0.0 KB/sec)"),
            log(6, "--- maven-clean-plugin:2.5:clean (default-clean) @ parent ---"),
            log(6, ""),
            log(6, SEP),
            log(7, "Building Module 2 1.0.0-SNAPSHOT"),
            log(7, SEP),
            log(7, ""),
            log(8, "--- maven-clean-plugin:2.5:clean (default-clean) @ parent ---"),
            log(9, ""),
            log(9, SEP),
            log(10, "Building Module 3 1.0.0-SNAPSHOT"),
            log(11, SEP),
            log(11, ""),
            log(12, "--- maven-clean-plugin:2.5:clean (default-clean) @ parent ---"),
            log(12, ""),
            log(12, SEP),
            log(13, "Reactor Summary:"),
            log(13, ""),
            log(13, "Module 1 ........................................... SUCCESS [05:11 min]"),
            log(13, "Module 2 ........................................... SUCCESS [  3.909 s]"),
            log(13, "Module 3 ........................................... SUCCESS [ 16.844 s]"),
            log(13, SEP),
            log(13, "BUILD SUCCESS"),
            log(13, SEP),
            log(13, "Total time: 02:11 h"),
            log(13, "Finished at: 2019-03-25T17:06:52+00:00"),
            log(13, "Final Memory: 3710M/6185M"),
            log(13, SEP),
        ]
    }

    fn t(second: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(16, 55, second).unwrap()
    }

    #[test]
    fn test_reduce_three_modules() {
        let reduction = reduce("myJob", 123, &three_module_transcript()).unwrap();

        let names: Vec<&str> = reduction
            .modules
            .iter()
            .map(|m| m.module_name.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "Module 1 1.0.0-SNAPSHOT",
                "Module 2 1.0.0-SNAPSHOT",
                "Module 3 1.0.0-SNAPSHOT"
            ]
        );

        let m1 = &reduction.modules[0];
        assert_eq!(m1.job_name, "myJob");
        assert_eq!(m1.job_exec_id, 123);
        assert_eq!(m1.start_time, t(4));
        assert_eq!(m1.end_time, t(6));
        assert_eq!(reduction.modules[1].start_time, t(7));
        assert_eq!(reduction.modules[1].end_time, t(9));
        assert_eq!(reduction.modules[2].start_time, t(10));
        assert_eq!(reduction.modules[2].end_time, t(12));

        // 3 synthetic downloads + 3 real clean executions.
        assert_eq!(reduction.plugins.len(), 6);
        let downloads = reduction.plugins.iter().filter(|p| p.is_download()).count();
        assert_eq!(downloads, 3);
        for p in &reduction.plugins {
            // Every summary names the parent module and backfilled id.
            assert!(!p.module_name.is_empty());
            assert_eq!(p.module_id, "parent");
            assert!(p.end_time >= p.start_time);
        }
    }

    #[test]
    fn test_plugin_execution_windows() {
        let reduction = reduce("myJob", 123, &three_module_transcript()).unwrap();
        let clean: Vec<_> = reduction
            .plugins
            .iter()
            .filter(|p| p.plugin_name == "maven-clean-plugin")
            .collect();
        assert_eq!(clean.len(), 3);
        assert_eq!(clean[0].start_time, t(6));
        assert_eq!(clean[0].plugin_version, "2.5");
        assert_eq!(clean[0].plugin_goal, "clean");
        assert_eq!(clean[0].plugin_exec_id, "default-clean");
        assert_eq!(clean[0].module_name, "Module 1 1.0.0-SNAPSHOT");
        assert_eq!(clean[1].start_time, t(8));
        assert_eq!(clean[1].end_time, t(9));
    }

    #[test]
    fn test_reduce_two_modules_one_plugin() {
        // Two modules, a single real plugin execution under the first.
        let records = vec![
            log(0, "Reactor Build Order:"),
            log(1, SEP),
            log(2, "Building Module 1 1.0.0-SNAPSHOT"),
            log(2, SEP),
            log(3, "--- maven-clean-plugin:2.5:clean (default-clean) @ module1 ---"),
            log(5, ""),
            log(6, SEP),
            log(7, "Building Module 2 1.0.0-SNAPSHOT"),
            log(7, SEP),
            log(9, ""),
            log(11, SEP),
            log(12, "Reactor Summary:"),
        ];
        let reduction = reduce("myJob", 7, &records).unwrap();
        assert_eq!(reduction.modules.len(), 2);
        assert_eq!(reduction.plugins.len(), 3);

        let downloads: Vec<_> = reduction.plugins.iter().filter(|p| p.is_download()).collect();
        assert_eq!(downloads.len(), 2);
        // Module 1's download entry gets the id discovered at the first
        // real plugin declaration; module 2 never revealed one.
        assert_eq!(downloads[0].module_name, "Module 1 1.0.0-SNAPSHOT");
        assert_eq!(downloads[0].module_id, "module1");
        assert_eq!(downloads[1].module_id, "");
        assert_eq!(reduction.modules[0].module_id, "module1");
        assert_eq!(reduction.modules[1].module_id, "");
    }

    #[test]
    fn test_end_of_input_finalizes_open_work() {
        // Transcript truncated mid-module: no Reactor Summary, no closing
        // separator. In-progress summaries are kept.
        let records = vec![
            log(0, "Reactor Build Order:"),
            log(1, SEP),
            log(2, "Building Module 1 1.0.0-SNAPSHOT"),
            log(2, SEP),
            log(3, "--- maven-clean-plugin:2.5:clean (default-clean) @ module1 ---"),
            log(4, "cleaning target/"),
        ];
        let reduction = reduce("job", 1, &records).unwrap();
        assert_eq!(reduction.modules.len(), 1);
        assert_eq!(reduction.modules[0].end_time, t(4));
        assert_eq!(reduction.plugins.len(), 2);
        let real = reduction.plugins.iter().find(|p| !p.is_download()).unwrap();
        assert_eq!(real.end_time, t(4));
    }

    #[test]
    fn test_almost_plugin_line_is_body() {
        // Missing trailing dashes: not a declaration, only advances time.
        let records = vec![
            log(0, "Reactor Build Order:"),
            log(1, SEP),
            log(2, "Building Module 1 1.0.0-SNAPSHOT"),
            log(2, SEP),
            log(4, "--- maven-clean-plugin:2.5:clean (default-clean) @ module1"),
            log(5, SEP),
            log(6, "Reactor Summary:"),
        ];
        let reduction = reduce("job", 1, &records).unwrap();
        assert_eq!(reduction.plugins.len(), 1);
        assert!(reduction.plugins[0].is_download());
        assert_eq!(reduction.plugins[0].end_time, t(4));
        assert_eq!(reduction.modules[0].end_time, t(4));
    }

    #[test]
    fn test_missing_module_header_is_fatal() {
        let records = vec![
            log(0, "Reactor Build Order:"),
            log(1, SEP),
            log(2, "Downloading: http://example.com/a.pom"),
        ];
        let err = reduce("job", 1, &records).unwrap_err();
        assert!(matches!(err, BuildLogError::MissingModuleHeader { .. }));
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        let reduction = reduce("job", 1, &[]).unwrap();
        assert!(reduction.modules.is_empty());
        assert!(reduction.plugins.is_empty());
    }

    #[test]
    fn test_no_reactor_marker_yields_nothing() {
        let records = vec![log(0, "Scanning for projects..."), log(1, "chatter")];
        let reduction = reduce("job", 1, &records).unwrap();
        assert!(reduction.modules.is_empty());
        assert!(reduction.plugins.is_empty());
    }
}
