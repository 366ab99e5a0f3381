//! Opswatch common library
//!
//! Core logic shared by the opswatch tools: reduction of CI build console
//! transcripts into per-module and per-plugin timing summaries, and
//! classification of application error logs against a fixed pattern
//! taxonomy with frequency ranking.

pub mod build_log;
pub mod build_summary;
pub mod config;
pub mod csv_export;
pub mod csv_import;
pub mod json_store;
pub mod log_entry;
pub mod log_patterns;
pub mod log_reader;
pub mod module_reducer;
pub mod summary_extractor;
