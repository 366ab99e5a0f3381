//! Opswatchctl library - exposes command modules for integration tests

pub mod commands;
