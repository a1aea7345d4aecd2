//! `jira_hierarchy` - Jira Epic → Task → Subtask export/import over CSV
//!
//! This crate provides the Jira-facing half of the two command-line tools,
//! `export-jira-hierarchy` and `import-jira-hierarchy`. The hierarchy logic
//! itself lives in `jira_hierarchy_lib`.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`cli`] - Command-line interface using clap
//! - [`config`] - Configuration layering (YAML file, environment, flags)
//! - [`format`] - Output formatting (text, JSON)
//! - [`jira`] - Jira REST client and project adapters
//! - [`logging`] - tracing subscriber setup

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod format;
pub mod jira;
pub mod logging;

pub use cli::{run_export, run_import};
pub use jira_hierarchy_lib::{HierarchyError, Result};
