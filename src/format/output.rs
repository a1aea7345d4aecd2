use std::path::PathBuf;

use jira_hierarchy_lib::{HierarchyCounts, ImportReport, LinkMode};
use serde::Serialize;

/// Result of one export.
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub project_key: String,
    pub output: PathBuf,
    pub epics: usize,
    pub tasks: usize,
    pub subtasks: usize,
    pub rows: usize,
}

impl ExportSummary {
    #[must_use]
    pub fn new(
        project_key: impl Into<String>,
        output: impl Into<PathBuf>,
        counts: HierarchyCounts,
        rows: usize,
    ) -> Self {
        Self {
            project_key: project_key.into(),
            output: output.into(),
            epics: counts.epics,
            tasks: counts.tasks,
            subtasks: counts.subtasks,
            rows,
        }
    }
}

/// Result of one import, with the settings it ran under.
#[derive(Debug, Clone, Serialize)]
pub struct ImportOutput {
    pub project_key: String,
    pub csv: PathBuf,
    pub link_mode: LinkMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapping: Option<PathBuf>,
    #[serde(flatten)]
    pub report: ImportReport,
}
