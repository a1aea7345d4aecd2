//! Core data types for the Epic → Task → Subtask hierarchy.
//!
//! [`Row`] is the CSV contract shared by the exporter and the importer.
//! The node types describe the tree as fetched from the tracker.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// CSV header, in column order.
pub const CSV_HEADER: [&str; 6] = [
    "epic_key",
    "epic_summary",
    "task_key",
    "task_summary",
    "subtask_key",
    "subtask_summary",
];

/// Hierarchy level of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    Epic,
    Task,
    Subtask,
}

impl IssueKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Epic => "epic",
            Self::Task => "task",
            Self::Subtask => "subtask",
        }
    }

    /// Human-facing label used in progress output.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Epic => "Epic",
            Self::Task => "Task",
            Self::Subtask => "Sub-task",
        }
    }

    /// The kind one level up, if any.
    #[must_use]
    pub const fn parent(&self) -> Option<Self> {
        match self {
            Self::Epic => None,
            Self::Task => Some(Self::Epic),
            Self::Subtask => Some(Self::Task),
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for IssueKind {
    type Err = crate::error::HierarchyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "epic" => Ok(Self::Epic),
            "task" => Ok(Self::Task),
            "subtask" | "sub-task" | "sub_task" => Ok(Self::Subtask),
            other => Err(crate::error::HierarchyError::config(format!(
                "unknown issue kind '{other}'"
            ))),
        }
    }
}

/// One issue as seen by the exporter: key plus (possibly empty) summary.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IssueRef {
    pub key: String,
    pub summary: Option<String>,
}

impl IssueRef {
    #[must_use]
    pub fn new(key: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            summary: Some(summary.into()),
        }
    }
}

/// A Task with its Subtasks.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskNode {
    pub key: String,
    pub summary: Option<String>,
    pub subtasks: Vec<IssueRef>,
}

/// An Epic with its Tasks.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EpicNode {
    pub key: String,
    pub summary: Option<String>,
    pub tasks: Vec<TaskNode>,
}

impl EpicNode {
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn subtask_count(&self) -> usize {
        self.tasks.iter().map(|t| t.subtasks.len()).sum()
    }
}

/// Issue counts per level, used to compare an export against an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HierarchyCounts {
    pub epics: usize,
    pub tasks: usize,
    pub subtasks: usize,
}

impl HierarchyCounts {
    #[must_use]
    pub fn of(epics: &[EpicNode]) -> Self {
        Self {
            epics: epics.len(),
            tasks: epics.iter().map(EpicNode::task_count).sum(),
            subtasks: epics.iter().map(EpicNode::subtask_count).sum(),
        }
    }
}

/// One denormalized CSV row.
///
/// Blank cells are `None`. Each row carries one Task-level record with
/// zero or one Subtask; an Epic without Tasks gets a row of its own.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Row {
    pub epic_key: Option<String>,
    pub epic_summary: Option<String>,
    pub task_key: Option<String>,
    pub task_summary: Option<String>,
    pub subtask_key: Option<String>,
    pub subtask_summary: Option<String>,
}

impl Row {
    /// Build a fully populated row (convenience for tests and fixtures).
    #[must_use]
    pub fn full(
        epic: (&str, &str),
        task: Option<(&str, &str)>,
        subtask: Option<(&str, &str)>,
    ) -> Self {
        Self {
            epic_key: Some(epic.0.to_string()),
            epic_summary: Some(epic.1.to_string()),
            task_key: task.map(|t| t.0.to_string()),
            task_summary: task.map(|t| t.1.to_string()),
            subtask_key: subtask.map(|s| s.0.to_string()),
            subtask_summary: subtask.map(|s| s.1.to_string()),
        }
    }

    /// Trim every cell and turn whitespace-only cells into `None`.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            epic_key: blank_to_none(self.epic_key),
            epic_summary: blank_to_none(self.epic_summary),
            task_key: blank_to_none(self.task_key),
            task_summary: blank_to_none(self.task_summary),
            subtask_key: blank_to_none(self.subtask_key),
            subtask_summary: blank_to_none(self.subtask_summary),
        }
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.epic_key.is_none()
            && self.epic_summary.is_none()
            && self.task_key.is_none()
            && self.task_summary.is_none()
            && self.subtask_key.is_none()
            && self.subtask_summary.is_none()
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == v.len() {
            Some(v)
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// A creation request handed to an [`IssueSink`](crate::tracker::IssueSink).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssue {
    pub kind: IssueKind,
    pub summary: String,
    /// Key of the issue this one is copied from.
    pub source_key: Option<String>,
    /// Target key of the parent, when the issue is created already linked.
    pub parent_key: Option<String>,
}
