//! Seams between the hierarchy logic and a concrete work tracker.
//!
//! The export side only reads ([`HierarchySource`]); the import side only
//! writes ([`IssueSink`]). Implementations block until the tracker answers.

use crate::error::Result;
use crate::model::{IssueRef, NewIssue, TaskNode};

/// Read access to a project's Epic → Task → Subtask tree.
pub trait HierarchySource {
    /// Every Epic of the project, ordered by key.
    ///
    /// # Errors
    ///
    /// Returns the tracker's error unchanged.
    fn epics(&mut self, project_key: &str) -> Result<Vec<IssueRef>>;

    /// Every Task-level child of an Epic, ordered by key, with its Subtasks.
    ///
    /// # Errors
    ///
    /// Returns the tracker's error unchanged.
    fn tasks(&mut self, epic_key: &str) -> Result<Vec<TaskNode>>;
}

/// Write access used by the importer.
pub trait IssueSink {
    /// Create one issue and return its new key.
    ///
    /// # Errors
    ///
    /// Returns the tracker's error unchanged.
    fn create_issue(&mut self, issue: &NewIssue) -> Result<String>;

    /// Attach already-created Tasks to an Epic.
    ///
    /// # Errors
    ///
    /// Returns the tracker's error unchanged.
    fn link_to_epic(&mut self, epic_key: &str, task_keys: &[String]) -> Result<()>;
}
