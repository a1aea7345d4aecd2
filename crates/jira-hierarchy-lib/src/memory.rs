//! In-memory tracker backed by a `Vec` and a key index.
//!
//! Implements both [`HierarchySource`] and [`IssueSink`] so a whole
//! export → CSV → import cycle can run without a server. Keys are
//! `<PROJECT>-<n>` in creation order.

use std::collections::HashMap;

use crate::error::{HierarchyError, Result};
use crate::model::{EpicNode, IssueKind, IssueRef, NewIssue, TaskNode};
use crate::tracker::{HierarchySource, IssueSink};

#[derive(Debug, Clone)]
struct StoredIssue {
    key: String,
    kind: IssueKind,
    summary: String,
    parent: Option<String>,
}

/// In-memory project.
#[derive(Debug, Clone)]
pub struct InMemoryTracker {
    project: String,
    issues: Vec<StoredIssue>,
    index: HashMap<String, usize>,
    links: usize,
}

impl InMemoryTracker {
    #[must_use]
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            issues: Vec::new(),
            index: HashMap::new(),
            links: 0,
        }
    }

    /// Seed an Epic; returns its key.
    pub fn add_epic(&mut self, summary: &str) -> String {
        self.insert(IssueKind::Epic, summary, None)
    }

    /// Seed a Task, optionally under an Epic; returns its key.
    pub fn add_task(&mut self, epic_key: Option<&str>, summary: &str) -> String {
        self.insert(IssueKind::Task, summary, epic_key.map(str::to_string))
    }

    /// Seed a Subtask under a Task; returns its key.
    pub fn add_subtask(&mut self, task_key: &str, summary: &str) -> String {
        self.insert(IssueKind::Subtask, summary, Some(task_key.to_string()))
    }

    #[must_use]
    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }

    /// Number of "add issues to epic" calls received.
    #[must_use]
    pub const fn link_calls(&self) -> usize {
        self.links
    }

    #[must_use]
    pub fn parent_of(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|issue| issue.parent.as_deref())
    }

    /// The current tree, in creation order. Tasks without an Epic are not
    /// part of it.
    #[must_use]
    pub fn tree(&self) -> Vec<EpicNode> {
        self.of_kind(IssueKind::Epic)
            .map(|epic| EpicNode {
                key: epic.key.clone(),
                summary: Some(epic.summary.clone()),
                tasks: self.task_nodes(&epic.key),
            })
            .collect()
    }

    fn insert(&mut self, kind: IssueKind, summary: &str, parent: Option<String>) -> String {
        let key = format!("{}-{}", self.project, self.issues.len() + 1);
        self.index.insert(key.clone(), self.issues.len());
        self.issues.push(StoredIssue {
            key: key.clone(),
            kind,
            summary: summary.to_string(),
            parent,
        });
        key
    }

    fn get(&self, key: &str) -> Option<&StoredIssue> {
        self.index.get(key).map(|&i| &self.issues[i])
    }

    fn of_kind(&self, kind: IssueKind) -> impl Iterator<Item = &StoredIssue> {
        self.issues.iter().filter(move |issue| issue.kind == kind)
    }

    fn children(&self, kind: IssueKind, parent: &str) -> impl Iterator<Item = &StoredIssue> {
        self.of_kind(kind)
            .filter(move |issue| issue.parent.as_deref() == Some(parent))
    }

    fn task_nodes(&self, epic_key: &str) -> Vec<TaskNode> {
        self.children(IssueKind::Task, epic_key)
            .map(|task| TaskNode {
                key: task.key.clone(),
                summary: Some(task.summary.clone()),
                subtasks: self
                    .children(IssueKind::Subtask, &task.key)
                    .map(|sub| IssueRef::new(sub.key.clone(), sub.summary.clone()))
                    .collect(),
            })
            .collect()
    }

    fn expect_kind(&self, key: &str, kind: IssueKind) -> Result<()> {
        match self.get(key) {
            Some(issue) if issue.kind == kind => Ok(()),
            Some(issue) => Err(HierarchyError::Api {
                status: 400,
                message: format!("{key} is a {}, expected a {kind}", issue.kind),
            }),
            None => Err(HierarchyError::NotFound(key.to_string())),
        }
    }
}

impl HierarchySource for InMemoryTracker {
    fn epics(&mut self, project_key: &str) -> Result<Vec<IssueRef>> {
        if project_key != self.project {
            return Err(HierarchyError::NotFound(format!("project {project_key}")));
        }
        Ok(self
            .of_kind(IssueKind::Epic)
            .map(|epic| IssueRef::new(epic.key.clone(), epic.summary.clone()))
            .collect())
    }

    fn tasks(&mut self, epic_key: &str) -> Result<Vec<TaskNode>> {
        self.expect_kind(epic_key, IssueKind::Epic)?;
        Ok(self.task_nodes(epic_key))
    }
}

impl IssueSink for InMemoryTracker {
    fn create_issue(&mut self, issue: &NewIssue) -> Result<String> {
        if issue.summary.trim().is_empty() {
            return Err(HierarchyError::Api {
                status: 400,
                message: "summary: You must specify a summary of the issue.".to_string(),
            });
        }
        match (issue.kind.parent(), issue.parent_key.as_deref()) {
            (Some(parent_kind), Some(parent)) => self.expect_kind(parent, parent_kind)?,
            (None, Some(parent)) => {
                return Err(HierarchyError::Api {
                    status: 400,
                    message: format!("{} cannot have parent {parent}", issue.kind),
                });
            }
            (Some(IssueKind::Task), None) => {
                return Err(HierarchyError::Api {
                    status: 400,
                    message: "parent: Sub-task requires a parent".to_string(),
                });
            }
            _ => {}
        }
        Ok(self.insert(issue.kind, &issue.summary, issue.parent_key.clone()))
    }

    fn link_to_epic(&mut self, epic_key: &str, task_keys: &[String]) -> Result<()> {
        self.expect_kind(epic_key, IssueKind::Epic)?;
        for key in task_keys {
            self.expect_kind(key, IssueKind::Task)?;
        }
        for key in task_keys {
            if let Some(&i) = self.index.get(key) {
                self.issues[i].parent = Some(epic_key.to_string());
            }
        }
        self.links += 1;
        Ok(())
    }
}
