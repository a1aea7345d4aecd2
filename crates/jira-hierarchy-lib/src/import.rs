//! Import: rebuild the hierarchy from CSV rows.
//!
//! Work is split in two steps. [`ImportPlan::build`] is pure: it validates
//! rows, deduplicates keys and orders the creations. [`execute`] replays the
//! plan against an [`IssueSink`]. A dry run is the same replay against
//! [`DryRunSink`], which never touches the tracker.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::csv_io::NumberedRow;
use crate::error::{HierarchyError, Result};
use crate::mapping::{KeyMap, MappingEntry};
use crate::model::{IssueKind, NewIssue};
use crate::tracker::IssueSink;
use crate::validation::RowValidator;

/// Maximum number of issues per "add issues to epic" call.
pub const EPIC_LINK_BATCH: usize = 50;

/// How Tasks get attached to their Epic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkMode {
    /// Create each Task with its Epic as parent.
    #[default]
    Parent,
    /// Create Tasks unlinked, then attach them in batches after all creations.
    EpicApi,
}

impl LinkMode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Parent => "parent",
            Self::EpicApi => "epic-api",
        }
    }
}

impl fmt::Display for LinkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkMode {
    type Err = HierarchyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "parent" => Ok(Self::Parent),
            "epic-api" | "epic_api" | "epic" => Ok(Self::EpicApi),
            other => Err(HierarchyError::config(format!(
                "unknown link mode '{other}' (expected parent or epic-api)"
            ))),
        }
    }
}

/// One step of an import. Keys are source keys; the executor resolves them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlannedAction {
    CreateEpic {
        source_key: String,
        summary: String,
    },
    CreateTask {
        source_key: String,
        summary: String,
        epic: Option<String>,
    },
    CreateSubtask {
        source_key: String,
        summary: String,
        task: String,
    },
    LinkToEpic {
        epic: String,
        tasks: Vec<String>,
    },
}

impl PlannedAction {
    /// Kind of issue created by this action; `None` for links.
    #[must_use]
    pub const fn kind(&self) -> Option<IssueKind> {
        match self {
            Self::CreateEpic { .. } => Some(IssueKind::Epic),
            Self::CreateTask { .. } => Some(IssueKind::Task),
            Self::CreateSubtask { .. } => Some(IssueKind::Subtask),
            Self::LinkToEpic { .. } => None,
        }
    }
}

/// Ordered, deduplicated list of actions for one CSV file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportPlan {
    pub link_mode: LinkMode,
    pub actions: Vec<PlannedAction>,
    /// Distinct source keys skipped because `known` already mapped them.
    pub skipped_existing: usize,
}

struct Seen {
    summary: String,
    parent: Option<String>,
}

impl ImportPlan {
    /// Build the plan for a set of rows.
    ///
    /// Rows are processed in file order: for each row the Epic is created if
    /// unseen, then the Task (under the Epic), then the Subtask (under the
    /// Task). Keys present in `known` are skipped. A key with a blank summary
    /// is titled with the key itself.
    ///
    /// In [`LinkMode::EpicApi`] every Task with an Epic is linked, including
    /// Tasks created by an earlier run, so a run that stopped before its link
    /// calls is completed by the next one. Linking is idempotent.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRow` for a malformed row, or `ConflictingParent` when a
    /// Task or Subtask key appears under two different parents.
    pub fn build(rows: &[NumberedRow], known: &KeyMap, link_mode: LinkMode) -> Result<Self> {
        RowValidator::validate_all(rows)?;

        let mut seen: HashMap<(IssueKind, String), Seen> = HashMap::new();
        let mut skipped: HashSet<(IssueKind, String)> = HashSet::new();
        let mut actions = Vec::new();
        let mut links: Vec<(String, Vec<String>)> = Vec::new();

        for NumberedRow { line, row } in rows {
            let line = *line;

            if let Some(key) = &row.epic_key {
                let summary = &title(IssueKind::Epic, key, row.epic_summary.as_deref(), line);
                let fresh = note(&mut seen, IssueKind::Epic, key, summary, None, line)?;
                if fresh {
                    if known.contains(IssueKind::Epic, key) {
                        skipped.insert((IssueKind::Epic, key.clone()));
                    } else {
                        actions.push(PlannedAction::CreateEpic {
                            source_key: key.clone(),
                            summary: summary.clone(),
                        });
                    }
                }
            }

            if let Some(key) = &row.task_key {
                let summary = &title(IssueKind::Task, key, row.task_summary.as_deref(), line);
                let epic = row.epic_key.clone();
                let fresh = note(&mut seen, IssueKind::Task, key, summary, epic.clone(), line)?;
                if fresh {
                    if let (LinkMode::EpicApi, Some(epic_key)) = (link_mode, &epic) {
                        push_link(&mut links, epic_key, key);
                    }
                    if known.contains(IssueKind::Task, key) {
                        skipped.insert((IssueKind::Task, key.clone()));
                    } else {
                        actions.push(PlannedAction::CreateTask {
                            source_key: key.clone(),
                            summary: summary.clone(),
                            epic,
                        });
                    }
                }
            }

            if let (Some(key), Some(task)) = (&row.subtask_key, &row.task_key) {
                let summary = &title(IssueKind::Subtask, key, row.subtask_summary.as_deref(), line);
                let fresh = note(
                    &mut seen,
                    IssueKind::Subtask,
                    key,
                    summary,
                    Some(task.clone()),
                    line,
                )?;
                if fresh {
                    if known.contains(IssueKind::Subtask, key) {
                        skipped.insert((IssueKind::Subtask, key.clone()));
                    } else {
                        actions.push(PlannedAction::CreateSubtask {
                            source_key: key.clone(),
                            summary: summary.clone(),
                            task: task.clone(),
                        });
                    }
                }
            }
        }

        for (epic, tasks) in links {
            for chunk in tasks.chunks(EPIC_LINK_BATCH) {
                actions.push(PlannedAction::LinkToEpic {
                    epic: epic.clone(),
                    tasks: chunk.to_vec(),
                });
            }
        }

        Ok(Self {
            link_mode,
            actions,
            skipped_existing: skipped.len(),
        })
    }

    /// Number of creations of one kind.
    #[must_use]
    pub fn count(&self, kind: IssueKind) -> usize {
        self.actions
            .iter()
            .filter(|a| a.kind() == Some(kind))
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Summary to create an issue with; falls back to the source key.
fn title(kind: IssueKind, key: &str, summary: Option<&str>, line: u64) -> String {
    summary.map_or_else(
        || {
            tracing::warn!(%kind, key, line, "Blank summary; using the key as the title");
            key.to_string()
        },
        str::to_string,
    )
}

/// Record a key; returns true the first time it is seen.
fn note(
    seen: &mut HashMap<(IssueKind, String), Seen>,
    kind: IssueKind,
    key: &str,
    summary: &str,
    parent: Option<String>,
    line: u64,
) -> Result<bool> {
    let Some(first) = seen.get(&(kind, key.to_string())) else {
        seen.insert(
            (kind, key.to_string()),
            Seen {
                summary: summary.to_string(),
                parent,
            },
        );
        return Ok(true);
    };

    if first.parent != parent {
        return Err(HierarchyError::ConflictingParent {
            kind,
            key: key.to_string(),
            first: first.parent.clone().unwrap_or_else(|| "(none)".to_string()),
            second: parent.unwrap_or_else(|| "(none)".to_string()),
            line,
        });
    }
    if first.summary != summary {
        tracing::warn!(
            %kind,
            key,
            line,
            kept = %first.summary,
            ignored = summary,
            "Differing summary for an already seen key; keeping the first"
        );
    }
    Ok(false)
}

fn push_link(links: &mut Vec<(String, Vec<String>)>, epic: &str, task: &str) {
    if let Some((_, tasks)) = links.iter_mut().find(|(e, _)| e == epic) {
        tasks.push(task.to_string());
    } else {
        links.push((epic.to_string(), vec![task.to_string()]));
    }
}

/// Outcome of an import run (real or dry).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub dry_run: bool,
    pub epics_created: usize,
    pub tasks_created: usize,
    pub subtasks_created: usize,
    pub tasks_linked: usize,
    pub skipped_existing: usize,
    pub created: Vec<MappingEntry>,
}

/// Replay a plan against a sink.
///
/// Every new key is added to `keys` and passed to `on_created` before the
/// next action runs, so callers can persist progress. The first error stops
/// the run.
///
/// # Errors
///
/// Returns the sink's error, the callback's error, or `UnknownParent` if a
/// parent key was neither created by this plan nor present in `keys`.
pub fn execute<S, F>(
    plan: &ImportPlan,
    sink: &mut S,
    keys: &mut KeyMap,
    mut on_created: F,
) -> Result<ImportReport>
where
    S: IssueSink,
    F: FnMut(&MappingEntry) -> Result<()>,
{
    let mut report = ImportReport {
        skipped_existing: plan.skipped_existing,
        ..ImportReport::default()
    };

    for action in &plan.actions {
        let (kind, source_key, summary, parent_key) = match action {
            PlannedAction::CreateEpic {
                source_key,
                summary,
            } => (IssueKind::Epic, source_key, summary, None),
            PlannedAction::CreateTask {
                source_key,
                summary,
                epic,
            } => {
                let parent = match (plan.link_mode, epic) {
                    (LinkMode::Parent, Some(epic)) => {
                        Some(resolve(keys, IssueKind::Epic, epic)?.to_string())
                    }
                    _ => None,
                };
                (IssueKind::Task, source_key, summary, parent)
            }
            PlannedAction::CreateSubtask {
                source_key,
                summary,
                task,
            } => {
                let parent = resolve(keys, IssueKind::Task, task)?.to_string();
                (IssueKind::Subtask, source_key, summary, Some(parent))
            }
            PlannedAction::LinkToEpic { epic, tasks } => {
                let epic_key = resolve(keys, IssueKind::Epic, epic)?.to_string();
                let task_keys = tasks
                    .iter()
                    .map(|t| resolve(keys, IssueKind::Task, t).map(str::to_string))
                    .collect::<Result<Vec<_>>>()?;
                sink.link_to_epic(&epic_key, &task_keys)?;
                tracing::info!(epic = %epic_key, count = task_keys.len(), "Linked tasks to epic");
                report.tasks_linked += task_keys.len();
                continue;
            }
        };

        let issue = NewIssue {
            kind,
            summary: summary.clone(),
            source_key: Some(source_key.clone()),
            parent_key,
        };
        let target_key = sink.create_issue(&issue)?;
        tracing::info!(
            %kind,
            source = %source_key,
            target = %target_key,
            parent = issue.parent_key.as_deref().unwrap_or(""),
            "Created issue"
        );

        let entry = MappingEntry {
            kind,
            source_key: source_key.clone(),
            target_key,
        };
        keys.insert(&entry);
        on_created(&entry)?;

        match kind {
            IssueKind::Epic => report.epics_created += 1,
            IssueKind::Task => report.tasks_created += 1,
            IssueKind::Subtask => report.subtasks_created += 1,
        }
        report.created.push(entry);
    }

    Ok(report)
}

/// Replay a plan without a tracker.
///
/// Planned keys are `DRY-<source key>`. `known` is not modified.
///
/// # Errors
///
/// Returns `UnknownParent` if the plan references a parent that is neither
/// planned nor known.
pub fn dry_run(plan: &ImportPlan, known: &KeyMap) -> Result<ImportReport> {
    let mut keys = known.clone();
    let mut report = execute(plan, &mut DryRunSink, &mut keys, |_| Ok(()))?;
    report.dry_run = true;
    Ok(report)
}

/// Sink that invents keys instead of calling a tracker.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunSink;

impl IssueSink for DryRunSink {
    fn create_issue(&mut self, issue: &NewIssue) -> Result<String> {
        let source = issue.source_key.as_deref().unwrap_or("NEW");
        Ok(format!("DRY-{source}"))
    }

    fn link_to_epic(&mut self, _epic_key: &str, _task_keys: &[String]) -> Result<()> {
        Ok(())
    }
}

fn resolve<'a>(keys: &'a KeyMap, kind: IssueKind, source_key: &str) -> Result<&'a str> {
    keys.get(kind, source_key)
        .ok_or_else(|| HierarchyError::UnknownParent {
            kind,
            key: source_key.to_string(),
        })
}
