//! Export: walk the tracker tree and flatten it into CSV rows.

use crate::error::Result;
use crate::model::{EpicNode, Row};
use crate::tracker::HierarchySource;

/// Fetch every Epic of a project with its Tasks and Subtasks.
///
/// Encounter order is preserved: Epics in the order the source returns
/// them, then each Epic's Tasks, then each Task's Subtasks.
///
/// # Errors
///
/// Returns the first error raised by the source.
pub fn collect_hierarchy<S: HierarchySource>(
    source: &mut S,
    project_key: &str,
) -> Result<Vec<EpicNode>> {
    let epics = source.epics(project_key)?;
    tracing::info!(project = project_key, count = epics.len(), "Found epics");

    let mut tree = Vec::with_capacity(epics.len());
    for epic in epics {
        let tasks = source.tasks(&epic.key)?;
        tracing::info!(epic = %epic.key, count = tasks.len(), "Found tasks");
        tree.push(EpicNode {
            key: epic.key,
            summary: epic.summary,
            tasks,
        });
    }
    Ok(tree)
}

/// Flatten the tree into rows.
///
/// - Epic without Tasks: one row, task and subtask cells blank.
/// - Task without Subtasks: one row, subtask cells blank.
/// - Task with N Subtasks: N rows, one per Subtask.
#[must_use]
pub fn flatten(epics: &[EpicNode]) -> Vec<Row> {
    let mut rows = Vec::new();
    for epic in epics {
        let epic_cells = (Some(epic.key.clone()), non_empty(epic.summary.as_ref()));

        if epic.tasks.is_empty() {
            rows.push(Row {
                epic_key: epic_cells.0.clone(),
                epic_summary: epic_cells.1.clone(),
                ..Row::default()
            });
            continue;
        }

        for task in &epic.tasks {
            let base = Row {
                epic_key: epic_cells.0.clone(),
                epic_summary: epic_cells.1.clone(),
                task_key: Some(task.key.clone()),
                task_summary: non_empty(task.summary.as_ref()),
                ..Row::default()
            };

            if task.subtasks.is_empty() {
                rows.push(base);
                continue;
            }

            for subtask in &task.subtasks {
                rows.push(Row {
                    subtask_key: Some(subtask.key.clone()),
                    subtask_summary: non_empty(subtask.summary.as_ref()),
                    ..base.clone()
                });
            }
        }
    }
    rows
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryTracker;
    use crate::model::{IssueRef, TaskNode};

    fn task(key: &str, summary: &str, subtasks: &[(&str, &str)]) -> TaskNode {
        TaskNode {
            key: key.into(),
            summary: Some(summary.into()),
            subtasks: subtasks.iter().map(|(k, s)| IssueRef::new(*k, *s)).collect(),
        }
    }

    #[test]
    fn test_epic_without_tasks_emits_one_blank_row() {
        let epics = vec![EpicNode {
            key: "EPIC-1".into(),
            summary: Some("Epic One".into()),
            tasks: vec![],
        }];
        let rows = flatten(&epics);
        assert_eq!(rows, vec![Row::full(("EPIC-1", "Epic One"), None, None)]);
    }

    #[test]
    fn test_one_row_per_subtask_in_order() {
        let epics = vec![EpicNode {
            key: "EPIC-1".into(),
            summary: Some("Epic One".into()),
            tasks: vec![
                task("TASK-1", "Task One", &[("SUB-1", "Sub One"), ("SUB-2", "Sub Two")]),
                task("TASK-2", "Task Two", &[]),
            ],
        }];
        let rows = flatten(&epics);
        let keys: Vec<(Option<&str>, Option<&str>)> = rows
            .iter()
            .map(|r| (r.task_key.as_deref(), r.subtask_key.as_deref()))
            .collect();
        assert_eq!(
            keys,
            vec![
                (Some("TASK-1"), Some("SUB-1")),
                (Some("TASK-1"), Some("SUB-2")),
                (Some("TASK-2"), None),
            ]
        );
        assert!(rows[2].subtask_summary.is_none());
    }

    #[test]
    fn test_missing_summaries_written_blank() {
        let epics = vec![EpicNode {
            key: "EPIC-1".into(),
            summary: None,
            tasks: vec![TaskNode {
                key: "TASK-1".into(),
                summary: Some("  ".into()),
                subtasks: vec![],
            }],
        }];
        let rows = flatten(&epics);
        assert!(rows[0].epic_summary.is_none());
        assert!(rows[0].task_summary.is_none());
    }

    #[test]
    fn test_collect_hierarchy_walks_source() {
        let mut tracker = InMemoryTracker::new("OLD");
        let epic = tracker.add_epic("Epic One");
        let t1 = tracker.add_task(Some(epic.as_str()), "Task One");
        tracker.add_subtask(&t1, "Sub One");
        let _empty = tracker.add_epic("Epic Two");

        let tree = collect_hierarchy(&mut tracker, "OLD").unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].tasks.len(), 1);
        assert_eq!(tree[0].tasks[0].subtasks[0].summary.as_deref(), Some("Sub One"));
        assert!(tree[1].tasks.is_empty());
    }
}
