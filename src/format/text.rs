//! Plain text lines for terminal output.

use jira_hierarchy_lib::{ImportReport, LinkMode, MappingEntry, PlannedAction};

use super::ExportSummary;

/// One planned action, as printed by a dry run.
///
/// Format: `Would create {Kind} {source}: {summary}[ (under {parent})]`.
/// In `epic-api` mode a Task's Epic is shown by the later link line instead.
#[must_use]
pub fn format_planned(action: &PlannedAction, link_mode: LinkMode) -> String {
    match action {
        PlannedAction::CreateEpic {
            source_key,
            summary,
        } => format!("Would create Epic {source_key}: {summary}"),
        PlannedAction::CreateTask {
            source_key,
            summary,
            epic,
        } => match (epic, link_mode) {
            (Some(epic), LinkMode::Parent) => {
                format!("Would create Task {source_key}: {summary} (under {epic})")
            }
            _ => format!("Would create Task {source_key}: {summary}"),
        },
        PlannedAction::CreateSubtask {
            source_key,
            summary,
            task,
        } => format!("Would create Sub-task {source_key}: {summary} (under {task})"),
        PlannedAction::LinkToEpic { epic, tasks } => {
            format!("Would link {} task(s) to Epic {epic}", tasks.len())
        }
    }
}

/// One created issue.
#[must_use]
pub fn format_created(entry: &MappingEntry) -> String {
    format!(
        "Created {} {} (from {})",
        entry.kind, entry.target_key, entry.source_key
    )
}

#[must_use]
pub fn format_export_summary(summary: &ExportSummary) -> String {
    format!(
        "Export completed: {} ({} epics, {} tasks, {} subtasks, {} rows)",
        summary.output.display(),
        summary.epics,
        summary.tasks,
        summary.subtasks,
        summary.rows
    )
}

#[must_use]
pub fn format_import_summary(report: &ImportReport) -> String {
    let verb = if report.dry_run {
        "Dry run: would create"
    } else {
        "Import completed: created"
    };
    let mut line = format!(
        "{verb} {} epics, {} tasks, {} subtasks",
        report.epics_created, report.tasks_created, report.subtasks_created
    );
    if report.tasks_linked > 0 {
        line.push_str(&format!(", linked {} tasks", report.tasks_linked));
    }
    if report.skipped_existing > 0 {
        line.push_str(&format!(
            "; skipped {} already imported",
            report.skipped_existing
        ));
    }
    line
}
