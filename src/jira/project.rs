//! Jira-backed implementations of the hierarchy seams.

use jira_hierarchy_lib::{HierarchySource, IssueKind, IssueRef, IssueSink, NewIssue, TaskNode};
use tracing::{debug, warn};

use super::client::JiraClient;
use super::models::{CreateIssueRequest, Issue};
use crate::Result;
use crate::config::IssueTypeNames;

const EPIC_FIELDS: &[&str] = &["summary"];
const CHILD_FIELDS: &[&str] = &["summary", "issuetype", "subtasks"];

/// JQL selecting every Epic of a project.
#[must_use]
pub fn epics_jql(project_key: &str, epic_type: &str) -> String {
    format!(
        "project = {} AND issuetype = {} ORDER BY key",
        quote(project_key),
        quote(epic_type)
    )
}

/// JQL selecting the direct children of an Epic.
#[must_use]
pub fn children_jql(epic_key: &str) -> String {
    format!("parent = {} ORDER BY key", quote(epic_key))
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Hierarchy level of a search hit, by issue-type name and subtask flag.
#[must_use]
pub fn classify(issue: &Issue, types: &IssueTypeNames) -> IssueKind {
    match issue.fields.issuetype.as_ref() {
        Some(t) if t.subtask => IssueKind::Subtask,
        Some(t) if t.name.eq_ignore_ascii_case(&types.epic) => IssueKind::Epic,
        _ => IssueKind::Task,
    }
}

fn issue_ref(issue: Issue) -> IssueRef {
    IssueRef {
        key: issue.key,
        summary: issue.fields.summary,
    }
}

/// Reads a project's hierarchy through the search API.
#[derive(Debug)]
pub struct ProjectSource<'a> {
    client: &'a JiraClient,
    types: IssueTypeNames,
}

impl<'a> ProjectSource<'a> {
    #[must_use]
    pub const fn new(client: &'a JiraClient, types: IssueTypeNames) -> Self {
        Self { client, types }
    }
}

impl HierarchySource for ProjectSource<'_> {
    fn epics(&mut self, project_key: &str) -> Result<Vec<IssueRef>> {
        let jql = epics_jql(project_key, &self.types.epic);
        let issues = self.client.search_all(&jql, EPIC_FIELDS)?;
        Ok(issues.into_iter().map(issue_ref).collect())
    }

    fn tasks(&mut self, epic_key: &str) -> Result<Vec<TaskNode>> {
        let children = self.client.search_all(&children_jql(epic_key), CHILD_FIELDS)?;
        Ok(children_to_tasks(epic_key, children, &self.types))
    }
}

/// Keep Task-level children and their embedded Subtasks.
fn children_to_tasks(epic_key: &str, children: Vec<Issue>, types: &IssueTypeNames) -> Vec<TaskNode> {
    let mut tasks = Vec::with_capacity(children.len());
    for mut child in children {
        let kind = classify(&child, types);
        if kind != IssueKind::Task {
            warn!(epic = epic_key, key = %child.key, %kind, "Skipping non-task child of epic");
            continue;
        }
        let subtasks = std::mem::take(&mut child.fields.subtasks)
            .into_iter()
            .map(issue_ref)
            .collect::<Vec<_>>();
        debug!(task = %child.key, subtasks = subtasks.len(), "Collected task");
        let task = issue_ref(child);
        tasks.push(TaskNode {
            key: task.key,
            summary: task.summary,
            subtasks,
        });
    }
    tasks
}

/// Creates issues in the target project.
#[derive(Debug)]
pub struct ProjectSink<'a> {
    client: &'a JiraClient,
    project_key: String,
    types: IssueTypeNames,
    epic_name_field: Option<String>,
}

impl<'a> ProjectSink<'a> {
    #[must_use]
    pub fn new(
        client: &'a JiraClient,
        project_key: impl Into<String>,
        types: IssueTypeNames,
        epic_name_field: Option<String>,
    ) -> Self {
        Self {
            client,
            project_key: project_key.into(),
            types,
            epic_name_field,
        }
    }

    /// Create body for one issue.
    #[must_use]
    pub fn request_for(&self, issue: &NewIssue) -> CreateIssueRequest {
        let type_name = match issue.kind {
            IssueKind::Epic => &self.types.epic,
            IssueKind::Task => &self.types.task,
            IssueKind::Subtask => &self.types.subtask,
        };
        let mut request = CreateIssueRequest::new(&self.project_key, &issue.summary, type_name);
        if let Some(parent) = issue.parent_key.as_deref() {
            request = request.with_parent(parent);
        }
        if issue.kind == IssueKind::Epic {
            if let Some(field) = self.epic_name_field.as_deref() {
                request = request.with_field(field, &issue.summary);
            }
        }
        request
    }
}

impl IssueSink for ProjectSink<'_> {
    fn create_issue(&mut self, issue: &NewIssue) -> Result<String> {
        let created = self.client.create_issue(&self.request_for(issue))?;
        debug!(id = %created.id, key = %created.key, "Jira accepted issue");
        Ok(created.key)
    }

    fn link_to_epic(&mut self, epic_key: &str, task_keys: &[String]) -> Result<()> {
        self.client.add_issues_to_epic(epic_key, task_keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JiraCredentials;
    use crate::jira::models::SearchResponse;
    use serde_json::json;

    fn client() -> JiraClient {
        JiraClient::new(&JiraCredentials {
            base_url: "https://acme.atlassian.net".into(),
            user: "alice@example.com".into(),
            api_token: "t".into(),
        })
        .unwrap()
    }

    #[test]
    fn test_jql_quoting() {
        assert_eq!(
            epics_jql("ACME", "Epic"),
            r#"project = "ACME" AND issuetype = "Epic" ORDER BY key"#
        );
        assert_eq!(children_jql("ACME-1"), r#"parent = "ACME-1" ORDER BY key"#);
        assert_eq!(quote(r#"My "Epic""#), r#""My \"Epic\"""#);
    }

    #[test]
    fn test_children_keep_tasks_and_subtasks() {
        let page: SearchResponse = serde_json::from_value(json!({
            "total": 3,
            "issues": [
                {"key": "ACME-2", "fields": {
                    "summary": "Task One",
                    "issuetype": {"name": "Story", "subtask": false},
                    "subtasks": [
                        {"key": "ACME-4", "fields": {"summary": "Sub One"}},
                        {"key": "ACME-5", "fields": {"summary": ""}}
                    ]
                }},
                {"key": "ACME-3", "fields": {"summary": "Nested", "issuetype": {"name": "epic"}}},
                {"key": "ACME-6", "fields": {"summary": "Stray", "issuetype": {"name": "Sub-task", "subtask": true}}}
            ]
        }))
        .unwrap();

        let tasks = children_to_tasks("ACME-1", page.issues, &IssueTypeNames::default());
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].key, "ACME-2");
        assert_eq!(tasks[0].summary.as_deref(), Some("Task One"));
        let subs: Vec<_> = tasks[0].subtasks.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(subs, ["ACME-4", "ACME-5"]);
    }

    #[test]
    fn test_request_for_each_level() {
        let client = client();
        let types = IssueTypeNames {
            subtask: "Subtask".into(),
            ..IssueTypeNames::default()
        };
        let sink = ProjectSink::new(&client, "NEW", types, Some("customfield_10011".into()));

        let epic = sink.request_for(&NewIssue {
            kind: IssueKind::Epic,
            summary: "Epic One".into(),
            source_key: Some("OLD-1".into()),
            parent_key: None,
        });
        assert_eq!(epic.fields["issuetype"], json!({"name": "Epic"}));
        assert_eq!(epic.fields["customfield_10011"], json!("Epic One"));
        assert!(!epic.fields.contains_key("parent"));

        let sub = sink.request_for(&NewIssue {
            kind: IssueKind::Subtask,
            summary: "Sub One".into(),
            source_key: Some("OLD-3".into()),
            parent_key: Some("NEW-2".into()),
        });
        assert_eq!(sub.fields["issuetype"], json!({"name": "Subtask"}));
        assert_eq!(sub.fields["parent"], json!({"key": "NEW-2"}));
        assert_eq!(sub.fields["project"], json!({"key": "NEW"}));
        assert!(!sub.fields.contains_key("customfield_10011"));
    }
}
