//! Jira REST API request and response models.
//!
//! Only the fields this tool reads are modelled; everything else in the
//! payloads is ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

// ============================================================================
// Search
// ============================================================================

/// Page of results from `GET /rest/api/2/search`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub start_at: u32,
    #[serde(default)]
    pub max_results: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

/// One issue; also used for the embedded `subtasks` entries.
#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub key: String,
    #[serde(default)]
    pub fields: IssueFields,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueFields {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub issuetype: Option<IssueType>,
    #[serde(default)]
    pub subtasks: Vec<Issue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueType {
    pub name: String,
    #[serde(default)]
    pub subtask: bool,
}

// ============================================================================
// Create / link
// ============================================================================

/// Body for `POST /rest/api/2/issue`.
#[derive(Debug, Serialize)]
pub struct CreateIssueRequest {
    pub fields: Map<String, Value>,
}

impl CreateIssueRequest {
    /// Minimal create body: project, summary and issue type.
    #[must_use]
    pub fn new(project_key: &str, summary: &str, issue_type: &str) -> Self {
        let mut fields = Map::new();
        fields.insert("project".into(), json!({ "key": project_key }));
        fields.insert("summary".into(), json!(summary));
        fields.insert("issuetype".into(), json!({ "name": issue_type }));
        Self { fields }
    }

    #[must_use]
    pub fn with_parent(mut self, parent_key: &str) -> Self {
        self.fields
            .insert("parent".into(), json!({ "key": parent_key }));
        self
    }

    #[must_use]
    pub fn with_field(mut self, field: &str, value: &str) -> Self {
        self.fields.insert(field.into(), json!(value));
        self
    }
}

/// Response of `POST /rest/api/2/issue`.
#[derive(Debug, Deserialize)]
pub struct CreatedIssue {
    pub id: String,
    pub key: String,
}

/// Body for `POST /rest/agile/1.0/epic/{epicKey}/issue`.
#[derive(Debug, Serialize)]
pub struct EpicIssuesRequest<'a> {
    pub issues: &'a [String],
}

// ============================================================================
// Errors
// ============================================================================

/// Standard Jira error body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorCollection {
    #[serde(default)]
    pub error_messages: Vec<String>,
    #[serde(default)]
    pub errors: BTreeMap<String, String>,
}

impl ErrorCollection {
    /// Flatten into one line, or `None` when the body carried nothing.
    #[must_use]
    pub fn summary(&self) -> Option<String> {
        let parts: Vec<String> = self
            .error_messages
            .iter()
            .cloned()
            .chain(self.errors.iter().map(|(field, msg)| format!("{field}: {msg}")))
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_page_with_subtasks() {
        let body = r#"{
            "startAt": 0, "maxResults": 100, "total": 1,
            "issues": [{
                "id": "10001", "key": "ACME-2",
                "fields": {
                    "summary": "Task One",
                    "issuetype": {"name": "Task", "subtask": false},
                    "subtasks": [{
                        "id": "10005", "key": "ACME-5",
                        "fields": {"summary": "Sub One", "issuetype": {"name": "Sub-task", "subtask": true}}
                    }]
                }
            }]
        }"#;
        let page: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(page.total, 1);
        let task = &page.issues[0];
        assert_eq!(task.key, "ACME-2");
        assert_eq!(task.fields.subtasks[0].key, "ACME-5");
        assert_eq!(task.fields.subtasks[0].fields.summary.as_deref(), Some("Sub One"));
        assert!(task.fields.subtasks[0].fields.issuetype.as_ref().unwrap().subtask);
    }

    #[test]
    fn test_parse_issue_without_fields() {
        let page: SearchResponse =
            serde_json::from_str(r#"{"issues": [{"key": "ACME-1"}]}"#).unwrap();
        assert!(page.issues[0].fields.summary.is_none());
        assert!(page.issues[0].fields.subtasks.is_empty());
    }

    #[test]
    fn test_create_body_shape() {
        let body = CreateIssueRequest::new("NEW", "Sub One", "Sub-task")
            .with_parent("NEW-2")
            .with_field("customfield_10011", "Sub One");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            json!({"fields": {
                "project": {"key": "NEW"},
                "summary": "Sub One",
                "issuetype": {"name": "Sub-task"},
                "parent": {"key": "NEW-2"},
                "customfield_10011": "Sub One"
            }})
        );
    }

    #[test]
    fn test_error_collection_summary() {
        let body = r#"{"errorMessages": ["Issue does not exist"], "errors": {"summary": "required"}}"#;
        let errors: ErrorCollection = serde_json::from_str(body).unwrap();
        assert_eq!(
            errors.summary().as_deref(),
            Some("Issue does not exist; summary: required")
        );
        assert!(ErrorCollection::default().summary().is_none());
    }
}
