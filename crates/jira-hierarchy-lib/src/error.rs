//! Error types for `jira-hierarchy-lib`.
//!
//! One enum covers the CSV side, row validation, import planning and the
//! remote tracker. Tracker adapters live outside this crate and map their
//! transport errors into [`HierarchyError::Transport`] / [`HierarchyError::Api`].

use std::path::PathBuf;
use thiserror::Error;

use crate::model::IssueKind;

/// Primary error type for hierarchy export/import operations.
#[derive(Error, Debug)]
pub enum HierarchyError {
    // === Remote Tracker Errors ===
    /// The tracker answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The tracker reported that an issue or resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("Transport error: {0}")]
    Transport(String),

    // === CSV Row Errors ===
    /// A CSV row violates the hierarchy row rules.
    #[error("Invalid row at line {line}: {}", join_errors(.errors))]
    InvalidRow {
        line: u64,
        errors: Vec<ValidationError>,
    },

    /// The same child key appears under two different parents.
    #[error("{kind} {key} has conflicting parents: {first} and {second} (line {line})")]
    ConflictingParent {
        kind: IssueKind,
        key: String,
        first: String,
        second: String,
        line: u64,
    },

    /// A planned action references a parent that was never created or mapped.
    #[error("No target key for {kind} {key}")]
    UnknownParent { kind: IssueKind, key: String },

    // === Configuration Errors ===
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    // === I/O Errors ===
    /// File not found at the specified path.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// CSV encoding/decoding error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single field validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl HierarchyError {
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// True for errors raised by the remote tracker rather than local input.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Api { .. } | Self::NotFound(_) | Self::Transport(_)
        )
    }
}

/// Result type using `HierarchyError`.
pub type Result<T> = std::result::Result<T, HierarchyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_row_message_lists_every_error() {
        let err = HierarchyError::InvalidRow {
            line: 4,
            errors: vec![
                ValidationError::new("task_key", "required when task_summary is set"),
                ValidationError::new("subtask_key", "requires a task on the same row"),
            ],
        };
        assert_eq!(
            err.to_string(),
            "Invalid row at line 4: task_key: required when task_summary is set; \
             subtask_key: requires a task on the same row"
        );
    }

    #[test]
    fn test_remote_classification() {
        assert!(
            HierarchyError::Api {
                status: 401,
                message: "Unauthorized".into()
            }
            .is_remote()
        );
        assert!(HierarchyError::Transport("timeout".into()).is_remote());
        assert!(!HierarchyError::config("missing JIRA_URL").is_remote());
    }
}
