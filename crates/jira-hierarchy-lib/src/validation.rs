//! Validation helpers for hierarchy rows.
//!
//! These routines enforce the row contract and return structured
//! validation errors without touching the tracker.

use crate::csv_io::NumberedRow;
use crate::error::{HierarchyError, Result, ValidationError};
use crate::model::Row;

/// Validates rows before they are planned for import.
pub struct RowValidator;

impl RowValidator {
    /// Validate a row and return all validation errors found.
    ///
    /// # Errors
    ///
    /// Returns a `Vec<ValidationError>` if any rule is violated.
    pub fn validate(row: &Row) -> std::result::Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if row.is_blank() {
            errors.push(ValidationError::new("row", "every field is blank"));
            return Err(errors);
        }

        check_pair(
            &mut errors,
            ("epic_key", row.epic_key.as_deref()),
            ("epic_summary", row.epic_summary.as_deref()),
        );
        check_pair(
            &mut errors,
            ("task_key", row.task_key.as_deref()),
            ("task_summary", row.task_summary.as_deref()),
        );
        check_pair(
            &mut errors,
            ("subtask_key", row.subtask_key.as_deref()),
            ("subtask_summary", row.subtask_summary.as_deref()),
        );

        // A subtask cannot float without its task.
        if (row.subtask_key.is_some() || row.subtask_summary.is_some()) && row.task_key.is_none()
        {
            errors.push(ValidationError::new(
                "subtask_key",
                "requires a task on the same row",
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate every row, failing on the first invalid one.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRow` with the line number and all errors for that row.
    pub fn validate_all(rows: &[NumberedRow]) -> Result<()> {
        for numbered in rows {
            Self::validate(&numbered.row).map_err(|errors| HierarchyError::InvalidRow {
                line: numbered.line,
                errors,
            })?;
        }
        Ok(())
    }
}

fn check_pair(
    errors: &mut Vec<ValidationError>,
    (key_field, key): (&str, Option<&str>),
    (summary_field, summary): (&str, Option<&str>),
) {
    // A key with a blank summary is allowed; the importer titles it by key.
    if key.is_none() && summary.is_some() {
        errors.push(ValidationError::new(
            key_field,
            format!("required when {summary_field} is set"),
        ));
    }
}
