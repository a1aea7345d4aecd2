//! CSV file I/O for hierarchy rows.
//!
//! The header is always written, even for an empty export, so that an
//! import of an empty project still sees a well-formed file.

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::{HierarchyError, Result, ValidationError};
use crate::model::{CSV_HEADER, Row};

/// A row read from disk together with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedRow {
    pub line: u64,
    pub row: Row,
}

/// Write rows to any writer, header first.
///
/// # Errors
///
/// Returns `Csv` if a record cannot be encoded or written.
pub fn write_rows_to<W: Write>(writer: W, rows: &[Row]) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(CSV_HEADER)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write rows to a file, replacing it.
///
/// # Errors
///
/// Returns `Io` if the file cannot be created, or `Csv` on encoding errors.
pub fn write_rows(path: &Path, rows: &[Row]) -> Result<()> {
    let file = fs::File::create(path)?;
    write_rows_to(file, rows)
}

/// Read rows from any reader.
///
/// A leading UTF-8 BOM is ignored. Cells are trimmed and blank cells
/// become `None`.
///
/// # Errors
///
/// Returns `InvalidRow` (line 1) when a column is missing from the header,
/// or `Csv` when a record cannot be decoded.
pub fn read_rows_from<R: Read>(mut reader: R) -> Result<Vec<NumberedRow>> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);

    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = csv_reader.headers()?.clone();
    let missing: Vec<ValidationError> = CSV_HEADER
        .iter()
        .filter(|column| !headers.iter().any(|h| h == **column))
        .map(|column| ValidationError::new(*column, "missing column in header"))
        .collect();
    if !missing.is_empty() {
        return Err(HierarchyError::InvalidRow {
            line: 1,
            errors: missing,
        });
    }

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map_or(0, csv::Position::line);
        let row: Row = record.deserialize(Some(&headers))?;
        rows.push(NumberedRow {
            line,
            row: row.normalized(),
        });
    }

    tracing::debug!(count = rows.len(), "Read CSV rows");
    Ok(rows)
}

/// Read rows from a CSV file.
///
/// # Errors
///
/// Returns `FileNotFound` if the path does not exist, otherwise the errors
/// of [`read_rows_from`].
pub fn read_rows(path: &Path) -> Result<Vec<NumberedRow>> {
    let file = fs::File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            HierarchyError::FileNotFound(path.to_path_buf())
        } else {
            HierarchyError::Io(e)
        }
    })?;
    read_rows_from(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "epic_key,epic_summary,task_key,task_summary,subtask_key,subtask_summary";

    #[test]
    fn test_empty_export_still_has_header() {
        let mut out = Vec::new();
        write_rows_to(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), format!("{HEADER}\n"));
    }

    #[test]
    fn test_blank_cells_written_empty() {
        let mut out = Vec::new();
        let rows = vec![
            Row::full(("EPIC-1", "Epic One"), None, None),
            Row::full(
                ("EPIC-1", "Epic One"),
                Some(("TASK-1", "Task, with comma")),
                None,
            ),
        ];
        write_rows_to(&mut out, &rows).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "EPIC-1,Epic One,,,,");
        assert_eq!(lines[2], "EPIC-1,Epic One,TASK-1,\"Task, with comma\",,");
    }

    #[test]
    fn test_read_strips_bom_and_numbers_lines() {
        let input = format!(
            "\u{feff}{HEADER}\nEPIC-1,Epic One,TASK-1,Task One,SUB-1,Sub One\nEPIC-2,Epic Two,,,,\n"
        );
        let rows = read_rows_from(input.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[0].row.subtask_summary.as_deref(), Some("Sub One"));
        assert_eq!(rows[1].line, 3);
        assert!(rows[1].row.task_key.is_none());
    }

    #[test]
    fn test_read_trims_cells() {
        let input = format!("{HEADER}\n EPIC-1 , Epic One ,  ,,,\n");
        let rows = read_rows_from(input.as_bytes()).unwrap();
        assert_eq!(rows[0].row.epic_key.as_deref(), Some("EPIC-1"));
        assert_eq!(rows[0].row.epic_summary.as_deref(), Some("Epic One"));
        assert!(rows[0].row.task_key.is_none());
    }

    #[test]
    fn test_read_rejects_missing_column() {
        let input = "epic_key,epic_summary,task_key,task_summary\nE-1,a,T-1,b\n";
        let err = read_rows_from(input.as_bytes()).unwrap_err();
        match err {
            HierarchyError::InvalidRow { line, errors } => {
                assert_eq!(line, 1);
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["subtask_key", "subtask_summary"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_read_rejects_short_record() {
        let input = format!("{HEADER}\nEPIC-1,Epic One\n");
        let err = read_rows_from(input.as_bytes()).unwrap_err();
        assert!(matches!(err, HierarchyError::Csv(_)));
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hierarchy.csv");
        let rows = vec![Row::full(
            ("EPIC-1", "Epic One"),
            Some(("TASK-1", "Task One")),
            Some(("SUB-1", "Sub \"quoted\" one")),
        )];

        write_rows(&path, &rows).unwrap();
        let loaded = read_rows(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].row, rows[0]);
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_rows(Path::new("/nonexistent/hierarchy.csv")).unwrap_err();
        assert!(matches!(err, HierarchyError::FileNotFound(_)));
    }
}
