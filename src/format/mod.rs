//! Output formatting for the two binaries.
//!
//! Progress and summary lines are plain text on stdout. With `--json` only
//! the final report is printed, as one JSON document.
//!
//! # JSON Output Types
//!
//! - [`ExportSummary`] - result of `export-jira-hierarchy`
//! - [`ImportOutput`] - result of `import-jira-hierarchy` (real or dry run)

mod output;
mod text;

pub use output::{ExportSummary, ImportOutput};
pub use text::{format_created, format_export_summary, format_import_summary, format_planned};
