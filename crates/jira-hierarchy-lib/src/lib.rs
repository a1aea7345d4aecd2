//! `jira-hierarchy-lib` - Epic → Task → Subtask hierarchy over flat CSV.
//!
//! Pure logic with no HTTP: the tracker is reached through the
//! [`HierarchySource`] and [`IssueSink`] traits.
//!
//! # Quick Start
//!
//! ```no_run
//! use jira_hierarchy_lib::{InMemoryTracker, ImportPlan, KeyMap, LinkMode};
//! use jira_hierarchy_lib::{collect_hierarchy, csv_io, execute, flatten};
//! use std::path::Path;
//!
//! // Export
//! let mut old = InMemoryTracker::new("OLD");
//! let tree = collect_hierarchy(&mut old, "OLD").unwrap();
//! csv_io::write_rows(Path::new("hierarchy.csv"), &flatten(&tree)).unwrap();
//!
//! // Import
//! let rows = csv_io::read_rows(Path::new("hierarchy.csv")).unwrap();
//! let mut keys = KeyMap::new();
//! let plan = ImportPlan::build(&rows, &keys, LinkMode::Parent).unwrap();
//! let mut new = InMemoryTracker::new("NEW");
//! let report = execute(&plan, &mut new, &mut keys, |_| Ok(())).unwrap();
//! println!("created {} epics", report.epics_created);
//! ```

pub mod csv_io;
pub mod error;
pub mod export;
pub mod import;
pub mod mapping;
pub mod memory;
pub mod model;
pub mod tracker;
pub mod validation;

pub use error::{HierarchyError, Result, ValidationError};
pub use export::{collect_hierarchy, flatten};
pub use import::{
    DryRunSink, EPIC_LINK_BATCH, ImportPlan, ImportReport, LinkMode, PlannedAction, dry_run,
    execute,
};
pub use mapping::{KeyMap, MappingEntry, MappingLedger};
pub use memory::InMemoryTracker;
pub use model::{EpicNode, HierarchyCounts, IssueKind, IssueRef, NewIssue, Row, TaskNode};
pub use tracker::{HierarchySource, IssueSink};
