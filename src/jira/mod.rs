//! Jira Cloud REST integration.
//!
//! - [`client`]: blocking HTTP client (search, create, epic link)
//! - [`models`]: wire types
//! - [`project`]: [`HierarchySource`](jira_hierarchy_lib::HierarchySource) and
//!   [`IssueSink`](jira_hierarchy_lib::IssueSink) over one project

pub mod client;
pub mod models;
pub mod project;

pub use client::JiraClient;
pub use project::{ProjectSink, ProjectSource};
