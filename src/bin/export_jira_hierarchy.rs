//! `export-jira-hierarchy` - write a project's Epic → Task → Subtask tree to CSV.

use jira_hierarchy::run_export;

fn main() {
    if let Err(e) = run_export() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
