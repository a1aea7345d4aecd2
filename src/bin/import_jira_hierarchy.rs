//! `import-jira-hierarchy` - recreate an Epic → Task → Subtask tree from CSV.

use jira_hierarchy::run_import;

fn main() {
    if let Err(e) = run_import() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
