use jira_hierarchy_lib::csv_io::write_rows;
use jira_hierarchy_lib::{HierarchyCounts, Result, collect_hierarchy, flatten};
use tracing::info;

use crate::cli::{ExportCli, load_settings};
use crate::format::{ExportSummary, format_export_summary};
use crate::jira::{JiraClient, ProjectSource};

/// Execute the export command.
///
/// # Errors
///
/// Returns an error if credentials are missing, a Jira call fails, or the
/// CSV file cannot be written.
pub fn execute(args: &ExportCli) -> Result<()> {
    let settings = load_settings(&args.global, &args.jira, &args.types, None)?;
    let credentials = settings.credentials()?;
    let client = JiraClient::new(&credentials)?;
    info!(url = %client.base_url(), project = %args.project_key, "Exporting hierarchy");

    let mut source = ProjectSource::new(&client, settings.issue_types());
    let tree = collect_hierarchy(&mut source, &args.project_key)?;
    let counts = HierarchyCounts::of(&tree);
    if !args.global.json && !args.global.quiet {
        println!(
            "Found {} epics in project {}",
            counts.epics, args.project_key
        );
    }

    let rows = flatten(&tree);
    write_rows(&args.output, &rows)?;

    let summary = ExportSummary::new(&args.project_key, &args.output, counts, rows.len());
    if args.global.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", format_export_summary(&summary));
    }
    Ok(())
}
