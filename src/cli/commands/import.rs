use jira_hierarchy_lib::csv_io::read_rows;
use jira_hierarchy_lib::{
    ImportPlan, ImportReport, KeyMap, MappingLedger, Result, dry_run, execute as run_plan,
};
use tracing::{info, warn};

use crate::cli::{ImportCli, load_settings};
use crate::format::{ImportOutput, format_created, format_import_summary, format_planned};
use crate::jira::{JiraClient, ProjectSink};

/// Execute the import command.
///
/// Reads and validates the whole CSV before the first Jira call. A dry run
/// stops after printing the plan.
///
/// # Errors
///
/// Returns an error if the CSV is invalid, credentials are missing, a Jira
/// call fails, or the mapping file cannot be written. Issues created before
/// the failure stay recorded in the mapping file.
pub fn execute(args: &ImportCli) -> Result<()> {
    let settings = load_settings(
        &args.global,
        &args.jira,
        &args.types,
        args.epic_name_field.as_deref(),
    )?;

    let rows = read_rows(&args.csv)?;
    let known = match args.mapping.as_deref() {
        Some(path) => MappingLedger::load(path)?,
        None => KeyMap::new(),
    };
    let plan = ImportPlan::build(&rows, &known, args.link_mode)?;
    info!(
        rows = rows.len(),
        actions = plan.actions.len(),
        skipped = plan.skipped_existing,
        link_mode = %plan.link_mode,
        "Planned import"
    );

    let verbose_text = !args.global.json && !args.global.quiet;

    if args.dry_run {
        let report = dry_run(&plan, &known)?;
        if verbose_text {
            for action in &plan.actions {
                println!("{}", format_planned(action, plan.link_mode));
            }
        }
        return print_report(args, report);
    }

    let credentials = settings.credentials()?;
    let client = JiraClient::new(&credentials)?;
    info!(url = %client.base_url(), project = %args.project_key, "Importing hierarchy");

    let mut sink = ProjectSink::new(
        &client,
        &args.project_key,
        settings.issue_types(),
        settings.epic_name_field(),
    );
    let mut ledger = args.mapping.as_deref().map(MappingLedger::open).transpose()?;
    if let Some(ledger) = &ledger {
        info!(path = %ledger.path().display(), "Recording created issues");
    }
    let mut keys = known;

    let outcome = run_plan(&plan, &mut sink, &mut keys, |entry| {
        if let Some(ledger) = ledger.as_mut() {
            ledger.record(entry)?;
        }
        if verbose_text {
            println!("{}", format_created(entry));
        }
        Ok(())
    });
    let report = match outcome {
        Ok(report) => report,
        Err(err) => {
            if err.is_remote() {
                match &args.mapping {
                    Some(path) => warn!(
                        mapped = keys.len(),
                        mapping = %path.display(),
                        "Import stopped on a Jira error; re-run with the same --mapping to resume"
                    ),
                    None => warn!(
                        mapped = keys.len(),
                        "Import stopped on a Jira error; without --mapping a re-run creates duplicates"
                    ),
                }
            }
            return Err(err);
        }
    };

    print_report(args, report)
}

fn print_report(args: &ImportCli, report: ImportReport) -> Result<()> {
    if args.global.json {
        let output = ImportOutput {
            project_key: args.project_key.clone(),
            csv: args.csv.clone(),
            link_mode: args.link_mode,
            mapping: args.mapping.clone(),
            report,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", format_import_summary(&report));
    }
    Ok(())
}
